use crate::pagination::{Page, PageInfo};
use crate::pandascore::{
    PsLeague, PsLeagueRef, PsMap, PsMatch, PsPlayer, PsSerie, PsSerieRef, PsTeam, PsTournament,
    PsTournamentRef, PsWeapon,
};
use crate::{
    DEFAULT_ACCENT, GameKey, League, LeagueRef, MapInfo, Match, MatchKind, Player, Serie,
    SerieRef, Team, TeamCount, TeamRef, Tier, Tournament, TournamentRef, Weapon,
};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const PANDASCORE_BASE: &str = "https://api.pandascore.co";
const TIER_FILTER: &str = "filter[tier]";
/// Id filters travel in the query string; at most this many ids per request.
const ID_CHUNK: usize = 50;
const MAX_PER_PAGE: u32 = 100;

/// PandaScore REST client. Every call is authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct PandaScoreApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for PandaScoreApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("eswatch/0.1 (terminal esports browser)")
                .build()
                .unwrap_or_default(),
            base_url: PANDASCORE_BASE.to_owned(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    MissingToken,
    Network(reqwest::Error, String),
    Status { status: u16, detail: String, url: String },
    Parsing(reqwest::Error, String),
    InvalidArgument(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingToken => write!(f, "Missing PANDASCORE_TOKEN: set it in the environment or .env"),
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status { status, detail, .. } => write!(f, "PandaScore error {status}: {detail}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Endpoints without a tier column answer a tier filter with a 400/422 that
    /// names the offending key.
    fn is_tier_rejection(&self) -> bool {
        match self {
            ApiError::Status { status, detail, .. } => {
                matches!(status, 400 | 422) && detail.to_lowercase().contains("tier")
            }
            _ => false,
        }
    }
}

type Params = Vec<(&'static str, String)>;

impl PandaScoreApi {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: Some(token).filter(|t| !t.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // -----------------------------------------------------------------------
    // Teams and players
    // -----------------------------------------------------------------------

    /// Paginated list of all teams.
    pub async fn teams(&self, page: u32, per_page: u32) -> ApiResult<Page<Team>> {
        let raw = self.get_page::<PsTeam>(&["teams"], Vec::new(), page, per_page).await?;
        Ok(raw.map(map_team))
    }

    /// Current roster of a team, by numeric id or slug.
    pub async fn team_players(
        &self,
        team_id_or_slug: &str,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<Player>> {
        let team = team_id_or_slug.trim();
        if team.is_empty() {
            return Err(ApiError::InvalidArgument("team id or slug is required".into()));
        }
        let raw = self
            .get_page::<PsPlayer>(&["teams", team, "players"], Vec::new(), page, per_page)
            .await?;
        Ok(raw.map(map_player))
    }

    /// Look players up on one game's endpoint. Ids are sent in chunks of 50.
    pub async fn players_by_game_ids(&self, game: GameKey, ids: &[u64]) -> ApiResult<Vec<Player>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let params = vec![
                ("per_page", MAX_PER_PAGE.to_string()),
                ("filter[id]", join_ids(chunk)),
            ];
            let raw: Vec<PsPlayer> = self.get_json(&[game.slug(), "players"], params).await?;
            out.extend(raw.into_iter().map(map_player));
        }
        Ok(out)
    }

    /// Roster enriched with each player's videogame.
    ///
    /// Per-game lookups that fail are skipped so the roster itself stays visible.
    /// With `game_filter` set, only that game's endpoint is consulted.
    pub async fn team_roster(
        &self,
        team_id_or_slug: &str,
        page: u32,
        per_page: u32,
        game_filter: Option<GameKey>,
    ) -> ApiResult<Page<Player>> {
        let mut roster = self.team_players(team_id_or_slug, page, per_page).await?;
        let ids: Vec<u64> = roster.items.iter().map(|p| p.id).filter(|id| *id != 0).collect();
        if ids.is_empty() {
            return Ok(roster);
        }

        let wanted: Vec<GameKey> = match game_filter {
            Some(key) => vec![key],
            None => GameKey::ALL.to_vec(),
        };

        let mut game_by_id: HashMap<u64, String> = HashMap::new();
        for game in wanted {
            match self.players_by_game_ids(game, &ids).await {
                Ok(found) => {
                    for p in found {
                        let name = p.game.unwrap_or_else(|| game.label().to_owned());
                        game_by_id.entry(p.id).or_insert(name);
                    }
                }
                Err(e) => warn!("{} player lookup failed, keeping roster as-is: {e}", game.slug()),
            }
        }

        for player in &mut roster.items {
            if let Some(game) = game_by_id.remove(&player.id) {
                player.game = Some(game);
            }
        }
        Ok(roster)
    }

    pub async fn player(&self, id_or_slug: &str) -> ApiResult<Player> {
        let id = id_or_slug.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidArgument("player id or slug is required".into()));
        }
        let raw: PsPlayer = self.get_json(&["players", id], Vec::new()).await?;
        Ok(map_player(raw))
    }

    /// Counter-Strike players whose name matches `query`.
    pub async fn search_players(&self, query: &str, page: u32, per_page: u32) -> ApiResult<Page<Player>> {
        let params = vec![("search[name]", query.trim().to_owned())];
        let raw = self
            .get_page::<PsPlayer>(&["csgo", "players"], params, page, per_page)
            .await?;
        Ok(raw.map(map_player))
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    /// Counter-Strike matches of one kind. With tiers selected, only matches of
    /// tournaments in those tiers are returned.
    pub async fn matches(
        &self,
        kind: MatchKind,
        page: u32,
        per_page: u32,
        tiers: &[Tier],
    ) -> ApiResult<Page<Match>> {
        let path = ["csgo", "matches", kind.slug()];
        if tiers.is_empty() {
            let raw = self.get_page::<PsMatch>(&path, Vec::new(), page, per_page).await?;
            return Ok(raw.map(map_match));
        }

        let tournaments = self.tournaments(Some(kind), 1, MAX_PER_PAGE, tiers).await?;
        let ids = tier_match_ids(&tournaments.items, tiers);
        debug!(
            "{} tier-filtered {} matches from {} tournaments",
            ids.len(),
            kind.slug(),
            tournaments.items.len()
        );
        if ids.is_empty() {
            return Ok(Page::empty(page, per_page));
        }

        // Paged locally: only the ids of the requested page go into the query.
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let total = ids.len() as u64;
        let window = id_page(ids, kind, page, per_page);

        let mut items = Vec::with_capacity(window.len());
        for chunk in window.chunks(ID_CHUNK) {
            let params = vec![
                ("per_page", chunk.len().to_string()),
                ("filter[id]", join_ids(chunk)),
            ];
            let raw: Vec<PsMatch> = self.get_json(&path, params).await?;
            items.extend(raw.into_iter().map(map_match));
        }

        let rank: HashMap<u64, usize> = window.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        items.sort_by_key(|m| rank.get(&m.id).copied().unwrap_or(usize::MAX));
        Ok(Page { items, info: PageInfo::from_parts(None, Some(total), page, per_page) })
    }

    /// Teams ranked by how many tier-filtered matches they played across `kinds`.
    pub async fn top_teams_by_tier(
        &self,
        tiers: &[Tier],
        kinds: &[MatchKind],
        pages: u32,
        per_page: u32,
    ) -> ApiResult<Vec<TeamCount>> {
        let mut matches = Vec::new();
        for kind in kinds {
            for page in 1..=pages.max(1) {
                let batch = self.matches(*kind, page, per_page, tiers).await?;
                let has_next = batch.info.has_next;
                matches.extend(batch.items);
                if !has_next {
                    break;
                }
            }
        }
        Ok(count_team_appearances(&matches))
    }

    // -----------------------------------------------------------------------
    // Leagues, series, tournaments
    // -----------------------------------------------------------------------

    pub async fn leagues(&self, page: u32, per_page: u32, tiers: &[Tier]) -> ApiResult<Page<League>> {
        let raw = self
            .get_page_tiered::<PsLeague>(&["csgo", "leagues"], page, per_page, tiers)
            .await?;
        Ok(raw.map(map_league))
    }

    pub async fn series(&self, page: u32, per_page: u32, tiers: &[Tier]) -> ApiResult<Page<Serie>> {
        let raw = self
            .get_page_tiered::<PsSerie>(&["csgo", "series"], page, per_page, tiers)
            .await?;
        Ok(raw.map(map_serie))
    }

    /// Tournaments, optionally restricted to one calendar slice.
    pub async fn tournaments(
        &self,
        kind: Option<MatchKind>,
        page: u32,
        per_page: u32,
        tiers: &[Tier],
    ) -> ApiResult<Page<Tournament>> {
        let raw = match kind {
            Some(kind) => {
                self.get_page_tiered::<PsTournament>(&["csgo", "tournaments", kind.slug()], page, per_page, tiers)
                    .await?
            }
            None => {
                self.get_page_tiered::<PsTournament>(&["csgo", "tournaments"], page, per_page, tiers)
                    .await?
            }
        };
        Ok(raw.map(map_tournament))
    }

    // -----------------------------------------------------------------------
    // Reference data
    // -----------------------------------------------------------------------

    pub async fn maps(&self, page: u32, per_page: u32) -> ApiResult<Page<MapInfo>> {
        let raw = self.get_page::<PsMap>(&["csgo", "maps"], Vec::new(), page, per_page).await?;
        Ok(raw.map(|m| MapInfo {
            id: m.id.unwrap_or_default(),
            name: m.name.unwrap_or_default(),
            image_url: non_empty(m.image_url),
        }))
    }

    pub async fn weapons(&self, page: u32, per_page: u32) -> ApiResult<Page<Weapon>> {
        let raw = self
            .get_page::<PsWeapon>(&["csgo", "weapons"], Vec::new(), page, per_page)
            .await?;
        Ok(raw.map(|w| Weapon {
            id: w.id.unwrap_or_default(),
            name: w.name.unwrap_or_default(),
            kind: non_empty(w.kind),
            image_url: non_empty(w.image_url),
        }))
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str], params: &[(&'static str, String)]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Other(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("base url cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        let present: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !present.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in present {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send(&self, segments: &[&str], params: &[(&'static str, String)]) -> ApiResult<reqwest::Response> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        let url = self.endpoint(segments, params)?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
            url: url.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], params: Params) -> ApiResult<T> {
        let response = self.send(segments, &params).await?;
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|e| ApiError::Parsing(e, url))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        extra: Params,
        page: u32,
        per_page: u32,
    ) -> ApiResult<Page<T>> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let mut params: Params = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        params.extend(extra);

        let response = self.send(segments, &params).await?;
        let info = PageInfo::from_headers(response.headers(), page, per_page);
        let url = response.url().to_string();
        let items = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| ApiError::Parsing(e, url))?;
        Ok(Page { items, info })
    }

    /// Paginated GET with a tier filter; retried once without the filter when
    /// the endpoint rejects it.
    async fn get_page_tiered<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        page: u32,
        per_page: u32,
        tiers: &[Tier],
    ) -> ApiResult<Page<T>> {
        let filter = tier_filter_value(tiers);
        if filter.is_empty() {
            return self.get_page(segments, Vec::new(), page, per_page).await;
        }

        match self
            .get_page(segments, vec![(TIER_FILTER, filter)], page, per_page)
            .await
        {
            Err(e) if e.is_tier_rejection() => {
                debug!("/{} rejects tier filter, retrying without it: {e}", segments.join("/"));
                self.get_page(segments, Vec::new(), page, per_page).await
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Best-effort message from an error body: JSON `error`, then `message`,
/// then the JSON itself; plain text bodies are returned trimmed.
fn error_detail(body: &str) -> String {
    let body = body.trim();
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => {
            let field = |key: &str| {
                json.get(key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            };
            field("error")
                .or_else(|| field("message"))
                .unwrap_or_else(|| json.to_string())
        }
        Err(_) => body.to_owned(),
    }
}

fn tier_filter_value(tiers: &[Tier]) -> String {
    let mut sorted: Vec<Tier> = tiers.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.iter().map(Tier::code).collect::<Vec<_>>().join(",")
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
}

/// Match ids of tournaments whose tier is selected. Tournaments with another
/// or no tier never contribute, even if the server ignored the filter.
pub fn tier_match_ids(tournaments: &[Tournament], tiers: &[Tier]) -> Vec<u64> {
    let mut seen = HashSet::new();
    tournaments
        .iter()
        .filter(|t| t.tier.is_some_and(|tier| tiers.contains(&tier)))
        .flat_map(|t| t.match_ids.iter().copied())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Ids shown on `page`. Ids grow with creation time, so past matches are
/// listed highest first and the others lowest first.
fn id_page(mut ids: Vec<u64>, kind: MatchKind, page: u32, per_page: u32) -> Vec<u64> {
    ids.sort_unstable();
    if kind == MatchKind::Past {
        ids.reverse();
    }
    let skip = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    ids.into_iter().skip(skip).take(per_page as usize).collect()
}

fn count_team_appearances(matches: &[Match]) -> Vec<TeamCount> {
    let mut by_id: HashMap<u64, TeamCount> = HashMap::new();
    for m in matches {
        for team in &m.opponents {
            by_id
                .entry(team.id)
                .or_insert_with(|| TeamCount { team: team.clone(), count: 0 })
                .count += 1;
        }
    }
    let mut ranked: Vec<TeamCount> = by_id.into_values().collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.team.name.to_lowercase().cmp(&b.team.name.to_lowercase()))
    });
    ranked
}

// ---------------------------------------------------------------------------
// Mapping: PandaScore wire types → clean domain types
// ---------------------------------------------------------------------------

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_time(s: Option<&str>) -> Option<DateTime<Utc>> {
    s.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_tier(s: Option<&str>) -> Option<Tier> {
    s.and_then(Tier::parse)
}

fn map_team(t: PsTeam) -> Team {
    let name = non_empty(t.name);
    let abbreviation = non_empty(t.acronym).unwrap_or_else(|| {
        name.as_deref()
            .unwrap_or_default()
            .chars()
            .take(3)
            .collect::<String>()
            .to_uppercase()
    });

    let mut games: Vec<String> = Vec::new();
    let listed = t.current_videogame.into_iter().chain(t.videogames);
    for game in listed.filter_map(|vg| non_empty(vg.name)) {
        if !games.contains(&game) {
            games.push(game);
        }
    }

    Team {
        id: t.id.unwrap_or_default(),
        slug: non_empty(t.slug),
        name: name.unwrap_or_else(|| abbreviation.clone()),
        abbreviation,
        country: non_empty(t.location).or_else(|| non_empty(t.country)),
        logo_url: non_empty(t.image_url),
        founded: non_empty(t.founded).or_else(|| non_empty(t.created_at)),
        games,
        players: t.players.into_iter().map(map_player).collect(),
        trophies: Vec::new(),
        accent: DEFAULT_ACCENT.to_owned(),
    }
}

fn map_player(p: PsPlayer) -> Player {
    let name = non_empty(p.name).unwrap_or_else(|| {
        format!(
            "{} {}",
            p.first_name.unwrap_or_default(),
            p.last_name.unwrap_or_default()
        )
        .trim()
        .to_owned()
    });
    Player {
        id: p.id.unwrap_or_default(),
        slug: non_empty(p.slug),
        name,
        nationality: non_empty(p.nationality).or_else(|| non_empty(p.country)),
        image_url: non_empty(p.image_url),
        active: p.active != Some(false),
        role: non_empty(p.role),
        game: p.current_videogame.and_then(|vg| non_empty(vg.name)),
    }
}

fn map_league_ref(l: PsLeagueRef) -> LeagueRef {
    LeagueRef {
        id: l.id.unwrap_or_default(),
        name: l.name.unwrap_or_default(),
        image_url: non_empty(l.image_url),
    }
}

fn map_serie_ref(s: PsSerieRef) -> SerieRef {
    SerieRef {
        id: s.id.unwrap_or_default(),
        name: non_empty(s.name),
        full_name: non_empty(s.full_name),
    }
}

fn map_tournament_ref(t: PsTournamentRef) -> TournamentRef {
    TournamentRef {
        id: t.id.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        tier: parse_tier(t.tier.as_deref()),
    }
}

fn map_match(m: PsMatch) -> Match {
    let opponents = m
        .opponents
        .into_iter()
        .filter_map(|slot| slot.opponent)
        .map(|o| TeamRef {
            id: o.id.unwrap_or_default(),
            name: o.name.unwrap_or_default(),
            acronym: non_empty(o.acronym),
            image_url: non_empty(o.image_url),
        })
        .collect();

    // Team matches report `team_id`; 1v1 games report `player_id` instead.
    let results = m
        .results
        .into_iter()
        .filter_map(|r| Some((r.team_id.or(r.player_id)?, r.score.unwrap_or_default())))
        .collect();

    Match {
        id: m.id.unwrap_or_default(),
        name: m.name.unwrap_or_default(),
        status: m.status.unwrap_or_default(),
        opponents,
        results,
        winner_id: m.winner_id,
        begin_at: parse_time(m.begin_at.as_deref()),
        end_at: parse_time(m.end_at.as_deref()),
        scheduled_at: parse_time(m.scheduled_at.as_deref()),
        number_of_games: m.number_of_games,
        league: m.league.map(map_league_ref),
        serie: m.serie.map(map_serie_ref),
        tournament: m.tournament.map(map_tournament_ref),
    }
}

fn map_league(l: PsLeague) -> League {
    League {
        id: l.id.unwrap_or_default(),
        name: l.name.unwrap_or_default(),
        slug: non_empty(l.slug),
        image_url: non_empty(l.image_url),
        videogame: l.videogame.and_then(|vg| non_empty(vg.name)),
    }
}

fn map_serie(s: PsSerie) -> Serie {
    Serie {
        id: s.id.unwrap_or_default(),
        name: non_empty(s.name),
        full_name: non_empty(s.full_name),
        year: s.year,
        season: non_empty(s.season),
        begin_at: parse_time(s.begin_at.as_deref()),
        end_at: parse_time(s.end_at.as_deref()),
        league: s.league.map(map_league_ref),
        tier: parse_tier(s.tier.as_deref()),
        winner_id: s.winner_id,
    }
}

fn map_tournament(t: PsTournament) -> Tournament {
    Tournament {
        id: t.id.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        begin_at: parse_time(t.begin_at.as_deref()),
        end_at: parse_time(t.end_at.as_deref()),
        tier: parse_tier(t.tier.as_deref()),
        region: non_empty(t.region).or_else(|| non_empty(t.country)),
        league: t.league.map(map_league_ref),
        serie: t.serie.map(map_serie_ref),
        winner_id: t.winner_id,
        videogame: t.videogame.and_then(|vg| non_empty(vg.name)),
        match_ids: t.matches.into_iter().filter_map(|m| m.id).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    const TOKEN: &str = "secret-token";

    fn api(server: &ServerGuard) -> PandaScoreApi {
        PandaScoreApi::new(TOKEN).with_base_url(server.url())
    }

    #[test]
    fn error_detail_prefers_error_then_message_then_json() {
        assert_eq!(error_detail(r#"{"error":"Forbidden"}"#), "Forbidden");
        assert_eq!(error_detail(r#"{"message":"Rate limited"}"#), "Rate limited");
        assert_eq!(error_detail(r#"{"code":42}"#), r#"{"code":42}"#);
        assert_eq!(error_detail("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_detail(""), "");
    }

    #[test]
    fn tier_filter_value_is_sorted_and_deduplicated() {
        assert_eq!(tier_filter_value(&[Tier::B, Tier::S, Tier::B]), "s,b");
        assert_eq!(tier_filter_value(&[]), "");
    }

    #[test]
    fn only_selected_tier_tournaments_contribute_match_ids() {
        let tournaments = vec![
            Tournament { id: 1, tier: Some(Tier::S), match_ids: vec![10, 11], ..Default::default() },
            Tournament { id: 2, tier: Some(Tier::A), match_ids: vec![20], ..Default::default() },
            Tournament { id: 3, tier: None, match_ids: vec![30], ..Default::default() },
            Tournament { id: 4, tier: Some(Tier::S), match_ids: vec![11, 12], ..Default::default() },
        ];
        assert_eq!(tier_match_ids(&tournaments, &[Tier::S]), vec![10, 11, 12]);
        assert_eq!(tier_match_ids(&tournaments, &[Tier::A, Tier::S]), vec![10, 11, 20, 12]);
        assert!(tier_match_ids(&tournaments, &[Tier::B]).is_empty());
    }

    #[test]
    fn team_mapping_fills_fallbacks() {
        let raw: PsTeam = serde_json::from_str(
            r#"{"id":3210,"name":"Vitality","acronym":null,"location":"FR",
                "current_videogame":{"name":"Counter-Strike"},
                "videogames":[{"name":"Counter-Strike"},{"name":"Valorant"}],
                "players":[{"id":1,"first_name":"Mathieu","last_name":"Herbaut","active":false}]}"#,
        )
        .unwrap();
        let team = map_team(raw);
        assert_eq!(team.abbreviation, "VIT");
        assert_eq!(team.country.as_deref(), Some("FR"));
        assert_eq!(team.games, vec!["Counter-Strike".to_string(), "Valorant".to_string()]);
        assert_eq!(team.accent, DEFAULT_ACCENT);
        assert!(team.trophies.is_empty());
        assert_eq!(team.players[0].name, "Mathieu Herbaut");
        assert!(!team.players[0].active);
    }

    #[test]
    fn players_are_active_unless_explicitly_benched() {
        let raw: PsPlayer = serde_json::from_str(r#"{"id":7,"name":"ZywOo"}"#).unwrap();
        assert!(map_player(raw).active);
    }

    #[test]
    fn top_teams_are_ranked_by_appearances() {
        let team = |id, name: &str| TeamRef { id, name: name.into(), ..Default::default() };
        let matches = vec![
            Match { opponents: vec![team(1, "MOUZ"), team(2, "FaZe")], ..Default::default() },
            Match { opponents: vec![team(2, "FaZe"), team(3, "Astralis")], ..Default::default() },
            Match { opponents: vec![team(3, "Astralis"), team(2, "FaZe")], ..Default::default() },
        ];
        let ranked = count_team_appearances(&matches);
        assert_eq!(ranked[0].team.name, "FaZe");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[1].team.name, "Astralis");
        assert_eq!(ranked[2].team.name, "MOUZ");
    }

    #[tokio::test]
    async fn teams_sends_bearer_token_and_reads_pagination() {
        let mut server = Server::new_async().await;
        let link = format!(
            r#"<{0}/teams?page=1&per_page=10>; rel="prev", <{0}/teams?page=3&per_page=10>; rel="next", <{0}/teams?page=40&per_page=10>; rel="last""#,
            server.url()
        );
        let mock = server
            .mock("GET", "/teams")
            .match_query(Matcher::Exact("page=2&per_page=10".into()))
            .match_header("authorization", "Bearer secret-token")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("link", link.as_str())
            .with_header("x-total", "397")
            .with_body(r#"[{"id":1,"name":"Team Liquid","acronym":"TL"},{"id":2,"name":"G2 Esports","acronym":"G2"}]"#)
            .create_async()
            .await;

        let page = api(&server).teams(2, 10).await.expect("teams should load");
        mock.assert_async().await;

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].abbreviation, "G2");
        assert_eq!(page.info.total, Some(397));
        assert_eq!(page.info.total_pages, Some(40));
        assert_eq!(page.info.next_page, Some(3));
        assert!(page.info.has_prev);
        assert!(page.info.has_next);
    }

    #[tokio::test]
    async fn non_success_surfaces_status_and_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/teams")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":"Access to this resource is forbidden"}"#)
            .create_async()
            .await;

        let err = api(&server).teams(1, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "PandaScore error 403: Access to this resource is forbidden");
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/teams")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = PandaScoreApi::new("  ")
            .with_base_url(server.url())
            .teams(1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_tier_filter_is_retried_once_without_it() {
        let mut server = Server::new_async().await;
        let rejected = server
            .mock("GET", "/csgo/leagues")
            .match_query(Matcher::UrlEncoded("filter[tier]".into(), "s".into()))
            .with_status(400)
            .with_body(r#"{"error":"Unknown filter key 'tier'"}"#)
            .expect(1)
            .create_async()
            .await;
        let plain = server
            .mock("GET", "/csgo/leagues")
            .match_query(Matcher::Exact("page=1&per_page=6".into()))
            .with_status(200)
            .with_body(r#"[{"id":4197,"name":"BLAST Premier","slug":"cs-go-blast-premier","videogame":{"name":"Counter-Strike"}}]"#)
            .expect(1)
            .create_async()
            .await;

        let leagues = api(&server).leagues(1, 6, &[Tier::S]).await.expect("retry should succeed");
        rejected.assert_async().await;
        plain.assert_async().await;
        assert_eq!(leagues.items[0].name, "BLAST Premier");
        assert_eq!(leagues.items[0].videogame.as_deref(), Some("Counter-Strike"));
    }

    #[tokio::test]
    async fn unrelated_errors_are_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/csgo/series")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("tier service unavailable")
            .expect(1)
            .create_async()
            .await;

        let err = api(&server).series(1, 6, &[Tier::A]).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn tier_filtered_matches_query_ids_of_selected_tournaments() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/csgo/tournaments/upcoming")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter[tier]".into(), "s".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id":1,"name":"Playoffs","tier":"s","matches":[{"id":101},{"id":102}]},
                    {"id":2,"name":"Open Qualifier","tier":"c","matches":[{"id":900}]}]"#,
            )
            .create_async()
            .await;
        let matches = server
            .mock("GET", "/csgo/matches/upcoming")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter[id]".into(), "101,102".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id":101,"name":"Vitality vs NAVI","status":"not_started","number_of_games":3,
                     "opponents":[{"opponent":{"id":5,"name":"Vitality"}},{"opponent":{"id":9,"name":"NAVI"}}],
                     "tournament":{"id":1,"name":"Playoffs","tier":"s"}}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let page = api(&server)
            .matches(MatchKind::Upcoming, 1, 5, &[Tier::S])
            .await
            .expect("matches should load");
        matches.assert_async().await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].opponents[1].name, "NAVI");
        assert_eq!(page.items[0].tournament.as_ref().and_then(|t| t.tier), Some(Tier::S));
        assert_eq!(page.info.total, Some(2));
        assert!(!page.info.has_next);
    }

    fn many_tournaments(count: u64, per_tournament: u64) -> String {
        let entries: Vec<String> = (0..count)
            .map(|t| {
                let ids: Vec<String> = (1..=per_tournament)
                    .map(|m| format!(r#"{{"id":{}}}"#, t * per_tournament + m))
                    .collect();
                format!(r#"{{"id":{},"tier":"s","matches":[{}]}}"#, t + 1, ids.join(","))
            })
            .collect();
        format!("[{}]", entries.join(","))
    }

    #[test]
    fn id_pages_list_past_matches_newest_first() {
        let ids = vec![3, 1, 2, 5, 4];
        assert_eq!(id_page(ids.clone(), MatchKind::Past, 1, 2), vec![5, 4]);
        assert_eq!(id_page(ids.clone(), MatchKind::Upcoming, 2, 2), vec![3, 4]);
        assert_eq!(id_page(ids.clone(), MatchKind::Running, 3, 2), vec![5]);
        assert!(id_page(ids, MatchKind::Past, 4, 2).is_empty());
    }

    #[tokio::test]
    async fn large_tier_id_sets_only_query_the_requested_page() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/csgo/tournaments/past")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(many_tournaments(100, 30))
            .create_async()
            .await;
        let matches = server
            .mock("GET", "/csgo/matches/past")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter[id]".into(), "2995,2994,2993,2992,2991".into()),
                Matcher::UrlEncoded("per_page".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"id":2991,"status":"finished"},{"id":2995,"status":"finished"}]"#)
            .expect(1)
            .create_async()
            .await;

        let page = api(&server).matches(MatchKind::Past, 2, 5, &[Tier::S]).await.unwrap();
        matches.assert_async().await;
        let ids: Vec<u64> = page.items.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2995, 2991]);
        assert_eq!(page.info.total, Some(3000));
        assert_eq!(page.info.total_pages, Some(600));
        assert!(page.info.has_prev);
        assert!(page.info.has_next);
    }

    #[tokio::test]
    async fn full_pages_of_tier_ids_are_split_across_requests() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/csgo/tournaments/upcoming")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(many_tournaments(10, 30))
            .create_async()
            .await;
        let matches = server
            .mock("GET", "/csgo/matches/upcoming")
            .match_query(Matcher::UrlEncoded("per_page".into(), "50".into()))
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;

        let page = api(&server).matches(MatchKind::Upcoming, 1, 100, &[Tier::S]).await.unwrap();
        matches.assert_async().await;
        assert!(page.items.is_empty());
        assert_eq!(page.info.total_pages, Some(3));
    }

    #[tokio::test]
    async fn no_matching_tournaments_skips_match_query() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/csgo/tournaments/past")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id":2,"tier":"b","matches":[{"id":900}]}]"#)
            .create_async()
            .await;
        let matches = server
            .mock("GET", "/csgo/matches/past")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let page = api(&server).matches(MatchKind::Past, 1, 5, &[Tier::S]).await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.info.has_next);
        matches.assert_async().await;
    }

    #[tokio::test]
    async fn game_lookups_are_chunked() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/lol/players")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;

        let ids: Vec<u64> = (1..=60).collect();
        let found = api(&server).players_by_game_ids(GameKey::Lol, &ids).await.unwrap();
        assert!(found.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn roster_is_enriched_and_survives_failing_game_endpoints() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/teams/vitality/players")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id":11,"name":"ZywOo"},{"id":12,"name":"apEX"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/csgo/players")
            .match_query(Matcher::UrlEncoded("filter[id]".into(), "11,12".into()))
            .with_status(200)
            .with_body(r#"[{"id":11,"name":"ZywOo","current_videogame":{"name":"Counter-Strike"}}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/lol/players")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        server
            .mock("GET", "/valorant/players")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let roster = api(&server).team_roster("vitality", 1, 50, None).await.unwrap();
        assert_eq!(roster.items.len(), 2);
        assert_eq!(roster.items[0].game.as_deref(), Some("Counter-Strike"));
        assert_eq!(roster.items[1].game, None);
    }

    #[tokio::test]
    async fn blank_player_id_is_rejected_locally() {
        let err = PandaScoreApi::new(TOKEN).player(" ").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
