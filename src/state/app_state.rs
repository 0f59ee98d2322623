use crate::app::MenuItem;
use crate::state::bet::BetBoard;
use crate::state::messages::Loaded;
use crate::state::predictions::{LeaderboardEntry, PredictionStore};
use crate::state::tiers::TierSelection;
use chrono::{DateTime, Utc};
use pandascore_api::{GameKey, League, Match, MatchKind, PageInfo, Player, Serie, Team, TeamCount, Tournament};
use std::collections::HashSet;

pub const TEAMS_PER_PAGE: u32 = 10;
pub const ROSTER_PER_PAGE: u32 = 50;
pub const MATCHES_PER_PAGE: u32 = 5;
pub const LEAGUES_PER_PAGE: u32 = 6;
pub const BET_PER_PAGE: u32 = 50;

/// Placeholder for absent values in detail views.
pub const MISSING: &str = "—";

// ---------------------------------------------------------------------------
// Paginated, cancellable list
// ---------------------------------------------------------------------------

/// One remote list view. Every fetch bumps `generation`; a response carrying
/// an older generation is dropped so a slow page can't overwrite a newer one.
#[derive(Debug)]
pub struct Loadable<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub info: PageInfo,
    pub page: u32,
    pub per_page: u32,
    pub generation: u64,
    pub loaded: bool,
}

impl<T> Loadable<T> {
    pub fn new(per_page: u32) -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
            info: PageInfo::default(),
            page: 1,
            per_page,
            generation: 0,
            loaded: false,
        }
    }

    /// Mark a fetch as started and return the generation to tag it with.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.generation
    }

    /// Apply a response. Returns false when it was stale and ignored.
    pub fn accept(&mut self, generation: u64, result: Loaded<T>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(page) => {
                self.data = page.items;
                self.info = page.info;
                self.error = None;
            }
            Err(message) => {
                self.data.clear();
                self.info = PageInfo::default();
                self.error = Some(message);
            }
        }
        true
    }

    pub fn next_page(&mut self) -> bool {
        if !self.info.has_next {
            return false;
        }
        self.page = self.info.next_page.unwrap_or(self.page + 1);
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page = self.info.prev_page.unwrap_or(self.page - 1).max(1);
        true
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    pub fn page_label(&self) -> String {
        match self.info.total_pages {
            Some(total) => format!("page {}/{total}", self.page),
            None => format!("page {}", self.page),
        }
    }
}

fn move_cursor(index: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *index = 0;
    } else if down {
        *index = (*index + 1).min(len - 1);
    } else {
        *index = index.saturating_sub(1);
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ---------------------------------------------------------------------------
// Teams tab
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeamsFocus {
    #[default]
    List,
    Roster,
}

#[derive(Debug)]
pub struct TeamsState {
    pub teams: Loadable<Team>,
    pub selected: usize,
    pub filter: String,
    pub focus: TeamsFocus,
    /// Team whose roster is shown.
    pub roster_team: Option<Team>,
    pub roster: Loadable<Player>,
    pub roster_selected: usize,
    pub game_filter: Option<String>,
}

impl Default for TeamsState {
    fn default() -> Self {
        Self {
            teams: Loadable::new(TEAMS_PER_PAGE),
            selected: 0,
            filter: String::new(),
            focus: TeamsFocus::default(),
            roster_team: None,
            roster: Loadable::new(ROSTER_PER_PAGE),
            roster_selected: 0,
            game_filter: None,
        }
    }
}

impl TeamsState {
    /// Current page narrowed by the name/abbreviation filter.
    pub fn visible_teams(&self) -> Vec<&Team> {
        let q = self.filter.trim().to_lowercase();
        self.teams
            .data
            .iter()
            .filter(|t| q.is_empty() || contains_ci(&t.name, &q) || contains_ci(&t.abbreviation, &q))
            .collect()
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.visible_teams().get(self.selected).copied()
    }

    pub fn game_key(&self) -> Option<GameKey> {
        self.game_filter.as_deref().and_then(GameKey::from_name)
    }

    /// Active players, narrowed to the game filter when one is set.
    pub fn visible_roster(&self) -> Vec<&Player> {
        let wanted = self.game_filter.as_deref();
        self.roster
            .data
            .iter()
            .filter(|p| p.active)
            .filter(|p| match wanted {
                None => true,
                Some(game) => p.game.as_deref().is_some_and(|g| same_game(g, game)),
            })
            .collect()
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.visible_roster().get(self.roster_selected).copied()
    }

    /// all → each of the team's games → all.
    pub fn cycle_game_filter(&mut self) {
        let games: Vec<String> = self
            .roster_team
            .as_ref()
            .map(|t| t.games.clone())
            .unwrap_or_default();
        self.game_filter = match &self.game_filter {
            None => games.first().cloned(),
            Some(current) => games
                .iter()
                .position(|g| g == current)
                .and_then(|i| games.get(i + 1).cloned()),
        };
        self.roster_selected = 0;
    }

    pub fn move_selection(&mut self, down: bool) {
        match self.focus {
            TeamsFocus::List => {
                let len = self.visible_teams().len();
                move_cursor(&mut self.selected, len, down);
            }
            TeamsFocus::Roster => {
                let len = self.visible_roster().len();
                move_cursor(&mut self.roster_selected, len, down);
            }
        }
    }
}

fn same_game(a: &str, b: &str) -> bool {
    match (GameKey::from_name(a), GameKey::from_name(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.eq_ignore_ascii_case(b),
    }
}

// ---------------------------------------------------------------------------
// Players tab (search)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PlayersState {
    pub query: String,
    pub results: Vec<Player>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
}

impl PlayersState {
    pub fn selected_player(&self) -> Option<&Player> {
        self.results.get(self.selected)
    }
}

// ---------------------------------------------------------------------------
// Matches tab
// ---------------------------------------------------------------------------

pub const MATCH_COLUMNS: [MatchKind; 3] = [MatchKind::Running, MatchKind::Upcoming, MatchKind::Past];

#[derive(Debug)]
pub struct MatchesState {
    pub running: Loadable<Match>,
    pub upcoming: Loadable<Match>,
    pub past: Loadable<Match>,
    pub focus: MatchKind,
    pub selected: usize,
    pub filter: String,
    pub top_teams: Vec<TeamCount>,
    pub top_loading: bool,
    pub top_error: Option<String>,
    pub top_generation: u64,
}

impl Default for MatchesState {
    fn default() -> Self {
        Self {
            running: Loadable::new(MATCHES_PER_PAGE),
            upcoming: Loadable::new(MATCHES_PER_PAGE),
            past: Loadable::new(MATCHES_PER_PAGE),
            focus: MatchKind::Running,
            selected: 0,
            filter: String::new(),
            top_teams: Vec::new(),
            top_loading: false,
            top_error: None,
            top_generation: 0,
        }
    }
}

impl MatchesState {
    pub fn column(&self, kind: MatchKind) -> &Loadable<Match> {
        match kind {
            MatchKind::Running => &self.running,
            MatchKind::Upcoming => &self.upcoming,
            MatchKind::Past => &self.past,
        }
    }

    pub fn column_mut(&mut self, kind: MatchKind) -> &mut Loadable<Match> {
        match kind {
            MatchKind::Running => &mut self.running,
            MatchKind::Upcoming => &mut self.upcoming,
            MatchKind::Past => &mut self.past,
        }
    }

    /// Matches of one column whose opponents or league match the text filter.
    pub fn visible(&self, kind: MatchKind) -> Vec<&Match> {
        let q = self.filter.trim().to_lowercase();
        self.column(kind)
            .data
            .iter()
            .filter(|m| {
                q.is_empty()
                    || m.opponents.iter().any(|t| contains_ci(&t.name, &q))
                    || m.league.as_ref().is_some_and(|l| contains_ci(&l.name, &q))
            })
            .collect()
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.visible(self.focus).get(self.selected).copied()
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let idx = MATCH_COLUMNS.iter().position(|k| *k == self.focus).unwrap_or(0);
        let next = if forward { (idx + 1) % 3 } else { (idx + 2) % 3 };
        self.focus = MATCH_COLUMNS[next];
        self.selected = 0;
    }

    pub fn move_selection(&mut self, down: bool) {
        let len = self.visible(self.focus).len();
        move_cursor(&mut self.selected, len, down);
    }

    pub fn begin_top_teams(&mut self) -> u64 {
        self.top_generation += 1;
        self.top_loading = true;
        self.top_error = None;
        self.top_generation
    }
}

// ---------------------------------------------------------------------------
// Leagues tab
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeaguesColumn {
    #[default]
    Leagues,
    Series,
    Tournaments,
}

impl LeaguesColumn {
    const ORDER: [LeaguesColumn; 3] = [LeaguesColumn::Leagues, LeaguesColumn::Series, LeaguesColumn::Tournaments];

    pub fn label(&self) -> &'static str {
        match self {
            LeaguesColumn::Leagues => "Leagues",
            LeaguesColumn::Series => "Series",
            LeaguesColumn::Tournaments => "Tournaments",
        }
    }
}

#[derive(Debug)]
pub struct LeaguesState {
    pub leagues: Loadable<League>,
    pub series: Loadable<Serie>,
    pub tournaments: Loadable<Tournament>,
    pub focus: LeaguesColumn,
    pub selected: usize,
    pub filter: String,
}

impl Default for LeaguesState {
    fn default() -> Self {
        Self {
            leagues: Loadable::new(LEAGUES_PER_PAGE),
            series: Loadable::new(LEAGUES_PER_PAGE),
            tournaments: Loadable::new(LEAGUES_PER_PAGE),
            focus: LeaguesColumn::default(),
            selected: 0,
            filter: String::new(),
        }
    }
}

impl LeaguesState {
    fn query(&self) -> String {
        self.filter.trim().to_lowercase()
    }

    pub fn visible_leagues(&self) -> Vec<&League> {
        let q = self.query();
        self.leagues
            .data
            .iter()
            .filter(|l| {
                q.is_empty()
                    || contains_ci(&l.name, &q)
                    || l.slug.as_deref().is_some_and(|s| contains_ci(s, &q))
            })
            .collect()
    }

    pub fn visible_series(&self) -> Vec<&Serie> {
        let q = self.query();
        self.series
            .data
            .iter()
            .filter(|s| {
                q.is_empty()
                    || s.name.as_deref().is_some_and(|n| contains_ci(n, &q))
                    || s.full_name.as_deref().is_some_and(|n| contains_ci(n, &q))
                    || s.league.as_ref().is_some_and(|l| contains_ci(&l.name, &q))
            })
            .collect()
    }

    pub fn visible_tournaments(&self) -> Vec<&Tournament> {
        let q = self.query();
        self.tournaments
            .data
            .iter()
            .filter(|t| {
                q.is_empty()
                    || contains_ci(&t.name, &q)
                    || t.league.as_ref().is_some_and(|l| contains_ci(&l.name, &q))
                    || t.serie
                        .as_ref()
                        .and_then(|s| s.display_name())
                        .is_some_and(|n| contains_ci(n, &q))
            })
            .collect()
    }

    fn visible_len(&self) -> usize {
        match self.focus {
            LeaguesColumn::Leagues => self.visible_leagues().len(),
            LeaguesColumn::Series => self.visible_series().len(),
            LeaguesColumn::Tournaments => self.visible_tournaments().len(),
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let idx = LeaguesColumn::ORDER.iter().position(|c| *c == self.focus).unwrap_or(0);
        let next = if forward { (idx + 1) % 3 } else { (idx + 2) % 3 };
        self.focus = LeaguesColumn::ORDER[next];
        self.selected = 0;
    }

    pub fn move_selection(&mut self, down: bool) {
        let len = self.visible_len();
        move_cursor(&mut self.selected, len, down);
    }

    /// Details of the highlighted row in the focused column.
    pub fn selected_details(&self, now: DateTime<Utc>) -> Option<DetailPopup> {
        match self.focus {
            LeaguesColumn::Leagues => self.visible_leagues().get(self.selected).map(|l| league_details(l)),
            LeaguesColumn::Series => self.visible_series().get(self.selected).map(|s| serie_details(s)),
            LeaguesColumn::Tournaments => self
                .visible_tournaments()
                .get(self.selected)
                .map(|t| tournament_details(t, now)),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet tab
// ---------------------------------------------------------------------------

/// Selectable line on the bet board: a group header or one of its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetRow {
    Group(usize),
    Match(usize, usize),
}

/// What the cursor is on, so the same line can be found after a refresh
/// rebuilds the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetAnchor {
    Group(String),
    Match(String, u64),
}

#[derive(Debug)]
pub struct BetState {
    pub upcoming: Loadable<Match>,
    pub running: Loadable<Match>,
    pub past: Loadable<Match>,
    pub store: PredictionStore,
    pub nickname_input: String,
    pub cursor: usize,
    pub anchor: Option<BetAnchor>,
    pub collapsed: HashSet<String>,
}

impl Default for BetState {
    fn default() -> Self {
        Self::with_store(PredictionStore::default())
    }
}

impl BetState {
    pub fn with_store(store: PredictionStore) -> Self {
        Self {
            upcoming: Loadable::new(BET_PER_PAGE),
            running: Loadable::new(BET_PER_PAGE),
            past: Loadable::new(BET_PER_PAGE),
            nickname_input: store.nickname().to_string(),
            store,
            cursor: 0,
            anchor: None,
            collapsed: HashSet::new(),
        }
    }

    pub fn column_mut(&mut self, kind: MatchKind) -> &mut Loadable<Match> {
        match kind {
            MatchKind::Running => &mut self.running,
            MatchKind::Upcoming => &mut self.upcoming,
            MatchKind::Past => &mut self.past,
        }
    }

    pub fn board(&self, now: DateTime<Utc>) -> BetBoard {
        BetBoard::build(&self.running.data, &self.upcoming.data, now)
    }

    pub fn rows(&self, board: &BetBoard) -> Vec<BetRow> {
        let mut rows = Vec::new();
        for (gi, group) in board.groups().enumerate() {
            rows.push(BetRow::Group(gi));
            if !self.collapsed.contains(&group.key) {
                rows.extend((0..group.matches.len()).map(|mi| BetRow::Match(gi, mi)));
            }
        }
        rows
    }

    fn anchor_at(&self, board: &BetBoard, row: BetRow) -> Option<BetAnchor> {
        match row {
            BetRow::Group(gi) => board.groups().nth(gi).map(|g| BetAnchor::Group(g.key.clone())),
            BetRow::Match(gi, mi) => {
                let group = board.groups().nth(gi)?;
                let m = group.matches.get(mi)?;
                Some(BetAnchor::Match(group.key.clone(), m.id))
            }
        }
    }

    pub fn move_cursor(&mut self, down: bool, now: DateTime<Utc>) {
        let board = self.board(now);
        let rows = self.rows(&board);
        move_cursor(&mut self.cursor, rows.len(), down);
        self.anchor = rows.get(self.cursor).and_then(|row| self.anchor_at(&board, *row));
    }

    /// Put the cursor back on the anchored line after the board changed. A
    /// match that left the board falls back to its group header; a group
    /// that left keeps the row index, clamped.
    pub fn resync(&mut self, now: DateTime<Utc>) {
        let board = self.board(now);
        let rows = self.rows(&board);
        let position =
            |want: &BetAnchor| rows.iter().position(|row| self.anchor_at(&board, *row).as_ref() == Some(want));
        let found = self.anchor.as_ref().and_then(|anchor| {
            position(anchor).or_else(|| match anchor {
                BetAnchor::Match(key, _) => position(&BetAnchor::Group(key.clone())),
                BetAnchor::Group(_) => None,
            })
        });
        self.cursor = found.unwrap_or_else(|| self.cursor.min(rows.len().saturating_sub(1)));
        self.anchor = rows.get(self.cursor).and_then(|row| self.anchor_at(&board, *row));
    }

    pub fn current_row(&self, board: &BetBoard) -> Option<BetRow> {
        self.rows(board).get(self.cursor).copied()
    }

    pub fn toggle_group(&mut self, key: &str) {
        if !self.collapsed.remove(key) {
            self.collapsed.insert(key.to_string());
        }
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.store.leaderboard(&self.past.data)
    }
}

// ---------------------------------------------------------------------------
// Popups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPopup {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Popup {
    Details(DetailPopup),
    Leaderboard(Vec<LeaderboardEntry>),
    Share { title: String, text: String },
}

fn or_missing(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).filter(|v| !v.is_empty()).unwrap_or_else(|| MISSING.to_string())
}

fn date(value: Option<DateTime<Utc>>) -> String {
    or_missing(value.map(|d| d.format("%Y-%m-%d").to_string()))
}

fn row(label: &str, value: String) -> (String, String) {
    (label.to_string(), value)
}

pub fn league_details(l: &League) -> DetailPopup {
    DetailPopup {
        title: l.name.clone(),
        rows: vec![
            row("ID", l.id.to_string()),
            row("Slug", or_missing(l.slug.as_deref())),
            row("Videogame", or_missing(l.videogame.as_deref())),
            row("Image", or_missing(l.image_url.as_deref())),
        ],
    }
}

pub fn serie_details(s: &Serie) -> DetailPopup {
    DetailPopup {
        title: s.full_name.clone().or_else(|| s.name.clone()).unwrap_or_else(|| format!("Series #{}", s.id)),
        rows: vec![
            row("ID", s.id.to_string()),
            row("League", or_missing(s.league.as_ref().map(|l| l.name.as_str()))),
            row("Year", or_missing(s.year)),
            row("Season", or_missing(s.season.as_deref())),
            row("Tier", or_missing(s.tier.map(|t| t.code().to_uppercase()))),
            row("Begin", date(s.begin_at)),
            row("End", date(s.end_at)),
            row("Winner", or_missing(s.winner_id)),
        ],
    }
}

pub fn tournament_details(t: &Tournament, now: DateTime<Utc>) -> DetailPopup {
    DetailPopup {
        title: t.name.clone(),
        rows: vec![
            row("ID", t.id.to_string()),
            row("Status", t.status(now).label().to_string()),
            row("League", or_missing(t.league.as_ref().map(|l| l.name.as_str()))),
            row("Series", or_missing(t.serie.as_ref().and_then(|s| s.display_name()))),
            row("Tier", or_missing(t.tier.map(|t| t.code().to_uppercase()))),
            row("Region", or_missing(t.region.as_deref())),
            row("Begin", date(t.begin_at)),
            row("End", date(t.end_at)),
            row("Matches", t.match_ids.len().to_string()),
            row("Winner", or_missing(t.winner_id)),
        ],
    }
}

pub fn player_details(p: &Player) -> DetailPopup {
    DetailPopup {
        title: p.name.clone(),
        rows: vec![
            row("ID", p.id.to_string()),
            row("Slug", or_missing(p.slug.as_deref())),
            row("Nationality", or_missing(p.nationality.as_deref())),
            row("Role", or_missing(p.role.as_deref())),
            row("Game", or_missing(p.game.as_deref())),
            row("Active", if p.active { "yes".to_string() } else { "no".to_string() }),
        ],
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

/// Text field currently receiving keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    TeamFilter,
    PlayerSearch,
    MatchFilter,
    LeagueFilter,
    Nickname,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub input: Option<InputTarget>,
    pub popup: Option<Popup>,
    pub tiers: TierSelection,
    pub teams: TeamsState,
    pub players: PlayersState,
    pub matches: MatchesState,
    pub leagues: LeaguesState,
    pub bet: BetState,
}

impl AppState {
    pub fn new(tiers: TierSelection, store: PredictionStore) -> Self {
        Self {
            tiers,
            bet: BetState::with_store(store),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pandascore_api::{LeagueRef, Page, TeamRef, TournamentRef};

    fn page<T>(items: Vec<T>, has_next: bool) -> Page<T> {
        Page { items, info: PageInfo { page: 1, per_page: 10, has_next, ..Default::default() } }
    }

    #[test]
    fn stale_generations_are_discarded() {
        let mut list: Loadable<u32> = Loadable::new(10);
        let first = list.begin();
        let second = list.begin();

        assert!(!list.accept(first, Ok(page(vec![1], false))));
        assert!(list.loading);
        assert!(list.data.is_empty());

        assert!(list.accept(second, Ok(page(vec![2, 3], true))));
        assert!(!list.loading);
        assert_eq!(list.data, vec![2, 3]);
    }

    #[test]
    fn errors_clear_data_and_paging_follows_info() {
        let mut list: Loadable<u32> = Loadable::new(10);
        let g = list.begin();
        list.accept(g, Ok(page(vec![1], true)));
        assert!(list.next_page());
        assert_eq!(list.page, 2);
        assert!(list.prev_page());
        assert!(!list.prev_page());

        let g = list.begin();
        list.accept(g, Err("PandaScore error 500: boom".into()));
        assert!(list.data.is_empty());
        assert!(!list.next_page());
        assert_eq!(list.error.as_deref(), Some("PandaScore error 500: boom"));
    }

    #[test]
    fn team_filter_matches_name_or_abbreviation() {
        let mut teams = TeamsState::default();
        let g = teams.teams.begin();
        teams.teams.accept(
            g,
            Ok(page(
                vec![
                    Team { id: 1, name: "Team Vitality".into(), abbreviation: "VIT".into(), ..Default::default() },
                    Team { id: 2, name: "Natus Vincere".into(), abbreviation: "NAVI".into(), ..Default::default() },
                ],
                false,
            )),
        );
        teams.filter = "navi".into();
        assert_eq!(teams.visible_teams().len(), 1);
        teams.filter = "VITAL".into();
        assert_eq!(teams.selected_team().map(|t| t.id), Some(1));
    }

    #[test]
    fn roster_hides_inactive_and_follows_game_filter() {
        let mut teams = TeamsState {
            roster_team: Some(Team { games: vec!["Counter-Strike".into(), "Valorant".into()], ..Default::default() }),
            ..Default::default()
        };
        let g = teams.roster.begin();
        teams.roster.accept(
            g,
            Ok(page(
                vec![
                    Player { id: 1, name: "ZywOo".into(), active: true, game: Some("CS2".into()), ..Default::default() },
                    Player { id: 2, name: "old".into(), active: false, game: Some("CS2".into()), ..Default::default() },
                    Player { id: 3, name: "Derke".into(), active: true, game: Some("Valorant".into()), ..Default::default() },
                ],
                false,
            )),
        );

        assert_eq!(teams.visible_roster().len(), 2);
        teams.cycle_game_filter();
        assert_eq!(teams.game_key(), Some(GameKey::Csgo));
        let names: Vec<&str> = teams.visible_roster().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["ZywOo"]);
        teams.cycle_game_filter();
        assert_eq!(teams.game_filter.as_deref(), Some("Valorant"));
        teams.cycle_game_filter();
        assert_eq!(teams.game_filter, None);
    }

    #[test]
    fn match_filter_checks_opponents_and_league() {
        let mut matches = MatchesState::default();
        let g = matches.upcoming.begin();
        matches.upcoming.accept(
            g,
            Ok(page(
                vec![
                    Match {
                        id: 1,
                        opponents: vec![TeamRef { name: "FaZe".into(), ..Default::default() }],
                        ..Default::default()
                    },
                    Match {
                        id: 2,
                        league: Some(LeagueRef { name: "BLAST Premier".into(), ..Default::default() }),
                        ..Default::default()
                    },
                ],
                false,
            )),
        );
        matches.filter = "blast".into();
        assert_eq!(matches.visible(MatchKind::Upcoming).iter().map(|m| m.id).collect::<Vec<_>>(), [2]);
        matches.filter = "faze".into();
        assert_eq!(matches.visible(MatchKind::Upcoming).iter().map(|m| m.id).collect::<Vec<_>>(), [1]);

        matches.cycle_focus(false);
        assert_eq!(matches.focus, MatchKind::Past);
    }

    #[test]
    fn details_show_placeholder_for_missing_values() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let t = Tournament { id: 9, name: "Major".into(), ..Default::default() };
        let popup = tournament_details(&t, now);
        assert_eq!(popup.title, "Major");
        let region = popup.rows.iter().find(|(k, _)| k == "Region").unwrap();
        assert_eq!(region.1, MISSING);
        let status = popup.rows.iter().find(|(k, _)| k == "Status").unwrap();
        assert_eq!(status.1, "unknown");
    }

    #[test]
    fn collapsed_groups_hide_their_matches() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut bet = BetState::default();
        let g = bet.running.begin();
        let live = |id| Match { id, status: "running".into(), ..Default::default() };
        bet.running.accept(g, Ok(page(vec![live(1), live(2)], false)));

        let board = bet.board(now);
        assert_eq!(bet.rows(&board), vec![BetRow::Group(0), BetRow::Match(0, 0), BetRow::Match(0, 1)]);

        let key = board.current[0].key.clone();
        bet.toggle_group(&key);
        assert_eq!(bet.rows(&board), vec![BetRow::Group(0)]);
    }

    #[test]
    fn bet_cursor_follows_its_match_across_refreshes() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let live = |id, t: u64| Match {
            id,
            status: "running".into(),
            tournament: Some(TournamentRef { id: t, name: format!("T{t}"), tier: None }),
            ..Default::default()
        };
        let refresh = |bet: &mut BetState, matches: Vec<Match>| {
            let g = bet.running.begin();
            bet.running.accept(g, Ok(page(matches, false)));
            bet.resync(now);
        };

        let mut bet = BetState::default();
        refresh(&mut bet, vec![live(1, 10), live(2, 10)]);
        assert_eq!(bet.anchor, Some(BetAnchor::Group("10".into())));
        bet.move_cursor(true, now);
        bet.move_cursor(true, now);
        assert_eq!(bet.anchor, Some(BetAnchor::Match("10".into(), 2)));

        // A bigger group now sorts first and pushes the match down.
        refresh(&mut bet, vec![live(5, 20), live(6, 20), live(7, 20), live(1, 10), live(2, 10)]);
        assert_eq!(bet.cursor, 6);
        assert_eq!(bet.current_row(&bet.board(now)), Some(BetRow::Match(1, 1)));

        refresh(&mut bet, vec![live(5, 20), live(6, 20), live(7, 20), live(1, 10)]);
        assert_eq!(bet.cursor, 4);
        assert_eq!(bet.anchor, Some(BetAnchor::Group("10".into())));

        refresh(&mut bet, vec![live(5, 20)]);
        assert_eq!(bet.cursor, 1);
        assert_eq!(bet.anchor, Some(BetAnchor::Match("20".into(), 5)));
    }
}
