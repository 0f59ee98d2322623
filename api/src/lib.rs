pub mod client;
pub mod pagination;
pub mod pandascore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use pagination::{Page, PageInfo};

/// Placeholder accent used for every team until the API exposes brand colors.
pub const DEFAULT_ACCENT: &str = "#8b5cf6";

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of PandaScore wire format
// ---------------------------------------------------------------------------

/// Quality classification assigned upstream to tournaments, leagues and series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    Unranked,
}

impl Tier {
    /// Tiers a user can filter on.
    pub const SELECTABLE: [Tier; 3] = [Tier::S, Tier::A, Tier::B];

    pub fn code(&self) -> &'static str {
        match self {
            Tier::S => "s",
            Tier::A => "a",
            Tier::B => "b",
            Tier::C => "c",
            Tier::D => "d",
            Tier::Unranked => "unranked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" => Some(Tier::S),
            "a" => Some(Tier::A),
            "b" => Some(Tier::B),
            "c" => Some(Tier::C),
            "d" => Some(Tier::D),
            "unranked" => Some(Tier::Unranked),
            _ => None,
        }
    }
}

/// Game-specific player endpoints the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    Csgo,
    Lol,
    Valorant,
}

impl GameKey {
    pub const ALL: [GameKey; 3] = [GameKey::Csgo, GameKey::Lol, GameKey::Valorant];

    pub fn slug(&self) -> &'static str {
        match self {
            GameKey::Csgo => "csgo",
            GameKey::Lol => "lol",
            GameKey::Valorant => "valorant",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameKey::Csgo => "Counter-Strike",
            GameKey::Lol => "League of Legends",
            GameKey::Valorant => "Valorant",
        }
    }

    /// Map a free-form videogame name ("CS2", "Counter-Strike", "LoL") to a key.
    pub fn from_name(name: &str) -> Option<Self> {
        let n = name.trim().to_lowercase();
        if n.is_empty() {
            return None;
        }
        let cs_aliases = ["counter-strike", "counter strike", "counterstrike", "csgo", "cs2", "cs 2", "cs:go"];
        if cs_aliases.iter().any(|alias| n.contains(alias)) {
            return Some(GameKey::Csgo);
        }
        if n.contains("league of legends") || n.split_whitespace().any(|w| w == "lol") {
            return Some(GameKey::Lol);
        }
        if n.contains("valorant") {
            return Some(GameKey::Valorant);
        }
        None
    }
}

/// Which slice of the match calendar to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchKind {
    #[default]
    Running,
    Upcoming,
    Past,
}

impl MatchKind {
    pub fn slug(&self) -> &'static str {
        match self {
            MatchKind::Running => "running",
            MatchKind::Upcoming => "upcoming",
            MatchKind::Past => "past",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchKind::Running => "Running",
            MatchKind::Upcoming => "Upcoming",
            MatchKind::Past => "Past",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: u64,
    pub slug: Option<String>,
    pub name: String,
    pub abbreviation: String,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub founded: Option<String>,
    pub games: Vec<String>,
    pub players: Vec<Player>,
    /// Never populated by the API today; kept so views can render an empty grid.
    pub trophies: Vec<Trophy>,
    pub accent: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trophy {
    pub name: String,
    pub year: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: u64,
    pub slug: Option<String>,
    pub name: String,
    pub nationality: Option<String>,
    pub image_url: Option<String>,
    pub active: bool,
    pub role: Option<String>,
    /// Videogame name, resolved from the per-game endpoints when possible.
    pub game: Option<String>,
}

/// Lightweight team reference as embedded in matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRef {
    pub id: u64,
    pub name: String,
    pub acronym: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueRef {
    pub id: u64,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerieRef {
    pub id: u64,
    pub name: Option<String>,
    pub full_name: Option<String>,
}

impl SerieRef {
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentRef {
    pub id: u64,
    pub name: String,
    pub tier: Option<Tier>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub opponents: Vec<TeamRef>,
    /// (team id, score) pairs as reported by the API.
    pub results: Vec<(u64, u16)>,
    pub winner_id: Option<u64>,
    pub begin_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub number_of_games: Option<u8>,
    pub league: Option<LeagueRef>,
    pub serie: Option<SerieRef>,
    pub tournament: Option<TournamentRef>,
}

/// Settled outcome of a match, oriented on opponent order (A = first, B = second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub winner_id: Option<u64>,
    pub team_a: Option<u64>,
    pub team_b: Option<u64>,
    pub score_a: Option<u16>,
    pub score_b: Option<u16>,
}

impl Match {
    pub fn team_a(&self) -> Option<&TeamRef> {
        self.opponents.first()
    }

    pub fn team_b(&self) -> Option<&TeamRef> {
        self.opponents.get(1)
    }

    pub fn score_for(&self, team_id: u64) -> Option<u16> {
        self.results
            .iter()
            .find(|(id, _)| *id == team_id)
            .map(|(_, score)| *score)
    }

    pub fn result(&self) -> MatchResult {
        let team_a = self.team_a().map(|t| t.id);
        let team_b = self.team_b().map(|t| t.id);
        MatchResult {
            winner_id: self.winner_id,
            team_a,
            team_b,
            score_a: team_a.and_then(|id| self.score_for(id)),
            score_b: team_b.and_then(|id| self.score_for(id)),
        }
    }

    /// Best-of count, defaulting to BO3 when the API leaves it out.
    pub fn best_of(&self) -> u8 {
        self.number_of_games.filter(|n| *n > 0).unwrap_or(3)
    }

    pub fn win_threshold(&self) -> u8 {
        win_threshold(self.best_of())
    }

    pub fn is_live(&self) -> bool {
        self.status.eq_ignore_ascii_case("running")
    }
}

/// Games needed to take a best-of-`bo` match. Zero falls back to BO3.
pub fn win_threshold(bo: u8) -> u8 {
    let bo = if bo == 0 { 3 } else { bo };
    bo / 2 + 1
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct League {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub videogame: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Serie {
    pub id: u64,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub year: Option<u16>,
    pub season: Option<String>,
    pub begin_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub league: Option<LeagueRef>,
    pub tier: Option<Tier>,
    pub winner_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentStatus {
    Upcoming,
    Running,
    Finished,
    Unknown,
}

impl TournamentStatus {
    pub fn from_dates(
        begin_at: Option<DateTime<Utc>>,
        end_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let Some(begin) = begin_at else {
            return TournamentStatus::Unknown;
        };
        if now < begin {
            return TournamentStatus::Upcoming;
        }
        match end_at {
            Some(end) if now > end => TournamentStatus::Finished,
            _ => TournamentStatus::Running,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Running => "running",
            TournamentStatus::Finished => "finished",
            TournamentStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub begin_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub tier: Option<Tier>,
    pub region: Option<String>,
    pub league: Option<LeagueRef>,
    pub serie: Option<SerieRef>,
    pub winner_id: Option<u64>,
    pub videogame: Option<String>,
    pub match_ids: Vec<u64>,
}

impl Tournament {
    pub fn status(&self, now: DateTime<Utc>) -> TournamentStatus {
        TournamentStatus::from_dates(self.begin_at, self.end_at, now)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapInfo {
    pub id: u64,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weapon {
    pub id: u64,
    pub name: String,
    pub kind: Option<String>,
    pub image_url: Option<String>,
}

/// A team and how many tier-filtered matches it appeared in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamCount {
    pub team: TeamRef,
    pub count: u32,
}
