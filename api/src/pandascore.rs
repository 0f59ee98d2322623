/// PandaScore raw wire types — serde shapes for deserializing API responses.
/// These map to our clean domain types via the mapping functions in client.rs.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Shared references
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsVideogame {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsLeagueRef {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsSerieRef {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTournamentRef {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub tier: Option<String>,
}

// ---------------------------------------------------------------------------
// Teams and players
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTeam {
    pub id: Option<u64>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub image_url: Option<String>,
    pub founded: Option<String>,
    pub created_at: Option<String>,
    pub current_videogame: Option<PsVideogame>,
    #[serde(default)]
    pub videogames: Vec<PsVideogame>,
    #[serde(default)]
    pub players: Vec<PsPlayer>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsPlayer {
    pub id: Option<u64>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nationality: Option<String>,
    pub country: Option<String>,
    pub image_url: Option<String>,
    /// Absent means active; only an explicit `false` marks a benched player.
    pub active: Option<bool>,
    pub role: Option<String>,
    pub current_videogame: Option<PsVideogame>,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsMatch {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub opponents: Vec<PsOpponentSlot>,
    #[serde(default)]
    pub results: Vec<PsResult>,
    pub winner_id: Option<u64>,
    pub begin_at: Option<String>,
    pub end_at: Option<String>,
    pub scheduled_at: Option<String>,
    pub number_of_games: Option<u8>,
    pub league: Option<PsLeagueRef>,
    pub serie: Option<PsSerieRef>,
    pub tournament: Option<PsTournamentRef>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsOpponentSlot {
    pub opponent: Option<PsOpponent>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsOpponent {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsResult {
    pub team_id: Option<u64>,
    pub player_id: Option<u64>,
    pub score: Option<u16>,
}

// ---------------------------------------------------------------------------
// Leagues, series, tournaments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsLeague {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub videogame: Option<PsVideogame>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsSerie {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub year: Option<u16>,
    pub season: Option<String>,
    pub begin_at: Option<String>,
    pub end_at: Option<String>,
    pub league: Option<PsLeagueRef>,
    pub tier: Option<String>,
    pub winner_id: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTournament {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub begin_at: Option<String>,
    pub end_at: Option<String>,
    pub tier: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub league: Option<PsLeagueRef>,
    pub serie: Option<PsSerieRef>,
    pub winner_id: Option<u64>,
    pub videogame: Option<PsVideogame>,
    /// Tournaments embed a shallow list of their matches.
    #[serde(default)]
    pub matches: Vec<PsMatchStub>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsMatchStub {
    pub id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Reference data (CS maps and weapons)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsMap {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsWeapon {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub image_url: Option<String>,
}
