use crate::state::network::LoadingState;
use crate::state::search::SearchEvent;
use crossterm::event::KeyEvent;
use log::debug;
use pandascore_api::{GameKey, League, MapInfo, Match, MatchKind, Page, Player, Serie, Team, TeamCount, Tier, Tournament, Weapon};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Which screen a match list belongs to. Both fetch the same endpoints with
/// different paging and tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchBoard {
    Matches,
    Bet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadTeams { page: u32, per_page: u32, generation: u64 },
    LoadRoster { team: String, page: u32, per_page: u32, game: Option<GameKey>, generation: u64 },
    LoadPlayer { id: String },
    LoadMatches { board: MatchBoard, kind: MatchKind, page: u32, per_page: u32, tiers: Vec<Tier>, generation: u64 },
    LoadTopTeams { tiers: Vec<Tier>, generation: u64 },
    LoadLeagues { page: u32, per_page: u32, tiers: Vec<Tier>, generation: u64 },
    LoadSeries { page: u32, per_page: u32, tiers: Vec<Tier>, generation: u64 },
    LoadTournaments { page: u32, per_page: u32, tiers: Vec<Tier>, generation: u64 },
    LoadMaps,
    LoadWeapons,
}

/// The list a request fills. A newer generation for the same list makes any
/// queued older request pointless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSlot {
    Teams,
    Roster,
    Matches(MatchBoard, MatchKind),
    TopTeams,
    Leagues,
    Series,
    Tournaments,
}

impl NetworkRequest {
    /// `None` for one-off lookups, which are never superseded.
    pub fn slot(&self) -> Option<(ListSlot, u64)> {
        let slot = match self {
            NetworkRequest::LoadTeams { generation, .. } => (ListSlot::Teams, *generation),
            NetworkRequest::LoadRoster { generation, .. } => (ListSlot::Roster, *generation),
            NetworkRequest::LoadMatches { board, kind, generation, .. } => {
                (ListSlot::Matches(*board, *kind), *generation)
            }
            NetworkRequest::LoadTopTeams { generation, .. } => (ListSlot::TopTeams, *generation),
            NetworkRequest::LoadLeagues { generation, .. } => (ListSlot::Leagues, *generation),
            NetworkRequest::LoadSeries { generation, .. } => (ListSlot::Series, *generation),
            NetworkRequest::LoadTournaments { generation, .. } => (ListSlot::Tournaments, *generation),
            NetworkRequest::LoadPlayer { .. } | NetworkRequest::LoadMaps | NetworkRequest::LoadWeapons => {
                return None;
            }
        };
        Some(slot)
    }
}

/// Keep only the newest request per list, in queue order.
pub fn supersede(queued: Vec<NetworkRequest>) -> Vec<NetworkRequest> {
    let mut newest: HashMap<ListSlot, u64> = HashMap::new();
    for (slot, generation) in queued.iter().filter_map(NetworkRequest::slot) {
        let entry = newest.entry(slot).or_insert(generation);
        *entry = (*entry).max(generation);
    }
    let before = queued.len();
    let kept: Vec<NetworkRequest> = queued
        .into_iter()
        .filter(|r| match r.slot() {
            Some((slot, generation)) => newest.get(&slot) == Some(&generation),
            None => true,
        })
        .collect();
    if kept.len() < before {
        debug!("skipped {} superseded requests", before - kept.len());
    }
    kept
}

/// Send from the UI loop without ever waiting on a full queue: the loop must
/// stay free to drain responses. A full queue hands the send to a task.
pub fn forward<T: Send + 'static>(tx: &mpsc::Sender<T>, item: T) {
    match tx.try_send(item) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(item)) => {
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(item).await;
            });
        }
    }
}

/// List results carry the generation they were requested under; failures are
/// already rendered to the message shown inline.
pub type Loaded<T> = Result<Page<T>, String>;

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TeamsLoaded { generation: u64, result: Loaded<Team> },
    RosterLoaded { generation: u64, result: Loaded<Player> },
    PlayerLoaded { player: Player },
    MatchesLoaded { board: MatchBoard, kind: MatchKind, generation: u64, result: Loaded<Match> },
    TopTeamsLoaded { generation: u64, result: Result<Vec<TeamCount>, String> },
    LeaguesLoaded { generation: u64, result: Loaded<League> },
    SeriesLoaded { generation: u64, result: Loaded<Serie> },
    TournamentsLoaded { generation: u64, result: Loaded<Tournament> },
    MapsLoaded { maps: Vec<MapInfo> },
    WeaponsLoaded { weapons: Vec<Weapon> },
    Error { message: String },
}

impl NetworkResponse {
    /// Whether the spinner should settle on the error glyph.
    pub fn is_failure(&self) -> bool {
        match self {
            NetworkResponse::LoadingStateChanged { .. } => false,
            NetworkResponse::TeamsLoaded { result, .. } => result.is_err(),
            NetworkResponse::RosterLoaded { result, .. } => result.is_err(),
            NetworkResponse::MatchesLoaded { result, .. } => result.is_err(),
            NetworkResponse::TopTeamsLoaded { result, .. } => result.is_err(),
            NetworkResponse::LeaguesLoaded { result, .. } => result.is_err(),
            NetworkResponse::SeriesLoaded { result, .. } => result.is_err(),
            NetworkResponse::TournamentsLoaded { result, .. } => result.is_err(),
            NetworkResponse::PlayerLoaded { .. }
            | NetworkResponse::MapsLoaded { .. }
            | NetworkResponse::WeaponsLoaded { .. } => false,
            NetworkResponse::Error { .. } => true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Periodic tick asking for the running matches to be reloaded.
    RefreshRunning,
    Search(SearchEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(board: MatchBoard, generation: u64) -> NetworkRequest {
        NetworkRequest::LoadMatches {
            board,
            kind: MatchKind::Running,
            page: 1,
            per_page: 5,
            tiers: Vec::new(),
            generation,
        }
    }

    #[test]
    fn newer_generations_replace_queued_requests_for_the_same_list() {
        let queued = vec![
            running(MatchBoard::Matches, 1),
            NetworkRequest::LoadPlayer { id: "7".into() },
            running(MatchBoard::Matches, 3),
            running(MatchBoard::Bet, 2),
            running(MatchBoard::Matches, 2),
            NetworkRequest::LoadMaps,
        ];
        assert_eq!(
            supersede(queued),
            vec![
                NetworkRequest::LoadPlayer { id: "7".into() },
                running(MatchBoard::Matches, 3),
                running(MatchBoard::Bet, 2),
                NetworkRequest::LoadMaps,
            ]
        );
    }

    #[tokio::test]
    async fn forward_does_not_wait_on_a_full_queue() {
        let (tx, mut rx) = mpsc::channel::<u32>(1);
        forward(&tx, 1);
        forward(&tx, 2);
        forward(&tx, 3);

        let mut got = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        assert_eq!(got[0], 1);
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 3]);
    }
}
