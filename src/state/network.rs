use crate::state::messages::{Loaded, NetworkRequest, NetworkResponse, supersede};
use log::{debug, error};
use pandascore_api::client::{ApiResult, PandaScoreApi};
use pandascore_api::{MatchKind, Page};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

/// Matches scanned per kind when ranking teams.
const TOP_TEAMS_PER_PAGE: u32 = 50;
const TOP_TEAMS_KINDS: [MatchKind; 3] = [MatchKind::Running, MatchKind::Upcoming, MatchKind::Past];
const REFERENCE_PAGE_SIZE: u32 = 100;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: PandaScoreApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: PandaScoreApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        let mut queued: VecDeque<NetworkRequest> = VecDeque::new();
        loop {
            if queued.is_empty() {
                match self.requests.recv().await {
                    Some(request) => queued.push_back(request),
                    None => break,
                }
            }
            while let Ok(request) = self.requests.try_recv() {
                queued.push_back(request);
            }
            queued = supersede(queued.into()).into();
            let Some(request) = queued.pop_front() else {
                continue;
            };

            self.start_loading_animation().await;

            let response = self.handle(request).await;

            debug!("network request complete");
            self.stop_loading_animation(!response.is_failure()).await;

            if let NetworkResponse::Error { message } = &response {
                error!("{message}");
            }
            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> NetworkResponse {
        let api = &self.client;
        match request {
            NetworkRequest::LoadTeams { page, per_page, generation } => {
                debug!("loading teams page {page}");
                NetworkResponse::TeamsLoaded { generation, result: loaded(api.teams(page, per_page).await) }
            }
            NetworkRequest::LoadRoster { team, page, per_page, game, generation } => {
                debug!("loading roster for team {team}");
                let result = loaded(api.team_roster(&team, page, per_page, game).await);
                NetworkResponse::RosterLoaded { generation, result }
            }
            NetworkRequest::LoadPlayer { id } => {
                debug!("loading player {id}");
                match api.player(&id).await {
                    Ok(player) => NetworkResponse::PlayerLoaded { player },
                    Err(e) => NetworkResponse::Error { message: e.to_string() },
                }
            }
            NetworkRequest::LoadMatches { board, kind, page, per_page, tiers, generation } => {
                debug!("loading {} matches page {page} ({board:?})", kind.slug());
                let result = loaded(api.matches(kind, page, per_page, &tiers).await);
                NetworkResponse::MatchesLoaded { board, kind, generation, result }
            }
            NetworkRequest::LoadTopTeams { tiers, generation } => {
                let result = api
                    .top_teams_by_tier(&tiers, &TOP_TEAMS_KINDS, 1, TOP_TEAMS_PER_PAGE)
                    .await
                    .map_err(|e| e.to_string());
                NetworkResponse::TopTeamsLoaded { generation, result }
            }
            NetworkRequest::LoadLeagues { page, per_page, tiers, generation } => {
                let result = loaded(api.leagues(page, per_page, &tiers).await);
                NetworkResponse::LeaguesLoaded { generation, result }
            }
            NetworkRequest::LoadSeries { page, per_page, tiers, generation } => {
                let result = loaded(api.series(page, per_page, &tiers).await);
                NetworkResponse::SeriesLoaded { generation, result }
            }
            NetworkRequest::LoadTournaments { page, per_page, tiers, generation } => {
                let result = loaded(api.tournaments(None, page, per_page, &tiers).await);
                NetworkResponse::TournamentsLoaded { generation, result }
            }
            NetworkRequest::LoadMaps => match api.maps(1, REFERENCE_PAGE_SIZE).await {
                Ok(page) => NetworkResponse::MapsLoaded { maps: page.items },
                Err(e) => NetworkResponse::Error { message: e.to_string() },
            },
            NetworkRequest::LoadWeapons => match api.weapons(1, REFERENCE_PAGE_SIZE).await {
                Ok(page) => NetworkResponse::WeaponsLoaded { weapons: page.items },
                Err(e) => NetworkResponse::Error { message: e.to_string() },
            },
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self.responses.try_send(NetworkResponse::LoadingStateChanged { loading_state });

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                // Frames are dropped while the UI is behind.
                let _ = responses.try_send(NetworkResponse::LoadingStateChanged { loading_state });
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

fn loaded<T>(result: ApiResult<Page<T>>) -> Loaded<T> {
    result.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::messages::MatchBoard;

    async fn next_payload(rx: &mut mpsc::Receiver<NetworkResponse>) -> NetworkResponse {
        loop {
            match rx.recv().await {
                Some(NetworkResponse::LoadingStateChanged { .. }) => continue,
                Some(other) => return other,
                None => panic!("worker hung up"),
            }
        }
    }

    #[tokio::test]
    async fn missing_token_is_reported_inline_with_generation() {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        tokio::spawn(NetworkWorker::new(PandaScoreApi::new(""), req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::LoadMatches {
                board: MatchBoard::Bet,
                kind: MatchKind::Upcoming,
                page: 1,
                per_page: 50,
                tiers: Vec::new(),
                generation: 7,
            })
            .await
            .unwrap();

        match next_payload(&mut resp_rx).await {
            NetworkResponse::MatchesLoaded { board, kind, generation, result } => {
                assert_eq!(board, MatchBoard::Bet);
                assert_eq!(kind, MatchKind::Upcoming);
                assert_eq!(generation, 7);
                assert!(result.unwrap_err().contains("PANDASCORE_TOKEN"));
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn queued_requests_for_a_replaced_list_are_skipped() {
        let (req_tx, req_rx) = mpsc::channel(32);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        for generation in 1..=20 {
            req_tx
                .send(NetworkRequest::LoadTeams { page: 1, per_page: 10, generation })
                .await
                .unwrap();
        }
        req_tx.send(NetworkRequest::LoadPlayer { id: " ".into() }).await.unwrap();
        tokio::spawn(NetworkWorker::new(PandaScoreApi::new(""), req_rx, resp_tx).run());

        match next_payload(&mut resp_rx).await {
            NetworkResponse::TeamsLoaded { generation, .. } => assert_eq!(generation, 20),
            other => panic!("unexpected response {other:?}"),
        }
        assert!(matches!(next_payload(&mut resp_rx).await, NetworkResponse::Error { .. }));
    }

    #[tokio::test]
    async fn player_failures_become_error_responses() {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        tokio::spawn(NetworkWorker::new(PandaScoreApi::new("token"), req_rx, resp_tx).run());

        req_tx.send(NetworkRequest::LoadPlayer { id: "  ".into() }).await.unwrap();
        let response = next_payload(&mut resp_rx).await;
        assert!(response.is_failure());
        assert!(matches!(response, NetworkResponse::Error { message } if message.contains("Invalid argument")));
    }
}
