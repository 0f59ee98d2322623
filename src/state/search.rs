//! Search-as-you-type worker.
//!
//! Queries arrive on a channel. Each one resets the debounce timer and drops
//! whatever request was pending or in flight; only the last query standing
//! when the timer fires reaches the API.

use log::debug;
use pandascore_api::Player;
use pandascore_api::client::ApiResult;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

pub const MIN_QUERY_LEN: usize = 3;
pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const SEARCH_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Input is below the minimum length; results should be emptied.
    Cleared,
    Started { query: String },
    Results { query: String, players: Vec<Player> },
    Failed { query: String, message: String },
}

pub struct SearchWorker<F> {
    search: F,
    queries: mpsc::Receiver<String>,
    events: mpsc::Sender<SearchEvent>,
}

impl<F, Fut> SearchWorker<F>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ApiResult<Vec<Player>>> + Send + 'static,
{
    pub fn new(search: F, queries: mpsc::Receiver<String>, events: mpsc::Sender<SearchEvent>) -> Self {
        Self { search, queries, events }
    }

    pub async fn run(mut self) {
        let (done_tx, mut done_rx) = mpsc::channel::<(u64, String, ApiResult<Vec<Player>>)>(8);
        let mut pending: Option<String> = None;
        let mut deadline = Instant::now();
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut ticket: u64 = 0;

        loop {
            tokio::select! {
                next = self.queries.recv() => {
                    let Some(raw) = next else { break };
                    ticket += 1;
                    if let Some(handle) = in_flight.take() {
                        handle.abort();
                    }
                    let query = raw.trim().to_string();
                    if query.chars().count() < MIN_QUERY_LEN {
                        pending = None;
                        let _ = self.events.send(SearchEvent::Cleared).await;
                        continue;
                    }
                    pending = Some(query);
                    deadline = Instant::now() + DEBOUNCE;
                }
                _ = sleep_until(deadline), if pending.is_some() => {
                    let Some(query) = pending.take() else { continue };
                    debug!("searching players for {query:?}");
                    let _ = self.events.send(SearchEvent::Started { query: query.clone() }).await;
                    let request = (self.search)(query.clone());
                    let done_tx = done_tx.clone();
                    let id = ticket;
                    in_flight = Some(tokio::spawn(async move {
                        let result = request.await;
                        let _ = done_tx.send((id, query, result)).await;
                    }));
                }
                Some((id, query, result)) = done_rx.recv() => {
                    if id != ticket {
                        debug!("dropping stale search results for {query:?}");
                        continue;
                    }
                    in_flight = None;
                    let event = match result {
                        Ok(players) => SearchEvent::Results { query, players },
                        Err(e) => SearchEvent::Failed { query, message: e.to_string() },
                    };
                    let _ = self.events.send(event).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandascore_api::client::ApiError;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<String>>>;

    fn spawn_worker(
        calls: Calls,
        slow: &'static str,
    ) -> (mpsc::Sender<String>, mpsc::Receiver<SearchEvent>) {
        let (query_tx, query_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        let search = move |query: String| {
            let calls = calls.clone();
            async move {
                calls.lock().unwrap().push(query.clone());
                if query == slow {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                if query == "boom" {
                    return Err(ApiError::Other("upstream down".into()));
                }
                Ok(vec![Player { name: format!("{query}-player"), ..Default::default() }])
            }
        };
        tokio::spawn(SearchWorker::new(search, query_rx, event_tx).run());
        (query_tx, event_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_never_hit_the_api() {
        let calls = Calls::default();
        let (tx, mut events) = spawn_worker(calls.clone(), "");

        tx.send("ab".into()).await.unwrap();
        tx.send("  xy  ".into()).await.unwrap();
        assert_eq!(events.recv().await, Some(SearchEvent::Cleared));
        assert_eq!(events.recv().await, Some(SearchEvent::Cleared));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_query_after_the_pause_is_searched() {
        let calls = Calls::default();
        let (tx, mut events) = spawn_worker(calls.clone(), "");

        tx.send("zyw".into()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("zywo".into()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("zywoo".into()).await.unwrap();

        assert_eq!(events.recv().await, Some(SearchEvent::Started { query: "zywoo".into() }));
        match events.recv().await {
            Some(SearchEvent::Results { query, players }) => {
                assert_eq!(query, "zywoo");
                assert_eq!(players[0].name, "zywoo-player");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(*calls.lock().unwrap(), vec!["zywoo".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn new_input_cancels_the_request_in_flight() {
        let calls = Calls::default();
        let (tx, mut events) = spawn_worker(calls.clone(), "slow");

        tx.send("slow".into()).await.unwrap();
        assert_eq!(events.recv().await, Some(SearchEvent::Started { query: "slow".into() }));
        tx.send("fast".into()).await.unwrap();

        assert_eq!(events.recv().await, Some(SearchEvent::Started { query: "fast".into() }));
        match events.recv().await {
            Some(SearchEvent::Results { query, .. }) => assert_eq!(query, "fast"),
            other => panic!("unexpected event {other:?}"),
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(events.try_recv().is_err(), "slow results must never surface");
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_below_minimum_cancels_pending_search() {
        let calls = Calls::default();
        let (tx, mut events) = spawn_worker(calls.clone(), "");

        tx.send("navi".into()).await.unwrap();
        tx.send("na".into()).await.unwrap();
        assert_eq!(events.recv().await, Some(SearchEvent::Cleared));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(events.try_recv().is_err());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_with_the_query() {
        let calls = Calls::default();
        let (tx, mut events) = spawn_worker(calls, "");

        tx.send("boom".into()).await.unwrap();
        assert_eq!(events.recv().await, Some(SearchEvent::Started { query: "boom".into() }));
        match events.recv().await {
            Some(SearchEvent::Failed { query, message }) => {
                assert_eq!(query, "boom");
                assert!(message.contains("upstream down"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
