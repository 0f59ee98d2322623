use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const RUNNING_REFRESH: Duration = Duration::from_secs(30);

/// Periodic refresh of live matches. The UI decides which page and tiers
/// to reload, so this only emits ticks.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events, every: RUNNING_REFRESH }
    }

    pub async fn run(self) {
        let mut running_interval = interval(self.every);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        running_interval.tick().await;

        loop {
            running_interval.tick().await;
            if self.ui_events.send(UiEvent::RefreshRunning).await.is_err() {
                break;
            }
        }
    }
}
