mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent, forward};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crate::state::search::{SEARCH_PAGE_SIZE, SearchEvent, SearchWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use pandascore_api::client::PandaScoreApi;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let app = App::new();
    let api = PandaScoreApi::new(app.settings.api_token.clone().unwrap_or_default())
        .with_base_url(app.settings.api_base.clone());
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (search_query_tx, search_query_rx) = mpsc::channel::<String>(100);
    let (search_evt_tx, search_evt_rx) = mpsc::channel::<SearchEvent>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(api.clone(), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Player search thread (debounced, cancels superseded queries)
    let search_worker = SearchWorker::new(
        move |query: String| {
            let api = api.clone();
            async move {
                api.search_players(&query, 1, SEARCH_PAGE_SIZE)
                    .await
                    .map(|page| page.items)
            }
        },
        search_query_rx,
        search_evt_tx,
    );
    let search_task = tokio::spawn(search_worker.run());

    // Running matches refresh thread (every 30s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger the first load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        search_query_tx,
        search_evt_rx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    search_task.abort();
    periodic_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("eswatch {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "eswatch - esports teams, matches and predictions in the terminal

Usage:
  eswatch
  eswatch --help
  eswatch --version

Environment (also read from .env):
  PANDASCORE_TOKEN   PandaScore API token (required)
  ESWATCH_API_BASE   API base URL (default https://api.pandascore.co)
  ESWATCH_DATA_DIR   Where predictions and tier selection are stored
                     (default $XDG_CONFIG_HOME/eswatch or ~/.config/eswatch)
  ESWATCH_LOG        Log level for the log pane: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    search_queries: mpsc::Sender<String>,
    mut search_events: mpsc::Receiver<SearchEvent>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests, &search_queries).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(search_event) = search_events.recv() => {
                let should_redraw =
                    handle_ui_event(UiEvent::Search(search_event), &app, &network_requests, &search_queries).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    search_queries: &mpsc::Sender<String>,
) -> bool {
    let requests = match ui_event {
        UiEvent::AppStarted => app.lock().await.on_start(),
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests, search_queries).await;
            Vec::new()
        }
        UiEvent::Resize => Vec::new(),
        UiEvent::RefreshRunning => app.lock().await.refresh_running(),
        UiEvent::Search(event) => {
            app.lock().await.on_search_event(event);
            Vec::new()
        }
    };
    for request in requests {
        forward(network_requests, request);
    }
    true
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    match response {
        NetworkResponse::LoadingStateChanged { .. } => {}
        NetworkResponse::TeamsLoaded { generation, result } => guard.on_teams_loaded(generation, result),
        NetworkResponse::RosterLoaded { generation, result } => guard.on_roster_loaded(generation, result),
        NetworkResponse::PlayerLoaded { player } => guard.on_player_loaded(player),
        NetworkResponse::MatchesLoaded { board, kind, generation, result } => {
            guard.on_matches_loaded(board, kind, generation, result)
        }
        NetworkResponse::TopTeamsLoaded { generation, result } => guard.on_top_teams_loaded(generation, result),
        NetworkResponse::LeaguesLoaded { generation, result } => guard.on_leagues_loaded(generation, result),
        NetworkResponse::SeriesLoaded { generation, result } => guard.on_series_loaded(generation, result),
        NetworkResponse::TournamentsLoaded { generation, result } => {
            guard.on_tournaments_loaded(generation, result)
        }
        NetworkResponse::MapsLoaded { maps } => guard.on_maps_loaded(maps),
        NetworkResponse::WeaponsLoaded { weapons } => guard.on_weapons_loaded(weapons),
        NetworkResponse::Error { message } => guard.on_error(message),
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where failing again is pointless.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
