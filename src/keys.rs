use crate::app::{App, MenuItem};
use crate::state::messages::{NetworkRequest, forward};
use crate::state::predictions::Side;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pandascore_api::Tier;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    search_queries: &mpsc::Sender<String>,
) {
    let mut guard = app.lock().await;
    let mut requests: Vec<NetworkRequest> = Vec::new();
    let mut search: Option<String> = None;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    if guard.state.input.is_some() {
        match (key_event.code, key_event.modifiers) {
            (KeyCode::Enter, _) => guard.finish_input(true),
            (KeyCode::Esc, _) => guard.finish_input(false),
            (KeyCode::Backspace, _) => {
                search = guard.edit_input(|s| {
                    s.pop();
                });
            }
            (KeyCode::Down, _) => guard.move_selection(true),
            (KeyCode::Up, _) => guard.move_selection(false),
            (Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                search = guard.edit_input(|s| s.push(c));
            }
            _ => {}
        }
    } else if guard.state.popup.is_some() {
        match key_event.code {
            KeyCode::Esc | KeyCode::Enter | Char('q') => {
                guard.close_popup();
            }
            _ => {}
        }
    } else {
        match (guard.state.active_tab, key_event.code, key_event.modifiers) {
            // Quit
            (_, Char('q'), _) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }

            // Tab switching
            (_, Char('1'), _) => requests = guard.update_tab(MenuItem::Teams),
            (_, Char('2'), _) => requests = guard.update_tab(MenuItem::Players),
            (_, Char('3'), _) => requests = guard.update_tab(MenuItem::Matches),
            (_, Char('4'), _) => requests = guard.update_tab(MenuItem::Leagues),
            (_, Char('5'), _) => requests = guard.update_tab(MenuItem::Bet),
            (_, Char('?'), _) => requests = guard.update_tab(MenuItem::Help),
            (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

            // Bet scoring
            (MenuItem::Bet, Char('h') | KeyCode::Left, _) => guard.bet_step(Side::Left),
            (MenuItem::Bet, Char('l') | KeyCode::Right, _) => guard.bet_step(Side::Right),
            (MenuItem::Bet, Char('x') | KeyCode::Delete, _) => guard.bet_clear(),
            (MenuItem::Bet, Char('t'), _) => guard.show_leaderboard(),
            (MenuItem::Bet, Char('c'), _) => guard.show_share(),

            // Tier filters
            (MenuItem::Matches | MenuItem::Leagues, Char(c @ ('s' | 'a' | 'b')), _) => {
                if let Some(tier) = Tier::parse(&c.to_string()) {
                    requests = guard.toggle_tier(tier);
                }
            }
            (MenuItem::Matches | MenuItem::Leagues, Char(c @ ('S' | 'A' | 'B')), _) => {
                if let Some(tier) = Tier::parse(&c.to_string()) {
                    requests = guard.only_tier(tier);
                }
            }
            (MenuItem::Matches | MenuItem::Leagues, Char('0'), _) => requests = guard.clear_tiers(),

            // Reference data
            (MenuItem::Leagues, Char('m'), _) => requests.push(NetworkRequest::LoadMaps),
            (MenuItem::Leagues, Char('w'), _) => requests.push(NetworkRequest::LoadWeapons),

            (MenuItem::Teams, Char('g'), _) => requests = guard.cycle_game_filter(),

            // Navigation
            (_, Char('j') | KeyCode::Down, _) => guard.move_selection(true),
            (_, Char('k') | KeyCode::Up, _) => guard.move_selection(false),
            (_, Char('l') | KeyCode::Right | KeyCode::Tab, _) => guard.cycle_focus(true),
            (_, Char('h') | KeyCode::Left | KeyCode::BackTab, _) => guard.cycle_focus(false),
            (_, Char('n') | Char(']'), _) => requests = guard.next_page(),
            (_, Char('p') | Char('['), _) => requests = guard.prev_page(),
            (_, KeyCode::Enter, _) => requests = guard.activate(),
            (_, Char('/'), _) => guard.start_input(),

            // Global
            (_, Char('f'), _) => guard.toggle_full_screen(),
            (_, Char('"'), _) => guard.toggle_show_logs(),

            _ => {}
        }
    }

    drop(guard);

    for request in requests {
        forward(network_requests, request);
    }
    if let Some(query) = search {
        forward(search_queries, query);
    }
}
