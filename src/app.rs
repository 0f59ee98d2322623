use crate::state::app_settings::AppSettings;
use crate::state::app_state::{
    AppState, BetRow, DetailPopup, InputTarget, LeaguesColumn, Loadable, MISSING, Popup, TeamsFocus,
    player_details,
};
use crate::state::bet::share_text;
use crate::state::messages::{Loaded, MatchBoard, NetworkRequest};
use crate::state::predictions::{PredictionStore, Side};
use crate::state::search::SearchEvent;
use crate::state::tiers::{TIER_FILE, TierSelection};
use chrono::Utc;
use log::debug;
use pandascore_api::{League, MapInfo, Match, MatchKind, Player, Serie, Team, TeamCount, Tier, Tournament, Weapon};

/// Tiers the bet board always pulls from.
pub const BET_TIERS: [Tier; 2] = [Tier::S, Tier::A];

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Teams,
    Players,
    Matches,
    Leagues,
    Bet,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();
        let tiers = TierSelection::load(settings.data_dir.join(TIER_FILE));
        let store = PredictionStore::load(settings.data_dir.clone());

        let app = Self::from_parts(settings, tiers, store);

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn from_parts(settings: AppSettings, tiers: TierSelection, store: PredictionStore) -> Self {
        Self { settings, state: AppState::new(tiers, store) }
    }

    pub fn on_start(&mut self) -> Vec<NetworkRequest> {
        if self.settings.api_token.is_none() {
            self.state.last_error =
                Some("PANDASCORE_TOKEN is not set: export it or add it to .env".to_string());
        }
        vec![self.load_teams()]
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    fn load_teams(&mut self) -> NetworkRequest {
        let list = &mut self.state.teams.teams;
        let generation = list.begin();
        NetworkRequest::LoadTeams { page: list.page, per_page: list.per_page, generation }
    }

    fn load_roster(&mut self) -> Option<NetworkRequest> {
        let team = self.state.teams.roster_team.as_ref()?;
        let team_key = team.id.to_string();
        let game = self.state.teams.game_key();
        let roster = &mut self.state.teams.roster;
        let generation = roster.begin();
        Some(NetworkRequest::LoadRoster {
            team: team_key,
            page: roster.page,
            per_page: roster.per_page,
            game,
            generation,
        })
    }

    fn load_matches(&mut self, kind: MatchKind) -> NetworkRequest {
        let tiers = self.state.tiers.tiers().to_vec();
        let list = self.state.matches.column_mut(kind);
        let generation = list.begin();
        NetworkRequest::LoadMatches {
            board: MatchBoard::Matches,
            kind,
            page: list.page,
            per_page: list.per_page,
            tiers,
            generation,
        }
    }

    /// Ranking uses the selected tiers, or S when nothing is selected.
    fn load_top_teams(&mut self) -> NetworkRequest {
        let tiers = if self.state.tiers.is_empty() {
            vec![Tier::S]
        } else {
            self.state.tiers.tiers().to_vec()
        };
        let generation = self.state.matches.begin_top_teams();
        NetworkRequest::LoadTopTeams { tiers, generation }
    }

    fn load_matches_tab(&mut self) -> Vec<NetworkRequest> {
        vec![
            self.load_matches(MatchKind::Running),
            self.load_matches(MatchKind::Upcoming),
            self.load_matches(MatchKind::Past),
            self.load_top_teams(),
        ]
    }

    fn load_league_column(&mut self, column: LeaguesColumn) -> NetworkRequest {
        let tiers = self.state.tiers.tiers().to_vec();
        let leagues = &mut self.state.leagues;
        match column {
            LeaguesColumn::Leagues => {
                let generation = leagues.leagues.begin();
                NetworkRequest::LoadLeagues { page: leagues.leagues.page, per_page: leagues.leagues.per_page, tiers, generation }
            }
            LeaguesColumn::Series => {
                let generation = leagues.series.begin();
                NetworkRequest::LoadSeries { page: leagues.series.page, per_page: leagues.series.per_page, tiers, generation }
            }
            LeaguesColumn::Tournaments => {
                let generation = leagues.tournaments.begin();
                NetworkRequest::LoadTournaments {
                    page: leagues.tournaments.page,
                    per_page: leagues.tournaments.per_page,
                    tiers,
                    generation,
                }
            }
        }
    }

    fn load_leagues_tab(&mut self) -> Vec<NetworkRequest> {
        vec![
            self.load_league_column(LeaguesColumn::Leagues),
            self.load_league_column(LeaguesColumn::Series),
            self.load_league_column(LeaguesColumn::Tournaments),
        ]
    }

    fn load_bet_matches(&mut self, kind: MatchKind) -> NetworkRequest {
        let list = self.state.bet.column_mut(kind);
        let generation = list.begin();
        NetworkRequest::LoadMatches {
            board: MatchBoard::Bet,
            kind,
            page: list.page,
            per_page: list.per_page,
            tiers: BET_TIERS.to_vec(),
            generation,
        }
    }

    fn load_bet_tab(&mut self) -> Vec<NetworkRequest> {
        vec![
            self.load_bet_matches(MatchKind::Upcoming),
            self.load_bet_matches(MatchKind::Running),
            self.load_bet_matches(MatchKind::Past),
        ]
    }

    /// Reload the running columns that have been shown at least once.
    pub fn refresh_running(&mut self) -> Vec<NetworkRequest> {
        let mut out = Vec::new();
        if self.state.matches.running.loaded {
            out.push(self.load_matches(MatchKind::Running));
        }
        if self.state.bet.running.loaded {
            out.push(self.load_bet_matches(MatchKind::Running));
        }
        debug!("refreshing {} running match lists", out.len());
        out
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_teams_loaded(&mut self, generation: u64, result: Loaded<Team>) {
        if self.state.teams.teams.accept(generation, result) {
            self.state.teams.selected = 0;
        }
    }

    pub fn on_roster_loaded(&mut self, generation: u64, result: Loaded<Player>) {
        if self.state.teams.roster.accept(generation, result) {
            self.state.teams.roster_selected = 0;
        }
    }

    pub fn on_player_loaded(&mut self, player: Player) {
        self.state.popup = Some(Popup::Details(player_details(&player)));
    }

    pub fn on_matches_loaded(&mut self, board: MatchBoard, kind: MatchKind, generation: u64, result: Loaded<Match>) {
        let list = match board {
            MatchBoard::Matches => self.state.matches.column_mut(kind),
            MatchBoard::Bet => self.state.bet.column_mut(kind),
        };
        if !list.accept(generation, result) {
            debug!("dropped stale {} matches ({board:?})", kind.slug());
            return;
        }
        if board == MatchBoard::Bet {
            self.state.bet.resync(Utc::now());
        }
        if board == MatchBoard::Matches && kind == self.state.matches.focus {
            let len = self.state.matches.visible(kind).len();
            if self.state.matches.selected >= len {
                self.state.matches.selected = len.saturating_sub(1);
            }
        }
    }

    pub fn on_top_teams_loaded(&mut self, generation: u64, result: Result<Vec<TeamCount>, String>) {
        let matches = &mut self.state.matches;
        if generation != matches.top_generation {
            return;
        }
        matches.top_loading = false;
        match result {
            Ok(teams) => {
                matches.top_teams = teams;
                matches.top_error = None;
            }
            Err(message) => {
                matches.top_teams.clear();
                matches.top_error = Some(message);
            }
        }
    }

    pub fn on_leagues_loaded(&mut self, generation: u64, result: Loaded<League>) {
        self.state.leagues.leagues.accept(generation, result);
    }

    pub fn on_series_loaded(&mut self, generation: u64, result: Loaded<Serie>) {
        self.state.leagues.series.accept(generation, result);
    }

    pub fn on_tournaments_loaded(&mut self, generation: u64, result: Loaded<Tournament>) {
        self.state.leagues.tournaments.accept(generation, result);
    }

    pub fn on_maps_loaded(&mut self, maps: Vec<MapInfo>) {
        let rows = maps.into_iter().map(|m| (m.name, format!("#{}", m.id))).collect();
        self.state.popup = Some(Popup::Details(DetailPopup { title: "Map pool".to_string(), rows }));
    }

    pub fn on_weapons_loaded(&mut self, weapons: Vec<Weapon>) {
        let rows = weapons
            .into_iter()
            .map(|w| (w.name, w.kind.unwrap_or_else(|| MISSING.to_string())))
            .collect();
        self.state.popup = Some(Popup::Details(DetailPopup { title: "Weapons".to_string(), rows }));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    /// Only results for the text currently in the box are shown.
    pub fn on_search_event(&mut self, event: SearchEvent) {
        let players = &mut self.state.players;
        let current = players.query.trim().to_string();
        match event {
            SearchEvent::Cleared => {
                players.results.clear();
                players.loading = false;
                players.error = None;
                players.selected = 0;
            }
            SearchEvent::Started { query } if query == current => {
                players.loading = true;
                players.error = None;
            }
            SearchEvent::Results { query, players: found } if query == current => {
                players.loading = false;
                players.results = found;
                players.selected = 0;
            }
            SearchEvent::Failed { query, message } if query == current => {
                players.loading = false;
                players.results.clear();
                players.error = Some(message);
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    /// Switch tabs. The first visit to a data tab kicks off its loads.
    pub fn update_tab(&mut self, next: MenuItem) -> Vec<NetworkRequest> {
        if self.state.active_tab == next {
            return Vec::new();
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.input = None;

        match next {
            MenuItem::Teams if !self.state.teams.teams.loaded && !self.state.teams.teams.loading => {
                vec![self.load_teams()]
            }
            MenuItem::Matches if !self.state.matches.running.loaded && !self.state.matches.running.loading => {
                self.load_matches_tab()
            }
            MenuItem::Leagues if !self.state.leagues.leagues.loaded && !self.state.leagues.leagues.loading => {
                self.load_leagues_tab()
            }
            MenuItem::Bet if !self.state.bet.upcoming.loaded && !self.state.bet.upcoming.loading => {
                self.load_bet_tab()
            }
            MenuItem::Players => {
                self.state.input = Some(InputTarget::PlayerSearch);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn close_popup(&mut self) -> bool {
        self.state.popup.take().is_some()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn move_selection(&mut self, down: bool) {
        match self.state.active_tab {
            MenuItem::Teams => self.state.teams.move_selection(down),
            MenuItem::Players => {
                let len = self.state.players.results.len();
                let idx = &mut self.state.players.selected;
                *idx = if down { (*idx + 1).min(len.saturating_sub(1)) } else { idx.saturating_sub(1) };
            }
            MenuItem::Matches => self.state.matches.move_selection(down),
            MenuItem::Leagues => self.state.leagues.move_selection(down),
            MenuItem::Bet => self.state.bet.move_cursor(down, Utc::now()),
            MenuItem::Help => {}
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        match self.state.active_tab {
            MenuItem::Teams => {
                let teams = &mut self.state.teams;
                teams.focus = match teams.focus {
                    TeamsFocus::List if teams.roster_team.is_some() => TeamsFocus::Roster,
                    _ => TeamsFocus::List,
                };
            }
            MenuItem::Matches => self.state.matches.cycle_focus(forward),
            MenuItem::Leagues => self.state.leagues.cycle_focus(forward),
            _ => {}
        }
    }

    pub fn next_page(&mut self) -> Vec<NetworkRequest> {
        self.change_page(true)
    }

    pub fn prev_page(&mut self) -> Vec<NetworkRequest> {
        self.change_page(false)
    }

    fn change_page(&mut self, forward: bool) -> Vec<NetworkRequest> {
        fn step<T>(list: &mut Loadable<T>, forward: bool) -> bool {
            if forward { list.next_page() } else { list.prev_page() }
        }

        let tab = self.state.active_tab;
        let focus = self.state.teams.focus;
        match tab {
            MenuItem::Teams => match focus {
                TeamsFocus::List if step(&mut self.state.teams.teams, forward) => vec![self.load_teams()],
                TeamsFocus::Roster if step(&mut self.state.teams.roster, forward) => {
                    self.load_roster().into_iter().collect()
                }
                _ => Vec::new(),
            },
            MenuItem::Matches => {
                let kind = self.state.matches.focus;
                if step(self.state.matches.column_mut(kind), forward) {
                    self.state.matches.selected = 0;
                    vec![self.load_matches(kind)]
                } else {
                    Vec::new()
                }
            }
            MenuItem::Leagues => {
                let column = self.state.leagues.focus;
                let leagues = &mut self.state.leagues;
                let moved = match column {
                    LeaguesColumn::Leagues => step(&mut leagues.leagues, forward),
                    LeaguesColumn::Series => step(&mut leagues.series, forward),
                    LeaguesColumn::Tournaments => step(&mut leagues.tournaments, forward),
                };
                if moved {
                    leagues.selected = 0;
                    vec![self.load_league_column(column)]
                } else {
                    Vec::new()
                }
            }
            MenuItem::Bet if step(&mut self.state.bet.upcoming, forward) => {
                vec![self.load_bet_matches(MatchKind::Upcoming)]
            }
            _ => Vec::new(),
        }
    }

    /// Enter on the active tab: drill into a team, open details, fold a bet group.
    pub fn activate(&mut self) -> Vec<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Teams => match self.state.teams.focus {
                TeamsFocus::List => {
                    let Some(team) = self.state.teams.selected_team().cloned() else {
                        return Vec::new();
                    };
                    let teams = &mut self.state.teams;
                    teams.roster_team = Some(team);
                    teams.game_filter = None;
                    teams.roster_selected = 0;
                    teams.roster.reset_page();
                    teams.focus = TeamsFocus::Roster;
                    self.load_roster().into_iter().collect()
                }
                TeamsFocus::Roster => self
                    .state
                    .teams
                    .selected_player()
                    .map(|p| NetworkRequest::LoadPlayer { id: p.id.to_string() })
                    .into_iter()
                    .collect(),
            },
            MenuItem::Players => {
                if let Some(p) = self.state.players.selected_player() {
                    self.state.popup = Some(Popup::Details(player_details(p)));
                }
                Vec::new()
            }
            MenuItem::Leagues => {
                self.state.popup = self.state.leagues.selected_details(Utc::now()).map(Popup::Details);
                Vec::new()
            }
            MenuItem::Bet => {
                let board = self.state.bet.board(Utc::now());
                if let Some(BetRow::Group(gi)) = self.state.bet.current_row(&board)
                    && let Some(group) = board.groups().nth(gi)
                {
                    self.state.bet.toggle_group(&group.key);
                }
                self.state.bet.resync(Utc::now());
                Vec::new()
            }
            MenuItem::Matches | MenuItem::Help => Vec::new(),
        }
    }

    pub fn cycle_game_filter(&mut self) -> Vec<NetworkRequest> {
        if self.state.teams.roster_team.is_none() {
            return Vec::new();
        }
        self.state.teams.cycle_game_filter();
        self.state.teams.roster.reset_page();
        self.load_roster().into_iter().collect()
    }

    // -----------------------------------------------------------------------
    // Tier selection — reloads every tier-filtered list already on screen
    // -----------------------------------------------------------------------

    pub fn toggle_tier(&mut self, tier: Tier) -> Vec<NetworkRequest> {
        self.state.tiers.toggle(tier);
        self.reload_for_tiers()
    }

    pub fn only_tier(&mut self, tier: Tier) -> Vec<NetworkRequest> {
        self.state.tiers.set_only(tier);
        self.reload_for_tiers()
    }

    pub fn clear_tiers(&mut self) -> Vec<NetworkRequest> {
        self.state.tiers.clear();
        self.reload_for_tiers()
    }

    fn reload_for_tiers(&mut self) -> Vec<NetworkRequest> {
        let mut out = Vec::new();
        let matches = &mut self.state.matches;
        if matches.running.loaded || matches.running.loading {
            for kind in [MatchKind::Running, MatchKind::Upcoming, MatchKind::Past] {
                matches.column_mut(kind).reset_page();
            }
            matches.selected = 0;
            out.extend(self.load_matches_tab());
        }
        let leagues = &mut self.state.leagues;
        if leagues.leagues.loaded || leagues.leagues.loading {
            leagues.leagues.reset_page();
            leagues.series.reset_page();
            leagues.tournaments.reset_page();
            leagues.selected = 0;
            out.extend(self.load_leagues_tab());
        }
        out
    }

    // -----------------------------------------------------------------------
    // Text input
    // -----------------------------------------------------------------------

    pub fn start_input(&mut self) {
        self.state.input = match self.state.active_tab {
            MenuItem::Teams => Some(InputTarget::TeamFilter),
            MenuItem::Players => Some(InputTarget::PlayerSearch),
            MenuItem::Matches => Some(InputTarget::MatchFilter),
            MenuItem::Leagues => Some(InputTarget::LeagueFilter),
            MenuItem::Bet => {
                self.state.bet.nickname_input = self.state.bet.store.nickname().to_string();
                Some(InputTarget::Nickname)
            }
            MenuItem::Help => None,
        };
    }

    fn input_buffer(&mut self) -> Option<&mut String> {
        Some(match self.state.input? {
            InputTarget::TeamFilter => &mut self.state.teams.filter,
            InputTarget::PlayerSearch => &mut self.state.players.query,
            InputTarget::MatchFilter => &mut self.state.matches.filter,
            InputTarget::LeagueFilter => &mut self.state.leagues.filter,
            InputTarget::Nickname => &mut self.state.bet.nickname_input,
        })
    }

    /// Apply an edit to the focused field. Returns the new search text when
    /// the player search box changed.
    pub fn edit_input(&mut self, edit: impl FnOnce(&mut String)) -> Option<String> {
        let target = self.state.input?;
        let buffer = self.input_buffer()?;
        edit(buffer);
        let text = buffer.clone();

        match target {
            InputTarget::TeamFilter => self.state.teams.selected = 0,
            InputTarget::MatchFilter => self.state.matches.selected = 0,
            InputTarget::LeagueFilter => self.state.leagues.selected = 0,
            InputTarget::PlayerSearch => return Some(text),
            InputTarget::Nickname => {}
        }
        None
    }

    /// Leave the text field; `commit` decides whether a nickname edit sticks.
    pub fn finish_input(&mut self, commit: bool) {
        if self.state.input == Some(InputTarget::Nickname) {
            if commit {
                let nickname = self.state.bet.nickname_input.clone();
                self.state.bet.store.set_nickname(&nickname);
            }
            self.state.bet.nickname_input = self.state.bet.store.nickname().to_string();
        }
        self.state.input = None;
    }

    // -----------------------------------------------------------------------
    // Bet actions
    // -----------------------------------------------------------------------

    fn selected_bet_match(&self) -> Option<Match> {
        let board = self.state.bet.board(Utc::now());
        match self.state.bet.current_row(&board)? {
            BetRow::Match(gi, mi) => board.groups().nth(gi)?.matches.get(mi).cloned(),
            BetRow::Group(_) => None,
        }
    }

    pub fn bet_step(&mut self, side: Side) {
        if let Some(m) = self.selected_bet_match() {
            let p = self.state.bet.store.increment(&m, side);
            debug!("prediction for match {} is now {}", m.id, p.score);
        }
    }

    pub fn bet_clear(&mut self) {
        if let Some(m) = self.selected_bet_match() {
            self.state.bet.store.clear(m.id);
        }
    }

    pub fn show_leaderboard(&mut self) {
        self.state.popup = Some(Popup::Leaderboard(self.state.bet.leaderboard()));
    }

    /// Share text for the group under the cursor.
    pub fn show_share(&mut self) {
        let board = self.state.bet.board(Utc::now());
        let gi = match self.state.bet.current_row(&board) {
            Some(BetRow::Group(gi) | BetRow::Match(gi, _)) => gi,
            None => return,
        };
        if let Some(group) = board.groups().nth(gi) {
            let text = share_text(group, self.state.bet.store.mine());
            self.state.popup = Some(Popup::Share { title: group.name.clone(), text });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandascore_api::{Page, PageInfo, TeamRef};

    fn app() -> App {
        App::from_parts(AppSettings::default(), TierSelection::default(), PredictionStore::default())
    }

    fn page<T>(items: Vec<T>) -> Loaded<T> {
        Ok(Page { items, info: PageInfo { page: 1, per_page: 50, ..Default::default() } })
    }

    fn generation_of(req: &NetworkRequest) -> u64 {
        match req {
            NetworkRequest::LoadTeams { generation, .. }
            | NetworkRequest::LoadRoster { generation, .. }
            | NetworkRequest::LoadMatches { generation, .. }
            | NetworkRequest::LoadTopTeams { generation, .. }
            | NetworkRequest::LoadLeagues { generation, .. }
            | NetworkRequest::LoadSeries { generation, .. }
            | NetworkRequest::LoadTournaments { generation, .. } => *generation,
            NetworkRequest::LoadPlayer { .. } | NetworkRequest::LoadMaps | NetworkRequest::LoadWeapons => 0,
        }
    }

    #[test]
    fn startup_loads_teams_and_flags_missing_token() {
        let mut app = app();
        let reqs = app.on_start();
        assert!(matches!(reqs.as_slice(), [NetworkRequest::LoadTeams { page: 1, per_page: 10, .. }]));
        assert!(app.state.last_error.as_deref().unwrap_or_default().contains("PANDASCORE_TOKEN"));
    }

    #[test]
    fn first_visit_to_matches_loads_three_columns_and_top_teams() {
        let mut app = app();
        let reqs = app.update_tab(MenuItem::Matches);
        assert_eq!(reqs.len(), 4);
        assert!(matches!(
            &reqs[3],
            NetworkRequest::LoadTopTeams { tiers, .. } if tiers == &vec![Tier::S]
        ));
        app.update_tab(MenuItem::Teams);
        assert!(app.update_tab(MenuItem::Matches).is_empty(), "already loading");
    }

    #[test]
    fn tier_change_drops_responses_for_the_old_selection() {
        let mut app = app();
        let first = app.update_tab(MenuItem::Matches);
        let stale = generation_of(&first[0]);

        let reqs = app.toggle_tier(Tier::A);
        assert!(matches!(
            &reqs[0],
            NetworkRequest::LoadMatches { kind: MatchKind::Running, tiers, page: 1, .. } if tiers == &vec![Tier::A]
        ));
        let fresh = generation_of(&reqs[0]);

        let live = Match { id: 1, status: "running".into(), ..Default::default() };
        app.on_matches_loaded(MatchBoard::Matches, MatchKind::Running, stale, page(vec![live.clone()]));
        assert!(app.state.matches.running.data.is_empty());
        assert!(app.state.matches.running.loading);

        app.on_matches_loaded(MatchBoard::Matches, MatchKind::Running, fresh, page(vec![live]));
        assert_eq!(app.state.matches.running.data.len(), 1);
    }

    #[test]
    fn bet_board_uses_s_and_a_regardless_of_selection() {
        let mut app = app();
        app.state.tiers.set_only(Tier::B);
        let reqs = app.update_tab(MenuItem::Bet);
        assert_eq!(reqs.len(), 3);
        for req in &reqs {
            assert!(matches!(
                req,
                NetworkRequest::LoadMatches { board: MatchBoard::Bet, per_page: 50, tiers, .. } if tiers == &BET_TIERS.to_vec()
            ));
        }
    }

    #[test]
    fn selecting_a_team_loads_its_roster() {
        let mut app = app();
        let reqs = app.on_start();
        let team = Team { id: 42, name: "Vitality".into(), games: vec!["Counter-Strike".into()], ..Default::default() };
        app.on_teams_loaded(generation_of(&reqs[0]), page(vec![team]));

        let reqs = app.activate();
        assert!(matches!(
            reqs.as_slice(),
            [NetworkRequest::LoadRoster { team, page: 1, per_page: 50, game: None, .. }] if team == "42"
        ));
        assert_eq!(app.state.teams.focus, TeamsFocus::Roster);

        let reqs = app.cycle_game_filter();
        assert!(matches!(
            reqs.as_slice(),
            [NetworkRequest::LoadRoster { game: Some(pandascore_api::GameKey::Csgo), .. }]
        ));
    }

    #[test]
    fn stepping_a_bet_from_the_board() {
        let mut app = app();
        let reqs = app.update_tab(MenuItem::Bet);
        let running_gen = generation_of(&reqs[1]);
        let m = Match {
            id: 77,
            status: "running".into(),
            number_of_games: Some(3),
            opponents: vec![
                TeamRef { id: 5, name: "Vitality".into(), ..Default::default() },
                TeamRef { id: 9, name: "NAVI".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        app.on_matches_loaded(MatchBoard::Bet, MatchKind::Running, running_gen, page(vec![m]));

        app.bet_step(Side::Left);
        assert!(app.state.bet.store.get(77).is_none(), "cursor is on the group header");

        app.move_selection(true);
        app.bet_step(Side::Left);
        app.bet_step(Side::Left);
        let p = app.state.bet.store.get(77).unwrap();
        assert_eq!((p.score.as_str(), p.winner_id), ("2-0", Some(5)));

        app.show_share();
        match &app.state.popup {
            Some(Popup::Share { text, .. }) => assert!(text.contains("✅ Vitality ⚔️ ❌ NAVI 2-0 BO3")),
            other => panic!("unexpected popup {other:?}"),
        }

        app.bet_clear();
        assert!(app.state.bet.store.get(77).is_none());
    }

    #[test]
    fn running_refresh_keeps_the_bet_cursor_on_its_match() {
        let mut app = app();
        app.update_tab(MenuItem::Bet);
        let live = |id, t: u64| Match {
            id,
            status: "running".into(),
            tournament: Some(pandascore_api::TournamentRef { id: t, name: format!("T{t}"), tier: None }),
            opponents: vec![
                TeamRef { id: 5, name: "Vitality".into(), ..Default::default() },
                TeamRef { id: 9, name: "NAVI".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        let load = |app: &mut App, matches: Vec<Match>| {
            let reqs = app.refresh_running();
            app.on_matches_loaded(MatchBoard::Bet, MatchKind::Running, generation_of(&reqs[0]), page(matches));
        };

        let first = app.state.bet.running.begin();
        app.on_matches_loaded(MatchBoard::Bet, MatchKind::Running, first, page(vec![live(77, 1)]));
        app.move_selection(true);

        load(&mut app, vec![live(10, 2), live(11, 2), live(77, 1)]);
        app.bet_step(Side::Left);
        assert!(app.state.bet.store.get(77).is_some());
        assert!(app.state.bet.store.get(10).is_none());
    }

    #[test]
    fn nickname_edits_apply_on_commit_only() {
        let mut app = app();
        app.update_tab(MenuItem::Bet);
        app.start_input();
        app.edit_input(|s| s.push_str("Alice"));
        app.finish_input(false);
        assert_eq!(app.state.bet.store.nickname(), "Me");

        app.start_input();
        app.edit_input(|s| {
            s.clear();
            s.push_str("Alice");
        });
        app.finish_input(true);
        assert_eq!(app.state.bet.store.nickname(), "Alice");
        assert_eq!(app.state.input, None);
    }

    #[test]
    fn search_results_for_old_text_are_ignored() {
        let mut app = app();
        app.update_tab(MenuItem::Players);
        let sent = app.edit_input(|s| s.push_str("zywoo"));
        assert_eq!(sent.as_deref(), Some("zywoo"));

        app.on_search_event(SearchEvent::Results {
            query: "zyw".into(),
            players: vec![Player::default()],
        });
        assert!(app.state.players.results.is_empty());

        app.on_search_event(SearchEvent::Results {
            query: "zywoo".into(),
            players: vec![Player { name: "ZywOo".into(), ..Default::default() }],
        });
        assert_eq!(app.state.players.results.len(), 1);

        app.on_search_event(SearchEvent::Cleared);
        assert!(app.state.players.results.is_empty());
    }

    #[test]
    fn top_teams_only_accepts_latest_generation() {
        let mut app = app();
        let reqs = app.update_tab(MenuItem::Matches);
        let old = generation_of(&reqs[3]);
        app.clear_tiers();
        app.on_top_teams_loaded(old, Ok(vec![TeamCount::default()]));
        assert!(app.state.matches.top_teams.is_empty());
        assert!(app.state.matches.top_loading);
    }
}
