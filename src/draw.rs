use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::flags::country_label;
use crate::state::app_state::{BetRow, InputTarget, Loadable, MATCH_COLUMNS, MISSING, Popup, TeamsFocus};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::search::MIN_QUERY_LEN;
use crate::ui::layout::LayoutAreas;
use chrono::{Local, Utc};
use pandascore_api::{Match, Tier};

static TABS: &[&str; 5] = &["Teams", "Players", "Matches", "Leagues", "Bet"];

const SELECTED: Color = Color::Yellow;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }

        match app.state.active_tab {
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Players => draw_players(f, layout.main, app),
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::Leagues => draw_leagues(f, layout.main, app),
            MenuItem::Bet => draw_bet(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        if let Some(popup) = &app.state.popup {
            draw_popup(f, f.area(), popup);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn focus_border<'a>(focused: bool, title: String) -> Block<'a> {
    default_border(if focused { Color::White } else { Color::DarkGray }).title(title)
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Teams => 0,
        MenuItem::Players => 1,
        MenuItem::Matches => 2,
        MenuItem::Leagues => 3,
        MenuItem::Bet => 4,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {t}", i + 1)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let right = format!("tiers: {}  Help: ? ", app.state.tiers.label());
    let help = Paragraph::new(right)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if let Some(target) = app.state.input {
        let (label, value) = match target {
            InputTarget::TeamFilter => ("filter teams", app.state.teams.filter.as_str()),
            InputTarget::PlayerSearch => ("search players", app.state.players.query.as_str()),
            InputTarget::MatchFilter => ("filter matches", app.state.matches.filter.as_str()),
            InputTarget::LeagueFilter => ("filter leagues", app.state.leagues.filter.as_str()),
            InputTarget::Nickname => ("nickname", app.state.bet.nickname_input.as_str()),
        };
        (format!("{label}> {value}_   (Enter=done Esc=cancel)"), Style::default().fg(Color::Yellow))
    } else if let Some(err) = app.state.last_error.as_deref() {
        (err.to_string(), Style::default().fg(Color::Red))
    } else {
        let legend = match app.state.active_tab {
            MenuItem::Teams => "j/k=move  Tab=list/roster  Enter=open  g=game  n/p=page  /=filter",
            MenuItem::Players => "/=search  j/k=move  Enter=details",
            MenuItem::Matches => "h/l=column  j/k=move  n/p=page  s/a/b=tier  S/A/B=only  0=all  /=filter",
            MenuItem::Leagues => "h/l=column  Enter=details  s/a/b=tier  0=all  m=maps  w=weapons  /=filter",
            MenuItem::Bet => "j/k=move  h/l=score  x=clear  Enter=fold  c=share  t=leaderboard  /=nickname",
            MenuItem::Help => "Esc=back",
        };
        (format!("{legend}  q=quit"), Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

// ---------------------------------------------------------------------------
// Shared list helpers
// ---------------------------------------------------------------------------

/// Loading / error / empty message for a list, or None when rows should render.
fn list_notice<T>(list: &Loadable<T>, visible: usize) -> Option<String> {
    if let Some(err) = list.error.as_deref() {
        return Some(format!("Failed to load: {err}"));
    }
    if list.loading && list.data.is_empty() {
        return Some("Loading...".to_string());
    }
    if list.loaded && visible == 0 {
        return Some("Nothing to show".to_string());
    }
    None
}

fn selectable_lines(rows: Vec<String>, selected: usize, focused: bool) -> Vec<Line<'static>> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            if focused && idx == selected {
                Line::from(Span::styled(format!("> {row}"), Style::default().fg(SELECTED)))
            } else {
                Line::from(format!("  {row}"))
            }
        })
        .collect()
}

fn render_list<T>(f: &mut Frame, area: Rect, title: String, list: &Loadable<T>, rows: Vec<String>, selected: usize, focused: bool) {
    let title = format!(" {title} · {} ", list.page_label());
    let block = focus_border(focused, title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(notice) = list_notice(list, rows.len()) {
        let style = if list.error.is_some() { Color::Red } else { Color::DarkGray };
        f.render_widget(
            Paragraph::new(notice).style(Style::default().fg(style)).wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }
    f.render_widget(Paragraph::new(selectable_lines(rows, selected, focused)), inner);
}

fn team_label(m: &Match, idx: usize) -> String {
    m.opponents
        .get(idx)
        .map(|t| t.acronym.clone().filter(|a| !a.is_empty()).unwrap_or_else(|| t.name.clone()))
        .unwrap_or_else(|| "TBD".to_string())
}

fn match_line(m: &Match) -> String {
    let a = team_label(m, 0);
    let b = team_label(m, 1);
    let r = m.result();
    let score = match (r.score_a, r.score_b) {
        (Some(sa), Some(sb)) if m.status != "not_started" => format!("{sa}-{sb}"),
        _ => "vs".to_string(),
    };
    let when = m
        .begin_at
        .or(m.scheduled_at)
        .map(|t| t.with_timezone(&Local).format("%m/%d %H:%M").to_string())
        .unwrap_or_default();
    let league = m.league.as_ref().map(|l| l.name.as_str()).unwrap_or_default();
    format!("{a} {score} {b}  BO{}  {when}  {league}", m.best_of())
}

fn tier_label(tier: Option<Tier>) -> String {
    tier.map(|t| format!("[{}]", t.code().to_uppercase())).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let teams = &app.state.teams;
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let rows: Vec<String> = teams
        .visible_teams()
        .iter()
        .map(|t| format!("{} ({})", t.name, t.abbreviation))
        .collect();
    let title = if teams.filter.is_empty() { "Teams".to_string() } else { format!("Teams /{}", teams.filter) };
    render_list(f, list_area, title, &teams.teams, rows, teams.selected, teams.focus == TeamsFocus::List);

    let Some(team) = teams.roster_team.as_ref() else {
        let block = default_border(Color::DarkGray).title(" Team ");
        let inner = block.inner(detail_area);
        f.render_widget(block, detail_area);
        f.render_widget(
            Paragraph::new("Select a team and press Enter")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let [info_area, roster_area] = Layout::vertical([Constraint::Length(7), Constraint::Fill(1)]).areas(detail_area);

    let accent = parse_hex(&team.accent).unwrap_or(Color::Magenta);
    let block = default_border(accent).title(format!(" {} ", team.name));
    let inner = block.inner(info_area);
    f.render_widget(block, info_area);
    let games = if team.games.is_empty() { MISSING.to_string() } else { team.games.join(", ") };
    let trophies = if team.trophies.is_empty() {
        "none recorded".to_string()
    } else {
        team.trophies.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
    };
    let info = vec![
        Line::from(vec![
            Span::styled("Tag      ", Style::default().fg(Color::DarkGray)),
            Span::raw(team.abbreviation.clone()),
        ]),
        Line::from(vec![
            Span::styled("Country  ", Style::default().fg(Color::DarkGray)),
            Span::raw(country_label(team.country.as_deref())),
        ]),
        Line::from(vec![
            Span::styled("Founded  ", Style::default().fg(Color::DarkGray)),
            Span::raw(team.founded.clone().unwrap_or_else(|| MISSING.to_string())),
        ]),
        Line::from(vec![Span::styled("Games    ", Style::default().fg(Color::DarkGray)), Span::raw(games)]),
        Line::from(vec![Span::styled("Trophies ", Style::default().fg(Color::DarkGray)), Span::raw(trophies)]),
    ];
    f.render_widget(Paragraph::new(info), inner);

    let rows: Vec<String> = teams
        .visible_roster()
        .iter()
        .map(|p| {
            format!(
                "{:<16} {:<14} {}",
                p.name,
                p.role.as_deref().unwrap_or(""),
                p.game.as_deref().unwrap_or(MISSING)
            )
        })
        .collect();
    let title = format!("Roster · game: {}", teams.game_filter.as_deref().unwrap_or("all"));
    render_list(f, roster_area, title, &teams.roster, rows, teams.roster_selected, teams.focus == TeamsFocus::Roster);
}

fn parse_hex(hex: &str) -> Option<Color> {
    let h = hex.strip_prefix('#')?;
    if h.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(h.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let players = &app.state.players;
    let [input_area, results_area] = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);

    let editing = app.state.input == Some(InputTarget::PlayerSearch);
    let cursor = if editing { "_" } else { "" };
    let block = focus_border(editing, " Search players ".to_string());
    let inner = block.inner(input_area);
    f.render_widget(block, input_area);
    f.render_widget(Paragraph::new(format!("{}{cursor}", players.query)), inner);

    let block = focus_border(!editing, " Results ".to_string());
    let inner = block.inner(results_area);
    f.render_widget(block, results_area);

    let query_len = players.query.trim().chars().count();
    let notice = if let Some(err) = players.error.as_deref() {
        Some((format!("Failed to load: {err}"), Color::Red))
    } else if query_len < MIN_QUERY_LEN {
        Some((format!("Type at least {MIN_QUERY_LEN} characters"), Color::DarkGray))
    } else if players.loading {
        Some(("Searching...".to_string(), Color::DarkGray))
    } else if players.results.is_empty() {
        Some(("No players found".to_string(), Color::DarkGray))
    } else {
        None
    };
    if let Some((msg, color)) = notice {
        f.render_widget(Paragraph::new(msg).style(Style::default().fg(color)), inner);
        return;
    }

    let rows: Vec<String> = players
        .results
        .iter()
        .map(|p| format!("{:<18} {}", p.name, country_label(p.nationality.as_deref())))
        .collect();
    f.render_widget(Paragraph::new(selectable_lines(rows, players.selected, !editing)), inner);
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let matches = &app.state.matches;
    let [columns_area, top_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(30)]).areas(area);
    let column_areas: [Rect; 3] = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(columns_area);

    for (kind, col_area) in MATCH_COLUMNS.iter().zip(column_areas) {
        let focused = matches.focus == *kind;
        let rows: Vec<String> = matches.visible(*kind).into_iter().map(match_line).collect();
        let mut title = kind.label().to_string();
        if !matches.filter.is_empty() {
            title = format!("{title} /{}", matches.filter);
        }
        render_list(f, col_area, title, matches.column(*kind), rows, matches.selected, focused);
    }

    let tiers = if app.state.tiers.is_empty() { "S".to_string() } else { app.state.tiers.label() };
    let block = default_border(Color::DarkGray).title(format!(" Top teams ({tiers}) "));
    let inner = block.inner(top_area);
    f.render_widget(block, top_area);
    let lines: Vec<Line> = if let Some(err) = matches.top_error.as_deref() {
        vec![Line::from(Span::styled(format!("Failed to load: {err}"), Style::default().fg(Color::Red)))]
    } else if matches.top_loading {
        vec![Line::from(Span::styled("Loading...", Style::default().fg(Color::DarkGray)))]
    } else {
        matches
            .top_teams
            .iter()
            .enumerate()
            .map(|(i, tc)| Line::from(format!("{:>2}. {:<20} {}", i + 1, tc.team.name, tc.count)))
            .collect()
    };
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_leagues(f: &mut Frame, area: Rect, app: &App) {
    use crate::state::app_state::LeaguesColumn;

    let leagues = &app.state.leagues;
    let [l_area, s_area, t_area] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    let title = |col: LeaguesColumn| {
        if leagues.filter.is_empty() {
            col.label().to_string()
        } else {
            format!("{} /{}", col.label(), leagues.filter)
        }
    };

    let rows: Vec<String> = leagues
        .visible_leagues()
        .iter()
        .map(|l| format!("{}  {}", l.name, l.videogame.as_deref().unwrap_or("")))
        .collect();
    render_list(
        f,
        l_area,
        title(LeaguesColumn::Leagues),
        &leagues.leagues,
        rows,
        leagues.selected,
        leagues.focus == LeaguesColumn::Leagues,
    );

    let rows: Vec<String> = leagues
        .visible_series()
        .iter()
        .map(|s| {
            let name = s.full_name.as_deref().or(s.name.as_deref()).unwrap_or(MISSING);
            let league = s.league.as_ref().map(|l| l.name.as_str()).unwrap_or_default();
            format!("{} {name}  {league}", tier_label(s.tier))
        })
        .collect();
    render_list(
        f,
        s_area,
        title(LeaguesColumn::Series),
        &leagues.series,
        rows,
        leagues.selected,
        leagues.focus == LeaguesColumn::Series,
    );

    let now = Utc::now();
    let rows: Vec<String> = leagues
        .visible_tournaments()
        .iter()
        .map(|t| format!("{} {}  ({})", tier_label(t.tier), t.name, t.status(now).label()))
        .collect();
    render_list(
        f,
        t_area,
        title(LeaguesColumn::Tournaments),
        &leagues.tournaments,
        rows,
        leagues.selected,
        leagues.focus == LeaguesColumn::Tournaments,
    );
}

fn draw_bet(f: &mut Frame, area: Rect, app: &App) {
    let bet = &app.state.bet;
    let block = default_border(Color::White).title(format!(" Bets · {} ", bet.store.nickname()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lists = [&bet.running, &bet.upcoming];
    if let Some(err) = lists.iter().find_map(|l| l.error.as_deref()) {
        f.render_widget(
            Paragraph::new(format!("Failed to load: {err}")).style(Style::default().fg(Color::Red)),
            inner,
        );
        return;
    }
    if lists.iter().any(|l| l.loading && !l.loaded) {
        f.render_widget(Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray)), inner);
        return;
    }

    let board = bet.board(Utc::now());
    if board.is_empty() {
        f.render_widget(
            Paragraph::new("No S/A-tier matches running or upcoming").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let groups: Vec<_> = board.groups().collect();
    let mut lines: Vec<Line> = Vec::new();
    for (idx, row) in bet.rows(&board).into_iter().enumerate() {
        let selected = idx == bet.cursor;
        let marker = if selected { "> " } else { "  " };
        let base = if selected { Style::default().fg(SELECTED) } else { Style::default() };
        match row {
            BetRow::Group(gi) => {
                if gi == 0 || gi == board.current.len() {
                    let section = if gi < board.current.len() { "Current" } else { "Next" };
                    lines.push(Line::from(Span::styled(
                        section,
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
                    )));
                }
                let group = groups[gi];
                let fold = if bet.collapsed.contains(&group.key) { "▸" } else { "▾" };
                let mut spans = vec![
                    Span::styled(format!("{marker}{fold} {} ({})", group.name, group.matches.len()), base.add_modifier(Modifier::BOLD)),
                ];
                if group.is_live() {
                    spans.push(Span::styled(" LIVE", Style::default().fg(Color::Red)));
                }
                lines.push(Line::from(spans));
            }
            BetRow::Match(gi, mi) => {
                let m = &groups[gi].matches[mi];
                let prediction = bet.store.get(m.id);
                let (l, r) = prediction.map(|p| (p.left, p.right)).unwrap_or((0, 0));
                let winner = prediction
                    .and_then(|p| p.winner_id)
                    .and_then(|id| m.opponents.iter().find(|t| t.id == id))
                    .map(|t| format!("  → {}", t.name))
                    .unwrap_or_default();
                lines.push(Line::from(Span::styled(
                    format!(
                        "{marker}    {:<12} [{l}] - [{r}] {:<12} BO{}{winner}",
                        team_label(m, 0),
                        team_label(m, 1),
                        m.best_of()
                    ),
                    base,
                )));
            }
        }
    }

    let visible = inner.height as usize;
    let skip = (bet.cursor + 2).saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = "\
1-5   switch tab (Teams, Players, Matches, Leagues, Bet)
j/k   move selection          h/l  change column
n/p   next / previous page    Enter open / select
/     edit the tab's filter (Players: search, Bet: nickname)
s a b toggle tier filter      S A B only that tier   0 all tiers
g     cycle roster game filter (Teams)
m w   map pool / weapons (Leagues)
h/l   step left / right predicted score (Bet)
x     clear prediction   c share text   t leaderboard (Bet)
f     full screen        \"  log pane    q  quit";
    f.render_widget(Paragraph::new(text), inner);
}

fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct.min(100)) / 100) as u16;
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn draw_popup(f: &mut Frame, area: Rect, popup: &Popup) {
    let (title, lines): (String, Vec<Line>) = match popup {
        Popup::Details(details) => {
            let width = details.rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
            let lines = details
                .rows
                .iter()
                .map(|(k, v)| {
                    Line::from(vec![
                        Span::styled(format!("{k:<width$}  "), Style::default().fg(Color::DarkGray)),
                        Span::raw(v.clone()),
                    ])
                })
                .collect();
            (details.title.clone(), lines)
        }
        Popup::Leaderboard(entries) => {
            let lines = if entries.is_empty() {
                vec![Line::from("No predictions yet")]
            } else {
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| Line::from(format!("{:>2}. {:<20} {} pts", i + 1, e.nickname, e.points)))
                    .collect()
            };
            ("Leaderboard".to_string(), lines)
        }
        Popup::Share { title, text } => (format!("Share · {title}"), text.lines().map(|l| Line::from(l.to_string())).collect()),
    };

    let popup_area = centered(area, 60, u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(3));
    f.render_widget(Clear, popup_area);
    let block = default_border(Color::Cyan).title(format!(" {title} "));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let mut lines = lines;
    lines.push(Line::from(Span::styled("Esc to close", Style::default().fg(Color::DarkGray))));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logger = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logger, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(3), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
