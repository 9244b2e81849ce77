use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::actions::available_actions;
use crate::components::bracket::{BracketView, BracketWidget, TBD, grid_height};
use crate::components::info::TournamentInfo;
use crate::components::standings::{NO_PLAYERS, StandingsTable};
use crate::components::theme::{Theme, ThemeColor, resolve};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use official_api::MatchPlayer;

static TABS: &[&str; 1] = &["Tournament"];

const HELP_TEXT: &str = "\
q / Ctrl-C   quit
1            tournament view
?            this help (Esc to leave)
h j k l      move through the bracket (arrows work too)
j k          scroll standings
Enter        open the selected match's live game
J            join the tournament
W            withdraw
R            refresh from the server
f            full screen
\"            toggle the log pane";

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
        }

        match app.state.active_tab {
            MenuItem::Tournament => {
                if !app.settings.full_screen {
                    draw_info(f, layout.info, app);
                    draw_side(f, layout.side, app);
                }
                draw_content(f, layout.content, app);
            }
            MenuItem::Help => {
                let area = layout.content.union(layout.info).union(layout.side);
                draw_help(f, area);
            }
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status(f, layout.status, app);
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

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select((app.state.active_tab == MenuItem::Tournament).then_some(0))
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_info(f: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 {
        return;
    }
    let info = TournamentInfo::project(app.ctrl.tournament());
    let accent = resolve(ThemeColor::Accent, Theme::Dark);
    let dim = resolve(ThemeColor::Dim, Theme::Dark);

    let block = default_border(Color::DarkGray).title(Line::from(Span::styled(format!(" {} ", info.name), accent)));
    let lines = vec![
        Line::from(vec![
            Span::styled(info.headline, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(info.phase, dim),
        ]),
        Line::from(info.details),
        Line::from(vec![Span::raw(format!("Starts {}", info.starts)), Span::raw("  "), Span::styled(info.players, dim)]),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_content(f: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.bracket() {
        Some(bracket) => format!(" Bracket • Round {} of {} ", bracket.current_round, bracket.total_rounds),
        None => " Standings ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.follow_selection(inner.height);

    if let Some(bracket) = app.bracket() {
        let view = BracketView::project(bracket, app.ctrl.viewer_id());
        let selected = Some((app.state.bracket.column, app.state.bracket.row));
        let max_scroll = grid_height(&view).saturating_sub(inner.height);
        f.render_widget(
            BracketWidget {
                view: &view,
                selected,
                scroll_offset: app.state.bracket.scroll_offset.min(max_scroll),
                theme: Theme::Dark,
            },
            inner,
        );
        return;
    }

    let Some(table) = StandingsTable::project(&app.ctrl) else {
        draw_placeholder(f, inner, NO_PLAYERS);
        return;
    };

    let [rows, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    f.render_widget(table.widget(app.state.standings_offset, Theme::Dark), rows);
    f.render_widget(
        Paragraph::new(table.footer.as_str())
            .alignment(Alignment::Right)
            .style(resolve(ThemeColor::Dim, Theme::Dark)),
        footer,
    );
}

fn draw_side(f: &mut Frame, area: Rect, app: &App) {
    if area.width == 0 {
        return;
    }
    let accent = resolve(ThemeColor::Accent, Theme::Dark);
    let dim = resolve(ThemeColor::Dim, Theme::Dark);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Actions", accent));
    let actions = available_actions(&app.ctrl);
    if actions.is_empty() {
        lines.push(Line::styled("  none right now", dim));
    }
    for action in actions {
        lines.push(Line::from(vec![
            Span::styled(format!("  [{}] ", action.key_hint()), accent),
            Span::raw(action.label()),
        ]));
    }

    if let Some(bracket) = app.bracket() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Live matches", accent));
        let mut live = bracket.live_matches().peekable();
        if live.peek().is_none() {
            lines.push(Line::styled("  none", dim));
        }
        for m in live {
            lines.push(Line::raw(format!(
                "  {} vs {}",
                seat_name(m.player1.as_ref()),
                seat_name(m.player2.as_ref())
            )));
        }
    }

    if let Some(url) = app.state.navigation.as_deref() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Open", accent));
        lines.push(Line::raw(format!("  {url}")));
    }

    let block = default_border(Color::DarkGray).title(" Side ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn seat_name(player: Option<&MatchPlayer>) -> &str {
    player.map_or(TBD, |p| p.username.as_str())
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if let Some(err) = app.state.last_error.as_deref() {
        (err.to_string(), resolve(ThemeColor::Danger, Theme::Dark))
    } else if let Some(url) = app.state.navigation.as_deref() {
        (format!("open {url}"), resolve(ThemeColor::Primary, Theme::Dark))
    } else {
        (String::new(), Style::default())
    };

    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Percentage(50)]).areas(area);
    f.render_widget(Paragraph::new(text).style(style), left);
    f.render_widget(
        Paragraph::new(app.state.connection.label())
            .alignment(Alignment::Right)
            .style(resolve(ThemeColor::Dim, Theme::Dark)),
        right,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    f.render_widget(Paragraph::new(HELP_TEXT).block(block), area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
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
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use crate::state::ctrl::tests::{Recorder, payload, snapshot};
    use serde_json::json;
    use tui::backend::TestBackend;

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        draw(&mut terminal, app, LoadingState::default());
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn empty_swiss_shows_placeholder_and_join() {
        let recorder = Recorder::default();
        let mut app = App::new(AppSettings::from_vars("t1", |_| None), recorder.ctrl(snapshot("swiss", "created"), None));
        let screen = rendered(&mut app);
        for needle in ["Autumn Open", "Swiss Tournament", "1 player", NO_PLAYERS, "Join Tournament"] {
            assert!(screen.contains(needle), "missing {needle:?}");
        }
    }

    #[test]
    fn bracket_with_far_off_position_still_draws() {
        let recorder = Recorder::default();
        let mut value = payload("knockout", "started");
        value["bracket"] = json!({
            "currentRound": 1,
            "totalRounds": 1,
            "rounds": [{ "roundNumber": 1, "roundName": "Final", "matches": [
                { "id": "m1", "round": 1, "position": 20_000, "status": "pending", "isBye": false }
            ]}]
        });
        let data = official_api::Snapshot::from_value(value).unwrap();
        let mut app = App::new(AppSettings::from_vars("t1", |_| None), recorder.ctrl(data, None));
        assert!(rendered(&mut app).contains("Round 1 of 1"));
    }

    #[test]
    fn help_tab_lists_keys() {
        let recorder = Recorder::default();
        let mut app = App::new(AppSettings::from_vars("t1", |_| None), recorder.ctrl(snapshot("arena", "started"), None));
        app.update_tab(MenuItem::Help);
        assert!(rendered(&mut app).contains("toggle the log pane"));
    }
}
