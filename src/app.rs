use crate::components::actions::{self, Action};
use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::ctrl::TournamentCtrl;
use log::{info, warn};
use official_api::protocol::Destination;
use official_api::{Bracket, Snapshot};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Tournament,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub ctrl: TournamentCtrl,
}

impl App {
    pub fn new(settings: AppSettings, ctrl: TournamentCtrl) -> Self {
        let mut app = Self {
            state: AppState::new(settings.socket_url()),
            settings,
            ctrl,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app.sync_view();
        app
    }

    /// The bracket to draw, if this is a knockout with matches to show.
    /// Everything else renders as standings.
    pub fn bracket(&self) -> Option<&Bracket> {
        shown_bracket(&self.ctrl)
    }

    fn sync_view(&mut self) {
        if let Some(bracket) = shown_bracket(&self.ctrl) {
            self.state.bracket.sync(bracket);
        }
        let rows = self.ctrl.data().standings.as_ref().map_or(0, |s| s.players.len());
        self.state.standings_offset = self.state.standings_offset.min(rows.saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Inbound data: pushes and HTTP refreshes both end in ctrl.reload
    // -----------------------------------------------------------------------

    /// Returns true when the push was rejected and the error needs drawing.
    /// Accepted reloads ask for their own redraw through the controller.
    pub fn on_push(&mut self, kind: &str, payload: Value) -> bool {
        match self.ctrl.receive(kind, payload) {
            Ok(true) => {
                self.state.last_error = None;
                self.sync_view();
                false
            }
            Ok(false) => false,
            Err(e) => {
                self.state.last_error = Some(e.to_string());
                true
            }
        }
    }

    pub fn on_snapshot_loaded(&mut self, snapshot: Snapshot) {
        self.state.last_error = None;
        self.ctrl.reload(snapshot);
        self.sync_view();
    }

    pub fn on_navigate(&mut self, destination: &Destination) {
        let url = destination.url(&self.settings.server);
        info!("navigate to {url}");
        self.state.navigation = Some(url);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Socket lifecycle
    // -----------------------------------------------------------------------

    /// Returns true on a reconnect, when reloads may have been missed.
    pub fn on_socket_connected(&mut self) -> bool {
        let reconnect = self.state.connection.on_connected();
        info!("socket connected to {}", self.state.connection.endpoint);
        reconnect
    }

    pub fn on_socket_disconnected(&mut self) {
        if self.state.connection.on_disconnected() {
            warn!("socket disconnected, retrying");
        }
    }

    pub fn on_socket_error(&mut self, message: String) {
        warn!("{message}");
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
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

    // -----------------------------------------------------------------------
    // Content navigation: bracket cursor, or standings scroll
    // -----------------------------------------------------------------------

    pub fn move_left(&mut self) {
        if let Some(bracket) = shown_bracket(&self.ctrl) {
            self.state.bracket.left(bracket);
        }
    }

    pub fn move_right(&mut self) {
        if let Some(bracket) = shown_bracket(&self.ctrl) {
            self.state.bracket.right(bracket);
        }
    }

    pub fn move_up(&mut self) {
        if self.bracket().is_some() {
            self.state.bracket.up();
        } else {
            self.state.standings_up();
        }
    }

    pub fn move_down(&mut self) {
        if let Some(bracket) = shown_bracket(&self.ctrl) {
            self.state.bracket.down(bracket);
        } else {
            let rows = self.ctrl.data().standings.as_ref().map_or(0, |s| s.players.len());
            self.state.standings_down(rows);
        }
    }

    /// Keep the selected bracket cell inside `height` visible rows.
    pub fn follow_selection(&mut self, height: u16) {
        if let Some(bracket) = shown_bracket(&self.ctrl) {
            self.state.bracket.follow(bracket, height);
        }
    }

    /// Go to the selected match's game, if it has one.
    pub fn open_selected_game(&self) -> bool {
        let opened = self
            .bracket()
            .and_then(|b| self.state.bracket.selected_match(b))
            .is_some_and(|m| self.ctrl.open_game(m));
        if !opened {
            info!("selected match has no game to open");
        }
        opened
    }

    pub fn perform_action(&self, action: Action) -> bool {
        actions::perform(&self.ctrl, action)
    }
}

fn shown_bracket(ctrl: &TournamentCtrl) -> Option<&Bracket> {
    if !ctrl.is_knockout() {
        return None;
    }
    ctrl.data().bracket.as_ref().filter(|b| !b.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ctrl::tests::{Recorder, payload, snapshot};
    use official_api::protocol::Intent;
    use serde_json::json;

    fn knockout_payload() -> Value {
        let mut value = payload("knockout", "started");
        value["bracket"] = json!({
            "currentRound": 1,
            "totalRounds": 2,
            "rounds": [
                { "roundNumber": 1, "roundName": "Semifinals", "matches": [
                    { "id": "s1", "round": 1, "position": 0, "status": "pending", "isBye": false },
                    { "id": "s2", "round": 1, "position": 1, "gameId": "g2", "status": "inProgress", "isBye": false,
                      "player1": { "userId": "alice", "username": "Alice", "rating": 2000 },
                      "player2": { "userId": "bob", "username": "Bob", "rating": 1900 } }
                ]},
                { "roundNumber": 2, "roundName": "Final", "matches": [
                    { "id": "f1", "round": 2, "position": 0, "status": "pending", "isBye": false }
                ]}
            ]
        });
        value
    }

    fn app(recorder: &Recorder, data: Snapshot) -> App {
        let settings = AppSettings::from_vars("t1", |key| {
            (key == "OFFICIAL_SERVER").then(|| "https://example.org".to_string())
        });
        App::new(settings, recorder.ctrl(data, Some("alice")))
    }

    #[test]
    fn reload_push_focuses_the_bracket() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, snapshot("knockout", "created"));
        assert!(app.bracket().is_none());

        assert!(!app.on_push("reload", knockout_payload()));

        assert!(app.bracket().is_some());
        assert_eq!(app.state.bracket.selected_match(app.bracket().unwrap()).unwrap().id, "s2");
        assert_eq!(recorder.redraws(), 1);
    }

    #[test]
    fn rejected_push_surfaces_an_error() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, snapshot("swiss", "started"));
        assert!(app.on_push("reload", json!({ "tournament": { "id": "t1" } })));
        assert!(app.state.last_error.as_deref().unwrap_or_default().contains("rejected reload"));
        assert!(app.ctrl.is_swiss());
    }

    #[test]
    fn enter_on_live_match_opens_its_game() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, Snapshot::from_value(knockout_payload()).unwrap());

        assert!(app.open_selected_game());
        assert_eq!(recorder.navigated(), vec![Destination::game("g2").unwrap()]);

        app.move_up();
        assert!(!app.open_selected_game());
    }

    #[test]
    fn navigation_resolves_against_the_server() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, snapshot("arena", "started"));
        app.on_navigate(&Destination::game("g2").unwrap());
        assert_eq!(app.state.navigation.as_deref(), Some("https://example.org/g2"));
    }

    #[test]
    fn knockout_without_bracket_scrolls_standings() {
        let recorder = Recorder::default();
        let mut value = payload("knockout", "started");
        value["standings"] = json!({ "page": 1, "nbPages": 1, "players": [
            { "rank": 1, "userId": "a", "username": "A", "rating": 1500, "score": 1 },
            { "rank": 2, "userId": "b", "username": "B", "rating": 1500, "score": 0 }
        ]});
        let mut app = app(&recorder, Snapshot::from_value(value).unwrap());

        app.move_down();
        app.move_down();
        assert_eq!(app.state.standings_offset, 1);
        app.move_left();
        assert_eq!(app.state.bracket.column, 0);
    }

    #[test]
    fn actions_go_through_availability() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, snapshot("arena", "created"));
        assert!(!app.perform_action(Action::Withdraw));
        assert!(app.perform_action(Action::Join));
        assert_eq!(recorder.sent(), vec![Intent::Join]);
    }

    #[test]
    fn socket_reconnects_are_detected() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, snapshot("arena", "started"));
        assert_eq!(app.state.connection.endpoint, "wss://example.org/official/t1/socket");
        assert!(!app.on_socket_connected());
        app.on_socket_disconnected();
        assert!(app.on_socket_connected());
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let recorder = Recorder::default();
        let mut app = app(&recorder, snapshot("arena", "started"));
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Tournament);
    }
}
