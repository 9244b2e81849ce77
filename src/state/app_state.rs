use crate::app::MenuItem;
use crate::components::bracket::{HEADER_ROWS, MATCH_HEIGHT, center_row};
use official_api::{Bracket, Match};

// ---------------------------------------------------------------------------
// Bracket cursor
// ---------------------------------------------------------------------------

/// Selection in the bracket grid. Column is the round index, row the match
/// index within that round. Both survive reloads because positions are stable;
/// `sync` only clamps them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BracketCursor {
    pub column: usize,
    pub row: usize,
    /// Vertical scroll offset in grid rows.
    pub scroll_offset: u16,
    focused: bool,
}

impl BracketCursor {
    /// Jump to the current round, preferring a live match there.
    pub fn focus_current(&mut self, bracket: &Bracket) {
        self.column = bracket
            .rounds
            .iter()
            .position(|r| r.number == bracket.current_round)
            .unwrap_or(0);
        self.row = bracket
            .rounds
            .get(self.column)
            .and_then(|r| r.matches.iter().position(Match::is_live))
            .unwrap_or(0);
        self.scroll_offset = 0;
        self.focused = true;
    }

    /// Reconcile with a freshly loaded bracket. The first bracket seen gets
    /// focused on its current round; later ones only clamp.
    pub fn sync(&mut self, bracket: &Bracket) {
        if !self.focused {
            self.focus_current(bracket);
            return;
        }
        self.column = self.column.min(bracket.rounds.len().saturating_sub(1));
        self.row = self.row.min(self.rows_in(bracket, self.column).saturating_sub(1));
    }

    pub fn up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn down(&mut self, bracket: &Bracket) {
        if self.row + 1 < self.rows_in(bracket, self.column) {
            self.row += 1;
        }
    }

    /// Move toward the first round, landing on the upper feeder match.
    pub fn left(&mut self, bracket: &Bracket) {
        if self.column == 0 {
            return;
        }
        self.column -= 1;
        self.row = (self.row * 2).min(self.rows_in(bracket, self.column).saturating_sub(1));
    }

    /// Move toward the final, landing on the match this one feeds.
    pub fn right(&mut self, bracket: &Bracket) {
        if self.column + 1 >= bracket.rounds.len() {
            return;
        }
        self.column += 1;
        self.row = (self.row / 2).min(self.rows_in(bracket, self.column).saturating_sub(1));
    }

    pub fn selected_match<'a>(&self, bracket: &'a Bracket) -> Option<&'a Match> {
        bracket.rounds.get(self.column)?.matches.get(self.row)
    }

    /// Adjust `scroll_offset` so the selected cell fits in `height` rows.
    pub fn follow(&mut self, bracket: &Bracket, height: u16) {
        let Some(m) = self.selected_match(bracket) else {
            self.scroll_offset = 0;
            return;
        };
        let Some(center) = center_row(self.column, m.position) else {
            return;
        };
        let top = center - MATCH_HEIGHT / 2;
        let bottom = center + MATCH_HEIGHT / 2;

        if top < self.scroll_offset.saturating_add(HEADER_ROWS) {
            self.scroll_offset = top.saturating_sub(HEADER_ROWS);
        } else if bottom >= self.scroll_offset.saturating_add(height) {
            self.scroll_offset = bottom - height.max(1) + 1;
        }
    }

    fn rows_in(&self, bracket: &Bracket, column: usize) -> usize {
        bracket.rounds.get(column).map_or(0, |r| r.matches.len())
    }
}

// ---------------------------------------------------------------------------
// Socket connection
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct ConnectionState {
    pub connected: bool,
    pub endpoint: String,
    has_connected: bool,
}

impl ConnectionState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Self::default() }
    }

    /// Returns true when this is a reconnect rather than the first connect.
    pub fn on_connected(&mut self) -> bool {
        let reconnect = self.has_connected;
        self.connected = true;
        self.has_connected = true;
        reconnect
    }

    /// Returns true when an open connection was lost.
    pub fn on_disconnected(&mut self) -> bool {
        std::mem::replace(&mut self.connected, false)
    }

    pub fn label(&self) -> String {
        if self.connected {
            format!("live via {}", self.endpoint)
        } else if self.has_connected {
            "reconnecting...".to_string()
        } else {
            format!("connecting to {}", self.endpoint)
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub connection: ConnectionState,
    /// Last destination the controller asked to open.
    pub navigation: Option<String>,
    pub bracket: BracketCursor,
    pub standings_offset: usize,
}

impl AppState {
    pub fn new(socket_endpoint: impl Into<String>) -> Self {
        Self {
            connection: ConnectionState::new(socket_endpoint),
            ..Self::default()
        }
    }

    pub fn standings_down(&mut self, rows: usize) {
        if self.standings_offset + 1 < rows {
            self.standings_offset += 1;
        }
    }

    pub fn standings_up(&mut self) {
        self.standings_offset = self.standings_offset.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use official_api::Snapshot;
    use serde_json::json;

    /// Eight players: 4 + 2 + 1 matches, second round live at position 1.
    fn bracket() -> Bracket {
        let m = |id: &str, round: u32, position: u32, status: &str, game: Option<&str>| {
            let mut v = json!({ "id": id, "round": round, "position": position, "status": status, "isBye": false });
            if let Some(game) = game {
                v["gameId"] = game.into();
            }
            v
        };
        let value = json!({
            "tournament": crate::state::ctrl::tests::tournament("knockout", "started"),
            "bracket": {
                "currentRound": 2,
                "totalRounds": 3,
                "rounds": [
                    { "roundNumber": 1, "roundName": "Quarterfinals", "matches": [
                        m("a", 1, 0, "completed", None), m("b", 1, 1, "completed", None),
                        m("c", 1, 2, "completed", None), m("d", 1, 3, "completed", None)
                    ]},
                    { "roundNumber": 2, "roundName": "Semifinals", "matches": [
                        m("e", 2, 0, "pending", None), m("f", 2, 1, "inProgress", Some("g1"))
                    ]},
                    { "roundNumber": 3, "roundName": "Final", "matches": [ m("g", 3, 0, "pending", None) ]}
                ]
            }
        });
        Snapshot::from_value(value).unwrap().bracket.unwrap()
    }

    fn selected(cursor: &BracketCursor, bracket: &Bracket) -> String {
        cursor.selected_match(bracket).map(|m| m.id.clone()).unwrap_or_default()
    }

    #[test]
    fn first_sync_focuses_live_match_in_current_round() {
        let bracket = bracket();
        let mut cursor = BracketCursor::default();
        cursor.sync(&bracket);
        assert_eq!((cursor.column, cursor.row), (1, 1));
        assert_eq!(selected(&cursor, &bracket), "f");
    }

    #[test]
    fn later_syncs_keep_the_selection() {
        let bracket = bracket();
        let mut cursor = BracketCursor::default();
        cursor.sync(&bracket);
        cursor.left(&bracket);
        cursor.sync(&bracket);
        assert_eq!(selected(&cursor, &bracket), "c");
    }

    #[test]
    fn sync_clamps_into_a_smaller_bracket() {
        let mut bracket = bracket();
        let mut cursor = BracketCursor::default();
        cursor.sync(&bracket);
        cursor.left(&bracket);
        cursor.down(&bracket);
        assert_eq!(selected(&cursor, &bracket), "d");

        bracket.rounds[0].matches.truncate(2);
        cursor.sync(&bracket);
        assert_eq!(selected(&cursor, &bracket), "b");
    }

    #[test]
    fn horizontal_moves_follow_the_tree() {
        let bracket = bracket();
        let mut cursor = BracketCursor::default();
        cursor.focus_current(&bracket);

        cursor.left(&bracket);
        assert_eq!(selected(&cursor, &bracket), "c");
        cursor.right(&bracket);
        assert_eq!(selected(&cursor, &bracket), "f");
        cursor.right(&bracket);
        assert_eq!(selected(&cursor, &bracket), "g");
        cursor.right(&bracket);
        assert_eq!(selected(&cursor, &bracket), "g");
    }

    #[test]
    fn vertical_moves_stay_in_the_round() {
        let bracket = bracket();
        let mut cursor = BracketCursor::default();
        cursor.focus_current(&bracket);
        cursor.down(&bracket);
        assert_eq!(selected(&cursor, &bracket), "f");
        cursor.up();
        cursor.up();
        assert_eq!(selected(&cursor, &bracket), "e");
    }

    #[test]
    fn follow_scrolls_the_selection_into_view() {
        let bracket = bracket();
        let mut cursor = BracketCursor::default();
        cursor.focus_current(&bracket);
        cursor.left(&bracket);
        cursor.down(&bracket);
        // "d" centers on grid row 15; six visible rows put its bottom row on the last line.
        cursor.follow(&bracket, 6);
        assert_eq!(cursor.scroll_offset, 11);

        cursor.up();
        cursor.up();
        cursor.up();
        cursor.follow(&bracket, 6);
        assert_eq!(cursor.scroll_offset, 0);
    }

    #[test]
    fn follow_leaves_scroll_alone_for_rows_past_the_grid() {
        let mut bracket = bracket();
        bracket.rounds[0].matches[3].position = 20_000;
        let mut cursor = BracketCursor::default();
        cursor.focus_current(&bracket);
        cursor.left(&bracket);
        cursor.down(&bracket);
        cursor.scroll_offset = 4;
        cursor.follow(&bracket, 6);
        assert_eq!(cursor.scroll_offset, 4);
    }

    #[test]
    fn connection_tracks_reconnects() {
        let mut conn = ConnectionState::new("ws://localhost/socket");
        assert_eq!(conn.label(), "connecting to ws://localhost/socket");
        assert!(!conn.on_connected());
        assert!(conn.on_disconnected());
        assert!(!conn.on_disconnected());
        assert_eq!(conn.label(), "reconnecting...");
        assert!(conn.on_connected());
    }

    #[test]
    fn standings_scroll_is_bounded() {
        let mut state = AppState::new("ws://x");
        state.standings_up();
        assert_eq!(state.standings_offset, 0);
        state.standings_down(2);
        state.standings_down(2);
        assert_eq!(state.standings_offset, 1);
    }
}
