use crate::components::theme::{Theme, ThemeColor, resolve};
use crate::state::ctrl::TournamentCtrl;
use tui::layout::Constraint;
use tui::style::{Modifier, Style};
use tui::widgets::{Row, Table};

pub const NO_PLAYERS: &str = "No players yet";
pub const MISSING_PERF: &str = "-";

/// Standings as plain rows, ready for a table widget.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsTable {
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    /// Index of the viewer's own row, if they are on this page.
    pub viewer_row: Option<usize>,
    pub footer: String,
}

impl StandingsTable {
    /// `None` when there is nothing to list; draw `NO_PLAYERS` instead.
    /// The performance column only exists for swiss.
    pub fn project(ctrl: &TournamentCtrl) -> Option<Self> {
        let standings = ctrl.data().standings.as_ref()?;
        if standings.players.is_empty() {
            return None;
        }
        let with_perf = ctrl.is_swiss();

        let mut header = vec!["Rank", "Player", "Rating", "Score"];
        if with_perf {
            header.push("Perf");
        }

        let rows = standings
            .players
            .iter()
            .map(|p| {
                let mut row = vec![
                    p.rank.to_string(),
                    p.username.clone(),
                    p.rating.to_string(),
                    p.score_label(),
                ];
                if with_perf {
                    row.push(p.perf.map_or_else(|| MISSING_PERF.to_string(), |perf| perf.to_string()));
                }
                row
            })
            .collect();

        let viewer_row = ctrl
            .viewer_id()
            .and_then(|id| standings.players.iter().position(|p| p.user_id == id));

        Some(Self {
            header,
            rows,
            viewer_row,
            footer: format!("page {} of {}", standings.page, standings.nb_pages.max(1)),
        })
    }

    pub fn widget(&self, offset: usize, theme: Theme) -> Table<'_> {
        let viewer_style = resolve(ThemeColor::Viewer, theme);
        let rows = self.rows.iter().enumerate().skip(offset).map(|(idx, cells)| {
            let row = Row::new(cells.iter().map(String::as_str));
            if Some(idx) == self.viewer_row { row.style(viewer_style) } else { row }
        });

        let mut widths = vec![
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(6),
        ];
        if self.header.len() > 4 {
            widths.push(Constraint::Length(6));
        }

        Table::new(rows, widths)
            .header(
                Row::new(self.header.iter().copied())
                    .style(Style::default().add_modifier(Modifier::BOLD))
                    .bottom_margin(1),
            )
            .column_spacing(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ctrl::tests::{Recorder, payload};
    use official_api::Snapshot;
    use serde_json::json;

    fn with_standings(format: &str) -> Snapshot {
        let mut value = payload(format, "started");
        value["standings"] = json!({
            "page": 1,
            "nbPages": 2,
            "players": [
                { "rank": 1, "userId": "alice", "username": "Alice", "rating": 2000, "score": 3, "perf": 2150 },
                { "rank": 2, "userId": "bob", "username": "Bob", "rating": 1800, "score": 2.5 },
                { "rank": 3, "userId": "carol", "username": "Carol", "rating": 1900, "score": 2, "perf": 1880 }
            ]
        });
        Snapshot::from_value(value).unwrap()
    }

    #[test]
    fn swiss_shows_perf_with_placeholder() {
        let recorder = Recorder::default();
        let table = StandingsTable::project(&recorder.ctrl(with_standings("swiss"), None)).unwrap();

        assert_eq!(table.header, vec!["Rank", "Player", "Rating", "Score", "Perf"]);
        assert_eq!(table.rows[0], vec!["1", "Alice", "2000", "3", "2150"]);
        assert_eq!(table.rows[1], vec!["2", "Bob", "1800", "2.5", MISSING_PERF]);
        assert_eq!(table.rows[2][4], "1880");
    }

    #[test]
    fn arena_and_knockout_omit_perf() {
        let recorder = Recorder::default();
        for format in ["arena", "knockout"] {
            let table = StandingsTable::project(&recorder.ctrl(with_standings(format), None)).unwrap();
            assert_eq!(table.header, vec!["Rank", "Player", "Rating", "Score"]);
            assert!(table.rows.iter().all(|row| row.len() == 4));
        }
    }

    #[test]
    fn rows_keep_server_order() {
        let recorder = Recorder::default();
        let mut data = with_standings("arena");
        data.standings.as_mut().unwrap().players.swap(0, 2);
        let table = StandingsTable::project(&recorder.ctrl(data, None)).unwrap();
        let ranks: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ranks, vec!["3", "2", "1"]);
    }

    #[test]
    fn viewer_row_and_footer() {
        let recorder = Recorder::default();
        let table = StandingsTable::project(&recorder.ctrl(with_standings("swiss"), Some("bob"))).unwrap();
        assert_eq!(table.viewer_row, Some(1));
        assert_eq!(table.footer, "page 1 of 2");
    }

    #[test]
    fn missing_or_empty_standings_project_to_nothing() {
        let recorder = Recorder::default();
        let bare = Snapshot::from_value(payload("swiss", "created")).unwrap();
        assert!(StandingsTable::project(&recorder.ctrl(bare, None)).is_none());

        let mut empty = with_standings("swiss");
        empty.standings.as_mut().unwrap().players.clear();
        assert!(StandingsTable::project(&recorder.ctrl(empty, None)).is_none());
    }
}
