use official_api::{Bracket, Match, MatchPlayer, MatchStatus, Seat};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::components::theme::{Theme, ThemeColor, resolve};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: player1 line, status line, player2 line.
pub const MATCH_HEIGHT: u16 = 3;

/// Rows above the first match: round label plus a blank line.
pub const HEADER_ROWS: u16 = 2;

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum match cell width in wider terminals.
const CELL_W_FULL: u16 = 26;

/// Below this a cell can't show a name at all; scroll sideways instead.
const CELL_W_MIN: u16 = 16;

pub const TBD: &str = "TBD";

// ---------------------------------------------------------------------------
// Projection: Bracket → columns of cells
// ---------------------------------------------------------------------------

/// Read-only, render-ready view of a bracket. Rebuilt from the snapshot on
/// every draw; never kept across reloads.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketView {
    /// "Round X of Y".
    pub header: String,
    /// One column per round, in round order.
    pub columns: Vec<RoundColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundColumn {
    pub number: u32,
    pub label: String,
    pub is_current: bool,
    /// Cells in position order.
    pub cells: Vec<MatchCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCell {
    pub match_id: String,
    pub position: u32,
    pub seats: [SeatLine; 2],
    pub status: MatchStatus,
    pub is_live: bool,
    pub is_bye: bool,
    pub involves_viewer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatLine {
    /// Username, or `TBD` for an empty seat.
    pub name: String,
    pub seed: Option<u32>,
    pub rating: Option<u32>,
    pub is_winner: bool,
}

impl SeatLine {
    fn project(m: &Match, seat: Seat) -> Self {
        let is_winner = m.winning_seat() == Some(seat);
        match m.seat(seat) {
            Some(MatchPlayer { username, rating, seed, .. }) => Self {
                name: username.clone(),
                seed: *seed,
                rating: Some(*rating),
                is_winner,
            },
            None => Self { name: TBD.to_string(), seed: None, rating: None, is_winner: false },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rating.is_none()
    }
}

impl MatchCell {
    fn project(m: &Match, viewer: Option<&str>) -> Self {
        Self {
            match_id: m.id.clone(),
            position: m.position,
            seats: [SeatLine::project(m, Seat::Player1), SeatLine::project(m, Seat::Player2)],
            status: m.status,
            is_live: m.is_live(),
            is_bye: m.is_bye,
            involves_viewer: viewer.is_some_and(|id| m.involves(id)),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_bye {
            MatchStatus::Bye.label()
        } else if self.is_live {
            MatchStatus::InProgress.label()
        } else {
            self.status.label()
        }
    }
}

impl BracketView {
    /// Rounds and matches keep the order the snapshot gives them, which
    /// decoding has already put in round and position order.
    pub fn project(bracket: &Bracket, viewer: Option<&str>) -> Self {
        let columns = bracket
            .rounds
            .iter()
            .map(|round| RoundColumn {
                number: round.number,
                label: round.name.clone(),
                is_current: round.number == bracket.current_round,
                cells: round.matches.iter().map(|m| MatchCell::project(m, viewer)).collect(),
            })
            .collect();

        Self {
            header: format!("Round {} of {}", bracket.current_round, bracket.total_rounds),
            columns,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid geometry
// ---------------------------------------------------------------------------

/// Slot height for a bracket depth (0 = first round).
/// SH[0] = MATCH_HEIGHT; SH[d] = 2 * SH[d-1] + 1, so 3, 7, 15, 31, ...
pub fn slot_height(depth: usize) -> u16 {
    let factor = 1u16.checked_shl(depth as u32).unwrap_or(u16::MAX);
    (MATCH_HEIGHT + 1).saturating_mul(factor).saturating_sub(1)
}

/// Grid row of a match's status line. The slot comes from its position,
/// so a parent at position j sits midway between children 2j and 2j+1.
///
/// `None` when the whole cell would not fit in a `u16` grid.
pub fn center_row(depth: usize, position: u32) -> Option<u16> {
    let sh = u32::from(slot_height(depth));
    let center = u32::from(HEADER_ROWS)
        .checked_add(sh / 2)?
        .checked_add(position.checked_mul(sh + 1)?)?;
    let center = u16::try_from(center).ok()?;
    center.checked_add(MATCH_HEIGHT / 2).map(|_| center)
}

/// Rows the whole grid needs.
pub fn grid_height(view: &BracketView) -> u16 {
    view.columns
        .iter()
        .enumerate()
        .flat_map(|(depth, col)| col.cells.iter().filter_map(move |c| center_row(depth, c.position)))
        .map(|center| center.saturating_add(MATCH_HEIGHT / 2 + 1))
        .max()
        .unwrap_or(HEADER_ROWS)
}

/// Cell width for `columns` columns in `width` terminal columns.
pub fn cell_width(width: u16, columns: usize) -> u16 {
    let columns = u16::try_from(columns.max(1)).unwrap_or(u16::MAX);
    let connectors = CONNECTOR_WIDTH.saturating_mul(columns - 1);
    let per_col = width.saturating_sub(connectors) / columns;
    per_col.clamp(CELL_W_MIN, CELL_W_FULL)
}

// ---------------------------------------------------------------------------
// BracketWidget
// ---------------------------------------------------------------------------

/// Renders a knockout bracket, first round on the left.
pub struct BracketWidget<'a> {
    pub view: &'a BracketView,
    /// (column, row) of the highlighted cell.
    pub selected: Option<(usize, usize)>,
    /// Vertical scroll offset in grid rows.
    pub scroll_offset: u16,
    pub theme: Theme,
}

impl BracketWidget<'_> {
    /// First column to draw so the selected one stays on screen.
    fn first_column(&self, width: u16, cell_w: u16) -> usize {
        let stride = cell_w + CONNECTOR_WIDTH;
        let fit = usize::from(((width + CONNECTOR_WIDTH) / stride).max(1));
        let selected = self.selected.map_or(0, |(col, _)| col);
        (selected + 1).saturating_sub(fit)
    }
}

impl Widget for BracketWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < CELL_W_MIN || area.height < MATCH_HEIGHT {
            return;
        }

        let cell_w = cell_width(area.width, self.view.columns.len());
        let stride = cell_w + CONNECTOR_WIDTH;
        let first = self.first_column(area.width, cell_w);
        let accent = resolve(ThemeColor::Accent, self.theme);
        let dim = resolve(ThemeColor::Dim, self.theme);

        for (depth, column) in self.view.columns.iter().enumerate().skip(first) {
            let Some(col_x) = u16::try_from(depth - first)
                .ok()
                .and_then(|i| i.checked_mul(stride))
                .and_then(|x| area.x.checked_add(x))
            else {
                break;
            };
            if col_x >= area.x + area.width {
                break;
            }
            let avail_w = usize::from((area.x + area.width - col_x).min(cell_w));

            // Round label
            if let Some(sy) = screen_y(0, self.scroll_offset, area) {
                let label: String = column.label.chars().take(avail_w).collect();
                let style = if column.is_current { accent } else { dim };
                buf.set_string(col_x, sy, label, style);
            }

            // Pass 1: match cells
            for (row, cell) in column.cells.iter().enumerate() {
                let selected = self.selected == Some((depth, row));
                draw_match_cell(cell, depth, col_x, cell_w, avail_w, selected, area, self.scroll_offset, self.theme, buf);
            }

            // Pass 2: connectors from this column's pairs into the next round.
            let Some(next) = self.view.columns.get(depth + 1) else {
                continue;
            };
            let conn_x = col_x + cell_w;
            if conn_x >= area.x + area.width {
                continue;
            }
            for parent in &next.cells {
                let rows = parent.position.checked_mul(2).and_then(|top| {
                    Some((
                        center_row(depth, top)?,
                        center_row(depth + 1, parent.position)?,
                        center_row(depth, top.checked_add(1)?)?,
                    ))
                });
                if let Some((r_top, r_mid, r_bot)) = rows {
                    draw_connector(r_top, r_mid, r_bot, conn_x, area, self.scroll_offset, self.theme, buf);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

/// Convert a grid row to an absolute screen y, applying scroll + area bounds.
/// Returns `None` if the row is off-screen.
fn screen_y(grid_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if grid_row < scroll {
        return None;
    }
    let rel = grid_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

/// Draw one match cell (3 rows) into the buffer, with scroll + clip handling.
#[allow(clippy::too_many_arguments)]
fn draw_match_cell(
    cell: &MatchCell,
    depth: usize,
    x: u16,
    cell_w: u16,
    avail_w: usize,
    selected: bool,
    area: Rect,
    scroll: u16,
    theme: Theme,
    buf: &mut Buffer,
) {
    let primary = resolve(ThemeColor::Primary, theme);
    let winner_style = resolve(ThemeColor::Winner, theme);
    let viewer_style = resolve(ThemeColor::Viewer, theme);
    let dim = resolve(ThemeColor::Dim, theme);

    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else if cell.involves_viewer {
        viewer_style
    } else {
        Style::default().fg(Color::Gray)
    };

    let Some(center) = center_row(depth, cell.position) else {
        return;
    };
    let rows = [(center - 1, 0usize), (center, 1), (center + 1, 2)];

    for (grid_row, slot) in rows {
        let Some(sy) = screen_y(grid_row, scroll, area) else {
            continue;
        };

        let (content, style) = match slot {
            1 => {
                let style = if cell.is_live { primary } else { dim };
                (format_status_line(cell, usize::from(cell_w)), style)
            }
            _ => {
                let seat = &cell.seats[slot / 2];
                let style = if seat.is_winner {
                    winner_style.add_modifier(Modifier::BOLD)
                } else if seat.is_empty() && !selected {
                    dim
                } else {
                    base_style
                };
                (format_seat_line(seat, usize::from(cell_w)), style)
            }
        };

        let text: String = content.chars().take(avail_w).collect();
        buf.set_string(x, sy, &text, style);
    }
}

/// Format a seat line: `"[seed] [name       ] [rating] "`.
///
/// Total width = seed(3) + " " + name + " " + rating(4) + " " = width.
pub fn format_seat_line(seat: &SeatLine, width: usize) -> String {
    let seed = seat.seed.map_or_else(|| "   ".to_string(), |s| format!("#{s:<2}"));
    let seed: String = seed.chars().take(3).collect();
    let rating = seat.rating.map_or_else(|| "    ".to_string(), |r| format!("{r:4}"));
    let name_w = width.saturating_sub(10);
    let name: String = seat.name.chars().take(name_w).collect();
    let line = format!("{seed:<3} {name:<name_w$} {rating} ");
    line.chars().take(width).collect()
}

/// Format the center status row.
fn format_status_line(cell: &MatchCell, width: usize) -> String {
    let marker = if cell.involves_viewer { "*" } else { " " };
    let raw = format!("{marker}{}", cell.status_label());
    let padded = format!("{raw:<width$}");
    padded.chars().take(width).collect()
}

/// Draw box-drawing connectors between one parent and its two children.
///
/// ```text
///  child_top  ──┐         (col_a='─'  col_b='┐')
///               │         (col_b='│')
///  parent     ──├──       (col_a='─'  col_b='├'  col_c='─')
///               │         (col_b='│')
///  child_bot  ──┘         (col_a='─'  col_b='┘')
/// ```
#[allow(clippy::too_many_arguments)]
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    conn_base_x: u16, // absolute screen x of connector column 0
    area: Rect,
    scroll: u16,
    theme: Theme,
    buf: &mut Buffer,
) {
    let style = resolve(ThemeColor::Dim, theme);
    let col_a = conn_base_x;
    let col_b = conn_base_x + 1;
    let col_c = conn_base_x + 2;
    let limit_x = area.x + area.width;

    macro_rules! put {
        ($x:expr, $row:expr, $ch:expr) => {
            if $x < limit_x {
                if let Some(sy) = screen_y($row, scroll, area) {
                    put_char(buf, $x, sy, $ch, style);
                }
            }
        };
    }

    put!(col_a, r_top, '─');
    put!(col_b, r_top, '┐');
    for row in (r_top + 1)..r_mid {
        put!(col_b, row, '│');
    }
    put!(col_a, r_mid, '─');
    put!(col_b, r_mid, '├');
    put!(col_c, r_mid, '─');
    for row in (r_mid + 1)..r_bot {
        put!(col_b, row, '│');
    }
    put!(col_a, r_bot, '─');
    put!(col_b, r_bot, '┘');
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
