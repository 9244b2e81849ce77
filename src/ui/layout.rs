use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const INFO_HEIGHT: u16 = 5;
pub const LOG_HEIGHT: u16 = 8;
pub const SIDE_WIDTH: u16 = 34;

/// Below this width the side panel is dropped.
const SIDE_MIN_TERMINAL_WIDTH: u16 = 80;

/// Pre-computed layout areas for the main draw loop.
#[derive(Debug, Default, PartialEq)]
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub info: Rect,
    pub content: Rect,
    pub side: Rect,
    pub logs: Option<Rect>,
    pub status: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let log_height = if show_logs { LOG_HEIGHT } else { 0 };

        if full_screen {
            let [content, logs, status] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(log_height),
                Constraint::Length(1),
            ])
            .areas(area);
            return LayoutAreas {
                content,
                logs: show_logs.then_some(logs),
                status,
                ..LayoutAreas::default()
            };
        }

        let [tab, body, logs, status] = Layout::vertical([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(log_height),
            Constraint::Length(1),
        ])
        .areas(area);

        let side_width = if area.width >= SIDE_MIN_TERMINAL_WIDTH { SIDE_WIDTH } else { 0 };
        let [main, side] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(side_width)]).areas(body);
        let [info, content] =
            Layout::vertical([Constraint::Length(INFO_HEIGHT), Constraint::Fill(1)]).areas(main);

        LayoutAreas {
            tab_bar: Self::split_tab_bar(tab),
            info,
            content,
            side,
            logs: show_logs.then_some(logs),
            status,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}
