use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeColor {
    Primary,
    Accent,
    Dim,
    Winner,
    Viewer,
    Danger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Theme {
    #[default]
    Dark,
}

pub fn resolve(color: ThemeColor, _theme: Theme) -> Style {
    match color {
        ThemeColor::Primary => Style::default().fg(Color::Rgb(0, 122, 195)),
        ThemeColor::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ThemeColor::Dim => Style::default().fg(Color::Indexed(240)),
        ThemeColor::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ThemeColor::Viewer => Style::default().fg(Color::Rgb(255, 103, 31)),
        ThemeColor::Danger => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}
