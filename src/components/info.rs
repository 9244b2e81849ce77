use chrono::Local;
use official_api::Tournament;

/// Header lines describing a tournament.
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentInfo {
    pub name: String,
    /// e.g. "Swiss Tournament".
    pub headline: String,
    /// Clock, variant and rating mode.
    pub details: String,
    pub phase: &'static str,
    /// Start time in the local time zone.
    pub starts: String,
    pub players: String,
}

impl TournamentInfo {
    pub fn project(t: &Tournament) -> Self {
        Self {
            name: t.name.clone(),
            headline: format!("{} Tournament", t.format.label()),
            details: format!(
                "{} • {} • {}",
                t.clock.label(),
                t.variant,
                if t.rated { "Rated" } else { "Casual" }
            ),
            phase: t.phase.label(),
            starts: t.starts_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            players: player_count(t.nb_players),
        }
    }
}

pub fn player_count(n: u32) -> String {
    if n == 1 { "1 player".to_string() } else { format!("{n} players") }
}
