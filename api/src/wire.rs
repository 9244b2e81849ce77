//! Raw wire types: serde shapes of the JSON the official tournament server
//! sends, both over HTTP and inside `reload` frames.
//! These map to the clean domain types via `map_snapshot` in client.rs.
use crate::{Clock, MatchStatus, Phase, TournamentFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct WireSnapshot {
    pub tournament: WireTournament,
    pub me: Option<WireViewer>,
    pub standings: Option<WireStandings>,
    pub bracket: Option<WireBracket>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireTournament {
    pub id: String,
    pub name: String,
    pub tournament_type: TournamentFormat,
    pub arena_id: Option<String>,
    pub swiss_id: Option<String>,
    pub knockout_id: Option<String>,
    pub status: Phase,
    pub nb_players: u32,
    /// Epoch milliseconds.
    pub starts_at: i64,
    pub clock: Clock,
    pub variant: String,
    pub rated: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireViewer {
    pub id: String,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Standings  (arena and swiss)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireStandings {
    pub players: Vec<WireStandingsPlayer>,
    pub page: u32,
    pub nb_pages: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireStandingsPlayer {
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub rating: u32,
    pub score: f64,
    pub perf: Option<u32>,
}

// ---------------------------------------------------------------------------
// Bracket  (knockout only)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireBracket {
    pub rounds: Vec<WireRound>,
    pub current_round: u32,
    pub total_rounds: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireRound {
    pub round_number: u32,
    pub round_name: String,
    pub matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireMatch {
    pub id: String,
    pub round: u32,
    pub position: u32,
    pub player1: Option<WireMatchPlayer>,
    pub player2: Option<WireMatchPlayer>,
    pub winner: Option<String>,
    pub game_id: Option<String>,
    pub status: MatchStatus,
    #[serde(default)]
    pub is_bye: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireMatchPlayer {
    pub user_id: String,
    pub username: String,
    pub rating: u32,
    pub seed: Option<u32>,
}
