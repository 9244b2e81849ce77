use crate::wire::{WireBracket, WireMatch, WireMatchPlayer, WireSnapshot, WireStandings, WireTournament};
use crate::{
    Bracket, Match, MatchPlayer, Round, Snapshot, SnapshotError, Standings, StandingsPlayer,
    Tournament, TournamentFormat, Viewer,
};
use chrono::DateTime;
use log::debug;
use reqwest::{Client, StatusCode};
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8788";

/// HTTP client for the official tournament server.
#[derive(Debug, Clone)]
pub struct OfficialApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for OfficialApi {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("API error for {1}: {0}")]
    Api(#[source] reqwest::Error, String),
    #[error("Parse error for {1}: {0}")]
    Parsing(#[source] reqwest::Error, String),
    #[error("Invalid snapshot from {1}: {0}")]
    Snapshot(#[source] SnapshotError, String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Could not read {1}: {0}")]
    Io(#[source] std::io::Error, String),
}

impl OfficialApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent("official-tui/0.1 (terminal tournament viewer)")
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the current snapshot of a tournament. Decodes through the same
    /// path as pushed reloads, so a fetched snapshot is held to the same rules.
    pub async fn fetch_snapshot(&self, tournament_id: &str) -> ApiResult<Snapshot> {
        let url = format!("{}/official/{tournament_id}", self.base_url);
        debug!("fetching snapshot from {url}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("tournament {tournament_id}")));
        }

        let value = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.clone()))?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;

        Snapshot::from_value(value).map_err(|e| ApiError::Snapshot(e, url))
    }
}

/// Load a snapshot from a local JSON file, for offline use and the relay.
pub fn load_snapshot_file(path: impl AsRef<Path>) -> ApiResult<Snapshot> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ApiError::NotFound(path.display().to_string()),
        _ => ApiError::Io(e, path.display().to_string()),
    })?;
    Snapshot::from_json(&content).map_err(|e| ApiError::Snapshot(e, path.display().to_string()))
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

/// Map a decoded payload into a `Snapshot`.
///
/// Rounds are put in round-number order and matches in position order. Both
/// sorts are stable and no match ever changes round.
pub(crate) fn map_snapshot(raw: WireSnapshot) -> Result<Snapshot, SnapshotError> {
    Ok(Snapshot {
        tournament: map_tournament(raw.tournament)?,
        me: raw.me.map(|me| Viewer { id: me.id, username: me.username }),
        standings: raw.standings.map(map_standings),
        bracket: raw.bracket.map(map_bracket),
    })
}

fn map_tournament(t: WireTournament) -> Result<Tournament, SnapshotError> {
    if t.id.trim().is_empty() {
        return Err(SnapshotError::MissingField("tournament.id"));
    }
    let starts_at =
        DateTime::from_timestamp_millis(t.starts_at).ok_or_else(|| SnapshotError::InvalidField {
            field: "tournament.startsAt",
            reason: format!("{} is out of range", t.starts_at),
        })?;
    let format_id = match t.tournament_type {
        TournamentFormat::Arena => t.arena_id,
        TournamentFormat::Swiss => t.swiss_id,
        TournamentFormat::Knockout => t.knockout_id,
    };

    Ok(Tournament {
        id: t.id,
        name: t.name,
        format: t.tournament_type,
        format_id,
        phase: t.status,
        nb_players: t.nb_players,
        starts_at,
        clock: t.clock,
        variant: t.variant,
        rated: t.rated,
    })
}

fn map_standings(s: WireStandings) -> Standings {
    Standings {
        players: s
            .players
            .into_iter()
            .map(|p| StandingsPlayer {
                rank: p.rank,
                user_id: p.user_id,
                username: p.username,
                rating: p.rating,
                score: p.score,
                perf: p.perf,
            })
            .collect(),
        page: s.page,
        nb_pages: s.nb_pages,
    }
}

fn map_bracket(b: WireBracket) -> Bracket {
    let mut rounds: Vec<Round> = b
        .rounds
        .into_iter()
        .map(|r| {
            let mut matches: Vec<Match> = r.matches.into_iter().map(map_match).collect();
            matches.sort_by_key(|m| m.position);
            Round { number: r.round_number, name: r.round_name, matches }
        })
        .collect();
    rounds.sort_by_key(|r| r.number);

    Bracket { rounds, current_round: b.current_round, total_rounds: b.total_rounds }
}

fn map_match(m: WireMatch) -> Match {
    Match {
        id: m.id,
        round: m.round,
        position: m.position,
        player1: m.player1.map(map_match_player),
        player2: m.player2.map(map_match_player),
        winner: m.winner,
        game_id: m.game_id,
        status: m.status,
        is_bye: m.is_bye,
    }
}

fn map_match_player(p: WireMatchPlayer) -> MatchPlayer {
    MatchPlayer { user_id: p.user_id, username: p.username, rating: p.rating, seed: p.seed }
}
