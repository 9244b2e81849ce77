pub mod client;
pub mod protocol;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the JSON wire format
// ---------------------------------------------------------------------------

/// The complete, server-authoritative state of one tournament.
///
/// Replaced wholesale on every reload; nothing in the client patches it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tournament: Tournament,
    /// Absent for anonymous viewers.
    pub me: Option<Viewer>,
    pub standings: Option<Standings>,
    /// Only meaningful when the format is knockout.
    pub bracket: Option<Bracket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub format: TournamentFormat,
    /// The arena/swiss/knockout id matching `format`, if the server sent one.
    pub format_id: Option<String>,
    pub phase: Phase,
    pub nb_players: u32,
    pub starts_at: DateTime<Utc>,
    pub clock: Clock,
    pub variant: String,
    pub rated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TournamentFormat {
    /// Continuous round-robin scoring.
    Arena,
    Swiss,
    Knockout,
}

impl TournamentFormat {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentFormat::Arena => "Arena",
            TournamentFormat::Swiss => "Swiss",
            TournamentFormat::Knockout => "Knockout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Created,
    Started,
    Finished,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Created => "Starting soon",
            Phase::Started => "In progress",
            Phase::Finished => "Finished",
        }
    }
}

/// Time control, both values in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub limit: u32,
    pub increment: u32,
}

impl Clock {
    /// `"3+2"` style label. Sub-minute limits show as fractions of a minute (`"0.5+0"`).
    pub fn label(&self) -> String {
        if self.limit % 60 == 0 {
            format!("{}+{}", self.limit / 60, self.increment)
        } else {
            format!("{}+{}", f64::from(self.limit) / 60.0, self.increment)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    /// Rank-ascending, exactly as the server ordered it.
    pub players: Vec<StandingsPlayer>,
    pub page: u32,
    pub nb_pages: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsPlayer {
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub rating: u32,
    pub score: f64,
    pub perf: Option<u32>,
}

impl StandingsPlayer {
    /// Whole scores print without a decimal point; swiss half points keep it.
    pub fn score_label(&self) -> String {
        if self.score.fract() == 0.0 {
            format!("{}", self.score as i64)
        } else {
            format!("{}", self.score)
        }
    }
}

// ---------------------------------------------------------------------------
// Bracket model
// ---------------------------------------------------------------------------

/// Knockout structure. Rounds are ordered by round number, matches within a
/// round by position. The topology is computed by the server and trusted as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bracket {
    pub rounds: Vec<Round>,
    pub current_round: u32,
    pub total_rounds: u32,
}

impl Bracket {
    pub fn is_empty(&self) -> bool {
        self.rounds.iter().all(|r| r.matches.is_empty())
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.matches().find(|m| m.id == match_id)
    }

    pub fn live_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches().filter(|m| m.is_live())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Round {
    pub number: u32,
    /// Human label, e.g. "Quarterfinals".
    pub name: String,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    pub round: u32,
    /// Slot within the round. Stable across reloads; drives layout.
    pub position: u32,
    pub player1: Option<MatchPlayer>, // None = TBD
    pub player2: Option<MatchPlayer>,
    /// User id of the winner.
    pub winner: Option<String>,
    pub game_id: Option<String>,
    pub status: MatchStatus,
    pub is_bye: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlayer {
    pub user_id: String,
    pub username: String,
    pub rating: u32,
    /// Display only; never used for bracket structure.
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Bye,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "Pending",
            MatchStatus::InProgress => "Live",
            MatchStatus::Completed => "Completed",
            MatchStatus::Bye => "Bye",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player1,
    Player2,
}

impl Match {
    pub fn seat(&self, seat: Seat) -> Option<&MatchPlayer> {
        match seat {
            Seat::Player1 => self.player1.as_ref(),
            Seat::Player2 => self.player2.as_ref(),
        }
    }

    pub fn seated_count(&self) -> usize {
        usize::from(self.player1.is_some()) + usize::from(self.player2.is_some())
    }

    /// True when `viewer_id` sits in either seat.
    pub fn involves(&self, viewer_id: &str) -> bool {
        [&self.player1, &self.player2]
            .into_iter()
            .flatten()
            .any(|p| p.user_id == viewer_id)
    }

    /// The seat holding the recorded winner.
    ///
    /// `None` when there is no winner yet, and also when the winner id matches
    /// neither seat. The latter is an integrity problem that
    /// [`Snapshot::integrity_issues`] reports; rendering just drops the highlight.
    pub fn winning_seat(&self) -> Option<Seat> {
        let winner = self.winner.as_deref()?;
        [Seat::Player1, Seat::Player2]
            .into_iter()
            .find(|&seat| self.seat(seat).is_some_and(|p| p.user_id == winner))
    }

    pub fn winner_player(&self) -> Option<&MatchPlayer> {
        self.winning_seat().and_then(|seat| self.seat(seat))
    }

    /// Drives the "go to live game" affordance.
    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::InProgress && self.game_id.is_some()
    }

    /// Both seats empty and no bye: the pairing simply hasn't happened yet.
    pub fn awaiting_pairing(&self) -> bool {
        self.seated_count() == 0 && !self.is_bye
    }
}

// ---------------------------------------------------------------------------
// Decoding and integrity
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("malformed snapshot: missing {0}")]
    MissingField(&'static str),
    #[error("malformed snapshot: invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A data-integrity problem in an otherwise well-formed snapshot. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityIssue {
    #[error("match {match_id}: bye flag, status and seats disagree")]
    ByeMismatch { match_id: String },
    #[error("match {match_id}: completed without a winner")]
    MissingWinner { match_id: String },
    #[error("match {match_id}: winner {winner} is not seated")]
    WinnerNotSeated { match_id: String, winner: String },
    #[error("match {match_id}: in progress without a game")]
    LiveWithoutGame { match_id: String },
    #[error("bracket lists round {0} more than once")]
    DuplicateRound(u32),
    #[error("current round {current} is outside 1..={total}")]
    CurrentRoundOutOfRange { current: u32, total: u32 },
    #[error("standings list rank {0} more than once")]
    DuplicateRank(u32),
    #[error("{0} tournament carries a bracket")]
    UnexpectedBracket(TournamentFormat),
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Snapshot {
    /// Decode a pushed or fetched payload. Either the whole snapshot decodes or
    /// nothing does.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let raw: wire::WireSnapshot = serde_json::from_value(value)?;
        client::map_snapshot(raw)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let raw: wire::WireSnapshot = serde_json::from_str(text)?;
        client::map_snapshot(raw)
    }

    pub fn format(&self) -> TournamentFormat {
        self.tournament.format
    }

    pub fn phase(&self) -> Phase {
        self.tournament.phase
    }

    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        if let Some(standings) = &self.standings {
            let mut ranks = HashSet::new();
            for p in &standings.players {
                if !ranks.insert(p.rank) {
                    issues.push(IntegrityIssue::DuplicateRank(p.rank));
                }
            }
        }

        let Some(bracket) = &self.bracket else {
            return issues;
        };

        if self.tournament.format != TournamentFormat::Knockout {
            issues.push(IntegrityIssue::UnexpectedBracket(self.tournament.format));
        }

        let mut rounds = HashSet::new();
        for round in &bracket.rounds {
            if !rounds.insert(round.number) {
                issues.push(IntegrityIssue::DuplicateRound(round.number));
            }
        }

        if !bracket.is_empty()
            && (bracket.current_round < 1 || bracket.current_round > bracket.total_rounds)
        {
            issues.push(IntegrityIssue::CurrentRoundOutOfRange {
                current: bracket.current_round,
                total: bracket.total_rounds,
            });
        }

        for m in bracket.matches() {
            issues.extend(match_issues(m));
        }

        issues
    }
}

fn match_issues(m: &Match) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let match_id = || m.id.clone();

    let bye_status = m.status == MatchStatus::Bye;
    if m.is_bye != bye_status || (m.is_bye && m.seated_count() != 1) {
        issues.push(IntegrityIssue::ByeMismatch { match_id: match_id() });
    }

    if m.status == MatchStatus::Completed {
        match m.winner.as_deref() {
            None => issues.push(IntegrityIssue::MissingWinner { match_id: match_id() }),
            Some(winner) if m.winning_seat().is_none() => {
                issues.push(IntegrityIssue::WinnerNotSeated {
                    match_id: match_id(),
                    winner: winner.to_string(),
                });
            }
            Some(_) => {}
        }
    } else if let Some(winner) = m.winner.as_deref()
        && m.winning_seat().is_none()
    {
        issues.push(IntegrityIssue::WinnerNotSeated {
            match_id: match_id(),
            winner: winner.to_string(),
        });
    }

    if m.status == MatchStatus::InProgress && m.game_id.is_none() {
        issues.push(IntegrityIssue::LiveWithoutGame { match_id: match_id() });
    }

    issues
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub fn player(id: &str, rating: u32) -> Value {
        json!({ "userId": id, "username": id.to_uppercase(), "rating": rating })
    }

    pub fn tournament(format: &str, status: &str) -> Value {
        json!({
            "id": "t1",
            "name": "Autumn Open",
            "tournamentType": format,
            "status": status,
            "nbPlayers": 8,
            "startsAt": 1_760_000_000_000i64,
            "clock": { "limit": 180, "increment": 2 },
            "variant": "standard",
            "rated": true
        })
    }

    /// Three rounds; round 1 lists its four matches out of position order.
    pub fn knockout(status: &str) -> Value {
        json!({
            "tournament": tournament("knockout", status),
            "me": { "id": "alice", "username": "Alice" },
            "bracket": {
                "currentRound": 2,
                "totalRounds": 3,
                "rounds": [
                    {
                        "roundNumber": 1,
                        "roundName": "Quarterfinals",
                        "matches": [
                            { "id": "m3", "round": 1, "position": 2,
                              "player1": player("erin", 1700), "player2": player("frank", 1650),
                              "winner": "erin", "status": "completed", "isBye": false },
                            { "id": "m1", "round": 1, "position": 0,
                              "player1": player("alice", 2000), "player2": player("bob", 1800),
                              "winner": "alice", "status": "completed", "isBye": false },
                            { "id": "m4", "round": 1, "position": 3,
                              "player1": player("gina", 1600),
                              "winner": "gina", "status": "bye", "isBye": true },
                            { "id": "m2", "round": 1, "position": 1,
                              "player1": player("carol", 1900), "player2": player("dave", 1750),
                              "winner": "dave", "status": "completed", "isBye": false }
                        ]
                    },
                    {
                        "roundNumber": 2,
                        "roundName": "Semifinals",
                        "matches": [
                            { "id": "m5", "round": 2, "position": 0,
                              "player1": player("alice", 2000), "player2": player("dave", 1750),
                              "gameId": "g5", "status": "inProgress", "isBye": false },
                            { "id": "m6", "round": 2, "position": 1,
                              "player1": player("erin", 1700), "player2": player("gina", 1600),
                              "status": "pending", "isBye": false }
                        ]
                    },
                    {
                        "roundNumber": 3,
                        "roundName": "Final",
                        "matches": [
                            { "id": "m7", "round": 3, "position": 0,
                              "status": "pending", "isBye": false }
                        ]
                    }
                ]
            }
        })
    }

    pub fn standings(format: &str) -> Value {
        json!({
            "tournament": tournament(format, "started"),
            "standings": {
                "page": 1,
                "nbPages": 3,
                "players": [
                    { "rank": 1, "userId": "alice", "username": "Alice", "rating": 2000, "score": 3, "perf": 2150 },
                    { "rank": 2, "userId": "bob", "username": "Bob", "rating": 1800, "score": 2.5 },
                    { "rank": 3, "userId": "carol", "username": "Carol", "rating": 1900, "score": 2, "perf": 1880 }
                ]
            }
        })
    }
}
