//! Push protocol spoken over the tournament socket.
//!
//! Every frame is a JSON object `{"t": kind, "d": payload}`; `d` may be absent.
use crate::{Snapshot, SnapshotError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub t: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub d: Value,
}

impl Frame {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self { t: kind.into(), d: payload }
    }

    pub fn parse(text: &str) -> Result<Self, PushError> {
        serde_json::from_str(text).map_err(PushError::InvalidFrame)
    }

    pub fn encode(&self) -> String {
        // A struct of a String and a Value always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("rejected reload: {0}")]
    MalformedReload(#[source] SnapshotError),
    #[error("rejected redirect: no destination in {0}")]
    MalformedRedirect(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(#[source] serde_json::Error),
}

/// Inbound events the client understands. Anything else stays `Unknown` so
/// newer servers can add kinds without breaking older clients.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Reload(Box<Snapshot>),
    Redirect(Destination),
    Unknown(String),
}

impl PushEvent {
    pub fn from_frame(kind: &str, payload: Value) -> Result<Self, PushError> {
        match kind {
            "reload" => Snapshot::from_value(payload)
                .map(|s| PushEvent::Reload(Box::new(s)))
                .map_err(PushError::MalformedReload),
            "redirect" => Destination::from_value(&payload)
                .map(PushEvent::Redirect)
                .ok_or_else(|| PushError::MalformedRedirect(payload.to_string())),
            other => Ok(PushEvent::Unknown(other.to_string())),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            PushEvent::Reload(_) => "reload",
            PushEvent::Redirect(_) => "redirect",
            PushEvent::Unknown(kind) => kind,
        }
    }
}

/// Outbound user intents. The server answers with a reload, not a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Join,
    Withdraw,
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Join => "join",
            Intent::Withdraw => "withdraw",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "join" => Some(Intent::Join),
            "withdraw" => Some(Intent::Withdraw),
            _ => None,
        }
    }

    pub fn to_frame(self) -> Frame {
        Frame::new(self.kind(), Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Navigation destinations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum WireDestination {
    Path(String),
    Target { url: Option<String>, id: Option<String> },
}

/// Where a redirect or a live-game click sends the viewer. Always either an
/// absolute URL or a server-relative path starting with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination(String);

impl Destination {
    pub fn new(target: &str) -> Option<Self> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        if target.starts_with('/') || is_absolute(target) {
            Some(Self(target.to_string()))
        } else {
            Some(Self(format!("/{target}")))
        }
    }

    pub fn game(game_id: &str) -> Option<Self> {
        Self::new(game_id)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value::<WireDestination>(value.clone()).ok()? {
            WireDestination::Path(path) => Self::new(&path),
            WireDestination::Target { url, id } => url.or(id).as_deref().and_then(Self::new),
        }
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// Resolve against the server base URL; absolute destinations pass through.
    pub fn url(&self, base_url: &str) -> String {
        if is_absolute(&self.0) {
            self.0.clone()
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), self.0)
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_absolute(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[test]
    fn frame_without_payload_parses_as_null() {
        let frame = Frame::parse(r#"{"t":"crowd"}"#).unwrap();
        assert_eq!(frame.t, "crowd");
        assert!(frame.d.is_null());
    }

    #[test]
    fn non_object_frame_is_invalid() {
        assert!(matches!(Frame::parse("0"), Err(PushError::InvalidFrame(_))));
    }

    #[test]
    fn intents_encode_without_payload() {
        assert_eq!(Intent::Join.to_frame().encode(), r#"{"t":"join"}"#);
        assert_eq!(Intent::Withdraw.to_frame().encode(), r#"{"t":"withdraw"}"#);
        assert_eq!(Intent::from_kind("withdraw"), Some(Intent::Withdraw));
        assert_eq!(Intent::from_kind("resign"), None);
    }

    #[test]
    fn reload_frame_becomes_reload_event() {
        match PushEvent::from_frame("reload", fixtures::knockout("created")).unwrap() {
            PushEvent::Reload(snapshot) => assert_eq!(snapshot.tournament.id, "t1"),
            other => panic!("expected reload, got {other:?}"),
        }
    }

    #[test]
    fn malformed_reload_is_an_error() {
        let err = PushEvent::from_frame("reload", json!({ "tournament": {} })).unwrap_err();
        assert!(matches!(err, PushError::MalformedReload(_)));
    }

    #[test]
    fn redirect_accepts_strings_and_objects() {
        let bare = PushEvent::from_frame("redirect", json!("abcd1234")).unwrap();
        assert_eq!(bare, PushEvent::Redirect(Destination::new("/abcd1234").unwrap()));

        let object = PushEvent::from_frame("redirect", json!({ "id": "abcd1234" })).unwrap();
        assert_eq!(object, bare);

        let url = PushEvent::from_frame("redirect", json!({ "url": "/official/t2" })).unwrap();
        assert_eq!(url.kind(), "redirect");
        assert_eq!(url, PushEvent::Redirect(Destination::new("/official/t2").unwrap()));
    }

    #[test]
    fn redirect_without_destination_is_an_error() {
        assert!(matches!(
            PushEvent::from_frame("redirect", Value::Null),
            Err(PushError::MalformedRedirect(_))
        ));
        assert!(PushEvent::from_frame("redirect", json!({ "id": "" })).is_err());
    }

    #[test]
    fn unknown_kinds_are_kept_by_name() {
        let event = PushEvent::from_frame("featured", json!({})).unwrap();
        assert_eq!(event, PushEvent::Unknown("featured".into()));
        assert_eq!(event.kind(), "featured");
    }

    #[test]
    fn destinations_resolve_against_the_server() {
        let game = Destination::game("g5").unwrap();
        assert_eq!(game.path(), "/g5");
        assert_eq!(game.url("https://example.org/"), "https://example.org/g5");

        let absolute = Destination::new("https://elsewhere.org/x").unwrap();
        assert_eq!(absolute.url("https://example.org"), "https://elsewhere.org/x");
    }
}
