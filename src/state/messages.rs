use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use official_api::Snapshot;
use official_api::protocol::Destination;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Fetch the full snapshot over HTTP. Sent at startup, after every
    /// socket reconnect, and on manual refresh.
    LoadSnapshot,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    SnapshotLoaded { snapshot: Box<Snapshot> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    /// The controller accepted a new snapshot.
    Redraw,
    /// The controller asked to leave for another page.
    Navigate(Destination),
}
