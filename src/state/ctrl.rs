use log::{debug, info, warn};
use official_api::protocol::{Destination, Intent, PushError, PushEvent};
use official_api::{Match, Phase, Snapshot, Tournament, TournamentFormat};
use serde_json::Value;

/// Outbound capability: hands an intent to the socket.
pub type SocketSend = Box<dyn Fn(Intent) + Send>;
/// Asks the host to draw the next frame.
pub type Redraw = Box<dyn FnMut() + Send>;
/// Hands a destination to whatever does navigation.
pub type Navigate = Box<dyn Fn(&Destination) + Send>;

pub struct CtrlOpts {
    pub data: Snapshot,
    /// The signed-in user, if any.
    pub user_id: Option<String>,
    pub socket_send: SocketSend,
}

/// Owns the snapshot the user is looking at and reconciles it with pushes.
///
/// Policy-free: it never checks whether an intent makes sense in the current
/// phase. Callers consult `components::actions::available_actions` first.
pub struct TournamentCtrl {
    data: Snapshot,
    user_id: Option<String>,
    socket_send: SocketSend,
    redraw: Redraw,
    navigate: Navigate,
}

impl TournamentCtrl {
    pub fn new(opts: CtrlOpts, redraw: Redraw, navigate: Navigate) -> Self {
        Self {
            data: opts.data,
            user_id: opts.user_id,
            socket_send: opts.socket_send,
            redraw,
            navigate,
        }
    }

    pub fn data(&self) -> &Snapshot {
        &self.data
    }

    pub fn tournament(&self) -> &Tournament {
        &self.data.tournament
    }

    // -----------------------------------------------------------------------
    // Derived predicates: always read from the current tags
    // -----------------------------------------------------------------------

    pub fn format(&self) -> TournamentFormat {
        self.data.tournament.format
    }

    pub fn phase(&self) -> Phase {
        self.data.tournament.phase
    }

    pub fn is_arena(&self) -> bool {
        self.format() == TournamentFormat::Arena
    }

    pub fn is_swiss(&self) -> bool {
        self.format() == TournamentFormat::Swiss
    }

    pub fn is_knockout(&self) -> bool {
        self.format() == TournamentFormat::Knockout
    }

    pub fn is_created(&self) -> bool {
        self.phase() == Phase::Created
    }

    pub fn is_started(&self) -> bool {
        self.phase() == Phase::Started
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == Phase::Finished
    }

    /// Identity given at construction, falling back to the snapshot's `me`.
    pub fn viewer_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or_else(|| self.data.me.as_ref().map(|me| me.id.as_str()))
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    pub fn join(&self) {
        debug!("sending join for {}", self.data.tournament.id);
        (self.socket_send)(Intent::Join);
    }

    pub fn withdraw(&self) {
        debug!("sending withdraw for {}", self.data.tournament.id);
        (self.socket_send)(Intent::Withdraw);
    }

    /// Navigate to the match's game. Returns false when the match has none.
    pub fn open_game(&self, m: &Match) -> bool {
        let Some(destination) = m.game_id.as_deref().and_then(Destination::game) else {
            return false;
        };
        info!("opening game {destination} for match {}", m.id);
        (self.navigate)(&destination);
        true
    }

    // -----------------------------------------------------------------------
    // Push handling
    // -----------------------------------------------------------------------

    /// Handle one pushed frame.
    ///
    /// `Ok(true)` when handled, `Ok(false)` for kinds this client doesn't
    /// know. A payload that fails to decode leaves the current snapshot alone
    /// and comes back as `Err`.
    pub fn receive(&mut self, kind: &str, payload: Value) -> Result<bool, PushError> {
        match PushEvent::from_frame(kind, payload) {
            Ok(PushEvent::Reload(snapshot)) => {
                self.reload(*snapshot);
                Ok(true)
            }
            Ok(PushEvent::Redirect(destination)) => {
                info!("redirected to {destination}");
                (self.navigate)(&destination);
                Ok(true)
            }
            Ok(PushEvent::Unknown(kind)) => {
                debug!("unhandled push event: {kind}");
                Ok(false)
            }
            Err(e) => {
                warn!("{e}");
                Err(e)
            }
        }
    }

    /// Replace the snapshot wholesale and redraw once.
    pub fn reload(&mut self, data: Snapshot) {
        let current = &self.data.tournament;
        if data.tournament.id != current.id || data.tournament.format != current.format {
            warn!(
                "reload switched tournament from {} ({}) to {} ({})",
                current.id, current.format, data.tournament.id, data.tournament.format
            );
        }

        self.data = data;
        for issue in self.data.integrity_issues() {
            warn!("tournament {}: {issue}", self.data.tournament.id);
        }
        (self.redraw)();
    }
}
