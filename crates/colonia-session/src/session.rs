//! Session types: the server's record of a logged-in player.

use std::time::{Duration, Instant};

use colonia_protocol::PlayerId;
use colonia_transport::ConnectionId;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long (in seconds) a dropped player may reconnect with their
    /// token before the session is expired.
    ///
    /// Default: 60 seconds. Set to 0 to disable reconnection.
    pub reconnect_grace_secs: u64,
}

impl SessionConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.reconnect_grace_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
///
/// ```text
///   Connected ──(disconnect)──→ Disconnected ──(grace elapsed)──→ Expired
///       ↑                            │
///       └────────(reconnect)─────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Bound to a live connection; requests on it act as this player.
    Connected { connection: ConnectionId },

    /// The connection dropped at `since`.
    Disconnected { since: Instant },

    /// Grace period over. Awaiting cleanup.
    Expired,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }

    /// The connection this session is bound to, if connected.
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            SessionState::Connected { connection } => Some(*connection),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single player's session on the server.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub state: SessionState,

    /// 32 hex characters (128 random bits). Sent in `loginAck`; a client
    /// that drops can present it to pick the session back up.
    pub reconnect_token: String,
}
