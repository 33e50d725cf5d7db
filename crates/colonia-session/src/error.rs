//! Error types for the session layer.

use colonia_protocol::PlayerId;
use colonia_transport::ConnectionId;

/// Errors that can occur while binding connections to players.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The [`Authenticator`](crate::Authenticator) rejected the token.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The reconnection token was never issued, or has been dropped.
    #[error("invalid reconnection token")]
    InvalidToken,

    /// The reconnection grace period has elapsed.
    #[error("session expired for player {0}")]
    SessionExpired(PlayerId),

    /// The player is already playing on another connection.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),

    /// This connection already belongs to a player.
    #[error("connection {0} is already bound to a player")]
    ConnectionInUse(ConnectionId),
}
