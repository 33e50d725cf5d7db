//! Unified error type for the Colonia server.

use colonia_game::GameError;
use colonia_protocol::ProtocolError;
use colonia_session::SessionError;
use colonia_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// These end a connection (or stop the server). Refusals of individual
/// requests never show up here; they are sent to the client as `error`
/// envelopes and the connection carries on.
#[derive(Debug, thiserror::Error)]
pub enum ColoniaError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Game(#[from] GameError),

    /// The client did not complete a valid login.
    #[error("login failed: {0}")]
    Login(String),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}
