//! Error types for the game layer.

use colonia_protocol::{ClientError, ErrorReason, PlayerId};

use crate::ObjectKind;

/// Failures of the game actor itself, as seen by a caller.
///
/// Refusals of individual requests are not errors at this level; they
/// come back as [`Response::Error`](colonia_protocol::Response) values.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The actor's command channel is closed (it has shut down).
    #[error("game is unavailable")]
    Unavailable,

    /// The player has no seat in this game.
    #[error("{0} is not in this game")]
    UnknownPlayer(PlayerId),

    /// A game state was assembled with references that do not resolve.
    #[error("invalid game state: {0}")]
    InvalidState(String),
}

/// Why an identifier from a request did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing has this identifier.
    #[error("no {kind} with id {id:?}")]
    NotFound { kind: ObjectKind, id: String },

    /// The identifier names an object of another kind.
    #[error("{id:?} is a {found}, not a {expected}")]
    WrongType {
        id: String,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// The object exists but belongs to someone else.
    #[error("{kind} {id:?} is not owned by {player}")]
    NotOwned {
        kind: ObjectKind,
        id: String,
        player: PlayerId,
    },
}

impl From<ResolveError> for ClientError {
    fn from(err: ResolveError) -> Self {
        ClientError::new(ErrorReason::UnresolvedReference, err.to_string())
    }
}
