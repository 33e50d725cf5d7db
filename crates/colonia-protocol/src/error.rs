//! Error types for the protocol layer.
//!
//! These are wire-level failures: the bytes did not form an envelope, the
//! envelope named a message nobody knows, or a known message was missing
//! a field it cannot live without. Game-level refusals ("that unit is not
//! yours") are not errors here; they travel back to the client as
//! [`ClientError`](crate::ClientError) values inside a response.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The wire form could not be turned into an envelope.
    ///
    /// Either the text is not well-formed, it does not have the
    /// envelope shape, or a tag/attribute name is not a valid identifier.
    /// This is a connection-level problem, not a game-logic one.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Serializing an envelope failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// No message variant is registered for this tag.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// A variant was asked to decode an envelope carrying another tag.
    #[error("expected <{expected}> envelope, got <{found}>")]
    UnexpectedTag {
        /// The tag the variant decodes.
        expected: &'static str,
        /// The tag that was actually present.
        found: String,
    },

    /// A required attribute is absent.
    #[error("<{tag}> is missing required attribute {attribute:?}")]
    MissingAttribute {
        /// Tag of the envelope that was being read.
        tag: String,
        /// Name of the attribute that was absent.
        attribute: &'static str,
    },

    /// An embedded payload (child element) is missing or unreadable.
    #[error("invalid payload in <{tag}>: {reason}")]
    InvalidPayload {
        /// Tag of the envelope that was being read.
        tag: String,
        /// What was wrong with the payload.
        reason: String,
    },
}

impl ProtocolError {
    pub(crate) fn payload(tag: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}
