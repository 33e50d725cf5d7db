//! Connection-level envelopes: login, its acknowledgement, and logout.
//!
//! These are not game actions and never reach the registry. The server
//! reads them directly in its connection loop.

use crate::{Envelope, PlayerId, ProtocolError};

/// Protocol version a client must announce in its `login`.
pub const PROTOCOL_VERSION: &str = "1";

/// The first envelope on every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub version: String,
    /// Credential handed to the server's authenticator.
    pub token: String,
    /// Token from a previous `loginAck`, to resume a dropped session.
    pub reconnect_token: Option<String>,
}

impl Login {
    pub const TAG: &'static str = "login";

    /// A fresh login at the current [`PROTOCOL_VERSION`].
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            token: token.into(),
            reconnect_token: None,
        }
    }

    /// A login that resumes an earlier session.
    pub fn reconnect(token: impl Into<String>, reconnect_token: impl Into<String>) -> Self {
        Self {
            reconnect_token: Some(reconnect_token.into()),
            ..Self::new(token)
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG)
            .with_attribute("version", self.version.as_str())
            .with_attribute("token", self.token.as_str())
            .with_optional_attribute("reconnectToken", self.reconnect_token.as_deref())
    }

    /// # Errors
    /// [`ProtocolError`] if this is not a `login` or a field is missing.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        if envelope.tag != Self::TAG {
            return Err(ProtocolError::UnexpectedTag {
                expected: Self::TAG,
                found: envelope.tag.clone(),
            });
        }
        Ok(Self {
            version: envelope.require_attribute("version")?.to_string(),
            token: envelope.require_attribute("token")?.to_string(),
            reconnect_token: envelope.attribute("reconnectToken").map(str::to_string),
        })
    }
}

/// Sent back when login succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAck {
    pub player: PlayerId,
    /// Present this in a later [`Login::reconnect`] to resume the session.
    pub reconnect_token: String,
}

impl LoginAck {
    pub const TAG: &'static str = "loginAck";

    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG)
            .with_attribute("player", self.player.to_string())
            .with_attribute("reconnectToken", self.reconnect_token.as_str())
    }

    /// # Errors
    /// [`ProtocolError`] if this is not a `loginAck` or a field is bad.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        if envelope.tag != Self::TAG {
            return Err(ProtocolError::UnexpectedTag {
                expected: Self::TAG,
                found: envelope.tag.clone(),
            });
        }
        Ok(Self {
            player: envelope
                .require_attribute("player")?
                .parse()
                .map_err(|e: crate::InvalidPlayerId| {
                    ProtocolError::payload(Self::TAG, e.to_string())
                })?,
            reconnect_token: envelope.require_attribute("reconnectToken")?.to_string(),
        })
    }
}

/// Ends the session cleanly. Carries nothing.
pub struct Logout;

impl Logout {
    pub const TAG: &'static str = "logout";

    pub fn to_envelope() -> Envelope {
        Envelope::new(Self::TAG)
    }
}
