//! Authentication hook for establishing who a connection belongs to.
//!
//! The server never decides identity on its own. It hands the token from
//! the client's `login` to an [`Authenticator`] and trusts the
//! [`PlayerId`] that comes back. Every later request on that connection
//! is attributed to that player.

use std::collections::HashMap;

use colonia_protocol::PlayerId;

use crate::SessionError;

/// Validates a client's login token and returns their identity.
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// connection task for the life of the server.
///
/// # Example
///
/// ```rust
/// use colonia_session::{Authenticator, SessionError};
/// use colonia_protocol::PlayerId;
///
/// /// Uses the token itself as the player number. Development only.
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(
///         &self,
///         token: &str,
///     ) -> Result<PlayerId, SessionError> {
///         let id: u64 = token.parse().map_err(|_| {
///             SessionError::AuthFailed("token must be a number".into())
///         })?;
///         Ok(PlayerId(id))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `token` and returns the player it identifies.
    ///
    /// # Errors
    /// [`SessionError::AuthFailed`] if the token is not accepted.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, SessionError>> + Send;
}

/// An [`Authenticator`] backed by a fixed token → player table.
///
/// Enough for a LAN game where the host hands each player a password.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    tokens: HashMap<String, PlayerId>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as `player`, builder style.
    pub fn with_player(mut self, token: impl Into<String>, player: PlayerId) -> Self {
        self.tokens.insert(token.into(), player);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, SessionError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| SessionError::AuthFailed("unknown token".into()))
    }
}
