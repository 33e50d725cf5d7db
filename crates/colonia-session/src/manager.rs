//! The session manager: which player is on which connection.
//!
//! Every request handled by the server is attributed to the player bound
//! to the connection it arrived on. The manager owns that binding, the
//! reconnection tokens, and the grace period after a drop.
//!
//! `SessionManager` is not thread-safe by itself. The server keeps it
//! behind a mutex and only holds the lock for the bookkeeping call, never
//! across network I/O.

use std::collections::HashMap;
use std::time::Instant;

use colonia_protocol::PlayerId;
use colonia_transport::ConnectionId;
use rand::Rng;

use crate::{Session, SessionConfig, SessionError, SessionState};

/// Tracks every logged-in (or recently dropped) player.
///
/// ```text
/// login ──→ create() ──→ disconnect() ──→ reconnect()
///              │               │               │
///              ▼               ▼               ▼
///         [Connected]    [Disconnected]   [Connected]
///                              │
///                              ▼ expire_stale()
///                          [Expired] ──→ cleanup_expired()
/// ```
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    /// Reconnection token → player. Kept in sync with `sessions`.
    tokens: HashMap<String, PlayerId>,
    /// Live connection → player. Only `Connected` sessions appear here.
    connections: HashMap<ConnectionId, PlayerId>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            tokens: HashMap::new(),
            connections: HashMap::new(),
            config,
        }
    }

    /// Starts a fresh session for an authenticated player on `connection`.
    ///
    /// A disconnected or expired session for the same player is replaced
    /// and its old token stops working.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyConnected`] if the player is connected elsewhere.
    /// - [`SessionError::ConnectionInUse`] if the connection already has a player.
    pub fn create(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<&Session, SessionError> {
        if self.connections.contains_key(&connection) {
            return Err(SessionError::ConnectionInUse(connection));
        }
        if let Some(existing) = self.sessions.get(&player_id) {
            if existing.state.is_connected() {
                return Err(SessionError::AlreadyConnected(player_id));
            }
            self.tokens.remove(&existing.reconnect_token);
        }

        let token = generate_token();
        self.tokens.insert(token.clone(), player_id);
        self.connections.insert(connection, player_id);
        self.sessions.insert(
            player_id,
            Session {
                player_id,
                state: SessionState::Connected { connection },
                reconnect_token: token,
            },
        );

        tracing::info!(%player_id, %connection, "session created");
        // Inserted just above.
        Ok(self.sessions.get(&player_id).expect("just inserted"))
    }

    /// Marks the player's connection as gone and starts the grace period.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the player has no session.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        if let Some(connection) = session.state.connection() {
            self.connections.remove(&connection);
        }
        session.state = SessionState::Disconnected {
            since: Instant::now(),
        };

        tracing::info!(%player_id, "player disconnected, grace period started");
        Ok(())
    }

    /// Resumes a dropped session on a new connection.
    ///
    /// # Errors
    /// - [`SessionError::InvalidToken`] if the token is unknown.
    /// - [`SessionError::SessionExpired`] if the grace period has elapsed.
    /// - [`SessionError::AlreadyConnected`] if the session never dropped.
    /// - [`SessionError::ConnectionInUse`] if the connection already has a player.
    pub fn reconnect(
        &mut self,
        token: &str,
        connection: ConnectionId,
    ) -> Result<&Session, SessionError> {
        if self.connections.contains_key(&connection) {
            return Err(SessionError::ConnectionInUse(connection));
        }
        let player_id = self
            .tokens
            .get(token)
            .copied()
            .ok_or(SessionError::InvalidToken)?;
        let grace = self.config.grace();
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::InvalidToken)?;

        match &session.state {
            SessionState::Disconnected { since } => {
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    return Err(SessionError::SessionExpired(player_id));
                }
                session.state = SessionState::Connected { connection };
                self.connections.insert(connection, player_id);
                tracing::info!(%player_id, %connection, "player reconnected");
                Ok(self.sessions.get(&player_id).expect("just modified"))
            }
            SessionState::Connected { .. } => Err(SessionError::AlreadyConnected(player_id)),
            SessionState::Expired => Err(SessionError::SessionExpired(player_id)),
        }
    }

    /// The player bound to `connection`, if any.
    pub fn player_for(&self, connection: ConnectionId) -> Option<PlayerId> {
        self.connections.get(&connection).copied()
    }

    /// The player a reconnection token was issued to, if it is still valid.
    pub fn player_for_token(&self, token: &str) -> Option<PlayerId> {
        self.tokens.get(token).copied()
    }

    /// Expires every session whose grace period has elapsed and returns
    /// the affected players.
    pub fn expire_stale(&mut self) -> Vec<PlayerId> {
        let grace = self.config.grace();
        let mut expired = Vec::new();

        for session in self.sessions.values_mut() {
            if let SessionState::Disconnected { since } = &session.state {
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    expired.push(session.player_id);
                    tracing::info!(
                        player_id = %session.player_id,
                        "session expired (grace period elapsed)"
                    );
                }
            }
        }

        expired
    }

    /// Drops expired sessions and their tokens.
    pub fn cleanup_expired(&mut self) {
        self.sessions.retain(|_, session| {
            if session.state == SessionState::Expired {
                self.tokens.remove(&session.reconnect_token);
                false
            } else {
                true
            }
        });
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Number of sessions in any state.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// 16 random bytes as 32 lowercase hex characters.
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
