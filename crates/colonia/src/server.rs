//! `ColoniaServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session → game.

use std::sync::Arc;
use std::time::Duration;

use colonia_game::{spawn_game, GameConfig, GameHandle, GameState};
use colonia_protocol::{Codec, JsonCodec};
use colonia_session::{Authenticator, SessionConfig, SessionManager};
use colonia_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ColoniaError, ServerConfig};

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) game: GameHandle,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Colonia server.
///
/// ```rust,ignore
/// let server = ColoniaServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(auth, scenario::new_world()?)
///     .await?;
/// server.run().await
/// ```
pub struct ColoniaServerBuilder {
    config: ServerConfig,
    session_config: SessionConfig,
    game_config: GameConfig,
}

impl ColoniaServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            session_config: SessionConfig::default(),
            game_config: GameConfig::default(),
        }
    }

    /// Replaces all network settings at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Kept to the millisecond.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds the listener and starts the game actor.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// [`ColoniaError::Config`] for unusable settings, or a transport
    /// error if the address cannot be bound.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
        game: GameState,
    ) -> Result<ColoniaServer<A, JsonCodec>, ColoniaError> {
        self.config.validate()?;
        let transport = WebSocketTransport::bind(&self.config.bind).await?;
        let sweep_every = self.session_config.grace();

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new(self.session_config)),
            game: spawn_game(game, self.game_config),
            auth,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(ColoniaServer {
            transport,
            state,
            sweep_every,
        })
    }
}

impl Default for ColoniaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Colonia server. Call [`run()`](Self::run) to accept players.
pub struct ColoniaServer<A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
    sweep_every: Duration,
}

impl<A, C> ColoniaServer<A, C>
where
    A: Authenticator,
    C: Codec + 'static,
{
    pub fn builder() -> ColoniaServerBuilder {
        ColoniaServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle to the running game, for inspection or shutdown.
    pub fn game(&self) -> GameHandle {
        self.state.game.clone()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each connection gets its own task. Sessions whose reconnect grace
    /// period has run out are swept on a timer.
    pub async fn run(mut self) -> Result<(), ColoniaError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Colonia server running");

        // A zero grace period would make `interval` panic.
        let mut sweep = tokio::time::interval(self.sweep_every.max(Duration::from_secs(1)));

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
                _ = sweep.tick() => {
                    let mut sessions = self.state.sessions.lock().await;
                    let expired = sessions.expire_stale();
                    if !expired.is_empty() {
                        tracing::info!(count = expired.len(), "sessions expired");
                    }
                    sessions.cleanup_expired();
                }
            }
        }
    }
}
