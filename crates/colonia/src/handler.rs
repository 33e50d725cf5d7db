//! Per-connection handler: login, then requests in order.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `login` → check version → authenticate
//!   2. Bind (or resume) the session → send `loginAck`
//!   3. Join the game → send the player's snapshot as an `update`
//!   4. Loop: receive an envelope → dispatch → wait for the game →
//!      send the response. Changes made by other players are pushed
//!      between requests. The connection closes when the client has
//!      sent nothing for the idle timeout, or when it has fallen so far
//!      behind on pushed updates that the game dropped it.

use std::sync::Arc;

use colonia_protocol::{
    registry, ClientError, Codec, Envelope, ErrorReason, Login, LoginAck, Logout, PlayerId,
    Response, PROTOCOL_VERSION,
};
use colonia_session::{Authenticator, SessionError};
use colonia_transport::{Connection, WebSocketConnection};
use tokio::time::Instant;

use crate::server::ServerState;
use crate::ColoniaError;

/// Drop guard that releases a player's session and game seat when the
/// handler exits, including by panic.
///
/// `Drop` is synchronous, so the async cleanup runs in a spawned task.
struct SessionGuard<A: Authenticator, C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<A, C>>,
}

impl<A: Authenticator, C: Codec> Drop for SessionGuard<A, C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let _ = state.game.leave(player_id).await;
            let mut sessions = state.sessions.lock().await;
            let _ = sessions.disconnect(player_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), ColoniaError>
where
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = ?conn.peer_addr(), "handling new connection");

    let result = serve(&conn, state).await;
    // Best effort; the peer may already be gone.
    let _ = conn.close().await;
    result
}

async fn serve<A, C>(
    conn: &WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), ColoniaError>
where
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();

    // --- Step 1: Login ---
    let login = receive_login(conn, &state).await?;
    let player_id = match state.auth.authenticate(&login.token).await {
        Ok(player_id) => player_id,
        Err(e) => {
            send_error(conn, &state.codec, &refusal(&e)).await?;
            return Err(e.into());
        }
    };

    // --- Step 2: Session ---
    // Bind the session and arm the guard together so a failed bind
    // leaves nothing to clean up.
    let bound = {
        let mut sessions = state.sessions.lock().await;
        let session = match login.reconnect_token.as_deref() {
            Some(token) if sessions.player_for_token(token) == Some(player_id) => {
                sessions.reconnect(token, conn_id)
            }
            Some(_) => Err(SessionError::InvalidToken),
            None => sessions.create(player_id, conn_id),
        };
        session.map(|session| session.reconnect_token.clone())
    };
    let reconnect_token = match bound {
        Ok(token) => token,
        Err(e) => {
            send_error(conn, &state.codec, &refusal(&e)).await?;
            return Err(e.into());
        }
    };
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %player_id, resumed = login.reconnect_token.is_some(), "player logged in");

    let ack = LoginAck {
        player: player_id,
        reconnect_token,
    };
    send_envelope(conn, &state.codec, &ack.to_envelope()).await?;

    // --- Step 3: Join the game ---
    let (snapshot, mut updates) = match state.game.join(player_id).await {
        Ok(joined) => joined,
        Err(e) => {
            let error = ClientError::new(ErrorReason::NotAuthenticated, e.to_string());
            send_error(conn, &state.codec, &error).await?;
            return Err(e.into());
        }
    };
    send_envelope(conn, &state.codec, &Response::Update(snapshot).to_envelope()).await?;

    // --- Step 4: Request loop ---
    // One deadline for the whole loop. Only frames from the client move
    // it; pushed updates do not.
    let idle = state.config.idle_timeout();
    let deadline = tokio::time::sleep(idle);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            () = &mut deadline => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
            received = conn.recv() => {
                let data = match received {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                deadline.as_mut().reset(Instant::now() + idle);
                if !handle_frame(conn, &state, player_id, &data).await? {
                    break;
                }
            }
            update = updates.recv() => match update {
                Some(update) => {
                    send_envelope(conn, &state.codec, &update.to_envelope()).await?;
                }
                None => {
                    tracing::warn!(%player_id, "dropped from game updates, closing");
                    break;
                }
            },
        }
    }

    // _guard drops here → session disconnect fires.
    Ok(())
}

/// Waits for the `login` envelope and checks its version.
async fn receive_login<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
) -> Result<Login, ColoniaError>
where
    A: Authenticator,
    C: Codec,
{
    let data = match tokio::time::timeout(state.config.login_timeout(), conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ColoniaError::Login("connection closed before login".into()));
        }
        Ok(Err(e)) => return Err(ColoniaError::Transport(e)),
        Err(_) => return Err(ColoniaError::Login("login timed out".into())),
    };

    let envelope = match state.codec.decode(&data) {
        Ok(envelope) => envelope,
        Err(e) => {
            send_error(conn, &state.codec, &ClientError::from(&e)).await?;
            return Err(e.into());
        }
    };

    let login = match Login::from_envelope(&envelope) {
        Ok(login) => login,
        Err(e) => {
            let error = ClientError::new(
                ErrorReason::NotAuthenticated,
                format!("first message must be a valid <{}>: {e}", Login::TAG),
            );
            send_error(conn, &state.codec, &error).await?;
            return Err(ColoniaError::Login(e.to_string()));
        }
    };

    if login.version != PROTOCOL_VERSION {
        let message = format!(
            "version mismatch: expected {PROTOCOL_VERSION}, got {}",
            login.version
        );
        send_error(conn, &state.codec, &ClientError::invalid(message.as_str())).await?;
        return Err(ColoniaError::Login(message));
    }

    Ok(login)
}

/// Handles one frame from a logged-in player. Returns `false` when the
/// connection should close.
async fn handle_frame<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
    player_id: PlayerId,
    data: &[u8],
) -> Result<bool, ColoniaError>
where
    A: Authenticator,
    C: Codec,
{
    let envelope = match state.codec.decode(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "failed to decode envelope");
            send_error(conn, &state.codec, &ClientError::from(&e)).await?;
            return Ok(true);
        }
    };

    match envelope.tag.as_str() {
        Logout::TAG => {
            tracing::info!(%player_id, "player logged out");
            return Ok(false);
        }
        Login::TAG => {
            send_error(conn, &state.codec, &ClientError::invalid("already logged in")).await?;
            return Ok(true);
        }
        _ => {}
    }

    let message = match registry::dispatch(&envelope) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(%player_id, tag = %envelope.tag, error = %e, "undecodable request");
            send_error(conn, &state.codec, &ClientError::from(&e)).await?;
            return Ok(true);
        }
    };

    let tag = message.tag();
    let response = state.game.handle(player_id, message).await?;
    tracing::debug!(%player_id, tag, error = response.is_error(), "request handled");
    send_envelope(conn, &state.codec, &response.to_envelope()).await?;
    Ok(true)
}

/// The client-facing form of a login refusal.
fn refusal(err: &SessionError) -> ClientError {
    ClientError::new(ErrorReason::NotAuthenticated, err.to_string())
}

async fn send_envelope(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    envelope: &Envelope,
) -> Result<(), ColoniaError> {
    let bytes = codec.encode(envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    error: &ClientError,
) -> Result<(), ColoniaError> {
    send_envelope(conn, codec, &error.to_envelope()).await
}
