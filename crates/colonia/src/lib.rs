//! # Colonia
//!
//! Authoritative server for the Colonia colonization game protocol.
//!
//! Clients connect over WebSocket, log in, and send game actions (buy,
//! sell, work, disband, ...) as envelopes. Each action is resolved,
//! validated and applied against the one authoritative game state, and
//! the client gets back either the changes it may see or a structured
//! error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colonia::prelude::*;
//!
//! # async fn start() -> Result<(), ColoniaError> {
//! let auth = StaticAuthenticator::new().with_player("secret", scenario::DUTCH);
//! let server = ColoniaServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(auth, scenario::new_world()?)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ServerConfig, ENV_BIND, ENV_IDLE_TIMEOUT, ENV_LOGIN_TIMEOUT};
pub use error::ColoniaError;
pub use server::{ColoniaServer, ColoniaServerBuilder};

/// Everything needed to start a server and talk to it.
pub mod prelude {
    pub use crate::{ColoniaError, ColoniaServer, ColoniaServerBuilder, ServerConfig};
    pub use colonia_game::{scenario, GameConfig, GameHandle, GameState};
    pub use colonia_protocol::{
        registry, Change, ClientError, Codec, Envelope, ErrorReason, JsonCodec, Login, LoginAck,
        Logout, Message, PlayerId, Response, WireMessage,
    };
    pub use colonia_session::{Authenticator, SessionConfig, SessionError, StaticAuthenticator};
}
