//! Player sessions for the Colonia server.
//!
//! 1. **Authentication**: turning a login token into a [`PlayerId`]
//!    ([`Authenticator`] trait, [`StaticAuthenticator`]).
//! 2. **Binding**: remembering which player owns which connection
//!    ([`SessionManager`]), so every request is attributed to the right
//!    player.
//! 3. **Reconnection**: letting a dropped client resume with a token
//!    within a grace period.
//!
//! ```text
//! Game (above)     ← receives (player, message) pairs
//!     ↕
//! Session (here)   ← connection ↔ player
//!     ↕
//! Transport        ← provides ConnectionId
//! ```
//!
//! [`PlayerId`]: colonia_protocol::PlayerId

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;

pub use auth::{Authenticator, StaticAuthenticator};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionState};
