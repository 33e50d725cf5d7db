//! Authoritative game state and server-side message handling for Colonia.
//!
//! One task owns the [`GameState`]; connections reach it through a
//! [`GameHandle`]. Each request is handled to completion before the next
//! one starts: resolve the ids it names, validate it, make exactly one
//! [`Controller`] call, and send back the resulting changes.
//!
//! # Key types
//!
//! - [`GameState`]: every object in the game, with typed resolution
//! - [`HandleMessage`]: the four-phase contract, one impl per message
//! - [`Controller`]: the only code that mutates state
//! - [`ChangeSet`]: what an action changed and who may see it
//! - [`GameHandle`]: send requests to the running game
//! - [`scenario`]: a fixed starting world

mod actor;
mod changes;
mod config;
mod controller;
mod error;
mod handler;
mod model;
pub mod scenario;
mod state;

pub use actor::{spawn_game, GameHandle, UpdateReceiver};
pub use changes::{Audience, ChangeSet};
pub use config::GameConfig;
pub use controller::Controller;
pub use error::{GameError, ResolveError};
pub use handler::{handle, handle_message, HandleMessage};
pub use model::{
    Colony, Location, ObjectKind, Player, PriceError, Settlement, Unit, WorkLocation,
};
pub use state::{GameObject, GameState, GameStateBuilder, Owned};
