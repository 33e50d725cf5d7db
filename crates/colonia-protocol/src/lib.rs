//! Wire protocol for Colonia.
//!
//! This crate defines what clients and servers say to each other:
//!
//! - **Envelope** ([`Envelope`]): the tree-shaped unit on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): envelopes to bytes and back.
//! - **Messages** ([`Message`], [`BuyMessage`], [`WorkMessage`], ...): one
//!   typed struct per game action, each able to read itself from and
//!   write itself to an envelope.
//! - **Registry** ([`registry::dispatch`]): picks the message type for a
//!   received tag.
//! - **Responses** ([`Response`], [`ClientError`]): what comes back.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the game
//! (authoritative state). It never looks anything up: identifiers are
//! decoded as raw strings and resolved by the server when it handles the
//! message.
//!
//! ```text
//! Transport (bytes) → Codec (Envelope) → Registry (Message) → Game (Response)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod disband;
mod envelope;
mod error;
mod ids;
mod message;
mod param;
pub mod registry;
mod response;
mod scout;
mod system;
mod trade;
mod types;
mod work;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use disband::DisbandUnitMessage;
pub use envelope::Envelope;
pub use error::ProtocolError;
pub use ids::{
    ColonyId, InvalidPlayerId, InvalidTile, PlayerId, SettlementId, Tile,
    UnitId, WorkLocationId,
};
pub use message::{Message, MessageKind, WireMessage};
pub use param::{
    decode_revealed, encode_revealed, InvalidNumber, NumericParam, Revealed,
};
pub use response::{
    Change, ClientError, ErrorReason, Response, SettlementView, UnitLocation,
    UnitView,
};
pub use scout::ScoutSpeakToChiefMessage;
pub use system::{Login, LoginAck, Logout, PROTOCOL_VERSION};
pub use trade::{BuyMessage, SellMessage};
pub use types::{Goods, GoodsType, UnitType, UnknownName};
pub use work::{PutOutsideColonyMessage, WorkMessage};
