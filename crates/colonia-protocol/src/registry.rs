//! Tag → message variant lookup.
//!
//! The table is a `static` built at compile time. There is nothing to
//! register at startup and nothing that can change afterwards, so every
//! connection task can read it without synchronization.
//!
//! ```text
//! Envelope{tag:"buy", ..}
//!     │  lookup("buy")
//!     ▼
//! RegistryEntry { kind: Buy, decode: decode_as::<BuyMessage> }
//!     │  decode(&envelope)
//!     ▼
//! Message::Buy(BuyMessage { .. })
//! ```

use crate::{
    BuyMessage, DisbandUnitMessage, Envelope, Message, MessageKind,
    ProtocolError, PutOutsideColonyMessage, ScoutSpeakToChiefMessage,
    SellMessage, WireMessage, WorkMessage,
};

/// Decodes an envelope whose tag is already known to match.
pub type DecodeFn = fn(&Envelope) -> Result<Message, ProtocolError>;

/// One row of the registry.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    /// Wire tag.
    pub tag: &'static str,
    /// Variant produced for that tag.
    pub kind: MessageKind,
    /// Decoder for that tag.
    pub decode: DecodeFn,
}

fn decode_as<M>(envelope: &Envelope) -> Result<Message, ProtocolError>
where
    M: WireMessage + Into<Message>,
{
    M::from_envelope(envelope).map(Into::into)
}

const fn entry<M>() -> RegistryEntry
where
    M: WireMessage + Into<Message>,
{
    RegistryEntry {
        tag: M::TAG,
        kind: M::KIND,
        decode: decode_as::<M>,
    }
}

static REGISTRY: [RegistryEntry; 6] = [
    entry::<BuyMessage>(),
    entry::<SellMessage>(),
    entry::<WorkMessage>(),
    entry::<PutOutsideColonyMessage>(),
    entry::<DisbandUnitMessage>(),
    entry::<ScoutSpeakToChiefMessage>(),
];

/// Finds the entry for a wire tag.
pub fn lookup(tag: &str) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|e| e.tag == tag)
}

/// Every registered tag, in table order.
pub fn tags() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|e| e.tag)
}

/// Turns a received envelope into a typed message.
///
/// # Errors
/// [`ProtocolError::UnknownMessageType`] if no variant owns the tag (no
/// decoder runs in that case), or whatever the variant's decoder reports.
pub fn dispatch(envelope: &Envelope) -> Result<Message, ProtocolError> {
    let entry = lookup(&envelope.tag)
        .ok_or_else(|| ProtocolError::UnknownMessageType(envelope.tag.clone()))?;
    (entry.decode)(envelope)
}
