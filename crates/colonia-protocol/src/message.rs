//! The closed set of game-action messages.
//!
//! Each action has its own struct (in [`trade`](crate::trade),
//! [`work`](crate::work), ...) implementing [`WireMessage`]. [`Message`]
//! gathers them into one enum so the server can match exhaustively: adding
//! a variant without handling it is a compile error, not a runtime
//! surprise.

use std::fmt;

use crate::{
    BuyMessage, DisbandUnitMessage, Envelope, ProtocolError,
    PutOutsideColonyMessage, ScoutSpeakToChiefMessage, SellMessage,
    WorkMessage,
};

/// A message type that knows its wire tag and how to cross the wire.
///
/// `from_envelope` only extracts raw identifiers and parameters; it never
/// looks anything up in game state. `to_envelope` is its exact inverse:
/// for every value `m` built from valid inputs,
/// `M::from_envelope(&m.to_envelope())?.to_envelope() == m.to_envelope()`.
pub trait WireMessage: Sized {
    /// The stable wire tag.
    const TAG: &'static str;

    /// The matching [`MessageKind`].
    const KIND: MessageKind;

    /// Reads the message out of an envelope with tag [`Self::TAG`].
    ///
    /// # Errors
    /// [`ProtocolError::UnexpectedTag`] for another tag,
    /// [`ProtocolError::MissingAttribute`] or
    /// [`ProtocolError::InvalidPayload`] when a required field is absent.
    fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError>;

    /// Writes the message into a fresh envelope.
    fn to_envelope(&self) -> Envelope;
}

/// Fails unless `envelope` carries the tag of `M`.
pub(crate) fn expect_tag<M: WireMessage>(
    envelope: &Envelope,
) -> Result<(), ProtocolError> {
    if envelope.tag == M::TAG {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedTag {
            expected: M::TAG,
            found: envelope.tag.clone(),
        })
    }
}

/// Discriminant of [`Message`], usable without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Buy,
    Sell,
    Work,
    PutOutsideColony,
    DisbandUnit,
    ScoutSpeakToChief,
}

impl MessageKind {
    /// Every kind, in registry order.
    pub const ALL: [MessageKind; 6] = [
        MessageKind::Buy,
        MessageKind::Sell,
        MessageKind::Work,
        MessageKind::PutOutsideColony,
        MessageKind::DisbandUnit,
        MessageKind::ScoutSpeakToChief,
    ];

    /// The wire tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::Buy => BuyMessage::TAG,
            MessageKind::Sell => SellMessage::TAG,
            MessageKind::Work => WorkMessage::TAG,
            MessageKind::PutOutsideColony => PutOutsideColonyMessage::TAG,
            MessageKind::DisbandUnit => DisbandUnitMessage::TAG,
            MessageKind::ScoutSpeakToChief => ScoutSpeakToChiefMessage::TAG,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Any game-action request a client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Buy(BuyMessage),
    Sell(SellMessage),
    Work(WorkMessage),
    PutOutsideColony(PutOutsideColonyMessage),
    DisbandUnit(DisbandUnitMessage),
    ScoutSpeakToChief(ScoutSpeakToChiefMessage),
}

impl Message {
    /// Which variant this is.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Buy(_) => MessageKind::Buy,
            Message::Sell(_) => MessageKind::Sell,
            Message::Work(_) => MessageKind::Work,
            Message::PutOutsideColony(_) => MessageKind::PutOutsideColony,
            Message::DisbandUnit(_) => MessageKind::DisbandUnit,
            Message::ScoutSpeakToChief(_) => MessageKind::ScoutSpeakToChief,
        }
    }

    /// The wire tag of this message.
    pub fn tag(&self) -> &'static str {
        self.kind().tag()
    }

    /// Serializes whichever variant this is.
    pub fn to_envelope(&self) -> Envelope {
        match self {
            Message::Buy(m) => m.to_envelope(),
            Message::Sell(m) => m.to_envelope(),
            Message::Work(m) => m.to_envelope(),
            Message::PutOutsideColony(m) => m.to_envelope(),
            Message::DisbandUnit(m) => m.to_envelope(),
            Message::ScoutSpeakToChief(m) => m.to_envelope(),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Message {
                fn from(m: $ty) -> Self {
                    Message::$variant(m)
                }
            }
        )+
    };
}

impl_from_variant!(
    Buy(BuyMessage),
    Sell(SellMessage),
    Work(WorkMessage),
    PutOutsideColony(PutOutsideColonyMessage),
    DisbandUnit(DisbandUnitMessage),
    ScoutSpeakToChief(ScoutSpeakToChiefMessage),
);
