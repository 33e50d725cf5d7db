//! `scoutSpeakToChief`: a scout visits a native settlement.
//!
//! Speaking to the chief is how a player learns what the settlement can
//! teach and which goods it wants. Until then those values stay
//! [`Revealed::Unknown`](crate::Revealed) in every view sent to the player.

use crate::message::expect_tag;
use crate::{
    Envelope, MessageKind, ProtocolError, SettlementId, UnitId, WireMessage,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutSpeakToChiefMessage {
    unit: UnitId,
    settlement: SettlementId,
}

impl ScoutSpeakToChiefMessage {
    pub fn new(unit: &UnitId, settlement: &SettlementId) -> Self {
        Self {
            unit: unit.clone(),
            settlement: settlement.clone(),
        }
    }

    /// The scout.
    pub fn unit(&self) -> &UnitId {
        &self.unit
    }

    pub fn settlement(&self) -> &SettlementId {
        &self.settlement
    }
}

impl WireMessage for ScoutSpeakToChiefMessage {
    const TAG: &'static str = "scoutSpeakToChief";
    const KIND: MessageKind = MessageKind::ScoutSpeakToChief;

    fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        expect_tag::<Self>(envelope)?;
        Ok(Self {
            unit: UnitId::new(envelope.require_attribute("unit")?),
            settlement: SettlementId::new(envelope.require_attribute("settlement")?),
        })
    }

    fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG)
            .with_attribute("unit", self.unit.as_str())
            .with_attribute("settlement", self.settlement.as_str())
    }
}
