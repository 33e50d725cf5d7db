//! `disbandUnit`: remove one of the player's own units from the game.

use crate::message::expect_tag;
use crate::{Envelope, MessageKind, ProtocolError, UnitId, WireMessage};

/// Disband a unit the requesting player owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisbandUnitMessage {
    unit: UnitId,
}

impl DisbandUnitMessage {
    pub fn new(unit: &UnitId) -> Self {
        Self { unit: unit.clone() }
    }

    pub fn unit(&self) -> &UnitId {
        &self.unit
    }
}

impl WireMessage for DisbandUnitMessage {
    const TAG: &'static str = "disbandUnit";
    const KIND: MessageKind = MessageKind::DisbandUnit;

    fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        expect_tag::<Self>(envelope)?;
        Ok(Self {
            unit: UnitId::new(envelope.require_attribute("unit")?),
        })
    }

    fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG).with_attribute("unit", self.unit.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disband_envelope_layout() {
        let env = DisbandUnitMessage::new(&UnitId::new("unit:999")).to_envelope();
        assert_eq!(env.tag, "disbandUnit");
        assert_eq!(env.attribute("unit"), Some("unit:999"));
    }

    #[test]
    fn test_disband_without_unit_is_error() {
        assert!(DisbandUnitMessage::from_envelope(&Envelope::new("disbandUnit")).is_err());
    }
}
