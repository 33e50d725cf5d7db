//! Moving a unit into and out of a colony's work locations.

use crate::message::expect_tag;
use crate::{
    Envelope, MessageKind, ProtocolError, UnitId, WireMessage, WorkLocationId,
};

/// Put a unit to work at a building or colony tile.
///
/// ```text
/// work  unit="unit:4" workLocation="workLocation:9"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkMessage {
    unit: UnitId,
    work_location: WorkLocationId,
}

impl WorkMessage {
    pub fn new(unit: &UnitId, work_location: &WorkLocationId) -> Self {
        Self {
            unit: unit.clone(),
            work_location: work_location.clone(),
        }
    }

    pub fn unit(&self) -> &UnitId {
        &self.unit
    }

    pub fn work_location(&self) -> &WorkLocationId {
        &self.work_location
    }
}

impl WireMessage for WorkMessage {
    const TAG: &'static str = "work";
    const KIND: MessageKind = MessageKind::Work;

    fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        expect_tag::<Self>(envelope)?;
        Ok(Self {
            unit: UnitId::new(envelope.require_attribute("unit")?),
            work_location: WorkLocationId::new(
                envelope.require_attribute("workLocation")?,
            ),
        })
    }

    fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG)
            .with_attribute("unit", self.unit.as_str())
            .with_attribute("workLocation", self.work_location.as_str())
    }
}

/// Take a unit out of its work location and put it on the colony tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutsideColonyMessage {
    unit: UnitId,
}

impl PutOutsideColonyMessage {
    pub fn new(unit: &UnitId) -> Self {
        Self { unit: unit.clone() }
    }

    pub fn unit(&self) -> &UnitId {
        &self.unit
    }
}

impl WireMessage for PutOutsideColonyMessage {
    const TAG: &'static str = "putOutsideColony";
    const KIND: MessageKind = MessageKind::PutOutsideColony;

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
    fn test_work_envelope_layout() {
        let env = WorkMessage::new(&UnitId::numbered(4), &WorkLocationId::numbered(9))
            .to_envelope();
        assert_eq!(env.tag, "work");
        assert_eq!(env.attribute("unit"), Some("unit:4"));
        assert_eq!(env.attribute("workLocation"), Some("workLocation:9"));
        assert!(env.children.is_empty());
    }

    #[test]
    fn test_work_decode_keeps_raw_ids() {
        let env = Envelope::new("work")
            .with_attribute("unit", "U7")
            .with_attribute("workLocation", "");
        let msg = WorkMessage::from_envelope(&env).unwrap();
        assert_eq!(msg.unit().as_str(), "U7");
        // Present-but-empty is kept; resolution will fail later.
        assert_eq!(msg.work_location().as_str(), "");
    }

    #[test]
    fn test_work_missing_location_is_error() {
        let env = Envelope::new("work").with_attribute("unit", "U7");
        assert!(matches!(
            WorkMessage::from_envelope(&env),
            Err(ProtocolError::MissingAttribute { attribute: "workLocation", .. })
        ));
    }

    #[test]
    fn test_put_outside_colony_round_trip() {
        let msg = PutOutsideColonyMessage::new(&UnitId::numbered(3));
        let back = PutOutsideColonyMessage::from_envelope(&msg.to_envelope()).unwrap();
        assert_eq!(back, msg);
    }
}
