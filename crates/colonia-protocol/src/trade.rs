//! Trading with a native settlement: `buy` and `sell`.
//!
//! Both messages share the same shape:
//!
//! ```text
//! buy  unit="unit:12" settlement="settlement:3" gold="300"
//! └── goods  type="CLOTH" amount="50" location="settlement:3"
//! ```
//!
//! `gold` is the agreed price. It is kept exactly as received and only
//! parsed on demand, so a garbage price survives decoding and is rejected
//! by the server with a proper error response.

use crate::message::expect_tag;
use crate::{
    Envelope, Goods, InvalidNumber, MessageKind, NumericParam, ProtocolError,
    SettlementId, UnitId, WireMessage,
};

const UNIT: &str = "unit";
const SETTLEMENT: &str = "settlement";
const GOLD: &str = "gold";

/// Fields common to both trade directions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TradeFields {
    unit: UnitId,
    settlement: SettlementId,
    goods: Goods,
    gold: NumericParam,
}

impl TradeFields {
    fn new(unit: &UnitId, settlement: &SettlementId, goods: Goods, gold: u32) -> Self {
        Self {
            unit: unit.clone(),
            settlement: settlement.clone(),
            goods,
            gold: NumericParam::from_value(gold),
        }
    }

    fn read(envelope: &Envelope) -> Result<Self, ProtocolError> {
        let unit = UnitId::new(envelope.require_attribute(UNIT)?);
        let settlement = SettlementId::new(envelope.require_attribute(SETTLEMENT)?);
        let goods = envelope
            .child_by_tag(Goods::TAG)
            .ok_or_else(|| ProtocolError::payload(&envelope.tag, "missing <goods>"))?;
        Ok(Self {
            unit,
            settlement,
            goods: Goods::from_envelope(goods)?,
            gold: NumericParam::from_raw(envelope.attribute(GOLD)),
        })
    }

    fn write(&self, tag: &'static str) -> Envelope {
        Envelope::new(tag)
            .with_attribute(UNIT, self.unit.as_str())
            .with_attribute(SETTLEMENT, self.settlement.as_str())
            .with_optional_attribute(GOLD, self.gold.raw())
            .with_child(self.goods.to_envelope())
    }
}

macro_rules! trade_message {
    ($(#[$meta:meta])* $name:ident, $tag:literal, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(TradeFields);

        impl $name {
            /// Builds the request from live values.
            pub fn new(
                unit: &UnitId,
                settlement: &SettlementId,
                goods: Goods,
                gold: u32,
            ) -> Self {
                Self(TradeFields::new(unit, settlement, goods, gold))
            }

            /// The unit doing the trading.
            pub fn unit(&self) -> &UnitId {
                &self.0.unit
            }

            /// The settlement being traded with.
            pub fn settlement(&self) -> &SettlementId {
                &self.0.settlement
            }

            /// The goods changing hands.
            pub fn goods(&self) -> &Goods {
                &self.0.goods
            }

            /// The agreed price, or [`NumericParam::INVALID`] if the wire
            /// value is missing or not a non-negative integer.
            pub fn gold(&self) -> i64 {
                self.0.gold.value_or_sentinel()
            }

            /// The agreed price, checked.
            ///
            /// # Errors
            /// [`InvalidNumber`] if the wire value cannot be used.
            pub fn gold_amount(&self) -> Result<u32, InvalidNumber> {
                self.0.gold.parse()
            }

            /// The price exactly as received.
            pub fn gold_raw(&self) -> &NumericParam {
                &self.0.gold
            }
        }

        impl WireMessage for $name {
            const TAG: &'static str = $tag;
            const KIND: MessageKind = MessageKind::$kind;

            fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
                expect_tag::<Self>(envelope)?;
                TradeFields::read(envelope).map(Self)
            }

            fn to_envelope(&self) -> Envelope {
                self.0.write(Self::TAG)
            }
        }
    };
}

trade_message!(
    /// Buy goods from a native settlement.
    ///
    /// The goods must currently sit at the settlement named in the
    /// request; the server checks `goods.location` against it.
    BuyMessage,
    "buy",
    Buy
);

trade_message!(
    /// Sell goods carried by a unit to a native settlement.
    ///
    /// The goods must currently be in the unit's cargo.
    SellMessage,
    "sell",
    Sell
);
