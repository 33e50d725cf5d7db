//! Domain vocabulary shared by client and server: goods, unit types, and
//! the goods payload that rides inside trade messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Envelope, NumericParam, ProtocolError};

/// Defines a closed enum whose wire form is a fixed upper-case name.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The stable wire name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownName { kind: $err, name: s.to_string() }),
                }
            }
        }
    };
}

/// Returned when a wire name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} {name:?}")]
pub struct UnknownName {
    /// What kind of name was being parsed (e.g. "goods type").
    pub kind: &'static str,
    /// The offending text.
    pub name: String,
}

wire_enum! {
    /// The kinds of goods that can be stored, produced and traded.
    GoodsType, "goods type" {
        Food => "FOOD",
        Sugar => "SUGAR",
        Tobacco => "TOBACCO",
        Cotton => "COTTON",
        Furs => "FURS",
        Lumber => "LUMBER",
        Ore => "ORE",
        Silver => "SILVER",
        Horses => "HORSES",
        Rum => "RUM",
        Cigars => "CIGARS",
        Cloth => "CLOTH",
        Coats => "COATS",
        TradeGoods => "TRADE_GOODS",
        Tools => "TOOLS",
        Muskets => "MUSKETS",
    }
}

wire_enum! {
    /// Unit types. The expert types double as the skills a native
    /// settlement can teach.
    UnitType, "unit type" {
        FreeColonist => "FREE_COLONIST",
        IndenturedServant => "INDENTURED_SERVANT",
        SeasonedScout => "SEASONED_SCOUT",
        ExpertFarmer => "EXPERT_FARMER",
        ExpertFisherman => "EXPERT_FISHERMAN",
        ExpertSilverMiner => "EXPERT_SILVER_MINER",
        MasterSugarPlanter => "MASTER_SUGAR_PLANTER",
        MasterCottonPlanter => "MASTER_COTTON_PLANTER",
        MasterTobaccoPlanter => "MASTER_TOBACCO_PLANTER",
        ExpertOreMiner => "EXPERT_ORE_MINER",
        ExpertLumberJack => "EXPERT_LUMBER_JACK",
        ExpertFurTrapper => "EXPERT_FUR_TRAPPER",
        Wagon => "WAGON",
    }
}

impl UnitType {
    /// Returns `true` for people (units that can work in a colony).
    pub fn is_person(self) -> bool {
        !matches!(self, UnitType::Wagon)
    }

    /// Returns `true` for unit types that can speak to a native chief.
    pub fn is_scout(self) -> bool {
        matches!(self, UnitType::SeasonedScout)
    }
}

// ---------------------------------------------------------------------------
// Goods payload
// ---------------------------------------------------------------------------

/// A quantity of one goods type, optionally tagged with where it sits.
///
/// `location` is the identifier of the container holding the goods (a
/// settlement or a unit's cargo). The server compares it against the
/// container the request claims, so a client cannot buy goods "at" a
/// settlement that does not have them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goods {
    /// What kind of goods.
    pub goods_type: GoodsType,
    /// How many units of it.
    pub amount: u32,
    /// Identifier of the holding container, if known.
    pub location: Option<String>,
}

impl Goods {
    /// Wire tag of the goods element.
    pub const TAG: &'static str = "goods";

    /// Creates a goods descriptor at the given container.
    pub fn new(
        goods_type: GoodsType,
        amount: u32,
        location: Option<impl Into<String>>,
    ) -> Self {
        Self {
            goods_type,
            amount,
            location: location.map(Into::into),
        }
    }

    /// Builds the `goods` element.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG)
            .with_attribute("type", self.goods_type.as_str())
            .with_attribute("amount", self.amount.to_string())
            .with_optional_attribute("location", self.location.as_deref())
    }

    /// Reads a `goods` element.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidPayload`] for a wrong tag, an unknown goods
    /// type or a non-numeric amount.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        if envelope.tag != Self::TAG {
            return Err(ProtocolError::payload(
                &envelope.tag,
                format!("expected <{}>", Self::TAG),
            ));
        }
        let goods_type = envelope
            .require_attribute("type")?
            .parse::<GoodsType>()
            .map_err(|e| ProtocolError::payload(Self::TAG, e.to_string()))?;
        let amount = NumericParam::from_raw(envelope.attribute("amount"))
            .parse()
            .map_err(|e| ProtocolError::payload(Self::TAG, e.to_string()))?;
        Ok(Self {
            goods_type,
            amount,
            location: envelope.attribute("location").map(str::to_string),
        })
    }
}

impl fmt::Display for Goods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.goods_type)
    }
}
