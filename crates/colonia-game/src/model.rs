//! The objects that make up a game: players, units, colonies, work
//! locations and native settlements.
//!
//! These are plain data. All rules live in the
//! [`Controller`](crate::Controller) and the message handlers; nothing here
//! mutates anything beyond its own fields.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use colonia_protocol::{
    ColonyId, Goods, GoodsType, PlayerId, Revealed, SettlementId, SettlementView,
    Tile, UnitId, UnitLocation, UnitType, UnitView, WorkLocationId,
};
use serde::{Deserialize, Serialize};

/// What kind of object an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Unit,
    Colony,
    WorkLocation,
    Settlement,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Unit => "unit",
            ObjectKind::Colony => "colony",
            ObjectKind::WorkLocation => "work location",
            ObjectKind::Settlement => "settlement",
        })
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gold: u32,
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// Where a unit is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// On the map. A unit on a colony's tile is "outside" the colony.
    Tile(Tile),
    /// Working inside a colony.
    WorkLocation(WorkLocationId),
    /// Off the map.
    Europe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub unit_type: UnitType,
    pub location: Location,
    /// Goods carried, by type. Absent means zero.
    pub cargo: BTreeMap<GoodsType, u32>,
}

impl Unit {
    pub fn new(id: UnitId, owner: PlayerId, unit_type: UnitType, location: Location) -> Self {
        Self {
            id,
            owner,
            unit_type,
            location,
            cargo: BTreeMap::new(),
        }
    }

    /// How much of `goods_type` the unit carries.
    pub fn carried(&self, goods_type: GoodsType) -> u32 {
        self.cargo.get(&goods_type).copied().unwrap_or(0)
    }

    /// The cargo of one type as a goods payload located in this unit.
    pub fn cargo_goods(&self, goods_type: GoodsType) -> Goods {
        Goods::new(goods_type, self.carried(goods_type), Some(self.id.as_str()))
    }

    /// The owner-facing view.
    pub fn view(&self) -> UnitView {
        UnitView {
            id: self.id.clone(),
            owner: self.owner,
            unit_type: self.unit_type,
            location: match &self.location {
                Location::Tile(tile) => UnitLocation::Tile(*tile),
                Location::WorkLocation(wl) => UnitLocation::WorkLocation(wl.clone()),
                Location::Europe => UnitLocation::Europe,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Colony and work locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    pub id: ColonyId,
    pub owner: PlayerId,
    pub name: String,
    pub tile: Tile,
}

/// A building or colony tile that units can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLocation {
    pub id: WorkLocationId,
    pub colony: ColonyId,
    pub name: String,
    /// How many units can work here at once.
    pub capacity: usize,
    /// Unit types allowed here. Empty means any person.
    pub accepts: BTreeSet<UnitType>,
}

impl WorkLocation {
    /// Why `unit_type` may not work here at all, ignoring occupancy.
    pub fn no_add_reason(&self, unit_type: UnitType) -> Option<String> {
        if !unit_type.is_person() {
            return Some(format!("{unit_type} is not a person"));
        }
        if !self.accepts.is_empty() && !self.accepts.contains(&unit_type) {
            return Some(format!("{} does not accept {unit_type}", self.name));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Native settlement
// ---------------------------------------------------------------------------

/// Why a settlement cannot put a price on some goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The settlement does not trade this type.
    NotTraded,
    /// The amount is so large the total overflows.
    TooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub tile: Tile,
    /// Treasury used to pay for goods the settlement buys.
    pub gold: u32,
    /// Goods held, by type.
    pub stock: BTreeMap<GoodsType, u32>,
    /// Price per unit, by type. A type with no price is not traded.
    pub prices: BTreeMap<GoodsType, u32>,
    /// Skill taught to a colonist. `None` once taught.
    pub learnable_skill: Option<UnitType>,
    /// Most wanted goods, most wanted first.
    pub wanted_goods: [Option<GoodsType>; 3],
    /// Players whose scouts have spoken to the chief.
    pub visited_by: BTreeSet<PlayerId>,
}

impl Settlement {
    pub fn held(&self, goods_type: GoodsType) -> u32 {
        self.stock.get(&goods_type).copied().unwrap_or(0)
    }

    /// The settlement's stock of one type as a goods payload.
    pub fn stock_goods(&self, goods_type: GoodsType) -> Goods {
        Goods::new(goods_type, self.held(goods_type), Some(self.id.as_str()))
    }

    /// Static price for `amount` goods of a type.
    ///
    /// # Errors
    /// [`PriceError`] if the type is not traded here or the total does
    /// not fit in a treasury.
    pub fn price_for(&self, goods_type: GoodsType, amount: u32) -> Result<u32, PriceError> {
        let unit_price = self
            .prices
            .get(&goods_type)
            .ok_or(PriceError::NotTraded)?;
        unit_price.checked_mul(amount).ok_or(PriceError::TooLarge)
    }

    pub fn has_visited(&self, player: PlayerId) -> bool {
        self.visited_by.contains(&player)
    }

    /// What `player` knows about this settlement.
    ///
    /// Skill and wanted goods stay [`Revealed::Unknown`] until the
    /// player's scout has spoken to the chief.
    pub fn view_for(&self, player: PlayerId) -> SettlementView {
        let visited = self.has_visited(player);
        let reveal = |value| {
            if visited {
                Revealed::Known(value)
            } else {
                Revealed::Unknown
            }
        };
        SettlementView {
            id: self.id.clone(),
            visited,
            learnable_skill: if visited {
                Revealed::Known(self.learnable_skill)
            } else {
                Revealed::Unknown
            },
            wanted_goods: self.wanted_goods.map(reveal),
        }
    }
}
