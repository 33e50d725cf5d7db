//! A small fixed starting world, used by the server binary and tests.
//!
//! ```text
//!   (5,5)  colony:1 Nieuw Amsterdam (Dutch)   wl:1 carpenter, wl:2 fur trader
//!   (6,6)  unit:2 wagon (Dutch, 100 furs)
//!   (7,6)  settlement:1 Onondaga
//!   (8,6)  unit:3 seasoned scout (Dutch)
//!   (8,7)  unit:6 free colonist (English)
//!  (20,20) colony:2 Jamestown (English)       wl:3 town hall
//! ```
//!
//! unit:1 works in wl:1, unit:4 waits in Europe, unit:5 works in wl:3.

use std::collections::{BTreeMap, BTreeSet};

use colonia_protocol::{
    ColonyId, GoodsType, PlayerId, SettlementId, Tile, UnitId, UnitType, WorkLocationId,
};

use crate::{
    Colony, GameError, GameState, Location, Player, Settlement, Unit, WorkLocation,
};

pub const DUTCH: PlayerId = PlayerId(1);
pub const ENGLISH: PlayerId = PlayerId(2);

pub const NIEUW_AMSTERDAM_TILE: Tile = Tile::new(5, 5);
pub const JAMESTOWN_TILE: Tile = Tile::new(20, 20);
pub const ONONDAGA_TILE: Tile = Tile::new(7, 6);

/// Builds the starting world.
///
/// # Errors
/// Only if the world's own references are inconsistent.
pub fn new_world() -> Result<GameState, GameError> {
    let mut wagon = Unit::new(
        UnitId::new("unit:2"),
        DUTCH,
        UnitType::Wagon,
        Location::Tile(Tile::new(6, 6)),
    );
    wagon.cargo.insert(GoodsType::Furs, 100);

    GameState::builder()
        .player(Player { id: DUTCH, name: "Dutch".into(), gold: 1000 })
        .player(Player { id: ENGLISH, name: "English".into(), gold: 500 })
        .colony(Colony {
            id: ColonyId::new("colony:1"),
            owner: DUTCH,
            name: "Nieuw Amsterdam".into(),
            tile: NIEUW_AMSTERDAM_TILE,
        })
        .colony(Colony {
            id: ColonyId::new("colony:2"),
            owner: ENGLISH,
            name: "Jamestown".into(),
            tile: JAMESTOWN_TILE,
        })
        .work_location(WorkLocation {
            id: WorkLocationId::new("wl:1"),
            colony: ColonyId::new("colony:1"),
            name: "Carpenter's house".into(),
            capacity: 3,
            accepts: BTreeSet::new(),
        })
        .work_location(WorkLocation {
            id: WorkLocationId::new("wl:2"),
            colony: ColonyId::new("colony:1"),
            name: "Fur trader's house".into(),
            capacity: 1,
            accepts: BTreeSet::from([UnitType::FreeColonist, UnitType::ExpertFurTrapper]),
        })
        .work_location(WorkLocation {
            id: WorkLocationId::new("wl:3"),
            colony: ColonyId::new("colony:2"),
            name: "Town hall".into(),
            capacity: 3,
            accepts: BTreeSet::new(),
        })
        .unit(Unit::new(
            UnitId::new("unit:1"),
            DUTCH,
            UnitType::FreeColonist,
            Location::WorkLocation(WorkLocationId::new("wl:1")),
        ))
        .unit(wagon)
        .unit(Unit::new(
            UnitId::new("unit:3"),
            DUTCH,
            UnitType::SeasonedScout,
            Location::Tile(Tile::new(8, 6)),
        ))
        .unit(Unit::new(
            UnitId::new("unit:4"),
            DUTCH,
            UnitType::ExpertFurTrapper,
            Location::Europe,
        ))
        .unit(Unit::new(
            UnitId::new("unit:5"),
            ENGLISH,
            UnitType::FreeColonist,
            Location::WorkLocation(WorkLocationId::new("wl:3")),
        ))
        .unit(Unit::new(
            UnitId::new("unit:6"),
            ENGLISH,
            UnitType::FreeColonist,
            Location::Tile(Tile::new(8, 7)),
        ))
        .settlement(Settlement {
            id: SettlementId::new("settlement:1"),
            name: "Onondaga".into(),
            tile: ONONDAGA_TILE,
            gold: 1000,
            stock: BTreeMap::from([
                (GoodsType::Cloth, 100),
                (GoodsType::Furs, 50),
                (GoodsType::Tools, 20),
            ]),
            prices: BTreeMap::from([
                (GoodsType::Cloth, 6),
                (GoodsType::Furs, 3),
                (GoodsType::Tools, 8),
                (GoodsType::Muskets, 20),
            ]),
            learnable_skill: Some(UnitType::ExpertFurTrapper),
            wanted_goods: [Some(GoodsType::Muskets), Some(GoodsType::Rum), None],
            visited_by: BTreeSet::new(),
        })
        .build()
}
