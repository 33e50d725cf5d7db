//! The authoritative game state and identifier resolution.
//!
//! `GameState` is owned by exactly one task, the game actor started by
//! [`spawn_game`]. Handlers get `&GameState` while they resolve and
//! validate a request, and only the [`Controller`] ever sees
//! `&mut GameState`.
//!
//! [`spawn_game`]: crate::spawn_game
//! [`Controller`]: crate::Controller

use std::collections::{BTreeMap, HashMap};

use colonia_protocol::{
    Change, ColonyId, PlayerId, SettlementId, Tile, UnitId, WorkLocationId,
};

use crate::{
    Colony, GameError, Location, ObjectKind, Player, ResolveError, Settlement, Unit,
    WorkLocation,
};

// ---------------------------------------------------------------------------
// Resolution traits
// ---------------------------------------------------------------------------

/// An object that can be looked up by its wire identifier.
pub trait GameObject: Sized {
    const KIND: ObjectKind;

    fn find<'s>(state: &'s GameState, id: &str) -> Option<&'s Self>;
}

/// An object that belongs to a player.
pub trait Owned: GameObject {
    fn owner(&self) -> PlayerId;
}

impl GameObject for Unit {
    const KIND: ObjectKind = ObjectKind::Unit;

    fn find<'s>(state: &'s GameState, id: &str) -> Option<&'s Self> {
        state.units.get(id)
    }
}

impl Owned for Unit {
    fn owner(&self) -> PlayerId {
        self.owner
    }
}

impl GameObject for Colony {
    const KIND: ObjectKind = ObjectKind::Colony;

    fn find<'s>(state: &'s GameState, id: &str) -> Option<&'s Self> {
        state.colonies.get(id)
    }
}

impl Owned for Colony {
    fn owner(&self) -> PlayerId {
        self.owner
    }
}

impl GameObject for WorkLocation {
    const KIND: ObjectKind = ObjectKind::WorkLocation;

    fn find<'s>(state: &'s GameState, id: &str) -> Option<&'s Self> {
        state.work_locations.get(id)
    }
}

impl GameObject for Settlement {
    const KIND: ObjectKind = ObjectKind::Settlement;

    fn find<'s>(state: &'s GameState, id: &str) -> Option<&'s Self> {
        state.settlements.get(id)
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Every object in one running game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameState {
    players: BTreeMap<PlayerId, Player>,
    units: HashMap<UnitId, Unit>,
    colonies: HashMap<ColonyId, Colony>,
    work_locations: HashMap<WorkLocationId, WorkLocation>,
    settlements: HashMap<SettlementId, Settlement>,
}

impl GameState {
    pub fn builder() -> GameStateBuilder {
        GameStateBuilder::default()
    }

    /// Looks up an object of type `T`.
    ///
    /// Use this for objects the requester does not own, such as native
    /// settlements or a colony's work locations.
    ///
    /// # Errors
    /// [`ResolveError::WrongType`] if the id names another kind of object,
    /// [`ResolveError::NotFound`] if it names nothing.
    pub fn resolve<T: GameObject>(&self, id: &str) -> Result<&T, ResolveError> {
        if let Some(object) = T::find(self, id) {
            return Ok(object);
        }
        Err(match self.kind_of(id) {
            Some(found) => ResolveError::WrongType {
                id: id.to_string(),
                expected: T::KIND,
                found,
            },
            None => ResolveError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            },
        })
    }

    /// Looks up an object of type `T` that `player` must own.
    ///
    /// # Errors
    /// As [`Self::resolve`], plus [`ResolveError::NotOwned`] when the
    /// object belongs to someone else.
    pub fn resolve_owned<T: Owned>(&self, player: PlayerId, id: &str) -> Result<&T, ResolveError> {
        let object = self.resolve::<T>(id)?;
        if object.owner() != player {
            return Err(ResolveError::NotOwned {
                kind: T::KIND,
                id: id.to_string(),
                player,
            });
        }
        Ok(object)
    }

    /// Which kind of object `id` names, if any.
    pub fn kind_of(&self, id: &str) -> Option<ObjectKind> {
        if self.units.contains_key(id) {
            Some(ObjectKind::Unit)
        } else if self.colonies.contains_key(id) {
            Some(ObjectKind::Colony)
        } else if self.work_locations.contains_key(id) {
            Some(ObjectKind::WorkLocation)
        } else if self.settlements.contains_key(id) {
            Some(ObjectKind::Settlement)
        } else {
            None
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn colony(&self, id: &str) -> Option<&Colony> {
        self.colonies.get(id)
    }

    pub fn work_location(&self, id: &str) -> Option<&WorkLocation> {
        self.work_locations.get(id)
    }

    pub fn settlement(&self, id: &str) -> Option<&Settlement> {
        self.settlements.get(id)
    }

    /// The player's units, ordered by id.
    pub fn units_of(&self, player: PlayerId) -> Vec<&Unit> {
        let mut units: Vec<_> = self.units.values().filter(|u| u.owner == player).collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        units
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// The colony standing on `tile`, if any.
    pub fn colony_at(&self, tile: Tile) -> Option<&Colony> {
        self.colonies.values().find(|c| c.tile == tile)
    }

    /// Number of units currently assigned to a work location.
    pub fn occupancy(&self, work_location: &WorkLocationId) -> usize {
        self.units
            .values()
            .filter(|u| matches!(&u.location, Location::WorkLocation(wl) if wl == work_location))
            .count()
    }

    /// The map tile a unit stands on. Units inside a colony stand on the
    /// colony's tile; units in Europe are not on the map.
    pub fn tile_of(&self, unit: &Unit) -> Option<Tile> {
        match &unit.location {
            Location::Tile(tile) => Some(*tile),
            Location::WorkLocation(wl) => self.colony_of_work_location(wl).map(|c| c.tile),
            Location::Europe => None,
        }
    }

    /// The colony a unit is in or standing at.
    pub fn colony_of(&self, unit: &Unit) -> Option<&Colony> {
        match &unit.location {
            Location::WorkLocation(wl) => self.colony_of_work_location(wl),
            Location::Tile(tile) => self.colony_at(*tile),
            Location::Europe => None,
        }
    }

    fn colony_of_work_location(&self, wl: &WorkLocationId) -> Option<&Colony> {
        self.work_locations
            .get(wl)
            .and_then(|wl| self.colonies.get(&wl.colony))
    }

    /// Everything `player` is entitled to see, as one batch of changes.
    ///
    /// Sent right after login so the client starts from the server's view.
    pub fn snapshot_for(&self, player: PlayerId) -> Vec<Change> {
        let mut changes = Vec::new();
        if let Some(p) = self.players.get(&player) {
            changes.push(Change::Gold {
                player,
                gold: p.gold,
            });
        }
        changes.extend(self.units_of(player).into_iter().map(|u| Change::Unit(u.view())));
        let mut settlements: Vec<_> = self.settlements.values().collect();
        settlements.sort_by(|a, b| a.id.cmp(&b.id));
        changes.extend(
            settlements
                .into_iter()
                .map(|s| Change::Settlement(s.view_for(player))),
        );
        changes
    }

    // -- Mutation, for the controller only ---------------------------------

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub(crate) fn unit_mut(&mut self, id: &str) -> Option<&mut Unit> {
        self.units.get_mut(id)
    }

    pub(crate) fn settlement_mut(&mut self, id: &str) -> Option<&mut Settlement> {
        self.settlements.get_mut(id)
    }

    /// Borrows a unit and a settlement mutably at the same time.
    pub(crate) fn unit_and_settlement_mut(
        &mut self,
        unit: &str,
        settlement: &str,
    ) -> Option<(&mut Unit, &mut Settlement)> {
        let unit = self.units.get_mut(unit)?;
        let settlement = self.settlements.get_mut(settlement)?;
        Some((unit, settlement))
    }

    pub(crate) fn remove_unit(&mut self, id: &str) -> Option<Unit> {
        self.units.remove(id)
    }
}

// ---------------------------------------------------------------------------
// GameStateBuilder
// ---------------------------------------------------------------------------

/// Assembles a [`GameState`] and checks that its references hold together.
#[derive(Debug, Default)]
pub struct GameStateBuilder {
    state: GameState,
}

impl GameStateBuilder {
    pub fn player(mut self, player: Player) -> Self {
        self.state.players.insert(player.id, player);
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.state.units.insert(unit.id.clone(), unit);
        self
    }

    pub fn colony(mut self, colony: Colony) -> Self {
        self.state.colonies.insert(colony.id.clone(), colony);
        self
    }

    pub fn work_location(mut self, work_location: WorkLocation) -> Self {
        self.state
            .work_locations
            .insert(work_location.id.clone(), work_location);
        self
    }

    pub fn settlement(mut self, settlement: Settlement) -> Self {
        self.state
            .settlements
            .insert(settlement.id.clone(), settlement);
        self
    }

    /// Finishes the state.
    ///
    /// # Errors
    /// [`GameError::InvalidState`] if an id is used by two kinds of
    /// object, an owner is not a player, a work location's colony does
    /// not exist, or a unit works at a missing work location.
    pub fn build(self) -> Result<GameState, GameError> {
        let state = self.state;
        let invalid = |msg: String| Err(GameError::InvalidState(msg));

        {
            let mut seen = std::collections::HashSet::new();
            let ids = state
                .units
                .keys()
                .map(UnitId::as_str)
                .chain(state.colonies.keys().map(ColonyId::as_str))
                .chain(state.work_locations.keys().map(WorkLocationId::as_str))
                .chain(state.settlements.keys().map(SettlementId::as_str));
            for id in ids {
                if !seen.insert(id) {
                    return invalid(format!("id {id:?} is used twice"));
                }
            }
        }

        for unit in state.units.values() {
            if !state.players.contains_key(&unit.owner) {
                return invalid(format!("unit {} owned by unknown {}", unit.id, unit.owner));
            }
            if let Location::WorkLocation(wl) = &unit.location {
                if !state.work_locations.contains_key(wl) {
                    return invalid(format!("unit {} works at unknown {wl}", unit.id));
                }
            }
        }
        for colony in state.colonies.values() {
            if !state.players.contains_key(&colony.owner) {
                return invalid(format!("colony {} owned by unknown {}", colony.id, colony.owner));
            }
        }
        for wl in state.work_locations.values() {
            if !state.colonies.contains_key(&wl.colony) {
                return invalid(format!("work location {} in unknown {}", wl.id, wl.colony));
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use colonia_protocol::UnitType;

    use super::*;

    fn state() -> GameState {
        GameState::builder()
            .player(Player { id: PlayerId(1), name: "Dutch".into(), gold: 100 })
            .player(Player { id: PlayerId(2), name: "French".into(), gold: 100 })
            .colony(Colony {
                id: ColonyId::new("colony:1"),
                owner: PlayerId(1),
                name: "Nieuw Amsterdam".into(),
                tile: Tile::new(3, 3),
            })
            .work_location(WorkLocation {
                id: WorkLocationId::new("wl:1"),
                colony: ColonyId::new("colony:1"),
                name: "Carpenter".into(),
                capacity: 3,
                accepts: BTreeSet::new(),
            })
            .unit(Unit::new(
                UnitId::new("unit:1"),
                PlayerId(1),
                UnitType::FreeColonist,
                Location::WorkLocation(WorkLocationId::new("wl:1")),
            ))
            .unit(Unit::new(
                UnitId::new("unit:2"),
                PlayerId(2),
                UnitType::FreeColonist,
                Location::Tile(Tile::new(8, 8)),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_owned_returns_own_unit() {
        let s = state();
        let unit = s.resolve_owned::<Unit>(PlayerId(1), "unit:1").unwrap();
        assert_eq!(unit.id.as_str(), "unit:1");
    }

    #[test]
    fn test_resolve_owned_rejects_foreign_unit() {
        let s = state();
        let err = s.resolve_owned::<Unit>(PlayerId(1), "unit:2").unwrap_err();
        assert!(matches!(err, ResolveError::NotOwned { player: PlayerId(1), .. }));
    }

    #[test]
    fn test_resolve_unknown_id_is_not_found() {
        let s = state();
        let err = s.resolve_owned::<Unit>(PlayerId(1), "unit:999").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound { kind: ObjectKind::Unit, id: "unit:999".into() }
        );
    }

    #[test]
    fn test_resolve_wrong_kind_is_wrong_type() {
        let s = state();
        let err = s.resolve::<Settlement>("colony:1").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::WrongType { expected: ObjectKind::Settlement, found: ObjectKind::Colony, .. }
        ));
    }

    #[test]
    fn test_unit_in_work_location_stands_on_colony_tile() {
        let s = state();
        let unit = s.unit("unit:1").unwrap();
        assert_eq!(s.tile_of(unit), Some(Tile::new(3, 3)));
        assert_eq!(s.colony_of(unit).unwrap().id.as_str(), "colony:1");
        assert_eq!(s.occupancy(&WorkLocationId::new("wl:1")), 1);
    }

    #[test]
    fn test_snapshot_only_contains_own_units() {
        let s = state();
        let snapshot = s.snapshot_for(PlayerId(2));
        let unit_ids: Vec<_> = snapshot
            .iter()
            .filter_map(|c| match c {
                Change::Unit(v) => Some(v.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(unit_ids, ["unit:2"]);
        assert!(matches!(snapshot[0], Change::Gold { player: PlayerId(2), gold: 100 }));
    }

    #[test]
    fn test_build_rejects_unknown_owner() {
        let result = GameState::builder()
            .unit(Unit::new(
                UnitId::new("unit:1"),
                PlayerId(9),
                UnitType::FreeColonist,
                Location::Europe,
            ))
            .build();
        assert!(matches!(result, Err(GameError::InvalidState(_))));
    }

    #[test]
    fn test_build_rejects_shared_ids() {
        let result = GameState::builder()
            .player(Player { id: PlayerId(1), name: "Dutch".into(), gold: 0 })
            .colony(Colony {
                id: ColonyId::new("x"),
                owner: PlayerId(1),
                name: "A".into(),
                tile: Tile::new(0, 0),
            })
            .unit(Unit::new(UnitId::new("x"), PlayerId(1), UnitType::Wagon, Location::Europe))
            .build();
        assert!(matches!(result, Err(GameError::InvalidState(_))));
    }
}
