//! Server-side handling of every message variant.
//!
//! Each variant implements [`HandleMessage`] as four phases:
//!
//! 1. **resolve** every identifier against the state, scoped to what the
//!    requesting player owns or can see;
//! 2. **validate** the request-level preconditions;
//! 3. **apply** the action with exactly one [`Controller`] call;
//! 4. **respond** with the controller's [`ChangeSet`].
//!
//! Phases 1 and 2 only get `&GameState`, so a refused request cannot have
//! changed anything. [`handle`] runs the phases in order and is the only
//! place that hands out `&mut GameState`.

use colonia_protocol::{
    BuyMessage, ClientError, DisbandUnitMessage, ErrorReason, Goods, Message, PlayerId,
    PutOutsideColonyMessage, ScoutSpeakToChiefMessage, SellMessage, Tile, WireMessage,
    WorkMessage,
};

use crate::{ChangeSet, Controller, GameState, Location, Settlement, Unit, WorkLocation};

/// The four-phase contract every message variant follows on the server.
pub trait HandleMessage {
    /// The objects a request refers to, borrowed from the state.
    type Resolved<'s>;

    /// Everything `apply` needs beyond the message itself.
    type Plan;

    /// Looks up every referenced object.
    ///
    /// # Errors
    /// An `unresolvedReference` error for an id that names nothing, the
    /// wrong kind of object, or an object the player may not use.
    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<Self::Resolved<'s>, ClientError>;

    /// Checks the request against the resolved objects.
    ///
    /// # Errors
    /// A client error describing the first failed precondition.
    fn validate(
        &self,
        resolved: Self::Resolved<'_>,
        state: &GameState,
        player: PlayerId,
    ) -> Result<Self::Plan, ClientError>;

    /// Performs the action with a single controller call.
    fn apply(&self, plan: Self::Plan, controller: &mut Controller<'_>, player: PlayerId)
    -> ChangeSet;
}

/// Runs all four phases for one message.
pub fn handle<M>(message: &M, state: &mut GameState, player: PlayerId) -> ChangeSet
where
    M: HandleMessage + WireMessage,
{
    let plan = match message
        .resolve(state, player)
        .and_then(|resolved| message.validate(resolved, state, player))
    {
        Ok(plan) => plan,
        Err(error) => {
            tracing::debug!(%player, tag = M::TAG, reason = %error.reason, %error, "request refused");
            return ChangeSet::rejected(error);
        }
    };
    let mut controller = Controller::new(state);
    message.apply(plan, &mut controller, player)
}

/// Handles any message variant.
pub fn handle_message(message: &Message, state: &mut GameState, player: PlayerId) -> ChangeSet {
    match message {
        Message::Buy(m) => handle(m, state, player),
        Message::Sell(m) => handle(m, state, player),
        Message::Work(m) => handle(m, state, player),
        Message::PutOutsideColony(m) => handle(m, state, player),
        Message::DisbandUnit(m) => handle(m, state, player),
        Message::ScoutSpeakToChief(m) => handle(m, state, player),
    }
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

fn refuse(reason: ErrorReason, message: String) -> ClientError {
    ClientError::new(reason, message)
}

/// The tile `unit` stands on.
fn on_map(state: &GameState, unit: &Unit) -> Result<Tile, ClientError> {
    state
        .tile_of(unit)
        .ok_or_else(|| refuse(ErrorReason::NotOnMap, format!("{} is not on the map", unit.id)))
}

/// `unit` must stand next to `settlement`.
fn next_to(state: &GameState, unit: &Unit, settlement: &Settlement) -> Result<(), ClientError> {
    let tile = on_map(state, unit)?;
    if !tile.is_adjacent(&settlement.tile) {
        return Err(refuse(
            ErrorReason::NotAdjacent,
            format!("{} at {tile} is not next to {} at {}", unit.id, settlement.id, settlement.tile),
        ));
    }
    Ok(())
}

fn non_empty(goods: &Goods) -> Result<(), ClientError> {
    if goods.amount == 0 {
        return Err(ClientError::invalid(format!("no {} to trade", goods.goods_type)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

impl HandleMessage for BuyMessage {
    type Resolved<'s> = (&'s Unit, &'s Settlement);
    type Plan = u32;

    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<Self::Resolved<'s>, ClientError> {
        let unit = state.resolve_owned::<Unit>(player, self.unit().as_str())?;
        let settlement = state.resolve::<Settlement>(self.settlement().as_str())?;
        Ok((unit, settlement))
    }

    fn validate(
        &self,
        (unit, settlement): Self::Resolved<'_>,
        state: &GameState,
        _player: PlayerId,
    ) -> Result<u32, ClientError> {
        next_to(state, unit, settlement)?;
        let goods = self.goods();
        if goods.location.as_deref() != Some(settlement.id.as_str()) {
            return Err(refuse(
                ErrorReason::GoodsNotAtSettlement,
                format!("Goods {goods} are not at settlement {}", settlement.id),
            ));
        }
        non_empty(goods)?;
        self.gold_amount()
            .map_err(|e| ClientError::invalid(format!("Bad gold: {e}")))
    }

    fn apply(&self, gold: u32, controller: &mut Controller<'_>, player: PlayerId) -> ChangeSet {
        controller.buy_from_settlement(player, self.unit(), self.settlement(), self.goods(), gold)
    }
}

impl HandleMessage for SellMessage {
    type Resolved<'s> = (&'s Unit, &'s Settlement);
    type Plan = u32;

    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<Self::Resolved<'s>, ClientError> {
        let unit = state.resolve_owned::<Unit>(player, self.unit().as_str())?;
        let settlement = state.resolve::<Settlement>(self.settlement().as_str())?;
        Ok((unit, settlement))
    }

    fn validate(
        &self,
        (unit, settlement): Self::Resolved<'_>,
        state: &GameState,
        _player: PlayerId,
    ) -> Result<u32, ClientError> {
        next_to(state, unit, settlement)?;
        let goods = self.goods();
        if goods.location.as_deref() != Some(unit.id.as_str()) {
            return Err(ClientError::invalid(format!(
                "Goods {goods} are not carried by {}",
                unit.id
            )));
        }
        non_empty(goods)?;
        self.gold_amount()
            .map_err(|e| ClientError::invalid(format!("Bad gold: {e}")))
    }

    fn apply(&self, gold: u32, controller: &mut Controller<'_>, player: PlayerId) -> ChangeSet {
        controller.sell_to_settlement(player, self.unit(), self.settlement(), self.goods(), gold)
    }
}

// ---------------------------------------------------------------------------
// Colony work
// ---------------------------------------------------------------------------

impl HandleMessage for WorkMessage {
    type Resolved<'s> = (&'s Unit, &'s WorkLocation);
    type Plan = ();

    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<Self::Resolved<'s>, ClientError> {
        let unit = state.resolve_owned::<Unit>(player, self.unit().as_str())?;
        let work_location = state.resolve::<WorkLocation>(self.work_location().as_str())?;
        Ok((unit, work_location))
    }

    fn validate(
        &self,
        (unit, work_location): Self::Resolved<'_>,
        state: &GameState,
        player: PlayerId,
    ) -> Result<(), ClientError> {
        on_map(state, unit)?;
        let colony = state.colony_of(unit).ok_or_else(|| {
            refuse(ErrorReason::NotInColony, format!("{} is not in a colony", unit.id))
        })?;
        if work_location.colony != colony.id {
            return Err(refuse(
                ErrorReason::WrongColony,
                format!(
                    "{} is in {}, but {} is in {}",
                    work_location.id, work_location.colony, unit.id, colony.id
                ),
            ));
        }
        if colony.owner != player {
            return Err(refuse(
                ErrorReason::CannotAdd,
                format!("{} belongs to {}", colony.id, colony.owner),
            ));
        }
        if unit.location == Location::WorkLocation(work_location.id.clone()) {
            return Err(refuse(
                ErrorReason::CannotAdd,
                format!("{} already works at {}", unit.id, work_location.id),
            ));
        }
        if let Some(reason) = work_location.no_add_reason(unit.unit_type) {
            return Err(refuse(ErrorReason::CannotAdd, reason));
        }
        if state.occupancy(&work_location.id) >= work_location.capacity {
            return Err(refuse(
                ErrorReason::CannotAdd,
                format!("{} is full", work_location.name),
            ));
        }
        Ok(())
    }

    fn apply(&self, _: (), controller: &mut Controller<'_>, player: PlayerId) -> ChangeSet {
        controller.work(player, self.unit(), self.work_location())
    }
}

impl HandleMessage for PutOutsideColonyMessage {
    type Resolved<'s> = &'s Unit;
    type Plan = ();

    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<&'s Unit, ClientError> {
        Ok(state.resolve_owned::<Unit>(player, self.unit().as_str())?)
    }

    fn validate(&self, unit: &Unit, _state: &GameState, _player: PlayerId) -> Result<(), ClientError> {
        match unit.location {
            Location::WorkLocation(_) => Ok(()),
            _ => Err(refuse(
                ErrorReason::NotInColony,
                format!("{} is not working in a colony", unit.id),
            )),
        }
    }

    fn apply(&self, _: (), controller: &mut Controller<'_>, player: PlayerId) -> ChangeSet {
        controller.put_outside_colony(player, self.unit())
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

impl HandleMessage for DisbandUnitMessage {
    type Resolved<'s> = &'s Unit;
    type Plan = ();

    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<&'s Unit, ClientError> {
        Ok(state.resolve_owned::<Unit>(player, self.unit().as_str())?)
    }

    fn validate(&self, _unit: &Unit, _state: &GameState, _player: PlayerId) -> Result<(), ClientError> {
        Ok(())
    }

    fn apply(&self, _: (), controller: &mut Controller<'_>, player: PlayerId) -> ChangeSet {
        controller.disband_unit(player, self.unit())
    }
}

impl HandleMessage for ScoutSpeakToChiefMessage {
    type Resolved<'s> = (&'s Unit, &'s Settlement);
    type Plan = ();

    fn resolve<'s>(
        &self,
        state: &'s GameState,
        player: PlayerId,
    ) -> Result<Self::Resolved<'s>, ClientError> {
        let unit = state.resolve_owned::<Unit>(player, self.unit().as_str())?;
        let settlement = state.resolve::<Settlement>(self.settlement().as_str())?;
        Ok((unit, settlement))
    }

    fn validate(
        &self,
        (unit, settlement): Self::Resolved<'_>,
        state: &GameState,
        _player: PlayerId,
    ) -> Result<(), ClientError> {
        if !unit.unit_type.is_scout() {
            return Err(ClientError::invalid(format!(
                "{} is a {}, not a scout",
                unit.id, unit.unit_type
            )));
        }
        next_to(state, unit, settlement)
    }

    fn apply(&self, _: (), controller: &mut Controller<'_>, player: PlayerId) -> ChangeSet {
        controller.scout_speak_to_chief(player, self.unit(), self.settlement())
    }
}
