//! The controller: the only code that mutates [`GameState`].
//!
//! Each method is one game action. By the time a method is called the
//! handler has already resolved every identifier and checked every
//! precondition it can see from the request. The controller still checks
//! the contract of the action itself (can the player pay, does the
//! settlement have the goods) and answers with a rejected [`ChangeSet`]
//! instead of mutating anything when it does not hold.

use colonia_protocol::{
    Change, ClientError, ErrorReason, Goods, PlayerId, SettlementId, UnitId, WorkLocationId,
};

use crate::{Audience, ChangeSet, GameState, Location, PriceError};

/// Borrows the game state for exactly one action.
pub struct Controller<'g> {
    state: &'g mut GameState,
}

fn rejected(message: String) -> ChangeSet {
    ChangeSet::rejected(ClientError::new(ErrorReason::TradeRejected, message))
}

fn too_large(goods: &Goods) -> ChangeSet {
    rejected(format!("{} {} is too large an amount to trade", goods.amount, goods.goods_type))
}

fn vanished(what: impl std::fmt::Display) -> ChangeSet {
    ChangeSet::rejected(ClientError::internal(format!("{what} vanished during apply")))
}

impl<'g> Controller<'g> {
    pub fn new(state: &'g mut GameState) -> Self {
        Self { state }
    }

    /// Read access for callers holding the controller.
    pub fn state(&self) -> &GameState {
        self.state
    }

    /// `unit` buys `goods` from `settlement` for `gold`.
    ///
    /// The offer must cover the settlement's asking price, the settlement
    /// must hold the goods, and the player must be able to pay.
    pub fn buy_from_settlement(
        &mut self,
        player: PlayerId,
        unit: &UnitId,
        settlement: &SettlementId,
        goods: &Goods,
        gold: u32,
    ) -> ChangeSet {
        let Some(treasury) = self.state.player(player).map(|p| p.gold) else {
            return vanished(player);
        };
        let Some(s) = self.state.settlement(settlement.as_str()) else {
            return vanished(settlement);
        };
        let asking = match s.price_for(goods.goods_type, goods.amount) {
            Ok(price) => price,
            Err(PriceError::NotTraded) => {
                return rejected(format!("{} does not sell {}", s.name, goods.goods_type));
            }
            Err(PriceError::TooLarge) => return too_large(goods),
        };
        if gold < asking {
            return rejected(format!("offer of {gold} is below the asking price of {asking}"));
        }
        let held = s.held(goods.goods_type);
        if held < goods.amount {
            return rejected(format!("{} only has {held} {}", s.name, goods.goods_type));
        }
        if treasury < gold {
            return rejected(format!("{player} has only {treasury} gold"));
        }
        if s.gold.checked_add(gold).is_none() {
            return rejected(format!("{} cannot hold {gold} more gold", s.name));
        }

        let Some((u, s)) = self
            .state
            .unit_and_settlement_mut(unit.as_str(), settlement.as_str())
        else {
            return vanished(unit);
        };
        *u.cargo.entry(goods.goods_type).or_default() += goods.amount;
        *s.stock.entry(goods.goods_type).or_default() -= goods.amount;
        s.gold += gold;
        let cargo = u.cargo_goods(goods.goods_type);
        let stock = s.stock_goods(goods.goods_type);

        let Some(p) = self.state.player_mut(player) else {
            return vanished(player);
        };
        p.gold -= gold;
        let remaining = p.gold;

        tracing::info!(%player, %unit, %settlement, goods = %goods, gold, "bought from settlement");
        ChangeSet::new()
            .private(player, Change::Gold { player, gold: remaining })
            .private(player, Change::Goods(cargo))
            .with(Audience::All, Change::Goods(stock))
    }

    /// `unit` sells `goods` from its cargo to `settlement` for `gold`.
    ///
    /// The asking price may not exceed the settlement's bid, the unit
    /// must carry the goods, and the settlement must be able to pay.
    pub fn sell_to_settlement(
        &mut self,
        player: PlayerId,
        unit: &UnitId,
        settlement: &SettlementId,
        goods: &Goods,
        gold: u32,
    ) -> ChangeSet {
        let Some(treasury) = self.state.player(player).map(|p| p.gold) else {
            return vanished(player);
        };
        let Some(u) = self.state.unit(unit.as_str()) else {
            return vanished(unit);
        };
        let carried = u.carried(goods.goods_type);
        let Some(s) = self.state.settlement(settlement.as_str()) else {
            return vanished(settlement);
        };
        let bid = match s.price_for(goods.goods_type, goods.amount) {
            Ok(price) => price,
            Err(PriceError::NotTraded) => {
                return rejected(format!("{} does not buy {}", s.name, goods.goods_type));
            }
            Err(PriceError::TooLarge) => return too_large(goods),
        };
        if gold > bid {
            return rejected(format!("asking {gold} exceeds the bid of {bid}"));
        }
        if carried < goods.amount {
            return rejected(format!("{unit} only carries {carried} {}", goods.goods_type));
        }
        if s.gold < gold {
            return rejected(format!("{} has only {} gold", s.name, s.gold));
        }
        if treasury.checked_add(gold).is_none() {
            return rejected(format!("{player} cannot hold {gold} more gold"));
        }

        let Some((u, s)) = self
            .state
            .unit_and_settlement_mut(unit.as_str(), settlement.as_str())
        else {
            return vanished(unit);
        };
        let left = carried - goods.amount;
        if left == 0 {
            u.cargo.remove(&goods.goods_type);
        } else {
            u.cargo.insert(goods.goods_type, left);
        }
        *s.stock.entry(goods.goods_type).or_default() += goods.amount;
        s.gold -= gold;
        let cargo = u.cargo_goods(goods.goods_type);
        let stock = s.stock_goods(goods.goods_type);

        let Some(p) = self.state.player_mut(player) else {
            return vanished(player);
        };
        p.gold += gold;
        let treasury = p.gold;

        tracing::info!(%player, %unit, %settlement, goods = %goods, gold, "sold to settlement");
        ChangeSet::new()
            .private(player, Change::Gold { player, gold: treasury })
            .private(player, Change::Goods(cargo))
            .public(Change::Goods(stock))
    }

    /// Assigns `unit` to `work_location`.
    pub fn work(
        &mut self,
        player: PlayerId,
        unit: &UnitId,
        work_location: &WorkLocationId,
    ) -> ChangeSet {
        let Some(u) = self.state.unit_mut(unit.as_str()) else {
            return vanished(unit);
        };
        u.location = Location::WorkLocation(work_location.clone());
        let view = u.view();

        tracing::info!(%player, %unit, %work_location, "unit assigned to work");
        ChangeSet::new().private(player, Change::Unit(view))
    }

    /// Moves `unit` out of its work location onto the colony tile.
    pub fn put_outside_colony(&mut self, player: PlayerId, unit: &UnitId) -> ChangeSet {
        let tile = match self
            .state
            .unit(unit.as_str())
            .and_then(|u| self.state.colony_of(u))
        {
            Some(colony) => colony.tile,
            None => return vanished(unit),
        };
        let Some(u) = self.state.unit_mut(unit.as_str()) else {
            return vanished(unit);
        };
        u.location = Location::Tile(tile);
        let view = u.view();

        tracing::info!(%player, %unit, %tile, "unit put outside colony");
        ChangeSet::new().private(player, Change::Unit(view))
    }

    /// Removes `unit` from the game.
    pub fn disband_unit(&mut self, player: PlayerId, unit: &UnitId) -> ChangeSet {
        if self.state.remove_unit(unit.as_str()).is_none() {
            return vanished(unit);
        }

        tracing::info!(%player, %unit, "unit disbanded");
        ChangeSet::new().public(Change::Removed {
            id: unit.as_str().to_string(),
        })
    }

    /// `unit` (a scout) speaks to the chief of `settlement`, revealing
    /// what the settlement teaches and wants.
    pub fn scout_speak_to_chief(
        &mut self,
        player: PlayerId,
        unit: &UnitId,
        settlement: &SettlementId,
    ) -> ChangeSet {
        let Some(s) = self.state.settlement_mut(settlement.as_str()) else {
            return vanished(settlement);
        };
        let first_visit = s.visited_by.insert(player);
        let view = s.view_for(player);

        tracing::info!(%player, %unit, %settlement, first_visit, "scout spoke to chief");
        ChangeSet::new().private(player, Change::Settlement(view))
    }
}
