//! Handler pipeline tests against the fixed starting world.
//!
//! Every refusal is checked twice: the response carries the right reason,
//! and the state is exactly what it was before the request.

use colonia_game::{handle_message, scenario, GameState, Location};
use colonia_protocol::{
    registry, BuyMessage, Change, Codec, DisbandUnitMessage, Envelope, ErrorReason, Goods,
    GoodsType, JsonCodec, Message, PlayerId, Response, SellMessage, SettlementId, UnitId,
    WireMessage, WorkLocationId, WorkMessage,
};

use scenario::{DUTCH, ENGLISH};

fn world() -> GameState {
    scenario::new_world().unwrap()
}

fn onondaga() -> SettlementId {
    SettlementId::new("settlement:1")
}

fn cloth_at_onondaga(amount: u32) -> Goods {
    Goods::new(GoodsType::Cloth, amount, Some("settlement:1"))
}

/// Handles `message` and asserts it was refused for `reason` without
/// touching the state.
fn assert_refused(state: &mut GameState, player: PlayerId, message: Message, reason: ErrorReason) -> String {
    let before = state.clone();
    let response = handle_message(&message, state, player).build(player);
    let error = response
        .error()
        .unwrap_or_else(|| panic!("expected {reason} error, got {response:?}"));
    assert_eq!(error.reason, reason, "{}", error.message);
    assert_eq!(*state, before, "state changed by a refused request");
    error.message.clone()
}

// =========================================================================
// Buy
// =========================================================================

#[test]
fn test_buy_cloth_from_settlement() {
    let mut state = world();
    let msg = BuyMessage::new(&UnitId::new("unit:2"), &onondaga(), cloth_at_onondaga(50), 300);

    // Through the wire and back, as the server sees it.
    let bytes = JsonCodec.encode(&msg.to_envelope()).unwrap();
    let decoded = registry::dispatch(&JsonCodec.decode(&bytes).unwrap()).unwrap();
    let Message::Buy(buy) = &decoded else {
        panic!("expected buy, got {decoded:?}");
    };
    assert_eq!(buy.gold(), 300);

    let response = handle_message(&decoded, &mut state, DUTCH).build(DUTCH);
    let Response::Update(changes) = &response else {
        panic!("expected update, got {response:?}");
    };
    assert!(changes.contains(&Change::Gold { player: DUTCH, gold: 700 }));
    assert!(changes.contains(&Change::Goods(Goods::new(GoodsType::Cloth, 50, Some("unit:2")))));
    assert!(changes.contains(&Change::Goods(Goods::new(
        GoodsType::Cloth,
        50,
        Some("settlement:1")
    ))));

    assert_eq!(state.player(DUTCH).unwrap().gold, 700);
    assert_eq!(state.unit("unit:2").unwrap().carried(GoodsType::Cloth), 50);
    let settlement = state.settlement("settlement:1").unwrap();
    assert_eq!(settlement.held(GoodsType::Cloth), 50);
    assert_eq!(settlement.gold, 1300);
}

#[test]
fn test_buy_goods_not_at_settlement_is_refused() {
    let mut state = world();
    let goods = Goods::new(GoodsType::Cloth, 50, Some("unit:2"));
    let msg = BuyMessage::new(&UnitId::new("unit:2"), &onondaga(), goods, 300);

    let text = assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::GoodsNotAtSettlement);
    assert!(text.contains("settlement:1"), "{text}");
}

#[test]
fn test_buy_with_non_numeric_gold_is_refused() {
    let mut state = world();
    let envelope = Envelope::new("buy")
        .with_attribute("unit", "unit:2")
        .with_attribute("settlement", "settlement:1")
        .with_attribute("gold", "lots")
        .with_child(cloth_at_onondaga(50).to_envelope());
    let message = registry::dispatch(&envelope).unwrap();
    let Message::Buy(buy) = &message else {
        panic!("expected buy");
    };
    assert!(buy.gold() < 0);

    let text = assert_refused(&mut state, DUTCH, message, ErrorReason::InvalidParameter);
    assert!(text.contains("lots"), "{text}");
}

#[test]
fn test_buy_below_asking_price_is_rejected() {
    let mut state = world();
    let msg = BuyMessage::new(&UnitId::new("unit:2"), &onondaga(), cloth_at_onondaga(50), 299);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::TradeRejected);
}

#[test]
fn test_buy_beyond_treasury_is_rejected() {
    let mut state = world();
    // English have 500 gold; 100 cloth cost 600.
    let msg = BuyMessage::new(&UnitId::new("unit:6"), &onondaga(), cloth_at_onondaga(100), 600);
    assert_refused(&mut state, ENGLISH, msg.into(), ErrorReason::TradeRejected);
}

#[test]
fn test_buy_more_than_stock_is_rejected() {
    let mut state = world();
    let msg = BuyMessage::new(&UnitId::new("unit:2"), &onondaga(), cloth_at_onondaga(101), 606);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::TradeRejected);
}

#[test]
fn test_buy_from_inside_colony_is_not_adjacent() {
    let mut state = world();
    let msg = BuyMessage::new(&UnitId::new("unit:1"), &onondaga(), cloth_at_onondaga(10), 60);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::NotAdjacent);
}

#[test]
fn test_buy_from_europe_is_not_on_map() {
    let mut state = world();
    let msg = BuyMessage::new(&UnitId::new("unit:4"), &onondaga(), cloth_at_onondaga(10), 60);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::NotOnMap);
}

#[test]
fn test_buy_with_foreign_unit_is_unresolved() {
    let mut state = world();
    let msg = BuyMessage::new(&UnitId::new("unit:6"), &onondaga(), cloth_at_onondaga(10), 60);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::UnresolvedReference);
}

// =========================================================================
// Sell
// =========================================================================

#[test]
fn test_sell_furs_to_settlement() {
    let mut state = world();
    let furs = Goods::new(GoodsType::Furs, 40, Some("unit:2"));
    let msg = SellMessage::new(&UnitId::new("unit:2"), &onondaga(), furs, 120);

    let response = handle_message(&Message::from(msg), &mut state, DUTCH).build(DUTCH);
    assert!(!response.is_error(), "{response:?}");

    assert_eq!(state.player(DUTCH).unwrap().gold, 1120);
    assert_eq!(state.unit("unit:2").unwrap().carried(GoodsType::Furs), 60);
    let settlement = state.settlement("settlement:1").unwrap();
    assert_eq!(settlement.held(GoodsType::Furs), 90);
    assert_eq!(settlement.gold, 880);
}

#[test]
fn test_sell_above_bid_is_rejected() {
    let mut state = world();
    let furs = Goods::new(GoodsType::Furs, 40, Some("unit:2"));
    let msg = SellMessage::new(&UnitId::new("unit:2"), &onondaga(), furs, 121);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::TradeRejected);
}

#[test]
fn test_sell_more_than_carried_is_rejected() {
    let mut state = world();
    let furs = Goods::new(GoodsType::Furs, 101, Some("unit:2"));
    let msg = SellMessage::new(&UnitId::new("unit:2"), &onondaga(), furs, 303);
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::TradeRejected);
}

// =========================================================================
// Work
// =========================================================================

#[test]
fn test_work_in_other_colony_names_both_colonies() {
    let mut state = world();
    let msg = WorkMessage::new(&UnitId::new("unit:1"), &WorkLocationId::new("wl:3"));

    let text = assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::WrongColony);
    assert!(text.contains("colony:1"), "{text}");
    assert!(text.contains("colony:2"), "{text}");
    assert_eq!(
        state.unit("unit:1").unwrap().location,
        Location::WorkLocation(WorkLocationId::new("wl:1"))
    );
}

#[test]
fn test_work_at_current_location_cannot_add() {
    let mut state = world();
    let msg = WorkMessage::new(&UnitId::new("unit:1"), &WorkLocationId::new("wl:1"));
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::CannotAdd);
}

#[test]
fn test_work_from_europe_is_not_on_map() {
    let mut state = world();
    let msg = WorkMessage::new(&UnitId::new("unit:4"), &WorkLocationId::new("wl:2"));
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::NotOnMap);
}

#[test]
fn test_work_with_settlement_id_is_wrong_type() {
    let mut state = world();
    let msg = WorkMessage::new(&UnitId::new("unit:1"), &WorkLocationId::new("settlement:1"));
    let text = assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::UnresolvedReference);
    assert!(text.contains("not a work location"), "{text}");
}

// =========================================================================
// Disband
// =========================================================================

#[test]
fn test_disband_unknown_unit_removes_nothing() {
    let mut state = world();
    let count = state.unit_count();
    let msg = DisbandUnitMessage::new(&UnitId::new("unit:999"));

    let text = assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::UnresolvedReference);
    assert!(text.contains("unit:999"), "{text}");
    assert_eq!(state.unit_count(), count);
}

#[test]
fn test_disband_foreign_unit_removes_nothing() {
    let mut state = world();
    let msg = DisbandUnitMessage::new(&UnitId::new("unit:5"));
    assert_refused(&mut state, DUTCH, msg.into(), ErrorReason::UnresolvedReference);
    assert!(state.unit("unit:5").is_some());
}

#[test]
fn test_disband_own_unit() {
    let mut state = world();
    let msg = DisbandUnitMessage::new(&UnitId::new("unit:4"));

    let response = handle_message(&Message::from(msg), &mut state, DUTCH).build(DUTCH);
    assert_eq!(
        response,
        Response::Update(vec![Change::Removed { id: "unit:4".into() }])
    );
    assert!(state.unit("unit:4").is_none());
    assert_eq!(state.unit_count(), 5);
}
