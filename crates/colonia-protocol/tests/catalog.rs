//! Every message variant survives the full trip a request takes:
//! typed value → envelope → bytes → envelope → registry → typed value.

use colonia_protocol::{
    registry, BuyMessage, Codec, DisbandUnitMessage, Envelope, Goods,
    GoodsType, JsonCodec, Message, ProtocolError, PutOutsideColonyMessage,
    ScoutSpeakToChiefMessage, SellMessage, SettlementId, UnitId, WorkMessage,
    WorkLocationId,
};

fn catalog() -> Vec<Message> {
    let unit = UnitId::numbered(12);
    let settlement = SettlementId::numbered(3);
    vec![
        BuyMessage::new(
            &unit,
            &settlement,
            Goods::new(GoodsType::Cloth, 50, Some(settlement.as_str())),
            300,
        )
        .into(),
        SellMessage::new(
            &unit,
            &settlement,
            Goods::new(GoodsType::Furs, 20, Some(unit.as_str())),
            80,
        )
        .into(),
        WorkMessage::new(&unit, &WorkLocationId::numbered(9)).into(),
        PutOutsideColonyMessage::new(&unit).into(),
        DisbandUnitMessage::new(&unit).into(),
        ScoutSpeakToChiefMessage::new(&unit, &settlement).into(),
    ]
}

#[test]
fn test_every_variant_round_trips_through_the_wire() {
    let codec = JsonCodec;
    for msg in catalog() {
        let env = msg.to_envelope();
        let bytes = codec.encode(&env).unwrap();
        let decoded = registry::dispatch(&codec.decode(&bytes).unwrap()).unwrap();

        assert_eq!(decoded.kind(), msg.kind());
        assert_eq!(decoded.to_envelope(), env, "{} round trip", msg.tag());
    }
}

#[test]
fn test_catalog_matches_registry() {
    let mut from_catalog: Vec<_> = catalog().iter().map(Message::tag).collect();
    let mut from_registry: Vec<_> = registry::tags().collect();
    from_catalog.sort_unstable();
    from_registry.sort_unstable();
    assert_eq!(from_catalog, from_registry);
}

#[test]
fn test_unregistered_tag_from_the_wire() {
    let codec = JsonCodec;
    let bytes = codec
        .encode(&Envelope::new("abandonColony").with_attribute("colony", "colony:1"))
        .unwrap();
    let err = registry::dispatch(&codec.decode(&bytes).unwrap()).unwrap_err();
    assert!(matches!(err, ProtocolError::UnknownMessageType(t) if t == "abandonColony"));
}

#[test]
fn test_buy_from_handwritten_json() {
    let text = br#"{
        "tag": "buy",
        "attributes": {"unit": "U1", "settlement": "S1", "gold": "300"},
        "children": [
            {"tag": "goods", "attributes": {"type": "CLOTH", "amount": "50", "location": "S1"}}
        ]
    }"#;
    let env = JsonCodec.decode(text).unwrap();
    let Message::Buy(buy) = registry::dispatch(&env).unwrap() else {
        panic!("expected a buy message");
    };
    assert_eq!(buy.gold(), 300);
    assert_eq!(buy.unit().as_str(), "U1");
    assert_eq!(buy.goods().location.as_deref(), Some("S1"));
}
