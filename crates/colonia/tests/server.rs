//! End-to-end tests: a real server on an ephemeral port, real WebSocket
//! clients, the fixed starting world.

use std::time::Duration;

use colonia::prelude::*;
use colonia_protocol::{
    BuyMessage, DisbandUnitMessage, Goods, GoodsType, SettlementId, UnitId,
};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

fn auth() -> StaticAuthenticator {
    StaticAuthenticator::new()
        .with_player("dutch", scenario::DUTCH)
        .with_player("english", scenario::ENGLISH)
}

/// Starts a server on a random port and returns its address and game.
async fn start_server() -> (String, GameHandle) {
    start_server_with(ColoniaServerBuilder::new()).await
}

async fn start_server_with(builder: ColoniaServerBuilder) -> (String, GameHandle) {
    let server = builder
        .bind("127.0.0.1:0")
        .build(auth(), scenario::new_world().unwrap())
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr").to_string();
    let game = server.game();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, game)
}

/// Reads frames until the server closes the connection. Returns how
/// many frames arrived first, or `None` if it stayed open past `limit`.
async fn frames_until_closed(ws: &mut ClientWs, limit: Duration) -> Option<usize> {
    let deadline = tokio::time::Instant::now() + limit;
    let mut frames = 0;
    loop {
        match tokio::time::timeout_at(deadline, ws.next()).await {
            Err(_) => return None,
            Ok(Some(Ok(WsMessage::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => {
                return Some(frames);
            }
            Ok(Some(Ok(_))) => frames += 1,
        }
    }
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, envelope: &Envelope) {
    let text = String::from_utf8(JsonCodec.encode(envelope).unwrap()).unwrap();
    ws.send(WsMessage::Text(text.into())).await.expect("send");
}

async fn recv(ws: &mut ClientWs) -> Envelope {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("frame error");
    JsonCodec.decode(msg.into_data().as_ref()).expect("decode")
}

async fn recv_response(ws: &mut ClientWs) -> Response {
    Response::from_envelope(&recv(ws).await).expect("response")
}

/// Logs in and returns the ack and the starting snapshot.
async fn login(ws: &mut ClientWs, login: Login) -> (LoginAck, Response) {
    send(ws, &login.to_envelope()).await;
    let ack = LoginAck::from_envelope(&recv(ws).await).expect("loginAck");
    let snapshot = recv_response(ws).await;
    (ack, snapshot)
}

/// Sends a login that must be refused and returns the error.
async fn refused_login(ws: &mut ClientWs, envelope: &Envelope) -> ClientError {
    send(ws, envelope).await;
    let reply = recv(ws).await;
    assert_eq!(reply.tag, ClientError::TAG, "expected error, got {reply:?}");
    ClientError::from_envelope(&reply).unwrap()
}

fn buy_cloth() -> Envelope {
    BuyMessage::new(
        &UnitId::new("unit:2"),
        &SettlementId::new("settlement:1"),
        Goods::new(GoodsType::Cloth, 50, Some("settlement:1")),
        300,
    )
    .to_envelope()
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn test_login_returns_ack_and_snapshot() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;

    let (ack, snapshot) = login(&mut ws, Login::new("dutch")).await;
    assert_eq!(ack.player, scenario::DUTCH);
    assert_eq!(ack.reconnect_token.len(), 32);
    assert_eq!(
        snapshot.changes()[0],
        Change::Gold { player: scenario::DUTCH, gold: 1000 }
    );
}

#[tokio::test]
async fn test_login_version_mismatch() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;

    let mut bad = Login::new("dutch");
    bad.version = "999".into();
    let error = refused_login(&mut ws, &bad.to_envelope()).await;
    assert_eq!(error.reason, ErrorReason::InvalidParameter);
    assert!(error.message.contains("999"));
}

#[tokio::test]
async fn test_login_unknown_token() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;

    let error = refused_login(&mut ws, &Login::new("spanish").to_envelope()).await;
    assert_eq!(error.reason, ErrorReason::NotAuthenticated);
}

#[tokio::test]
async fn test_first_message_must_be_login() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;

    let error = refused_login(&mut ws, &buy_cloth()).await;
    assert_eq!(error.reason, ErrorReason::NotAuthenticated);
}

#[tokio::test]
async fn test_second_login_for_connected_player_is_refused() {
    let (addr, _game) = start_server().await;
    let mut first = connect(&addr).await;
    login(&mut first, Login::new("dutch")).await;

    let mut second = connect(&addr).await;
    let error = refused_login(&mut second, &Login::new("dutch").to_envelope()).await;
    assert_eq!(error.reason, ErrorReason::NotAuthenticated);
}

#[tokio::test]
async fn test_reconnect_resumes_session() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;
    let (ack, _) = login(&mut ws, Login::new("dutch")).await;
    drop(ws);

    // Let the server notice the drop and release the session.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut ws = connect(&addr).await;
    let (resumed, _) = login(&mut ws, Login::reconnect("dutch", ack.reconnect_token.as_str())).await;
    assert_eq!(resumed.player, scenario::DUTCH);
    assert_eq!(resumed.reconnect_token, ack.reconnect_token);
}

#[tokio::test]
async fn test_reconnect_with_someone_elses_token_is_refused() {
    let (addr, _game) = start_server().await;
    let mut dutch = connect(&addr).await;
    let (ack, _) = login(&mut dutch, Login::new("dutch")).await;

    let mut english = connect(&addr).await;
    let stolen = Login::reconnect("english", ack.reconnect_token.as_str());
    let error = refused_login(&mut english, &stolen.to_envelope()).await;
    assert_eq!(error.reason, ErrorReason::NotAuthenticated);
}

// =========================================================================
// Requests
// =========================================================================

#[tokio::test]
async fn test_buy_over_the_wire() {
    let (addr, game) = start_server().await;
    let mut ws = connect(&addr).await;
    login(&mut ws, Login::new("dutch")).await;

    send(&mut ws, &buy_cloth()).await;
    let response = recv_response(&mut ws).await;
    assert!(
        response
            .changes()
            .contains(&Change::Gold { player: scenario::DUTCH, gold: 700 }),
        "{response:?}"
    );

    let state = game.state().await.unwrap();
    assert_eq!(state.player(scenario::DUTCH).unwrap().gold, 700);
}

#[tokio::test]
async fn test_disband_unknown_unit_over_the_wire() {
    let (addr, game) = start_server().await;
    let mut ws = connect(&addr).await;
    login(&mut ws, Login::new("dutch")).await;

    send(&mut ws, &DisbandUnitMessage::new(&UnitId::new("unit:999")).to_envelope()).await;
    let response = recv_response(&mut ws).await;
    assert_eq!(response.error().unwrap().reason, ErrorReason::UnresolvedReference);

    assert_eq!(game.state().await.unwrap().unit_count(), 6);
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;
    login(&mut ws, Login::new("dutch")).await;

    ws.send(WsMessage::Text("not json".into())).await.unwrap();
    let response = recv_response(&mut ws).await;
    assert_eq!(response.error().unwrap().reason, ErrorReason::MalformedEnvelope);

    // The connection still serves requests.
    send(&mut ws, &DisbandUnitMessage::new(&UnitId::new("unit:4")).to_envelope()).await;
    let response = recv_response(&mut ws).await;
    assert_eq!(
        response,
        Response::Update(vec![Change::Removed { id: "unit:4".into() }])
    );
}

#[tokio::test]
async fn test_unknown_tag_is_answered_with_error() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;
    login(&mut ws, Login::new("dutch")).await;

    send(&mut ws, &Envelope::new("declareIndependence")).await;
    let response = recv_response(&mut ws).await;
    let error = response.error().unwrap();
    assert_eq!(error.reason, ErrorReason::UnknownMessage);
    assert!(error.message.contains("declareIndependence"));
}

#[tokio::test]
async fn test_other_players_see_public_changes() {
    let (addr, _game) = start_server().await;
    let mut dutch = connect(&addr).await;
    let mut english = connect(&addr).await;
    login(&mut dutch, Login::new("dutch")).await;
    login(&mut english, Login::new("english")).await;

    send(&mut dutch, &buy_cloth()).await;
    recv_response(&mut dutch).await;

    let pushed = recv_response(&mut english).await;
    assert_eq!(
        pushed,
        Response::Update(vec![Change::Goods(Goods::new(
            GoodsType::Cloth,
            50,
            Some("settlement:1")
        ))])
    );
}

#[tokio::test]
async fn test_logout_closes_connection() {
    let (addr, _game) = start_server().await;
    let mut ws = connect(&addr).await;
    login(&mut ws, Login::new("dutch")).await;

    send(&mut ws, &Logout::to_envelope()).await;

    let result = tokio::time::timeout(Duration::from_secs(2), ws.next()).await;
    match result {
        Ok(Some(Ok(WsMessage::Close(_)))) | Ok(None) => {}
        Ok(Some(Err(_))) => {}
        other => panic!("expected close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sub_second_idle_timeout_is_honoured() {
    let builder = ColoniaServerBuilder::new().idle_timeout(Duration::from_millis(500));
    let (addr, _game) = start_server_with(builder).await;
    let mut ws = connect(&addr).await;
    login(&mut ws, Login::new("dutch")).await;

    // A request sent straight away is answered.
    send(&mut ws, &DisbandUnitMessage::new(&UnitId::new("unit:4")).to_envelope()).await;
    let response = recv_response(&mut ws).await;
    assert!(!response.is_error(), "{response:?}");

    // Then silence closes the connection.
    assert_eq!(frames_until_closed(&mut ws, Duration::from_secs(2)).await, Some(0));
}

#[tokio::test]
async fn test_zero_idle_timeout_is_rejected() {
    let result = ColoniaServerBuilder::new()
        .bind("127.0.0.1:0")
        .idle_timeout(Duration::from_micros(10))
        .build(auth(), scenario::new_world().unwrap())
        .await;
    assert!(matches!(result, Err(ColoniaError::Config(_))));
}

#[tokio::test]
async fn test_pushed_updates_do_not_keep_idle_connection_open() {
    let builder = ColoniaServerBuilder::new().idle_timeout(Duration::from_secs(1));
    let (addr, _game) = start_server_with(builder).await;
    let mut dutch = connect(&addr).await;
    let mut english = connect(&addr).await;
    login(&mut dutch, Login::new("dutch")).await;
    login(&mut english, Login::new("english")).await;

    // The English trade every 300ms; each trade is pushed to the Dutch,
    // who send nothing themselves.
    let trader = tokio::spawn(async move {
        let buy = BuyMessage::new(
            &UnitId::new("unit:6"),
            &SettlementId::new("settlement:1"),
            Goods::new(GoodsType::Cloth, 5, Some("settlement:1")),
            30,
        )
        .to_envelope();
        for _ in 0..10 {
            send(&mut english, &buy).await;
            let response = recv_response(&mut english).await;
            assert!(!response.is_error(), "{response:?}");
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
    });

    let pushed = frames_until_closed(&mut dutch, Duration::from_millis(2500)).await;
    let pushed = pushed.expect("idle connection should be closed despite pushed updates");
    assert!(pushed >= 1, "the Dutch should have seen some trades first");

    trader.abort();
}
