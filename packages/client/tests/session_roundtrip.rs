//! End-to-end tests: real sessions talking to an in-process relay server.

use std::{sync::Arc, time::Duration};

use tokio::{net::TcpListener, sync::watch};

use hiroba_client::{
    ChatSession, ClientConfig, ConnectionState, ReconnectPolicy, Role, RoomId, SessionState,
};
use hiroba_server::state::AppState;

const WAIT: Duration = Duration::from_secs(5);

/// Start a relay server on an ephemeral port and return its WebSocket URL
async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(hiroba_server::serve(listener, Arc::new(AppState::new())));
    format!("ws://{}/ws", addr)
}

/// Start a session and wait until it is connected
async fn connect(url: &str) -> ChatSession {
    let config = ClientConfig::new(url).with_reconnect(ReconnectPolicy::disabled());
    let session = ChatSession::start(config);
    let mut state = session.connection_state();
    tokio::time::timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .expect("session did not connect")
        .unwrap();
    session
}

async fn wait_for(session: &ChatSession, predicate: impl FnMut(&SessionState) -> bool) {
    let mut rx: watch::Receiver<SessionState> = session.subscribe();
    tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("state did not reach the expected value")
        .unwrap();
}

#[tokio::test]
async fn test_two_clients_chat_in_same_room() {
    // テスト項目: 同じルームの 2 クライアント間でメッセージが届き、人数が同期される
    // given (前提条件):
    let url = start_server().await;
    let alice = connect(&url).await;
    let bob = connect(&url).await;

    // when (操作):
    alice.join_room(RoomId::new("lobby").unwrap()).unwrap();
    bob.join_room(RoomId::new("lobby").unwrap()).unwrap();
    wait_for(&alice, |s| s.room_client_count() == 2).await;
    alice.send_message("hi bob").unwrap();

    // then (期待する結果):
    wait_for(&bob, |s| !s.chat_history().is_empty()).await;
    let history = bob.chat_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::Server);
    assert_eq!(history[0].message, "hi bob");

    let alice_history = alice.chat_history();
    assert_eq!(alice_history.len(), 1);
    assert_eq!(alice_history[0].role, Role::User);
    wait_for(&alice, |s| s.total_client_count() == 2).await;
}

#[tokio::test]
async fn test_other_room_counts_do_not_leak() {
    // テスト項目: 別のルームの人数変化は現在のルームの人数に影響しない
    // given (前提条件):
    let url = start_server().await;
    let alice = connect(&url).await;
    let bob = connect(&url).await;
    alice.join_room(RoomId::new("lobby").unwrap()).unwrap();
    bob.join_room(RoomId::new("lobby").unwrap()).unwrap();
    wait_for(&alice, |s| s.room_client_count() == 2).await;

    // when (操作):
    let carol = connect(&url).await;
    carol.join_room(RoomId::new("annex").unwrap()).unwrap();
    wait_for(&carol, |s| s.room_client_count() == 1).await;
    bob.send_message("still two of us").unwrap();
    wait_for(&alice, |s| !s.chat_history().is_empty()).await;

    // then (期待する結果):
    assert_eq!(alice.room_client_count(), 2);
    assert_eq!(alice.chat_room_id(), "lobby");
    assert_eq!(carol.chat_history().len(), 0);
}

#[tokio::test]
async fn test_switching_rooms_keeps_history() {
    // テスト項目: ルームを移動しても以前の履歴は残り、新しいルームのメッセージが追加される
    // given (前提条件):
    let url = start_server().await;
    let alice = connect(&url).await;
    let bob = connect(&url).await;
    alice.join_room(RoomId::new("first").unwrap()).unwrap();
    bob.join_room(RoomId::new("first").unwrap()).unwrap();
    wait_for(&bob, |s| s.room_client_count() == 2).await;
    alice.send_message("in first").unwrap();
    wait_for(&bob, |s| s.chat_history().len() == 1).await;

    // when (操作):
    alice.join_room(RoomId::new("second").unwrap()).unwrap();
    wait_for(&alice, |s| s.room_client_count() == 1).await;
    bob.join_room(RoomId::new("second").unwrap()).unwrap();
    wait_for(&alice, |s| s.room_client_count() == 2).await;
    alice.send_message("in second").unwrap();

    // then (期待する結果):
    wait_for(&bob, |s| s.chat_history().len() == 2).await;
    let messages: Vec<_> = bob
        .chat_history()
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(messages, vec!["in first", "in second"]);
}
