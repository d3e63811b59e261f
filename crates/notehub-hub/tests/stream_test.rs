//! End-to-end stream scenarios over real WebSocket connections.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use notehub_core::config::server::ServerConfig;
use notehub_hub::HubServer;
use notehub_proto::{Envelope, Payload, SERVER_SENDER, codec};

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_hub() -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        session_buffer_size: 64,
    };
    let server = HubServer::bind(&config).await.expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: SocketAddr, name: &str) -> ClientStream {
    let (mut ws, _) = connect_async(format!("ws://{addr}"))
        .await
        .expect("connect");
    let login = codec::encode(&Envelope::login(name)).expect("encode login");
    ws.send(login).await.expect("send login");
    ws
}

async fn next_envelope(ws: &mut ClientStream) -> Envelope {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, ws.next())
            .await
            .expect("timed out waiting for envelope")
            .expect("stream ended")
            .expect("stream error");
        if let Message::Text(text) = frame {
            return codec::decode(&text).expect("decode");
        }
    }
}

fn text_of(env: &Envelope) -> &str {
    match &env.payload {
        Some(Payload::Message { text }) => text,
        other => panic!("expected message payload, got {other:?}"),
    }
}

#[tokio::test]
async fn test_message_fans_out_to_all_sessions_in_order() {
    let addr = start_hub().await;

    let mut alice = connect(addr, "alice").await;
    assert_eq!(text_of(&next_envelope(&mut alice).await), "alice logged in!");

    let mut bob = connect(addr, "bob").await;
    assert_eq!(text_of(&next_envelope(&mut bob).await), "bob logged in!");
    assert_eq!(text_of(&next_envelope(&mut alice).await), "bob logged in!");

    let hi = codec::encode(&Envelope::message("alice", "hi")).expect("encode");
    alice.send(hi).await.expect("send");

    for ws in [&mut alice, &mut bob] {
        let env = next_envelope(ws).await;
        assert_eq!(env.sender, "alice");
        assert_eq!(text_of(&env), "hi");
    }
}

#[tokio::test]
async fn test_per_sender_fifo_across_the_hub() {
    let addr = start_hub().await;

    let mut alice = connect(addr, "alice").await;
    let _ = next_envelope(&mut alice).await;
    let mut bob = connect(addr, "bob").await;
    let _ = next_envelope(&mut bob).await;
    let _ = next_envelope(&mut alice).await;

    for i in 0..10 {
        let frame = codec::encode(&Envelope::message("alice", format!("m{i}"))).expect("encode");
        alice.send(frame).await.expect("send");
    }

    for i in 0..10 {
        let env = next_envelope(&mut bob).await;
        assert_eq!(env.sender, "alice");
        assert_eq!(text_of(&env), &format!("m{i}"));
    }
}

#[tokio::test]
async fn test_abrupt_disconnect_broadcasts_single_logout() {
    let addr = start_hub().await;

    let mut alice = connect(addr, "alice").await;
    let _ = next_envelope(&mut alice).await;
    let mut bob = connect(addr, "bob").await;
    let _ = next_envelope(&mut bob).await;
    let _ = next_envelope(&mut alice).await;

    // Drop bob's socket without a close handshake.
    drop(bob);

    let notice = next_envelope(&mut alice).await;
    assert_eq!(notice.sender, SERVER_SENDER);
    assert_eq!(text_of(&notice), "bob logged out!");

    // Nothing further: a message from alice is the next thing she sees.
    let frame = codec::encode(&Envelope::message("alice", "still here")).expect("encode");
    alice.send(frame).await.expect("send");
    assert_eq!(text_of(&next_envelope(&mut alice).await), "still here");
}

#[tokio::test]
async fn test_reconnect_with_same_name_tears_down_old_stream() {
    let addr = start_hub().await;

    let mut bob = connect(addr, "bob").await;
    let _ = next_envelope(&mut bob).await;
    let mut alice_old = connect(addr, "alice").await;
    let _ = next_envelope(&mut alice_old).await;
    let _ = next_envelope(&mut bob).await; // alice logged in!

    // Same name again: the hub drops the old session's queue, which
    // must end that whole session even though its reader sits idle.
    let mut alice_new = connect(addr, "alice").await;
    let notice = next_envelope(&mut alice_new).await;
    assert_eq!(text_of(&notice), "alice logged in!");

    // The hub closes the old stream on its own.
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, alice_old.next())
            .await
            .expect("timed out waiting for the old stream to close");
        match frame {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
            Some(Ok(_)) => {}
        }
    }

    // No logout notice for the replaced session: bob's next frames are
    // the replacement login, then live traffic.
    assert_eq!(text_of(&next_envelope(&mut bob).await), "alice logged in!");
    let frame = codec::encode(&Envelope::message("bob", "hello again")).expect("encode");
    bob.send(frame).await.expect("send");
    assert_eq!(text_of(&next_envelope(&mut alice_new).await), "hello again");
    assert_eq!(text_of(&next_envelope(&mut bob).await), "hello again");
}

#[tokio::test]
async fn test_chunk_envelopes_are_broadcast_unmodified() {
    let addr = start_hub().await;

    let mut alice = connect(addr, "alice").await;
    let _ = next_envelope(&mut alice).await;
    let mut bob = connect(addr, "bob").await;
    let _ = next_envelope(&mut bob).await;
    let _ = next_envelope(&mut alice).await;

    let bytes = vec![7u8; 1024];
    let chunk = Envelope::chunk("alice", "cat_1.png", bytes.clone(), ".png");
    alice
        .send(codec::encode(&chunk).expect("encode"))
        .await
        .expect("send");

    // Every connected client receives the chunk, sender included.
    for ws in [&mut alice, &mut bob] {
        let env = next_envelope(ws).await;
        assert_eq!(env.sender, "ftransfer_alice");
        match env.payload {
            Some(Payload::Chunk {
                name,
                bytes: received,
                format,
            }) => {
                assert_eq!(name, "cat_1.png");
                assert_eq!(received, bytes);
                assert_eq!(format, ".png");
            }
            other => panic!("expected chunk payload, got {other:?}"),
        }
    }
}
