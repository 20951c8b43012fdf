//! End-to-end relay behavior against real sockets.

use std::net::TcpListener as StdTcpListener;
use strake_engine::{
    Engine, EngineConfig, EngineError, InboundHandlerConfig, OutboundHandlerConfig, OutboundKind,
    RoutingRule,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn free_port() -> u16 {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

fn inbound(tag: &str, port: u16) -> InboundHandlerConfig {
    InboundHandlerConfig {
        tag: tag.to_string(),
        listen: "127.0.0.1".to_string(),
        port,
    }
}

fn direct(tag: &str, port: u16) -> OutboundHandlerConfig {
    OutboundHandlerConfig {
        tag: tag.to_string(),
        kind: OutboundKind::Direct {
            address: "127.0.0.1".to_string(),
            port,
        },
    }
}

fn rule(tag: &str, target: &str, inbound: &str) -> RoutingRule {
    RoutingRule {
        tag: tag.to_string(),
        target: target.to_string(),
        inbound_tags: vec![inbound.to_string()],
    }
}

/// Accept one connection and echo everything back.
async fn spawn_echo_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind echo");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if stream.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });
    port
}

#[tokio::test]
async fn relays_bytes_through_a_direct_outbound() {
    let echo_port = spawn_echo_server().await;
    let in_port = free_port();
    let engine = Engine::new(EngineConfig {
        inbounds: vec![inbound("in", in_port)],
        outbounds: vec![direct("out", echo_port)],
        rules: vec![rule("r", "out", "in")],
    })
    .unwrap();
    engine.start().await.unwrap();
    assert!(engine.is_running());

    let mut client = TcpStream::connect(("127.0.0.1", in_port)).await.unwrap();
    client.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 4];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ping");

    engine.stop().await.unwrap();
    assert!(!engine.is_running());
}

#[tokio::test]
async fn blackhole_outbound_drops_the_connection() {
    let in_port = free_port();
    let engine = Engine::new(EngineConfig {
        inbounds: vec![inbound("in", in_port)],
        outbounds: vec![OutboundHandlerConfig {
            tag: "sink".to_string(),
            kind: OutboundKind::Blackhole,
        }],
        rules: vec![],
    })
    .unwrap();
    engine.start().await.unwrap();

    let mut client = TcpStream::connect(("127.0.0.1", in_port)).await.unwrap();
    let mut buf = [0u8; 1];
    // the peer closes without ever replying
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(n, 0);

    engine.stop().await.unwrap();
}

#[tokio::test]
async fn stopped_engine_releases_ports_and_restarts_warm() {
    let in_port = free_port();
    let engine = Engine::new(EngineConfig {
        inbounds: vec![inbound("in", in_port)],
        outbounds: vec![OutboundHandlerConfig {
            tag: "sink".to_string(),
            kind: OutboundKind::Blackhole,
        }],
        rules: vec![],
    })
    .unwrap();
    engine.start().await.unwrap();
    engine.stop().await.unwrap();

    // the port is free again
    let probe = TcpListener::bind(("127.0.0.1", in_port)).await.unwrap();
    drop(probe);

    // registrations survived the stop
    engine.start().await.unwrap();
    assert_eq!(engine.inbound_manager().list(), vec!["in"]);
    TcpStream::connect(("127.0.0.1", in_port)).await.unwrap();
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn handlers_can_be_added_and_removed_while_running() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.start().await.unwrap();

    let port = free_port();
    engine
        .inbound_manager()
        .add(inbound("late", port))
        .await
        .unwrap();
    TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    let err = engine
        .inbound_manager()
        .add(inbound("late", free_port()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TagInUse(_)));

    engine.inbound_manager().remove("late").await.unwrap();
    assert!(engine.inbound_manager().list().is_empty());
    // the accept loop has exited, so the port can be rebound
    let probe = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    drop(probe);

    engine.stop().await.unwrap();
}

#[tokio::test]
async fn bind_conflict_surfaces_as_a_bind_error() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.start().await.unwrap();
    let err = engine
        .inbound_manager()
        .add(inbound("clash", port))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Bind { port: p, .. } if p == port));
    engine.stop().await.unwrap();
}
