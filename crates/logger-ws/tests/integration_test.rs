//! End-to-end streaming through a real websocket

use fanlog::{Logger, LoggerConfig};
use fanlog_ws::LogStreamServer;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

fn quiet_logger() -> Arc<Logger> {
    Arc::new(
        Logger::with_config(LoggerConfig {
            console: false,
            ..LoggerConfig::default()
        })
        .expect("Failed to create logger"),
    )
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..250 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

async fn start_server(logger: &Arc<Logger>) -> LogStreamServer {
    let server = LogStreamServer::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(logger))
        .await
        .expect("Failed to bind");
    server.start().expect("Failed to start");
    server
}

#[tokio::test]
async fn test_subscriber_receives_lines() {
    let _ = tracing_subscriber::fmt::try_init();

    let logger = quiet_logger();
    let server = start_server(&logger).await;

    let url = format!("ws://{}/log", server.local_addr());
    let (mut client, _) = connect_async(url).await.expect("Failed to connect");
    wait_for(|| logger.is_network_enabled()).await;

    logger.with_tag("BSC").with_field("a", 1).info("hello");

    let message = timeout(Duration::from_secs(5), client.next())
        .await
        .expect("Timed out waiting for line")
        .expect("Stream ended")
        .expect("Websocket error");
    let text = message.to_text().expect("Expected a text frame");

    assert!(text.starts_with("[I] "), "{text}");
    assert!(text.ends_with("[BSC] hello {\"a\":1}"), "{text}");

    // Once the client is gone the destination drops itself.
    drop(client);
    wait_for(|| {
        logger.info("anyone there?");
        !logger.is_network_enabled()
    })
    .await;

    server.shutdown().await;
}

#[tokio::test]
async fn test_new_subscriber_replaces_old() {
    let _ = tracing_subscriber::fmt::try_init();

    let logger = quiet_logger();
    let server = start_server(&logger).await;
    let url = format!("ws://{}/log", server.local_addr());

    let (mut first, _) = connect_async(url.as_str()).await.expect("Failed to connect");
    wait_for(|| logger.is_network_enabled()).await;

    let (mut second, _) = connect_async(url.as_str()).await.expect("Failed to connect");

    // Keep logging until the second subscriber is the one being written to.
    let mut reached_second = false;
    for _ in 0..250 {
        logger.warn("handover");
        if let Ok(Some(Ok(_))) = timeout(Duration::from_millis(20), second.next()).await {
            reached_second = true;
            break;
        }
    }
    assert!(reached_second, "second subscriber never received a line");

    // The first subscriber is closed; anything it got before that is a handover line.
    loop {
        let next = timeout(Duration::from_secs(5), first.next())
            .await
            .expect("First subscriber was never closed");
        match next {
            Some(Ok(message @ Message::Text(_))) => {
                let text = message.to_text().expect("Expected a text frame");
                assert!(text.ends_with("handover"), "{text}");
            }
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
            Some(Ok(_)) => {}
        }
    }

    server.shutdown().await;
}

#[tokio::test]
async fn test_start_twice_fails() {
    let logger = quiet_logger();
    let server = start_server(&logger).await;

    assert!(matches!(
        server.start(),
        Err(fanlog_ws::Error::AlreadyStarted)
    ));

    server.shutdown().await;
}

#[tokio::test]
async fn test_bind_reports_taken_address() {
    let logger = quiet_logger();
    let server = start_server(&logger).await;
    let taken = server.local_addr();

    match LogStreamServer::bind(taken, Arc::clone(&logger)).await {
        Err(fanlog_ws::Error::Bind { addr, source }) => {
            assert_eq!(addr, taken);
            assert_eq!(source.kind(), std::io::ErrorKind::AddrInUse);
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("bound an address already in use"),
    }

    server.shutdown().await;
}
