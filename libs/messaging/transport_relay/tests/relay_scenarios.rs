//! End-to-end relay scenarios against recording collaborators

use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use transport_relay::test_utils::{LogLevel, RecordingConnector, RecordingLogger, RecordingTracer};
use transport_relay::{RelayConfig, RelayState, Tier, TransportRelay};

fn build(
    config: RelayConfig,
    connector: RecordingConnector,
) -> (
    Arc<TransportRelay>,
    Arc<RecordingConnector>,
    Arc<RecordingLogger>,
    Arc<RecordingTracer>,
) {
    let connector = Arc::new(connector);
    let logger = Arc::new(RecordingLogger::new());
    let tracer = Arc::new(RecordingTracer::new());
    let relay = Arc::new(TransportRelay::with_connector(
        config,
        connector.clone(),
        logger.clone(),
        tracer.clone(),
    ));
    (relay, connector, logger, tracer)
}

fn config(tier: &str) -> RelayConfig {
    RelayConfig::new("kafka:9093", "topic-a").with_tier(Tier::parse(tier))
}

#[test]
fn dev_tier_without_ca_is_plaintext() {
    let (relay, ..) = build(config("dev"), RecordingConnector::new());
    let options = serde_json::to_value(relay.client_options()).unwrap();
    assert_eq!(options["ssl"], json!(false));
}

#[test]
fn dev_tier_with_ca_is_still_plaintext() {
    let (relay, ..) = build(
        config("development").with_tls_ca("FAKE_CA"),
        RecordingConnector::new(),
    );
    assert!(!relay.tls_policy().is_enabled());
}

#[test]
fn prod_tier_with_ca_trusts_it() {
    let (relay, ..) = build(config("prod").with_tls_ca("FAKE_CA"), RecordingConnector::new());
    let options = serde_json::to_value(relay.client_options()).unwrap();
    assert_eq!(
        options["ssl"],
        json!({ "rejectUnauthorized": false, "ca": ["FAKE_CA"] })
    );
}

#[test]
fn prod_tier_without_ca_uses_empty_list() {
    let (relay, ..) = build(config("prod"), RecordingConnector::new());
    let options = serde_json::to_value(relay.client_options()).unwrap();
    assert_eq!(options["ssl"], json!({ "rejectUnauthorized": false, "ca": [] }));
}

#[tokio::test]
async fn relay_hello_publishes_single_message() {
    let (relay, connector, ..) = build(config("dev"), RecordingConnector::new());
    relay.init().await.unwrap();

    relay.relay("hello").await;

    let requests = connector.producer().requests();
    assert_eq!(
        serde_json::to_value(&requests).unwrap(),
        json!([{ "topic": "topic-a", "messages": [{ "value": "hello" }] }])
    );
}

#[tokio::test]
async fn publish_rejection_is_logged_not_raised() {
    let (relay, connector, logger, tracer) = build(config("dev"), RecordingConnector::new());
    relay.init().await.unwrap();
    connector.producer().fail_next_send("boom");

    relay.relay("hello").await;

    assert!(logger.has_error_containing("boom"));
    assert_eq!(tracer.open_count(), 0);
    assert_eq!(relay.state(), RelayState::Ready);

    // the relay keeps working after an absorbed failure
    relay.relay("again").await;
    assert_eq!(connector.producer().request_count(), 1);
}

#[tokio::test]
async fn failed_init_leaves_relay_unable_to_deliver() {
    let (relay, connector, logger, tracer) =
        build(config("prod"), RecordingConnector::failing("handshake failed"));

    let err = relay.init().await.unwrap_err();
    assert!(err.is_connection_error());

    relay.relay("dropped").await;
    relay.relay(b"dropped too".to_vec()).await;

    assert_eq!(relay.state(), RelayState::Unrecoverable);
    assert_eq!(connector.producer().request_count(), 0);
    assert_eq!(relay.stats().messages_failed, 2);
    assert_eq!(tracer.open_count(), 0);
    assert_eq!(
        logger
            .messages(LogLevel::Error)
            .iter()
            .filter(|m| m.contains("not initialized"))
            .count(),
        2
    );
}

#[tokio::test]
async fn concurrent_relays_share_one_producer() {
    let (relay, connector, _, tracer) = build(config("dev"), RecordingConnector::new());
    relay.init().await.unwrap();

    let sends = (0..50).map(|i| {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move { relay.relay(format!("msg-{}", i)).await })
    });
    for outcome in join_all(sends).await {
        outcome.unwrap();
    }

    let mut values: Vec<String> = connector
        .producer()
        .requests()
        .into_iter()
        .map(|r| r.messages[0].value.clone())
        .collect();
    values.sort();

    assert_eq!(values.len(), 50);
    assert!(values.contains(&"msg-0".to_string()));
    assert!(values.contains(&"msg-49".to_string()));
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(relay.stats().messages_relayed, 50);
    assert_eq!(tracer.started_count(), 100);
    assert_eq!(tracer.open_count(), 0);
}

#[tokio::test]
async fn concurrent_init_connects_once() {
    let (relay, connector, ..) = build(config("dev"), RecordingConnector::slow(20));

    let inits = (0..5).map(|_| {
        let relay = Arc::clone(&relay);
        async move { relay.init().await }
    });
    for outcome in join_all(inits).await {
        outcome.unwrap();
    }

    assert_eq!(connector.connect_count(), 1);
    assert!(relay.is_ready());
}
