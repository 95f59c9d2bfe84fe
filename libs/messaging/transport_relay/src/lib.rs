//! # Transport Relay
//!
//! Thin adapter a processing pipeline uses to hand outbound payloads to a
//! message broker stream.
//!
//! ## Architecture
//!
//! ```text
//! pipeline ──relay(payload)──▶ TransportRelay ──ProduceRequest──▶ Producer ──▶ broker
//!                                  │    ▲
//!                     Logger/Tracer│    │init(): Connector::connect(ClientOptions)
//!                                  ▼    │
//!                         tracing spans + structured logs
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Construct** with an injected [`Logger`] and [`Tracer`]. Configuration is
//!    resolved from `RELAY_*` environment variables and the [`TlsPolicy`] is
//!    derived once: plaintext in development, TLS with relaxed peer
//!    verification elsewhere.
//! 2. **`init()`** connects exactly one producer. Failure is surfaced and
//!    leaves the instance unrecoverable; a repeated call on a ready relay is a
//!    no-op.
//! 3. **`relay(payload)`** normalizes bytes or text to text and publishes one
//!    message. Delivery failures are logged and absorbed, never returned.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transport_relay::{TracingLogger, TracingTracer, TransportRelay};
//!
//! # async fn run() -> Result<(), transport_relay::RelayError> {
//! let relay = TransportRelay::new(Arc::new(TracingLogger), Arc::new(TracingTracer))?;
//! relay.init().await?;
//! relay.relay("{\"event\":\"created\"}").await;
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod observability;
pub mod payload;
pub mod relay;
pub mod test_utils;
pub mod tls;

use async_trait::async_trait;
use std::fmt::Debug;

pub use broker::{Connector, OutboundMessage, ProduceRequest, Producer};
pub use error::RelayError;
#[cfg(feature = "kafka")]
pub use kafka::{KafkaConnector, KafkaProducer};
pub use observability::{
    Logger, TraceGuard, TraceHandle, Tracer, TracingLogger, TracingTracer,
};
pub use payload::Payload;
pub use relay::{RelayState, RelayStats, TransportRelay, COMPONENT};
pub use relay_config::{ConfigurationError, RelayConfig, Tier};
pub use tls::{ClientOptions, TlsPolicy};

/// Broker-agnostic relay stage
///
/// Pipelines hold a `dyn Relay` so the backing broker can change without
/// touching the stage that feeds it.
#[async_trait]
pub trait Relay: Send + Sync + Debug {
    /// Establish connectivity; called once before the first `relay`
    async fn init(&self) -> Result<(), RelayError>;

    /// Publish one payload; never fails from the caller's point of view
    async fn relay(&self, payload: Payload);
}

#[async_trait]
impl Relay for TransportRelay {
    async fn init(&self) -> Result<(), RelayError> {
        TransportRelay::init(self).await
    }

    async fn relay(&self, payload: Payload) {
        TransportRelay::relay(self, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingConnector, RecordingLogger, RecordingTracer};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_relay_through_trait_object() {
        let connector = Arc::new(RecordingConnector::new());
        let relay: Arc<dyn Relay> = Arc::new(TransportRelay::with_connector(
            RelayConfig::new("localhost:9092", "topic-a"),
            connector.clone(),
            Arc::new(RecordingLogger::new()),
            Arc::new(RecordingTracer::new()),
        ));

        relay.init().await.unwrap();
        relay.relay(Payload::from("via trait")).await;

        let requests = connector.producer().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].value, "via trait");
    }
}
