//! Transport relay bound to one broker stream
//!
//! `TransportRelay` owns at most one producer handle. `init()` establishes it
//! once; `relay()` publishes through it from any number of concurrent callers.
//! A failed `init()` leaves the instance unrecoverable: the caller decides
//! whether to build a new one.

use crate::broker::{Connector, ProduceRequest, Producer};
use crate::observability::{Logger, TraceGuard, Tracer};
use crate::tls::{ClientOptions, TlsPolicy};
use crate::{Payload, RelayError};
use parking_lot::RwLock;
use relay_config::RelayConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;

/// Component name attached to every log event
pub const COMPONENT: &str = "transport-relay";

const TRANSACTION_NAME: &str = "transport.relay";
const SPAN_NAME: &str = "relay";

/// Lifecycle state of a relay instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Constructed, no connection yet
    Uninitialized,
    /// Producer connected and reusable
    Ready,
    /// `init()` failed; terminal for this instance
    Unrecoverable,
}

impl RelayState {
    pub fn is_ready(&self) -> bool {
        matches!(self, RelayState::Ready)
    }
}

#[derive(Debug, Clone)]
enum Connection {
    Uninitialized,
    Ready(Arc<dyn Producer>),
    Unrecoverable(String),
}

/// Counters snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStats {
    pub state: RelayState,
    pub messages_relayed: u64,
    pub messages_failed: u64,
    pub bytes_relayed: u64,
}

#[derive(Debug)]
pub struct TransportRelay {
    config: RelayConfig,

    /// Derived once at construction
    options: ClientOptions,

    connector: Arc<dyn Connector>,

    /// Never held across an await
    connection: RwLock<Connection>,

    /// Serializes `init()` so at most one connect is in flight
    init_mutex: Mutex<()>,

    logger: Arc<dyn Logger>,
    tracer: Arc<dyn Tracer>,

    messages_relayed: AtomicU64,
    messages_failed: AtomicU64,
    bytes_relayed: AtomicU64,
}

impl TransportRelay {
    /// Resolve configuration from the environment and back the relay with Kafka
    #[cfg(feature = "kafka")]
    pub fn new(logger: Arc<dyn Logger>, tracer: Arc<dyn Tracer>) -> Result<Self, RelayError> {
        Self::from_env(Arc::new(crate::kafka::KafkaConnector::new()), logger, tracer)
    }

    /// Resolve configuration from the environment with a caller-chosen connector
    pub fn from_env(
        connector: Arc<dyn Connector>,
        logger: Arc<dyn Logger>,
        tracer: Arc<dyn Tracer>,
    ) -> Result<Self, RelayError> {
        let config = RelayConfig::resolve()?;
        Ok(Self::with_connector(config, connector, logger, tracer))
    }

    pub fn with_connector(
        config: RelayConfig,
        connector: Arc<dyn Connector>,
        logger: Arc<dyn Logger>,
        tracer: Arc<dyn Tracer>,
    ) -> Self {
        let options = ClientOptions::from_config(&config);

        Self {
            config,
            options,
            connector,
            connection: RwLock::new(Connection::Uninitialized),
            init_mutex: Mutex::new(()),
            logger,
            tracer,
            messages_relayed: AtomicU64::new(0),
            messages_failed: AtomicU64::new(0),
            bytes_relayed: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn client_options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn tls_policy(&self) -> &TlsPolicy {
        &self.options.ssl
    }

    pub fn stream(&self) -> &str {
        &self.config.stream
    }

    pub fn state(&self) -> RelayState {
        match &*self.connection.read() {
            Connection::Uninitialized => RelayState::Uninitialized,
            Connection::Ready(_) => RelayState::Ready,
            Connection::Unrecoverable(_) => RelayState::Unrecoverable,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            state: self.state(),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
            bytes_relayed: self.bytes_relayed.load(Ordering::Relaxed),
        }
    }

    /// Connect the producer
    ///
    /// A second call on a ready relay is a no-op. After a failed call every
    /// later call fails with [`RelayError::Unrecoverable`] without reconnecting.
    pub async fn init(&self) -> Result<(), RelayError> {
        let _guard = self.init_mutex.lock().await;

        let current = self.connection.read().clone();
        match current {
            Connection::Ready(_) => {
                self.logger.debug(
                    "init() on a ready relay, keeping the existing connection",
                    COMPONENT,
                );
                return Ok(());
            }
            Connection::Unrecoverable(reason) => return Err(RelayError::Unrecoverable(reason)),
            Connection::Uninitialized => {}
        }

        let brokers = self.config.broker_address();
        self.logger
            .info(&format!("Connecting to brokers {}", brokers), COMPONENT);

        match self.connector.connect(&self.options).await {
            Ok(producer) => {
                *self.connection.write() = Connection::Ready(producer);
                self.logger
                    .info(&format!("✅ Connected to brokers {}", brokers), COMPONENT);
                Ok(())
            }
            Err(e) => {
                *self.connection.write() = Connection::Unrecoverable(e.to_string());
                self.logger.error(
                    &format!("Connection to brokers {} failed: {}", brokers, e),
                    COMPONENT,
                );
                Err(e)
            }
        }
    }

    /// Publish one payload, absorbing any failure
    ///
    /// Failures are logged at error level and never reach the caller; one
    /// failed delivery must not take down the pipeline hosting the relay.
    pub async fn relay(&self, payload: impl Into<Payload>) {
        let _ = self
            .traced(payload.into(), |e| {
                self.logger.error(&format!("Relay failed: {}", e), COMPONENT)
            })
            .await;
    }

    /// Publish one payload and report the outcome
    pub async fn try_relay(&self, payload: impl Into<Payload>) -> Result<(), RelayError> {
        self.traced(payload.into(), |_| {}).await
    }

    /// Deliver under a transaction; `on_error` runs before the transaction ends
    async fn traced(
        &self,
        payload: Payload,
        on_error: impl FnOnce(&RelayError),
    ) -> Result<(), RelayError> {
        let transaction = TraceGuard::new(self.tracer.start_transaction(TRANSACTION_NAME));
        let result = self
            .deliver(payload)
            .instrument(transaction.span())
            .await;
        if let Err(e) = &result {
            on_error(e);
        }
        transaction.end();
        result
    }

    async fn deliver(&self, payload: Payload) -> Result<(), RelayError> {
        let span = TraceGuard::new(self.tracer.start_span(SPAN_NAME));

        let request = ProduceRequest::single(&self.config.stream, payload.into_text());
        self.logger.info(
            &format!("Relaying message to stream {}", self.config.stream),
            COMPONENT,
        );

        let result = match self.producer() {
            Some(producer) => producer.send(&request).instrument(span.span()).await,
            None => Err(RelayError::not_initialized(&self.config.stream)),
        };

        match result {
            Ok(()) => {
                self.messages_relayed.fetch_add(1, Ordering::Relaxed);
                self.bytes_relayed
                    .fetch_add(request.size() as u64, Ordering::Relaxed);
                span.end();
                Ok(())
            }
            Err(e) => {
                // span is ended when the guard drops
                self.messages_failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    fn producer(&self) -> Option<Arc<dyn Producer>> {
        match &*self.connection.read() {
            Connection::Ready(producer) => Some(Arc::clone(producer)),
            _ => None,
        }
    }
}
