//! Recording doubles for the relay's collaborators
//!
//! Used by this crate's tests and by host pipelines that want to exercise a
//! relay without a broker.

use crate::broker::{Connector, ProduceRequest, Producer};
use crate::observability::{Logger, TraceHandle, Tracer};
use crate::tls::ClientOptions;
use crate::RelayError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A producer that collects every request it is sent
#[derive(Debug, Default)]
pub struct RecordingProducer {
    requests: Mutex<Vec<ProduceRequest>>,
    fail_next: Mutex<Option<String>>,
    fail_always: AtomicBool,
}

impl RecordingProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all received requests
    pub fn requests(&self) -> Vec<ProduceRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Configure to fail the next send with `error`
    pub fn fail_next_send(&self, error: impl Into<String>) {
        *self.fail_next.lock() = Some(error.into());
    }

    /// Configure every send to fail
    pub fn fail_all_sends(&self) {
        self.fail_always.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl Producer for RecordingProducer {
    async fn send(&self, request: &ProduceRequest) -> Result<(), RelayError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(RelayError::delivery_failed(&request.topic, error));
        }
        if self.fail_always.load(Ordering::Relaxed) {
            return Err(RelayError::delivery_failed(
                &request.topic,
                "Simulated failure",
            ));
        }

        self.requests.lock().push(request.clone());
        Ok(())
    }
}

/// A connector handing out one shared [`RecordingProducer`]
#[derive(Debug)]
pub struct RecordingConnector {
    producer: Arc<RecordingProducer>,
    connect_error: Option<String>,
    connect_delay: Duration,
    connect_calls: AtomicU64,
    options_seen: Mutex<Vec<ClientOptions>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self {
            producer: Arc::new(RecordingProducer::new()),
            connect_error: None,
            connect_delay: Duration::ZERO,
            connect_calls: AtomicU64::new(0),
            options_seen: Mutex::new(Vec::new()),
        }
    }

    /// Every connect attempt fails with `error`
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            connect_error: Some(error.into()),
            ..Self::new()
        }
    }

    /// Connect succeeds after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self {
            connect_delay: Duration::from_millis(delay_ms),
            ..Self::new()
        }
    }

    pub fn producer(&self) -> Arc<RecordingProducer> {
        Arc::clone(&self.producer)
    }

    pub fn connect_count(&self) -> u64 {
        self.connect_calls.load(Ordering::Relaxed)
    }

    /// Options passed to the most recent connect attempt
    pub fn last_options(&self) -> Option<ClientOptions> {
        self.options_seen.lock().last().cloned()
    }
}

impl Default for RecordingConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn Producer>, RelayError> {
        self.connect_calls.fetch_add(1, Ordering::Relaxed);
        self.options_seen.lock().push(options.clone());

        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }

        match &self.connect_error {
            Some(error) => Err(RelayError::connection_failed(error.clone())),
            None => Ok(self.producer.clone() as Arc<dyn Producer>),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub component: String,
}

/// A logger that keeps every entry in memory
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages logged at `level`, oldest first
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.messages(LogLevel::Error)
            .iter()
            .any(|message| message.contains(needle))
    }

    fn record(&self, level: LogLevel, message: &str, component: &str) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
            component: component.to_string(),
        });
    }
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str, component: &str) {
        self.record(LogLevel::Info, message, component);
    }

    fn error(&self, message: &str, component: &str) {
        self.record(LogLevel::Error, message, component);
    }

    fn debug(&self, message: &str, component: &str) {
        self.record(LogLevel::Debug, message, component);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Transaction,
    Span,
}

type TraceLog = Arc<Mutex<Vec<(TraceKind, String)>>>;

/// A tracer that counts starts and ends
#[derive(Debug, Default)]
pub struct RecordingTracer {
    started: TraceLog,
    ended: TraceLog,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Vec<(TraceKind, String)> {
        self.started.lock().clone()
    }

    pub fn ended(&self) -> Vec<(TraceKind, String)> {
        self.ended.lock().clone()
    }

    pub fn started_count(&self) -> usize {
        self.started.lock().len()
    }

    pub fn ended_count(&self) -> usize {
        self.ended.lock().len()
    }

    pub fn ended_names(&self) -> Vec<String> {
        self.ended.lock().iter().map(|(_, name)| name.clone()).collect()
    }

    /// Handles started but not yet ended
    pub fn open_count(&self) -> usize {
        self.started_count() - self.ended_count()
    }

    fn start(&self, kind: TraceKind, name: &str) -> Box<dyn TraceHandle> {
        self.started.lock().push((kind, name.to_string()));
        Box::new(RecordedHandle {
            kind,
            name: name.to_string(),
            ended: Arc::clone(&self.ended),
        })
    }
}

impl Tracer for RecordingTracer {
    fn start_transaction(&self, name: &str) -> Box<dyn TraceHandle> {
        self.start(TraceKind::Transaction, name)
    }

    fn start_span(&self, name: &str) -> Box<dyn TraceHandle> {
        self.start(TraceKind::Span, name)
    }
}

struct RecordedHandle {
    kind: TraceKind,
    name: String,
    ended: TraceLog,
}

impl TraceHandle for RecordedHandle {
    fn end(self: Box<Self>) {
        let RecordedHandle { kind, name, ended } = *self;
        ended.lock().push((kind, name));
    }
}
