//! Logging and tracing collaborators
//!
//! The relay is handed a [`Logger`] and a [`Tracer`] at construction instead of
//! reaching for globals, so a host pipeline can route both into whatever sink
//! and APM agent it already runs. [`TracingLogger`] and [`TracingTracer`]
//! forward to the `tracing` ecosystem and are what most hosts want.

use std::fmt::Debug;
use tracing::Span;

/// Sink for `(message, component)` log events
pub trait Logger: Send + Sync + Debug {
    fn info(&self, message: &str, component: &str);

    fn error(&self, message: &str, component: &str);

    fn debug(&self, message: &str, component: &str) {
        let _ = (message, component);
    }
}

/// Handle for a started transaction or span
pub trait TraceHandle: Send + Sync {
    /// Finish the transaction or span
    fn end(self: Box<Self>);

    /// `tracing` span that work under this handle is instrumented with
    fn span(&self) -> Span {
        Span::none()
    }
}

/// Application performance tracer
pub trait Tracer: Send + Sync + Debug {
    fn start_transaction(&self, name: &str) -> Box<dyn TraceHandle>;

    /// Start a span under whatever transaction is current
    fn start_span(&self, name: &str) -> Box<dyn TraceHandle>;
}

/// Ends its handle exactly once, explicitly or on drop
#[must_use = "dropping the guard ends the trace immediately"]
pub struct TraceGuard {
    handle: Option<Box<dyn TraceHandle>>,
}

impl TraceGuard {
    pub fn new(handle: Box<dyn TraceHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn span(&self) -> Span {
        self.handle
            .as_ref()
            .map(|handle| handle.span())
            .unwrap_or_else(Span::none)
    }

    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.end();
        }
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Forwards log events to `tracing` with a `component` field
#[derive(Debug, Default, Clone)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, component: &str) {
        tracing::info!(component, "{}", message);
    }

    fn error(&self, message: &str, component: &str) {
        tracing::error!(component, "{}", message);
    }

    fn debug(&self, message: &str, component: &str) {
        tracing::debug!(component, "{}", message);
    }
}

/// Maps transactions and spans onto `tracing` spans
///
/// Spans pick up the current `tracing` span as their parent, so a span started
/// inside a future instrumented with a transaction's span nests under it.
#[derive(Debug, Default, Clone)]
pub struct TracingTracer;

struct TracingHandle {
    span: Span,
}

impl TraceHandle for TracingHandle {
    fn end(self: Box<Self>) {
        // Closes once the last clone handed out through `span()` is dropped
        drop(self.span);
    }

    fn span(&self) -> Span {
        self.span.clone()
    }
}

impl Tracer for TracingTracer {
    fn start_transaction(&self, name: &str) -> Box<dyn TraceHandle> {
        Box::new(TracingHandle {
            span: tracing::info_span!("transaction", name = %name),
        })
    }

    fn start_span(&self, name: &str) -> Box<dyn TraceHandle> {
        Box::new(TracingHandle {
            span: tracing::info_span!("span", name = %name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingTracer;

    #[test]
    fn test_guard_ends_once_when_ended_explicitly() {
        let tracer = RecordingTracer::new();
        let guard = TraceGuard::new(tracer.start_transaction("tx"));
        assert_eq!(tracer.open_count(), 1);

        guard.end();
        assert_eq!(tracer.started_count(), 1);
        assert_eq!(tracer.ended_count(), 1);
        assert_eq!(tracer.open_count(), 0);
    }

    #[test]
    fn test_guard_ends_on_drop() {
        let tracer = RecordingTracer::new();
        {
            let _guard = TraceGuard::new(tracer.start_span("work"));
        }
        assert_eq!(tracer.ended_names(), vec!["work".to_string()]);
    }

    #[test]
    fn test_tracing_defaults_do_not_panic_without_subscriber() {
        let logger = TracingLogger;
        logger.info("hello", "test");
        logger.error("oops", "test");
        logger.debug("details", "test");

        let tracer = TracingTracer;
        let transaction = TraceGuard::new(tracer.start_transaction("tx"));
        let span = TraceGuard::new(tracer.start_span("child"));
        span.end();
        transaction.end();
    }
}
