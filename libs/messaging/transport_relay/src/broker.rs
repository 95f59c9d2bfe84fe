//! Broker client seam
//!
//! The relay only needs three things from a broker library: build a client from
//! [`ClientOptions`], connect one producer, and publish to a topic. Handshake,
//! partitioning, retries and acknowledgements stay inside the library.

use crate::tls::ClientOptions;
use crate::RelayError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;

/// One message inside a produce request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub value: String,
}

/// Publish request for a single topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProduceRequest {
    pub topic: String,
    pub messages: Vec<OutboundMessage>,
}

impl ProduceRequest {
    /// Request carrying exactly one message
    pub fn single(topic: impl Into<String>, value: String) -> Self {
        Self {
            topic: topic.into(),
            messages: vec![OutboundMessage { value }],
        }
    }

    /// Total value bytes across all messages
    pub fn size(&self) -> usize {
        self.messages.iter().map(|m| m.value.len()).sum()
    }
}

/// Creates broker clients and connects their producer
#[async_trait]
pub trait Connector: Send + Sync + Debug {
    /// Build a client from `options`, open one producer and connect it
    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn Producer>, RelayError>;
}

/// A connected producer handle
///
/// Implementations must accept concurrent `send` calls; the relay shares one
/// handle across all callers without locking around it.
#[async_trait]
pub trait Producer: Send + Sync + Debug {
    async fn send(&self, request: &ProduceRequest) -> Result<(), RelayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_message_request_shape() {
        let request = ProduceRequest::single("topic-a", "hello".to_string());
        assert_eq!(request.size(), 5);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "topic": "topic-a", "messages": [{ "value": "hello" }] })
        );
    }
}
