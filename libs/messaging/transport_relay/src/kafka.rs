//! Kafka backend built on librdkafka
//!
//! `FutureProducer` is internally queued and safe to share, so one handle
//! serves every concurrent `relay()` call.

use crate::broker::{Connector, ProduceRequest, Producer};
use crate::tls::{ClientOptions, TlsPolicy};
use crate::RelayError;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use rdkafka::util::Timeout;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Connects `FutureProducer`s from [`ClientOptions`]
#[derive(Debug, Default, Clone)]
pub struct KafkaConnector;

impl KafkaConnector {
    pub fn new() -> Self {
        Self
    }

    /// Translate client options into librdkafka properties
    pub fn client_config(options: &ClientOptions) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", options.brokers.join(","))
            .set("client.id", options.client_id.as_str());

        match &options.ssl {
            TlsPolicy::Disabled => {
                config.set("security.protocol", "plaintext");
            }
            TlsPolicy::Enabled {
                ca_list,
                verify_peer,
            } => {
                config
                    .set("security.protocol", "ssl")
                    .set("enable.ssl.certificate.verification", verify_peer.to_string());
                // Without ssl.ca.pem librdkafka falls back to the system trust store
                if !ca_list.is_empty() {
                    config.set("ssl.ca.pem", ca_list.join("\n"));
                }
            }
        }

        config
    }
}

#[async_trait]
impl Connector for KafkaConnector {
    async fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn Producer>, RelayError> {
        let producer: FutureProducer = Self::client_config(options).create().map_err(|e| {
            RelayError::connection_failed(format!("Failed to create Kafka client: {}", e))
        })?;

        // Creating the client does not touch the network; a metadata round trip does
        let probe = producer.clone();
        let timeout = options.connect_timeout;
        let brokers = tokio::task::spawn_blocking(move || {
            probe
                .client()
                .fetch_metadata(None, Timeout::After(timeout))
                .map(|metadata| metadata.brokers().len())
        })
        .await
        .map_err(|e| RelayError::connection_failed(format!("Connectivity probe aborted: {}", e)))?
        .map_err(|e| {
            RelayError::connection_failed(format!(
                "Brokers {} unreachable: {}",
                options.brokers.join(","),
                e
            ))
        })?;
        debug!("Kafka metadata lists {} brokers", brokers);

        Ok(Arc::new(KafkaProducer { producer }))
    }
}

/// Connected Kafka producer handle
#[derive(Clone)]
pub struct KafkaProducer {
    producer: FutureProducer,
}

impl fmt::Debug for KafkaProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaProducer").finish_non_exhaustive()
    }
}

#[async_trait]
impl Producer for KafkaProducer {
    async fn send(&self, request: &ProduceRequest) -> Result<(), RelayError> {
        for message in &request.messages {
            let record: FutureRecord<'_, (), str> =
                FutureRecord::to(&request.topic).payload(message.value.as_str());

            // No queue timeout here; delivery timeouts belong to librdkafka's settings
            self.producer
                .send(record, Timeout::Never)
                .await
                .map_err(|(e, _)| RelayError::delivery_failed(&request.topic, e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options(ssl: TlsPolicy) -> ClientOptions {
        ClientOptions {
            client_id: "ingest".to_string(),
            brokers: vec!["kafka-1:9093".to_string(), "kafka-2:9093".to_string()],
            ssl,
            connect_timeout: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_plaintext_properties() {
        let config = KafkaConnector::client_config(&options(TlsPolicy::Disabled));
        assert_eq!(config.get("bootstrap.servers"), Some("kafka-1:9093,kafka-2:9093"));
        assert_eq!(config.get("client.id"), Some("ingest"));
        assert_eq!(config.get("security.protocol"), Some("plaintext"));
        assert_eq!(config.get("ssl.ca.pem"), None);
    }

    #[test]
    fn test_tls_properties_with_ca() {
        let config = KafkaConnector::client_config(&options(TlsPolicy::Enabled {
            ca_list: vec!["CA_ONE".to_string(), "CA_TWO".to_string()],
            verify_peer: false,
        }));
        assert_eq!(config.get("security.protocol"), Some("ssl"));
        assert_eq!(config.get("enable.ssl.certificate.verification"), Some("false"));
        assert_eq!(config.get("ssl.ca.pem"), Some("CA_ONE\nCA_TWO"));
    }

    #[test]
    fn test_tls_properties_without_ca_use_system_store() {
        let config = KafkaConnector::client_config(&options(TlsPolicy::Enabled {
            ca_list: vec![],
            verify_peer: false,
        }));
        assert_eq!(config.get("security.protocol"), Some("ssl"));
        assert_eq!(config.get("ssl.ca.pem"), None);
    }

    #[test]
    fn test_blank_ca_sets_no_pem() {
        use relay_config::{RelayConfig, Tier};

        let config = RelayConfig::new("kafka:9093", "topic-a")
            .with_tier(Tier::parse("prod"))
            .with_tls_ca("\n  \n");
        let client = KafkaConnector::client_config(&ClientOptions::from_config(&config));
        assert_eq!(client.get("security.protocol"), Some("ssl"));
        assert_eq!(client.get("ssl.ca.pem"), None);
    }
}
