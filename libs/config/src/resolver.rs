//! Configuration Resolver
//!
//! Reads the `RELAY_*` environment variables through the `config` crate,
//! applies defaults and validates the result. Validation never stops at the
//! first problem: a [`ConfigurationError::Invalid`] lists every violation so an
//! operator can fix the environment in one pass.

use crate::defaults::{self, env};
use crate::error::{ConfigurationError, Violation};
use crate::tier::Tier;
use config_crate::{Config, Environment, Map};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Raw values as they arrive from the environment source
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    broker_address: Option<String>,
    stream: Option<String>,
    tls_ca: Option<String>,
    client_id: Option<String>,
    environment: Option<String>,
    connect_timeout_ms: Option<String>,
}

/// Validated relay configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Broker `host:port` entries, in configured order
    pub brokers: Vec<String>,

    /// Target topic/stream
    pub stream: String,

    /// PEM certificate authority, only consulted outside development
    pub tls_ca: Option<String>,

    pub client_id: String,

    pub tier: Tier,

    /// Upper bound for the connectivity probe during `init()`
    pub connect_timeout: Duration,
}

impl RelayConfig {
    /// Resolve from the process environment
    pub fn resolve() -> Result<Self, ConfigurationError> {
        Self::load(Environment::with_prefix(defaults::ENV_PREFIX))
    }

    /// Resolve from an explicit variable map instead of the process environment
    pub fn resolve_from(vars: Map<String, String>) -> Result<Self, ConfigurationError> {
        Self::load(Environment::with_prefix(defaults::ENV_PREFIX).source(Some(vars)))
    }

    fn load(source: Environment) -> Result<Self, ConfigurationError> {
        let raw: RawSettings = Config::builder()
            .add_source(source.try_parsing(false))
            .build()?
            .try_deserialize()?;

        let config = Self::validate(raw)?;
        debug!(
            "Resolved relay configuration: stream={} brokers={} tier={}",
            config.stream,
            config.broker_address(),
            config.tier
        );
        Ok(config)
    }

    fn validate(raw: RawSettings) -> Result<Self, ConfigurationError> {
        let mut violations = Vec::new();

        let brokers = match non_blank(raw.broker_address) {
            Some(address) => parse_brokers(&address, &mut violations),
            None => {
                violations.push(Violation::missing(env::BROKER_ADDRESS));
                Vec::new()
            }
        };

        let stream = non_blank(raw.stream).unwrap_or_else(|| {
            violations.push(Violation::missing(env::STREAM));
            String::new()
        });

        let connect_timeout = match non_blank(raw.connect_timeout_ms) {
            Some(value) => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    violations.push(Violation::invalid(
                        env::CONNECT_TIMEOUT_MS,
                        format!("must be a positive number of milliseconds, got '{}'", value),
                    ));
                    Duration::from_millis(defaults::DEFAULT_CONNECT_TIMEOUT_MS)
                }
            },
            None => Duration::from_millis(defaults::DEFAULT_CONNECT_TIMEOUT_MS),
        };

        if !violations.is_empty() {
            return Err(ConfigurationError::Invalid { violations });
        }

        Ok(Self {
            brokers,
            stream,
            // Kept verbatim: an empty CA is meaningful outside development
            tls_ca: raw.tls_ca,
            client_id: non_blank(raw.client_id)
                .unwrap_or_else(|| defaults::DEFAULT_CLIENT_ID.to_string()),
            tier: raw
                .environment
                .as_deref()
                .map(Tier::parse)
                .unwrap_or_default(),
            connect_timeout,
        })
    }

    /// Build a configuration directly, bypassing the environment
    pub fn new(brokers: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            brokers: brokers
                .into()
                .split(',')
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect(),
            stream: stream.into(),
            tls_ca: None,
            client_id: defaults::DEFAULT_CLIENT_ID.to_string(),
            tier: Tier::Development,
            connect_timeout: Duration::from_millis(defaults::DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_tls_ca(mut self, ca: impl Into<String>) -> Self {
        self.tls_ca = Some(ca.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Brokers joined back into the configured form
    pub fn broker_address(&self) -> String {
        self.brokers.join(",")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_brokers(address: &str, violations: &mut Vec<Violation>) -> Vec<String> {
    let mut brokers = Vec::new();
    for entry in address.split(',').map(str::trim) {
        let valid = entry
            .rsplit_once(':')
            .map(|(host, port)| !host.is_empty() && matches!(port.parse::<u16>(), Ok(p) if p > 0))
            .unwrap_or(false);

        if valid {
            brokers.push(entry.to_string());
        } else {
            violations.push(Violation::invalid(
                env::BROKER_ADDRESS,
                format!("entry '{}' is not host:port", entry),
            ));
        }
    }
    brokers
}
