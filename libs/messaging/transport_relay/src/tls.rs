//! TLS policy and broker client options
//!
//! Both are derived once from a [`RelayConfig`] when the relay is constructed
//! and never recomputed. Serialized, the options take the shape broker client
//! libraries conventionally accept:
//!
//! ```json
//! { "clientId": "transport-relay", "brokers": ["kafka:9093"],
//!   "ssl": { "rejectUnauthorized": false, "ca": ["-----BEGIN CERTIFICATE-----..."] } }
//! ```
//!
//! with `"ssl": false` for plaintext connections.

use relay_config::RelayConfig;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::time::Duration;

/// Transport security for the broker connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Plaintext connection (development tier)
    Disabled,

    /// TLS trusting `ca_list`; an empty list means the system trust store
    Enabled {
        ca_list: Vec<String>,
        verify_peer: bool,
    },
}

impl TlsPolicy {
    /// Derive the policy for a configuration
    ///
    /// Outside development TLS is always on with peer verification relaxed,
    /// even when no CA material is configured. Blank CA material counts as
    /// none configured.
    pub fn from_config(config: &RelayConfig) -> Self {
        if config.tier.is_development() {
            return TlsPolicy::Disabled;
        }

        TlsPolicy::Enabled {
            ca_list: config
                .tls_ca
                .iter()
                .filter(|ca| !ca.trim().is_empty())
                .cloned()
                .collect(),
            verify_peer: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, TlsPolicy::Enabled { .. })
    }

    /// Trusted authorities; empty when disabled
    pub fn ca_list(&self) -> &[String] {
        match self {
            TlsPolicy::Disabled => &[],
            TlsPolicy::Enabled { ca_list, .. } => ca_list,
        }
    }
}

impl Serialize for TlsPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TlsPolicy::Disabled => serializer.serialize_bool(false),
            TlsPolicy::Enabled {
                ca_list,
                verify_peer,
            } => {
                let mut state = serializer.serialize_struct("TlsPolicy", 2)?;
                state.serialize_field("rejectUnauthorized", verify_peer)?;
                state.serialize_field("ca", ca_list)?;
                state.end()
            }
        }
    }
}

/// Everything the broker client is constructed with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    pub client_id: String,
    pub brokers: Vec<String>,
    pub ssl: TlsPolicy,

    /// Bound for the connectivity probe; part of the client's own settings
    #[serde(skip)]
    pub connect_timeout: Duration,
}

impl ClientOptions {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            brokers: config.brokers.clone(),
            ssl: TlsPolicy::from_config(config),
            connect_timeout: config.connect_timeout,
        }
    }
}
