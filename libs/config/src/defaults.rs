//! Environment variable names and default values
//!
//! Every variable shares the `RELAY_` prefix; the keys below are the
//! lower-cased remainder the `config` crate hands to serde.

/// Prefix shared by every recognized variable
pub const ENV_PREFIX: &str = "RELAY";

/// Environment variable names
pub mod env {
    /// Comma separated `host:port` broker list
    pub const BROKER_ADDRESS: &str = "RELAY_BROKER_ADDRESS";

    /// Target topic/stream
    pub const STREAM: &str = "RELAY_STREAM";

    /// PEM encoded certificate authority
    pub const TLS_CA: &str = "RELAY_TLS_CA";

    pub const CLIENT_ID: &str = "RELAY_CLIENT_ID";

    /// Deployment tier (`development`, `dev`, anything else)
    pub const ENVIRONMENT: &str = "RELAY_ENVIRONMENT";

    /// Connectivity probe bound handed to the broker client
    pub const CONNECT_TIMEOUT_MS: &str = "RELAY_CONNECT_TIMEOUT_MS";
}

/// Client identifier used when none is configured
pub const DEFAULT_CLIENT_ID: &str = "transport-relay";

/// Tier name used when none is configured
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Connect timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
