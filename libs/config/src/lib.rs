//! # Relay Configuration
//!
//! Resolves the transport relay's settings from the process environment into
//! an immutable, validated [`RelayConfig`].
//!
//! ## Features
//!
//! - **Environment Source**: `RELAY_*` variables read through the `config` crate
//! - **Defaults**: client identifier and environment tier fall back to fixed values
//! - **Aggregate Validation**: every violation is reported in one error
//!
//! ## Usage
//!
//! ```rust,no_run
//! use relay_config::RelayConfig;
//!
//! let config = RelayConfig::resolve().expect("relay configuration");
//! println!("publishing to {} via {:?}", config.stream, config.brokers);
//! ```

pub mod defaults;
pub mod error;
pub mod resolver;
pub mod tier;

// Re-export commonly used types
pub use error::{ConfigurationError, Violation};
pub use resolver::RelayConfig;
pub use tier::Tier;
