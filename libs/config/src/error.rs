use std::fmt;

/// A single problem found while validating the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Environment variable the problem refers to
    pub variable: &'static str,
    pub reason: String,
}

impl Violation {
    pub fn missing(variable: &'static str) -> Self {
        Self {
            variable,
            reason: "is required".to_string(),
        }
    }

    pub fn invalid(variable: &'static str, reason: impl Into<String>) -> Self {
        Self {
            variable,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.variable, self.reason)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid relay configuration: {}", join(.violations))]
    Invalid { violations: Vec<Violation> },

    #[error("Failed to read relay configuration: {0}")]
    Source(String),
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigurationError {
    /// Variables named by the error, in the order they were checked
    pub fn variables(&self) -> Vec<&'static str> {
        match self {
            ConfigurationError::Invalid { violations } => {
                violations.iter().map(|v| v.variable).collect()
            }
            ConfigurationError::Source(_) => Vec::new(),
        }
    }

    /// Check whether a variable was reported as absent
    pub fn is_missing(&self, variable: &str) -> bool {
        match self {
            ConfigurationError::Invalid { violations } => violations
                .iter()
                .any(|v| v.variable == variable && v.reason == "is required"),
            ConfigurationError::Source(_) => false,
        }
    }
}

impl From<config_crate::ConfigError> for ConfigurationError {
    fn from(err: config_crate::ConfigError) -> Self {
        ConfigurationError::Source(err.to_string())
    }
}
