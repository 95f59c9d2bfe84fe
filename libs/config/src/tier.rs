use std::fmt;

/// Deployment environment classification
///
/// Only the development tier is distinguished; it selects a plaintext broker
/// connection. Every other tier name is kept verbatim for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tier {
    #[default]
    Development,
    Other(String),
}

impl Tier {
    /// Parse a tier name. Blank input is development.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Tier::Development,
            _ => Tier::Other(trimmed.to_string()),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Tier::Development)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tier::Development => "development",
            Tier::Other(name) => name,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_aliases() {
        assert_eq!(Tier::parse("development"), Tier::Development);
        assert_eq!(Tier::parse("dev"), Tier::Development);
        assert_eq!(Tier::parse("DEV"), Tier::Development);
        assert_eq!(Tier::parse("  "), Tier::Development);
    }

    #[test]
    fn test_other_tiers_keep_their_name() {
        let tier = Tier::parse(" prod ");
        assert_eq!(tier, Tier::Other("prod".to_string()));
        assert!(!tier.is_development());
        assert_eq!(tier.to_string(), "prod");
    }
}
