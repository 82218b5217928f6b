//! Gateway environment selection.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DarajaError, DarajaResult};

/// Sandbox API base URL.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke/";

/// Production API base URL.
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke/";

/// Which gateway deployment requests are sent to.
///
/// `development` and `testing` are accepted as aliases of `sandbox`, `live`
/// as an alias of `production`. Any other value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Isolated test deployment (default)
    #[default]
    Sandbox,
    /// Live deployment
    Production,
}

/// How much gateway detail error messages carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReporting {
    /// Include raw gateway response bodies.
    Relaxed,
    /// Only status codes and gateway error codes.
    Strict,
}

impl Environment {
    /// Parse an environment name, accepting the documented aliases.
    pub fn parse(name: &str) -> DarajaResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "testing" | "development" => Ok(Self::Sandbox),
            "production" | "live" => Ok(Self::Production),
            other => Err(DarajaError::configuration(format!(
                "unknown environment '{}': expected sandbox, testing, development, production or live",
                other
            ))),
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }

    /// Base URL that relative endpoint paths are joined to.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    /// True for the sandbox deployment.
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }

    /// Error-reporting posture for this environment.
    pub fn error_reporting(&self) -> ErrorReporting {
        match self {
            Self::Sandbox => ErrorReporting::Relaxed,
            Self::Production => ErrorReporting::Strict,
        }
    }

    /// File name of the gateway certificate for this environment.
    pub fn certificate_file_name(&self) -> &'static str {
        match self {
            Self::Sandbox => "mpesa_sandbox.cer",
            Self::Production => "mpesa_production.cer",
        }
    }

    /// Join a relative endpoint path onto this environment's base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path.trim_start_matches('/'))
    }
}

impl FromStr for Environment {
    type Err = DarajaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_aliases_share_base_url() {
        for name in ["sandbox", "testing", "development", "Sandbox", " TESTING "] {
            let env = Environment::parse(name).unwrap();
            assert_eq!(env, Environment::Sandbox);
            assert_eq!(env.base_url(), SANDBOX_BASE_URL);
            assert!(env.is_sandbox());
        }
    }

    #[test]
    fn test_production_aliases_share_base_url() {
        for name in ["production", "live", "LIVE"] {
            let env = Environment::parse(name).unwrap();
            assert_eq!(env, Environment::Production);
            assert_eq!(env.base_url(), PRODUCTION_BASE_URL);
            assert!(!env.is_sandbox());
        }
    }

    #[test]
    fn test_unknown_environment_rejected() {
        let err = Environment::parse("staging").unwrap_err();
        assert!(matches!(err, DarajaError::Configuration(_)));
        assert!("".parse::<Environment>().is_err());
    }

    #[test]
    fn test_error_reporting_posture() {
        assert_eq!(
            Environment::Sandbox.error_reporting(),
            ErrorReporting::Relaxed
        );
        assert_eq!(
            Environment::Production.error_reporting(),
            ErrorReporting::Strict
        );
    }

    #[test]
    fn test_url_for() {
        assert_eq!(
            Environment::Sandbox.url_for("mpesa/stkpush/v1/processrequest"),
            "https://sandbox.safaricom.co.ke/mpesa/stkpush/v1/processrequest"
        );
        assert_eq!(
            Environment::Production.url_for("/mpesa/b2c/v1/paymentrequest"),
            "https://api.safaricom.co.ke/mpesa/b2c/v1/paymentrequest"
        );
    }

    #[test]
    fn test_certificate_file_name() {
        assert_eq!(
            Environment::Sandbox.certificate_file_name(),
            "mpesa_sandbox.cer"
        );
        assert_eq!(
            Environment::Production.certificate_file_name(),
            "mpesa_production.cer"
        );
    }

    #[test]
    fn test_serde_round_trip_uses_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            environment: Environment,
        }
        let w: Wrapper = toml::from_str("environment = \"live\"").unwrap();
        assert_eq!(w.environment, Environment::Production);
        assert!(toml::from_str::<Wrapper>("environment = \"qa\"").is_err());
    }
}
