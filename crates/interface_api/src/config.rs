//! API configuration

use std::time::Duration;

use serde::Deserialize;

use core_kernel::{CoreError, Currency};
use domain_voucher::RankingPolicy;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_URGENT_WINDOW_DAYS=5`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Billing currency code
    pub currency: String,
    /// Vouchers expiring within this many days are consumed first
    pub urgent_window_days: i64,
    /// Vouchers expiring within this many days come next
    pub soon_window_days: i64,
    /// Artificial latency of the in-memory backend, in milliseconds
    pub mock_latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            currency: "CNY".to_string(),
            urgent_window_days: 7,
            soon_window_days: 30,
            mock_latency_ms: 0,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Checks the values that `Deserialize` cannot
    pub fn validate(&self) -> Result<(), CoreError> {
        self.currency()?;
        self.ranking_policy()?;
        if self.port == 0 {
            return Err(CoreError::invalid_setting("port", "must not be 0"));
        }
        Ok(())
    }

    pub fn currency(&self) -> Result<Currency, CoreError> {
        self.currency
            .parse::<Currency>()
            .map_err(|e| CoreError::invalid_setting("currency", e.to_string()))
    }

    /// Expiry windows for voucher ranking
    pub fn ranking_policy(&self) -> Result<RankingPolicy, CoreError> {
        let key = if self.urgent_window_days <= 0 {
            "urgent_window_days"
        } else {
            "soon_window_days"
        };
        RankingPolicy::from_days(self.urgent_window_days, self.soon_window_days)
            .map_err(|e| CoreError::invalid_setting(key, e.to_string()))
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.currency().unwrap(), Currency::CNY);
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_inverted_windows_rejected() {
        let config = ApiConfig {
            urgent_window_days: 30,
            soon_window_days: 7,
            ..ApiConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.setting(), Some("soon_window_days"));
    }

    #[test]
    fn test_non_positive_urgent_window_rejected() {
        let config = ApiConfig {
            urgent_window_days: 0,
            ..ApiConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.setting(), Some("urgent_window_days"));
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let config = ApiConfig {
            currency: "XYZ".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().setting(), Some("currency"));
    }
}
