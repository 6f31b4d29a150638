//! API configuration

use core_kernel::Currency;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Book currency (ISO 4217 code)
    pub currency: String,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/books".to_string(),
            currency: "USD".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured book currency
    pub fn book_currency(&self) -> Result<Currency, config::ConfigError> {
        match self.currency.to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "CAD" => Ok(Currency::CAD),
            "AUD" => Ok(Currency::AUD),
            other => Err(config::ConfigError::Message(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_currency_parses() {
        let config = ApiConfig::default();
        assert_eq!(config.book_currency().unwrap(), Currency::USD);
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let config = ApiConfig {
            currency: "XYZ".to_string(),
            ..Default::default()
        };
        assert!(config.book_currency().is_err());
    }
}
