use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
}

fn default_jwt_expiration() -> u64 { 3600 }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Rapyd,
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub provider: PaymentProvider,
    pub base_url: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub complete_payment_url: String,
    pub error_payment_url: String,
    #[serde(default = "default_payment_timeout")]
    pub timeout_seconds: u64,
}

fn default_country() -> String { "US".to_string() }
fn default_currency() -> String { "USD".to_string() }
fn default_language() -> String { "en".to_string() }
fn default_payment_timeout() -> u64 { 10 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `TREK__AUTH__JWT_SECRET=...` overrides `auth.jwt_secret`
            .add_source(config::Environment::with_prefix("TREK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        port = 5000

        [database]
        url = "sqlite://travel.db"

        [auth]
        jwt_secret = "test-secret"

        [payment]
        provider = "mock"
        base_url = "https://sandboxapi.rapyd.net"
        complete_payment_url = "http://example.com/complete"
        error_payment_url = "http://example.com/error"
    "#;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(MINIMAL, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.jwt_expiration_seconds, 3600);
        assert_eq!(config.payment.provider, PaymentProvider::Mock);
        assert_eq!(config.payment.currency, "USD");
        assert_eq!(config.payment.country, "US");
        assert_eq!(config.payment.language, "en");
        assert_eq!(config.payment.timeout_seconds, 10);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let broken = MINIMAL.replace("provider = \"mock\"", "provider = \"paypal\"");
        let result: Result<Config, _> = config::Config::builder()
            .add_source(config::File::from_str(&broken, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize();

        assert!(result.is_err());
    }
}
