use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub push: PushSettings,
    pub delivery: DeliverySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub issuer: String,
}

/// VAPID configuration for Web Push. Push delivery is disabled (logged and
/// skipped) when no private key is configured.
#[derive(Debug, Deserialize, Clone)]
pub struct PushSettings {
    pub vapid_subject: String,
    pub vapid_private_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliverySettings {
    /// Upper bound on a single realtime socket send before falling through.
    pub socket_send_timeout_ms: u64,
    /// Per-device timeout for a Web Push request.
    pub push_timeout_ms: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("BARKPARK"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "barkpark")?
            .set_default("database.max_pool_size", None::<u32>)?
            .set_default("database.min_pool_size", None::<u32>)?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.issuer", "barkpark")?
            .set_default("push.vapid_subject", "mailto:ops@barkpark.app")?
            .set_default("push.vapid_private_key", None::<String>)?
            .set_default("delivery.socket_send_timeout_ms", 2000)?
            .set_default("delivery.push_timeout_ms", 5000)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
