use axum_extra::extract::cookie::Key;
use base64::Engine;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use time::Duration;
use tracing::warn;

use crate::error::NotejamError;

/// Runtime configuration.
///
/// Sources, lowest priority first: built-in defaults, `config.toml` in the
/// working directory, then `NOTEJAM_*` environment variables
/// (e.g. `NOTEJAM_BASIC__DATABASE_URL`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Base64 encoded 64-byte key for the session cookie. Empty means a
    /// random key per process.
    pub secret_key: String,
    /// Drop the `Secure` attribute from the session cookie (plain HTTP dev setups).
    pub insecure_cookie: bool,
    pub session_days: i64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:notejam.sqlite".to_string(),
            loglevel: "info".to_string(),
            secret_key: String::new(),
            insecure_cookie: false,
            session_days: 14,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("NOTEJAM_").split("__"))
            .extract()
    }
}

const SESSION_DAYS: RangeInclusive<i64> = 1..=3650;

impl BasicConfig {
    /// Session cookie lifetime; `session_days` must lie within 1..=3650.
    pub fn session_ttl(&self) -> Result<Duration, NotejamError> {
        if !SESSION_DAYS.contains(&self.session_days) {
            return Err(NotejamError::Config(format!(
                "session_days must be between {} and {}, got {}",
                SESSION_DAYS.start(),
                SESSION_DAYS.end(),
                self.session_days
            )));
        }
        Ok(Duration::days(self.session_days))
    }

    pub fn cookie_key(&self) -> Result<Key, NotejamError> {
        let secret = self.secret_key.trim();
        if secret.is_empty() {
            warn!("secret_key not configured; sessions will not survive a restart");
            return Ok(Key::generate());
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(secret)
            .map_err(|e| NotejamError::Config(format!("secret_key is not valid base64: {e}")))?;
        Key::try_from(bytes.as_slice())
            .map_err(|e| NotejamError::Config(format!("secret_key rejected: {e}")))
    }
}
