use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use serde::Deserialize;
use tracing::warn;

use crate::domain::DomainError;

const MIN_SECRET_LENGTH: usize = 32;
const GENERATED_SECRET_BYTES: usize = 48;
const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 86_400;

/// Random base64 secret long enough for `auth.jwt_secret`
pub fn generate_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Session token settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret, at least 32 characters
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: u64,
    pub revocation_sweep_secs: u64,
    /// Accept `?token=` when no bearer header is sent
    pub allow_query_token: bool,
    /// Log a short token prefix when a token is rejected
    pub log_token_prefix: bool,
    /// Start with a random secret when `jwt_secret` is unset (development only)
    pub allow_generated_secret: bool,
}

/// Initial admin account, created when the directory is empty
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 86_400,
            revocation_sweep_secs: 300,
            allow_query_token: true,
            log_token_prefix: false,
            allow_generated_secret: false,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("revocation_sweep_secs", &self.revocation_sweep_secs)
            .field("allow_query_token", &self.allow_query_token)
            .field("log_token_prefix", &self.log_token_prefix)
            .field("allow_generated_secret", &self.allow_generated_secret)
            .finish()
    }
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("admin_username", &self.admin_username)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[hidden]"))
            .finish()
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Result<chrono::Duration, DomainError> {
        Some(self.token_ttl_secs)
            .filter(|secs| *secs <= MAX_TOKEN_TTL_SECS)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::TimeDelta::try_seconds)
            .ok_or_else(ttl_out_of_range)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.revocation_sweep_secs)
    }

    /// The configured signing secret, or a random one when explicitly allowed
    pub fn signing_secret(&self) -> Result<String, DomainError> {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if secret.len() >= MIN_SECRET_LENGTH => Ok(secret.to_string()),
            Some(secret) if !secret.is_empty() => Err(DomainError::configuration(format!(
                "auth.jwt_secret must be at least {} characters",
                MIN_SECRET_LENGTH
            ))),
            _ if self.allow_generated_secret => {
                warn!("No auth.jwt_secret configured, using a generated secret; tokens will not survive a restart");
                Ok(generate_secret())
            }
            _ => Err(DomainError::configuration(
                "auth.jwt_secret is required (set APP__AUTH__JWT_SECRET)",
            )),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.token_ttl_secs == 0 {
            return Err(DomainError::configuration(
                "auth.token_ttl_secs must be greater than zero",
            ));
        }

        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ttl_out_of_range());
        }

        if self.revocation_sweep_secs == 0 {
            return Err(DomainError::configuration(
                "auth.revocation_sweep_secs must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn ttl_out_of_range() -> DomainError {
    DomainError::configuration(format!(
        "auth.token_ttl_secs must be at most {}",
        MAX_TOKEN_TTL_SECS
    ))
}

impl BootstrapConfig {
    /// Username, email and password when all three are set
    pub fn admin(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.admin_username.as_deref()?,
            self.admin_email.as_deref()?,
            self.admin_password.as_deref()?,
        ))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
