//! Layered application configuration

mod app_config;

pub use app_config::{
    generate_secret, AppConfig, AuthConfig, BootstrapConfig, LogFormat, LoggingConfig,
    ServerConfig,
};
