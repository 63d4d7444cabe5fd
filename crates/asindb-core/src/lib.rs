use thiserror::Error;

mod app_config;
mod config;
mod product;

pub use app_config::{AppConfig, Environment, Marketplace};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::CanonicalProduct;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
