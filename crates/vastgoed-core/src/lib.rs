//! Shared domain types and configuration for the vastgoed workspace.
//!
//! Holds the analysis [`Subject`] (single address or postal-code area), the
//! Dutch postal-code and house-number parsing rules every provider relies on,
//! and the environment-driven [`AppConfig`].

pub mod app_config;
pub mod config;
pub mod subject;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use subject::{AreaSubject, HouseNumber, IndividualSubject, PostalCode, Subject};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid postal code \"{0}\" (expected e.g. 1015MN)")]
    InvalidPostalCode(String),

    #[error("invalid house number \"{0}\"")]
    InvalidHouseNumber(String),

    #[error("{0} is required")]
    MissingField(&'static str),
}
