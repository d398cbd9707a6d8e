// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! # acilink Configuration
//!
//! Type-safe configuration for the ACI transport:
//! - Pin assignments for the handshake, reset and SPI lines
//! - Bus clock divider and bit-order strategy
//! - Board profiles (reset pulse sequences)
//! - TOML file loading with environment and CLI overrides (`std` only)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acilink_config::{load_config, AciConfig};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! println!("REQN on pin {}", config.pins.request);
//! ```
//!
//! On `no_std` targets the configuration is built in code and checked with
//! [`validate_config`] (the transport does this itself at initialisation).

#![cfg_attr(not(feature = "std"), no_std)]

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "std")]
pub mod loader;

pub mod types;
pub mod validation;

#[cfg(feature = "std")]
pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    CONFIG_FILE_NAME,
};

pub use types::*;
pub use validation::{validate_config, visit_violations, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "std")]
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[cfg(feature = "std")]
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "std")]
    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[cfg(feature = "std")]
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

#[cfg(feature = "std")]
impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
