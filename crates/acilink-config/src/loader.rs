// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading happens in three tiers, later tiers winning:
//! 1. TOML file (base values, missing keys fall back to defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)
//!
//! The merged result is validated before it is returned.

use crate::{validate_config, visit_violations, AciConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name searched for by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "acilink.toml";

/// Find the acilink configuration file
///
/// Search order:
/// 1. `ACILINK_CONFIG_PATH` environment variable
/// 2. Current working directory: `./acilink.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("ACILINK_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by ACILINK_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.extend(cwd.ancestors().take(6).map(|dir| dir.join(CONFIG_FILE_NAME)));
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet ACILINK_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, [`find_config_file`] is used.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is missing, is not valid TOML, names an unknown
/// board, carries an unparsable override, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AciConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: AciConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    visit_violations(&config, &mut |violation| {
        tracing::warn!(target: "acilink-config", file = %config_file.display(), "{}", violation);
    });
    validate_config(&config)?;

    tracing::debug!(
        target: "acilink-config",
        file = %config_file.display(),
        board = %config.board,
        interrupt_driven = config.interrupt_driven,
        "configuration loaded"
    );
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `ACILINK_INTERRUPT_DRIVEN` -> `interrupt_driven`
/// - `ACILINK_DEBUG_ECHO` -> `debug_echo`
/// - `ACILINK_BOARD` -> `board`
/// - `ACILINK_CLOCK_DIVIDER` -> `bus.clock_divider`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for a value that does not parse
pub fn apply_environment_overrides(config: &mut AciConfig) -> ConfigResult<()> {
    apply_overrides(config, |key| {
        let var = match key {
            "interrupt_driven" => "ACILINK_INTERRUPT_DRIVEN",
            "debug_echo" => "ACILINK_DEBUG_ECHO",
            "board" => "ACILINK_BOARD",
            "clock_divider" => "ACILINK_CLOCK_DIVIDER",
            _ => return None,
        };
        env::var(var).ok()
    })
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `board`, `interrupt_driven`, `debug_echo`,
/// `clock_divider`, `request_pin`, `ready_pin`, `reset_pin`.
/// Unknown keys are ignored.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for a value that does not parse
pub fn apply_cli_overrides(
    config: &mut AciConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    apply_overrides(config, |key| cli_args.get(key).cloned())
}

fn apply_overrides(
    config: &mut AciConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<()> {
    if let Some(value) = lookup("board") {
        config.board = parse_field("board", &value)?;
    }
    if let Some(value) = lookup("interrupt_driven") {
        config.interrupt_driven = parse_bool("interrupt_driven", &value)?;
    }
    if let Some(value) = lookup("debug_echo") {
        config.debug_echo = parse_bool("debug_echo", &value)?;
    }
    if let Some(value) = lookup("clock_divider") {
        config.bus.clock_divider = parse_field("bus.clock_divider", &value)?;
    }
    if let Some(value) = lookup("request_pin") {
        config.pins.request = parse_field("pins.request", &value)?;
    }
    if let Some(value) = lookup("ready_pin") {
        config.pins.ready = parse_field("pins.ready", &value)?;
    }
    if let Some(value) = lookup("reset_pin") {
        config.pins.reset = match value.trim().to_lowercase().as_str() {
            "none" | "unused" => None,
            _ => Some(parse_field("pins.reset", &value)?),
        };
    }
    Ok(())
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_bool(field: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
        }),
    }
}
