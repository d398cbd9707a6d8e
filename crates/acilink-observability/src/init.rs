// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialisation
//!
//! One human-readable layer on stderr, filtered by the per-crate debug
//! flags. Stdout stays free for tool output.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Build the filter for `debug_flags`
pub fn build_filter(debug_flags: &CrateDebugFlags) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string();
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails if the filter cannot be built or a global subscriber is already set
pub fn init_logging(debug_flags: &CrateDebugFlags) -> Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(build_filter(debug_flags)?);

    Registry::default()
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(filter = %debug_flags.to_filter_string(), "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        let filter = build_filter(&flags).unwrap();
        assert!(filter.to_string().contains("acilink-transport=debug"));
    }

    #[test]
    fn test_init_twice_fails() {
        let flags = CrateDebugFlags::default();
        // Another test may have installed a subscriber first; the second call fails either way
        let _ = init_logging(&flags);
        assert!(init_logging(&flags).is_err());
    }
}
