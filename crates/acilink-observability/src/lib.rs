// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! # acilink-observability
//!
//! Logging setup for host binaries built on acilink (simulators, bench
//! tools). Firmware never links this crate; the library crates only emit
//! `tracing` events and leave the subscriber to the application.
//!
//! Debug output is enabled per crate with `--debug-<crate>` flags or the
//! `ACILINK_DEBUG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Log targets that can be switched to debug individually
pub const KNOWN_CRATES: &[&str] = &["acilink-hal", "acilink-config", "acilink-transport"];

/// Target of the `C`/`E` frame echo
pub const ECHO_TARGET: &str = "acilink::echo";
