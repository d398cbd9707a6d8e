// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # acilink HAL
//!
//! Platform abstraction for the acilink transport.
//!
//! This crate provides:
//! - **HAL traits** (`hal` module) - the collaborators the transport core drives:
//!   full-duplex byte exchange on the SPI bus, handshake line I/O, delays and
//!   the ready-line wake source
//! - **Platform implementations** (`platforms` module) - a generic
//!   `embedded-hal` 1.0 adapter and a simulated coprocessor for host testing
//!
//! ## Feature Flags
//!
//! - `embedded-hal` - adapters for any MCU with an `embedded-hal` 1.0 implementation
//! - `mock` - simulated coprocessor (requires `std`)
//! - `serde` - (de)serialisation of bus and wake settings

/// Hardware abstraction traits shared by all platforms.
pub mod hal;

/// Concrete platform implementations.
pub mod platforms;

// Re-export commonly used types
pub use hal::{
    BitOrder,
    BusSettings,
    ErrorType,
    GpioProvider,
    NoWake,
    PinMode,
    SpiBus,
    TimeProvider,
    WakeSource,
    WakeTrigger,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
