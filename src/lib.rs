// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! # acilink - ACI transport for nRF8001-class radio coprocessors
//!
//! Moves length-prefixed ACI commands and events between a host MCU and a
//! radio coprocessor over SPI, using the REQN/RDYN handshake lines for flow
//! control. Runs polled from the main loop or from the RDYN interrupt.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! acilink = { version = "0.3", default-features = false, features = ["embedded-hal"] }
//! ```
//!
//! ## Feature Flags
//!
//! - **`std`** (default): host builds, TOML config loading
//! - **`embedded-hal`**: adapters for any `embedded-hal` 1.0 MCU HAL
//! - **`mock`**: simulated coprocessor for host tests
//! - **`tools`**: the `aci_sim` simulator binary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acilink::prelude::*;
//!
//! let config = AciConfig { interrupt_driven: false, ..AciConfig::default() };
//! let pins = config.pins;
//! let mut aci: Transport<_, _, _> = Transport::initialize(
//!     config,
//!     EhSpi::new(spi),
//!     EhLines::new(pins.request, reqn, pins.ready, rdyn),
//!     EhDelay::new(delay),
//!     NoWake,
//! )?;
//!
//! aci.send_bytes(&[0x06])?;            // Test command
//! loop {
//!     if let Some(event) = aci.try_receive()? {
//!         handle(event.payload());
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  acilink-config                                         │
//! │  (pins, bus settings, board profiles, TOML loader)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  acilink-transport                                      │
//! │  (frames, queues, handshake engine, scheduler)          │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  acilink-hal                                            │
//! │  (SPI/GPIO/delay/wake traits, embedded-hal + mock)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

#![cfg_attr(not(feature = "std"), no_std)]

// Re-export platform layer
pub use acilink_hal as hal;

// Re-export foundation
pub use acilink_config as config;

// Re-export transport core
pub use acilink_transport as transport;

// Re-export host logging setup
#[cfg(feature = "tools")]
pub use acilink_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{AciConfig, BoardVariant, PinAssignments};
    pub use crate::hal::{
        BitOrder, BusSettings, GpioProvider, NoWake, PinMode, SpiBus, TimeProvider, WakeSource,
        WakeTrigger,
    };
    pub use crate::transport::{
        Frame, SendError, SharedQueue, TickOutcome, Transport, TransportError, TransportStats,
        MAX_LENGTH,
    };

    #[cfg(feature = "embedded-hal")]
    pub use crate::hal::platforms::{EhDelay, EhLines, EhSpi};

    #[cfg(feature = "mock")]
    pub use crate::hal::platforms::MockCoprocessor;

    #[cfg(feature = "std")]
    pub use crate::config::load_config;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_exports() {
        assert_eq!(MAX_LENGTH, 31);
        assert_eq!(AciConfig::default().board, BoardVariant::Standard);
        assert!(Frame::new(&[0u8; MAX_LENGTH]).is_ok());
    }
}
