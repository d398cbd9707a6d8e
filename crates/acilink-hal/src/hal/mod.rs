// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

/// Handshake line I/O and pin modes.
pub mod gpio;
/// Full-duplex SPI byte exchange and bus settings.
pub mod spi;
/// Blocking delay primitives.
pub mod time;
/// Ready-line interrupt arming.
pub mod wake;

/// Hardware Abstraction Layer (HAL) trait definitions
///
/// This module defines the platform-agnostic traits the transport engine
/// is written against:
/// - Bus byte exchange (SpiBus)
/// - Line control (GpioProvider)
/// - Delays (TimeProvider)
/// - Ready-line interrupt (WakeSource)
pub use gpio::{GpioProvider, PinMode};
pub use spi::{BitOrder, BusSettings, SpiBus};
pub use time::TimeProvider;
pub use wake::{NoWake, WakeSource, WakeTrigger};

/// Error type shared by the fallible HAL traits.
///
/// Mirrors `embedded_hal::ErrorType`: a platform names its error once and
/// every fallible trait it implements reports through it.
pub trait ErrorType {
    /// Platform-specific error type
    type Error: core::fmt::Debug;
}
