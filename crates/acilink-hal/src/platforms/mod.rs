// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

/// Platform implementations
///
/// Each platform module implements the HAL traits defined in `crate::hal`.
///
/// Available platforms:
/// - Any MCU with an `embedded-hal` 1.0 implementation (`embedded-hal` feature)
/// - Simulated coprocessor for host tests (`mock` feature)

#[cfg(feature = "embedded-hal")]
pub mod embedded_hal;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export platform types
#[cfg(feature = "embedded-hal")]
pub use self::embedded_hal::{EhDelay, EhLineError, EhLines, EhSpi};

#[cfg(feature = "mock")]
pub use self::mock::{MockBus, MockCoprocessor, MockError, MockGpio, MockTime, MockTransaction, MockWake};
