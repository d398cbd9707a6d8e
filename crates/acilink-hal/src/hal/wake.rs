// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Ready-line wake source
//!
//! In interrupt-driven mode the transport attaches a handler to the ready
//! line. The platform owns the interrupt controller; this trait only lets the
//! transport mask and unmask that one source.

use core::convert::Infallible;

use super::ErrorType;

/// Condition on the ready line that fires the wake interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WakeTrigger {
    /// Fire while the line is held low (can wake AVR parts from sleep)
    #[default]
    LowLevel,
    /// Fire on the high-to-low transition
    FallingEdge,
}

/// Interrupt source tied to the ready line
pub trait WakeSource: ErrorType {
    /// Enable the interrupt with the given trigger
    fn arm(&mut self, trigger: WakeTrigger) -> Result<(), Self::Error>;

    /// Mask the interrupt
    fn disarm(&mut self) -> Result<(), Self::Error>;

    /// Whether the interrupt is currently enabled
    fn is_armed(&self) -> bool;
}

/// Wake source for polled builds; never armed
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWake;

impl ErrorType for NoWake {
    type Error = Infallible;
}

impl WakeSource for NoWake {
    fn arm(&mut self, _trigger: WakeTrigger) -> Result<(), Self::Error> {
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn is_armed(&self) -> bool {
        false
    }
}
