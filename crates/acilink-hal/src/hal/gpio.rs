// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

use super::ErrorType;

/// Electrical configuration of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with the internal pull-up enabled
    InputPullUp,
    /// Push-pull output
    Output,
}

/// GPIO abstraction for the handshake and reset lines
///
/// Pins are identified by the numbers assigned in the transport
/// configuration; the platform maps them to physical pins.
pub trait GpioProvider: ErrorType {
    /// Configure a pin's direction
    ///
    /// # Arguments
    /// * `pin` - Pin identifier
    /// * `mode` - Input, input with pull-up, or output
    fn configure(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error>;

    /// Set pin high
    ///
    /// # Arguments
    /// * `pin` - Pin identifier
    ///
    /// # Returns
    /// Ok(()) or error
    fn set_high(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Set pin low
    ///
    /// # Arguments
    /// * `pin` - Pin identifier
    ///
    /// # Returns
    /// Ok(()) or error
    fn set_low(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Read pin state
    ///
    /// # Returns
    /// True if pin is high, false if low, or error
    fn is_high(&mut self, pin: u8) -> Result<bool, Self::Error>;

    /// Read pin state (inverted)
    fn is_low(&mut self, pin: u8) -> Result<bool, Self::Error> {
        Ok(!self.is_high(pin)?)
    }

    /// Drive a pin to the given level
    fn write(&mut self, pin: u8, high: bool) -> Result<(), Self::Error> {
        if high {
            self.set_high(pin)
        } else {
            self.set_low(pin)
        }
    }
}
