// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! SPI bus abstraction
//!
//! The coprocessor speaks SPI mode 0, least-significant bit first. Some
//! controllers can only shift MSB-first; for those the transport reverses
//! every byte in software (see [`BitOrder::MsbFirstReversed`]).

use super::ErrorType;

/// Bit order on the wire as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BitOrder {
    /// Controller shifts LSB-first natively
    #[default]
    LsbFirst,
    /// Controller only supports MSB-first; bytes are reversed before and after each exchange
    MsbFirstReversed,
}

impl BitOrder {
    /// Bit order the controller hardware should be programmed with
    pub fn hardware_lsb_first(&self) -> bool {
        matches!(self, BitOrder::LsbFirst)
    }

    /// Map a byte between application order and wire order
    ///
    /// The mapping is an involution, so the same call converts in both
    /// directions.
    #[inline]
    pub fn apply(&self, byte: u8) -> u8 {
        match self {
            BitOrder::LsbFirst => byte,
            BitOrder::MsbFirstReversed => byte.reverse_bits(),
        }
    }
}

/// Bus parameters applied once at initialisation
///
/// SPI mode is always 0 (clock polarity 0, phase 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusSettings {
    /// System clock divider for the SPI clock (power of two, 2..=128)
    pub clock_divider: u8,
    /// Bit order strategy
    pub bit_order: BitOrder,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            clock_divider: 8, // 2 MHz on a 16 MHz part
            bit_order: BitOrder::LsbFirst,
        }
    }
}

/// Full-duplex SPI bus abstraction
///
/// The transport never holds chip-select; framing is done with the
/// request/ready lines instead.
pub trait SpiBus: ErrorType {
    /// Apply clock divider, mode 0 and hardware bit order
    ///
    /// # Arguments
    /// * `settings` - Bus parameters from the transport configuration
    fn configure(&mut self, settings: &BusSettings) -> Result<(), Self::Error>;

    /// Shift one byte out while shifting one byte in
    ///
    /// Completes before returning.
    ///
    /// # Arguments
    /// * `out` - Byte to send
    ///
    /// # Returns
    /// The byte received during the same clock cycles
    fn exchange_byte(&mut self, out: u8) -> Result<u8, Self::Error>;
}
