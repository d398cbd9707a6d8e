// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! One REQN/RDYN handshake cycle
//!
//! ```text
//! REQN  ‾‾\____________________________/‾‾
//! host    [len] [p1] [p2] ... [pn]
//! chip    [sts] [dlen] [e1] ... [en]
//! ```
//!
//! The first exchange trades the host's length byte for the status byte,
//! the second trades the first payload byte for the coprocessor's declared
//! length. Both sides then keep clocking until the longer of the two
//! messages is through.

use acilink_hal::{BitOrder, BusSettings, GpioProvider, SpiBus};

use crate::error::TransportError;
use crate::frame::{Frame, MAX_LENGTH};
use crate::lines::LineController;

/// Number of byte pairs to exchange after the two negotiation bytes
///
/// `out_len` is the host's length byte, `declared` the coprocessor's. With
/// nothing to send the host follows the coprocessor; otherwise the longer
/// message wins, minus the payload byte already sent during negotiation.
/// The result never exceeds `max`.
#[inline]
pub fn negotiate_length(out_len: u8, declared: u8, max: u8) -> u8 {
    let wanted = if out_len == 0 {
        declared
    } else {
        declared.max(out_len - 1)
    };
    wanted.min(max)
}

/// Result of one handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Frame shifted in from the coprocessor; empty if it had nothing to say
    pub received: Frame,
    /// Payload byte pairs exchanged after negotiation
    pub exchanged: u8,
}

/// Runs handshakes over the SPI bus
pub struct TransferEngine<B> {
    bus: B,
    settings: BusSettings,
}

impl<B: SpiBus> TransferEngine<B> {
    pub fn new(bus: B, settings: BusSettings) -> Self {
        Self { bus, settings }
    }

    /// Apply clock divider, mode 0 and bit order to the bus
    pub fn configure(&mut self) -> Result<(), TransportError> {
        tracing::debug!(
            target: "acilink-transport",
            clock_divider = self.settings.clock_divider,
            bit_order = ?self.settings.bit_order,
            "configuring SPI"
        );
        self.bus.configure(&self.settings).map_err(|err| {
            tracing::error!(target: "acilink-transport", error = ?err, "SPI configuration failed");
            TransportError::Bus
        })
    }

    pub fn bit_order(&self) -> BitOrder {
        self.settings.bit_order
    }

    /// Run one handshake cycle
    ///
    /// Asserts REQN, negotiates the length, exchanges the payload and
    /// releases REQN. On a bus fault REQN is still released and the error is
    /// returned; nothing partially received is handed out.
    pub fn transfer<G: GpioProvider>(
        &mut self,
        lines: &mut LineController<G>,
        outgoing: &Frame,
    ) -> Result<Transfer, TransportError> {
        lines.assert_request()?;
        let result = self.exchange_frame(outgoing);
        let released = lines.deassert_request();

        let transfer = result?;
        released?;
        Ok(transfer)
    }

    fn exchange_frame(&mut self, outgoing: &Frame) -> Result<Transfer, TransportError> {
        let mut buffer = [0u8; MAX_LENGTH + 1];

        let status = self.exchange(outgoing.wire_byte(0))?;
        let mut declared = self.exchange(outgoing.wire_byte(1))?;
        if declared as usize > MAX_LENGTH {
            tracing::warn!(
                target: "acilink-transport",
                declared,
                max = MAX_LENGTH,
                "coprocessor declared an oversized event, truncating"
            );
            declared = MAX_LENGTH as u8;
        }
        buffer[0] = declared;

        let exchanged = negotiate_length(outgoing.len() as u8, declared, MAX_LENGTH as u8);
        for i in 0..exchanged as usize {
            buffer[i + 1] = self.exchange(outgoing.wire_byte(i + 2))?;
        }

        tracing::debug!(
            target: "acilink-transport",
            sent = outgoing.len(),
            declared,
            exchanged,
            status,
            "handshake complete"
        );

        Ok(Transfer {
            received: Frame::received(status, buffer),
            exchanged,
        })
    }

    #[inline]
    fn exchange(&mut self, out: u8) -> Result<u8, TransportError> {
        let order = self.settings.bit_order;
        self.bus
            .exchange_byte(order.apply(out))
            .map(|inb| order.apply(inb))
            .map_err(|err| {
                tracing::error!(target: "acilink-transport", error = ?err, "SPI exchange failed");
                TransportError::Bus
            })
    }

    pub fn release(self) -> B {
        self.bus
    }
}
