// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! `embedded-hal` 1.0 adapters
//!
//! Wraps the typed peripherals an MCU HAL hands out so they can be driven
//! through the pin-number based acilink traits.
//!
//! ```rust,ignore
//! let bus = EhSpi::new(spi);
//! let lines = EhLines::new(config.pins.request, reqn, config.pins.ready, rdyn)
//!     .with_reset(reset_pin_number, reset);
//! let delay = EhDelay::new(timer);
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi;

use crate::hal::{BusSettings, ErrorType, GpioProvider, PinMode, SpiBus, TimeProvider};

/// SPI adapter over any `embedded_hal::spi::SpiBus<u8>`
///
/// Clock rate, mode and hardware bit order are fixed when the MCU HAL
/// creates the bus, so `configure` only records what was requested.
pub struct EhSpi<S> {
    spi: S,
    requested: Option<BusSettings>,
}

impl<S> EhSpi<S> {
    /// Wrap a configured SPI bus
    pub fn new(spi: S) -> Self {
        Self { spi, requested: None }
    }

    /// Settings the transport asked for at initialisation
    pub fn requested_settings(&self) -> Option<&BusSettings> {
        self.requested.as_ref()
    }

    /// Release the wrapped bus
    pub fn release(self) -> S {
        self.spi
    }
}

impl<S: spi::ErrorType> ErrorType for EhSpi<S> {
    type Error = S::Error;
}

impl<S: spi::SpiBus<u8>> SpiBus for EhSpi<S> {
    fn configure(&mut self, settings: &BusSettings) -> Result<(), Self::Error> {
        tracing::debug!(
            target: "acilink-hal",
            clock_divider = settings.clock_divider,
            bit_order = ?settings.bit_order,
            "SPI parameters are owned by the MCU HAL; recording request only"
        );
        self.requested = Some(*settings);
        Ok(())
    }

    fn exchange_byte(&mut self, out: u8) -> Result<u8, Self::Error> {
        let mut buf = [out];
        self.spi.transfer_in_place(&mut buf)?;
        self.spi.flush()?;
        Ok(buf[0])
    }
}

/// Delay adapter over `embedded_hal::delay::DelayNs`
pub struct EhDelay<D>(D);

impl<D> EhDelay<D> {
    /// Wrap a delay provider
    pub fn new(delay: D) -> Self {
        Self(delay)
    }
}

impl<D: DelayNs> TimeProvider for EhDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

/// Line errors reported by [`EhLines`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EhLineError {
    /// Pin number is not owned by this adapter and cannot be read
    UnknownPin(u8),
    /// The underlying pin driver failed
    Pin {
        /// Pin number from the configuration
        pin: u8,
        /// Error kind reported by the driver
        kind: digital::ErrorKind,
    },
}

fn pin_err<E: digital::Error>(pin: u8) -> impl FnOnce(E) -> EhLineError {
    move |e| EhLineError::Pin { pin, kind: e.kind() }
}

/// Handshake line adapter over typed `embedded-hal` pins
///
/// The request and reset lines are outputs, the ready line an input. Pin
/// direction is fixed by the type the MCU HAL produced, so `configure` is a
/// no-op. Clock and data lines belong to the SPI peripheral; writes to pins
/// this adapter does not own are ignored.
pub struct EhLines<REQ, RDY, RST = REQ> {
    request_pin: u8,
    request: REQ,
    ready_pin: u8,
    ready: RDY,
    reset: Option<(u8, RST)>,
}

impl<REQ, RDY, RST> EhLines<REQ, RDY, RST>
where
    REQ: OutputPin,
    RDY: InputPin,
    RST: OutputPin,
{
    /// Bind request and ready pins to their configured numbers
    pub fn new(request_pin: u8, request: REQ, ready_pin: u8, ready: RDY) -> Self {
        Self { request_pin, request, ready_pin, ready, reset: None }
    }

    /// Bind the optional reset line
    pub fn with_reset(mut self, reset_pin: u8, reset: RST) -> Self {
        self.reset = Some((reset_pin, reset));
        self
    }

    fn drive(&mut self, pin: u8, high: bool) -> Result<(), EhLineError> {
        if pin == self.request_pin {
            let res = if high { self.request.set_high() } else { self.request.set_low() };
            return res.map_err(pin_err(pin));
        }
        if let Some((reset_pin, reset)) = self.reset.as_mut() {
            if *reset_pin == pin {
                let res = if high { reset.set_high() } else { reset.set_low() };
                return res.map_err(pin_err(pin));
            }
        }
        tracing::trace!(target: "acilink-hal", pin, high, "ignoring write to pin owned by another peripheral");
        Ok(())
    }
}

impl<REQ, RDY, RST> ErrorType for EhLines<REQ, RDY, RST> {
    type Error = EhLineError;
}

impl<REQ, RDY, RST> GpioProvider for EhLines<REQ, RDY, RST>
where
    REQ: OutputPin,
    RDY: InputPin,
    RST: OutputPin,
{
    fn configure(&mut self, _pin: u8, _mode: PinMode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.drive(pin, true)
    }

    fn set_low(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.drive(pin, false)
    }

    fn is_high(&mut self, pin: u8) -> Result<bool, Self::Error> {
        if pin == self.ready_pin {
            return self.ready.is_high().map_err(pin_err(pin));
        }
        Err(EhLineError::UnknownPin(pin))
    }
}
