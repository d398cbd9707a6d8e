// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Handshake line control
//!
//! REQN (host to coprocessor) and RDYN (coprocessor to host) are both active
//! low. The controller also owns the reset pulse and the idle levels the
//! coprocessor expects after reset.

use acilink_config::{BoardProfile, PinAssignments, ResetStep};
use acilink_hal::{GpioProvider, PinMode, TimeProvider};

use crate::error::{line_fault, Line, TransportError};

/// Owns the GPIO provider and the configured line assignments
pub struct LineController<G> {
    gpio: G,
    pins: PinAssignments,
    request_asserted: bool,
}

impl<G: GpioProvider> LineController<G> {
    pub fn new(gpio: G, pins: PinAssignments) -> Self {
        Self {
            gpio,
            pins,
            request_asserted: false,
        }
    }

    pub fn pins(&self) -> &PinAssignments {
        &self.pins
    }

    /// Set line directions: RDYN pulled up, REQN output, ACTIVE input if wired
    pub fn configure(&mut self) -> Result<(), TransportError> {
        self.gpio
            .configure(self.pins.ready, PinMode::InputPullUp)
            .map_err(line_fault(Line::Ready))?;
        self.gpio
            .configure(self.pins.request, PinMode::Output)
            .map_err(line_fault(Line::Request))?;
        if let Some(active) = self.pins.active {
            self.gpio
                .configure(active, PinMode::Input)
                .map_err(line_fault(Line::Active))?;
        }
        Ok(())
    }

    /// Pull REQN low to ask for a transfer window
    pub fn assert_request(&mut self) -> Result<(), TransportError> {
        self.gpio
            .set_low(self.pins.request)
            .map_err(line_fault(Line::Request))?;
        if !self.request_asserted {
            tracing::trace!(target: "acilink-transport", "REQN asserted");
        }
        self.request_asserted = true;
        Ok(())
    }

    /// Release REQN
    pub fn deassert_request(&mut self) -> Result<(), TransportError> {
        self.gpio
            .set_high(self.pins.request)
            .map_err(line_fault(Line::Request))?;
        if self.request_asserted {
            tracing::trace!(target: "acilink-transport", "REQN released");
        }
        self.request_asserted = false;
        Ok(())
    }

    /// Last level this controller drove on REQN
    pub fn request_asserted(&self) -> bool {
        self.request_asserted
    }

    /// Whether the coprocessor holds RDYN low
    pub fn ready_asserted(&mut self) -> Result<bool, TransportError> {
        self.gpio
            .is_low(self.pins.ready)
            .map_err(line_fault(Line::Ready))
    }

    /// Level of the ACTIVE line, if one is wired
    pub fn active_high(&mut self) -> Result<Option<bool>, TransportError> {
        match self.pins.active {
            Some(pin) => self
                .gpio
                .is_high(pin)
                .map(Some)
                .map_err(line_fault(Line::Active)),
            None => Ok(None),
        }
    }

    /// Drive the board's reset sequence on the reset line
    ///
    /// Does nothing when no reset line is assigned.
    pub fn pin_reset<T: TimeProvider>(
        &mut self,
        profile: &BoardProfile,
        time: &mut T,
    ) -> Result<(), TransportError> {
        let Some(reset) = self.pins.reset else {
            return Ok(());
        };

        tracing::debug!(target: "acilink-transport", board = %profile.variant, pin = reset, "pin reset");
        self.gpio
            .configure(reset, PinMode::Output)
            .map_err(line_fault(Line::Reset))?;
        for step in profile.reset_sequence {
            match *step {
                ResetStep::High => self.gpio.set_high(reset).map_err(line_fault(Line::Reset))?,
                ResetStep::Low => self.gpio.set_low(reset).map_err(line_fault(Line::Reset))?,
                ResetStep::DelayMs(ms) => time.delay_ms(ms),
            }
        }
        Ok(())
    }

    /// Put SPI lines low and REQN high, the state the coprocessor expects after reset
    pub fn drive_idle(&mut self) -> Result<(), TransportError> {
        self.gpio
            .set_low(self.pins.data_in)
            .map_err(line_fault(Line::DataIn))?;
        self.gpio
            .set_low(self.pins.data_out)
            .map_err(line_fault(Line::DataOut))?;
        self.gpio
            .set_low(self.pins.clock)
            .map_err(line_fault(Line::Clock))?;
        self.deassert_request()
    }

    pub fn release(self) -> G {
        self.gpio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acilink_config::BoardVariant;
    use acilink_hal::platforms::MockCoprocessor;

    fn controller() -> (MockCoprocessor, LineController<acilink_hal::platforms::MockGpio>) {
        let pins = PinAssignments::default();
        let chip = MockCoprocessor::new(pins.request, pins.ready);
        let lines = LineController::new(chip.gpio(), pins);
        (chip, lines)
    }

    #[test]
    fn test_configure_directions() {
        let (chip, mut lines) = controller();
        lines.configure().unwrap();
        assert_eq!(chip.mode(8), Some(PinMode::InputPullUp));
        assert_eq!(chip.mode(9), Some(PinMode::Output));
    }

    #[test]
    fn test_request_line_is_active_low() {
        let (chip, mut lines) = controller();
        lines.assert_request().unwrap();
        assert_eq!(chip.level(9), Some(false));
        assert!(lines.request_asserted());
        assert!(lines.ready_asserted().unwrap());

        lines.deassert_request().unwrap();
        assert_eq!(chip.level(9), Some(true));
        assert!(!lines.ready_asserted().unwrap());
    }

    #[test]
    fn test_standard_reset_pulse() {
        let (chip, mut lines) = controller();
        let mut time = chip.time();
        let profile = BoardProfile::for_variant(BoardVariant::Standard);

        lines.pin_reset(profile, &mut time).unwrap();
        assert_eq!(chip.history(4), vec![true, false, true]);
        assert!(chip.delays_us().is_empty());
    }

    #[test]
    fn test_redbearlab_reset_pulse() {
        let (chip, mut lines) = controller();
        let mut time = chip.time();
        let profile = BoardProfile::for_variant(BoardVariant::RedBearLabV1_1);

        lines.pin_reset(profile, &mut time).unwrap();
        assert_eq!(chip.history(4), vec![true, false]);
        assert_eq!(chip.delays_us(), vec![100_000]);
    }

    #[test]
    fn test_no_reset_line() {
        let pins = PinAssignments {
            reset: None,
            ..PinAssignments::default()
        };
        let chip = MockCoprocessor::new(pins.request, pins.ready);
        let mut lines = LineController::new(chip.gpio(), pins);

        lines
            .pin_reset(BoardProfile::for_variant(BoardVariant::Standard), &mut chip.time())
            .unwrap();
        assert!(chip.history(4).is_empty());
    }

    #[test]
    fn test_line_fault_is_reported() {
        let (chip, mut lines) = controller();
        chip.fail_line(Some(9));
        assert_eq!(
            lines.assert_request(),
            Err(TransportError::Line { line: Line::Request })
        );
    }
}
