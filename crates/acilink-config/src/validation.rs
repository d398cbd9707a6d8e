// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Rejects wiring and bus settings that cannot work before any line is
//! touched. Unknown board names never reach this point: they fail while
//! parsing.

use crate::AciConfig;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Pin conflict: {first} and {second} both use pin {pin}")]
    PinConflict {
        first: &'static str,
        second: &'static str,
        pin: u8,
    },

    #[error("Invalid SPI clock divider {0}: must be a power of two between 2 and 128")]
    InvalidClockDivider(u8),
}

/// Validate the complete configuration
///
/// Checks for:
/// - Pin conflicts (no two lines on the same pin)
/// - SPI clock divider range
///
/// # Errors
///
/// Returns the first violation found
pub fn validate_config(config: &AciConfig) -> Result<(), ConfigValidationError> {
    let mut first = None;
    visit_violations(config, &mut |violation| {
        first.get_or_insert(violation);
    });
    match first {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Report every violation in `config` to `report`
pub fn visit_violations(config: &AciConfig, report: &mut dyn FnMut(ConfigValidationError)) {
    validate_pin_conflicts(config, report);
    validate_clock_divider(config, report);
}

fn validate_pin_conflicts(config: &AciConfig, report: &mut dyn FnMut(ConfigValidationError)) {
    for (i, (first, pin)) in config.pins.assigned().enumerate() {
        if let Some((second, _)) = config
            .pins
            .assigned()
            .skip(i + 1)
            .find(|(_, other)| *other == pin)
        {
            report(ConfigValidationError::PinConflict { first, second, pin });
        }
    }
}

fn validate_clock_divider(config: &AciConfig, report: &mut dyn FnMut(ConfigValidationError)) {
    let divider = config.bus.clock_divider;
    if !(2..=128).contains(&divider) || !divider.is_power_of_two() {
        report(ConfigValidationError::InvalidClockDivider(divider));
    }
}
