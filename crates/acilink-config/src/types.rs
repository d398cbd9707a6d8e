// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! These structs map to the sections of `acilink.toml`:
//!
//! ```toml
//! board = "redbearlab-v1.1"
//! interrupt_driven = true
//! wake_trigger = "low-level"
//! debug_echo = false
//!
//! [pins]
//! request = 9
//! ready = 8
//! reset = 4
//! clock = 13
//! data_in = 12
//! data_out = 11
//!
//! [bus]
//! clock_divider = 8
//! bit_order = "lsb-first"
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub use acilink_hal::{BitOrder, BusSettings, WakeTrigger};

/// Delay after the reset pulse before the coprocessor owns its lines
pub const SETTLE_DELAY_MS: u32 = 30;

/// Time the RedBearLab power-on-reset circuit needs to trigger
pub const POR_RESET_DELAY_MS: u32 = 100;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AciConfig {
    pub pins: PinAssignments,
    pub bus: BusSettings,
    pub board: BoardVariant,
    /// Run transfers from the ready-line interrupt instead of polling
    pub interrupt_driven: bool,
    pub wake_trigger: WakeTrigger,
    /// Log every command sent and event received
    pub debug_echo: bool,
}

impl AciConfig {
    /// Reset profile for the configured board
    pub fn board_profile(&self) -> &'static BoardProfile {
        BoardProfile::for_variant(self.board)
    }
}

/// Line assignments
///
/// Pin numbers are whatever the platform GPIO provider understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PinAssignments {
    /// REQN, host output, active low
    pub request: u8,
    /// RDYN, coprocessor output, active low
    pub ready: u8,
    pub reset: Option<u8>,
    /// ACTIVE, optional coprocessor status output
    pub active: Option<u8>,
    pub clock: u8,
    /// MISO
    pub data_in: u8,
    /// MOSI
    pub data_out: u8,
}

impl PinAssignments {
    /// Every assigned line with its field name
    pub fn assigned(&self) -> impl Iterator<Item = (&'static str, u8)> {
        [
            ("pins.request", Some(self.request)),
            ("pins.ready", Some(self.ready)),
            ("pins.reset", self.reset),
            ("pins.active", self.active),
            ("pins.clock", Some(self.clock)),
            ("pins.data_in", Some(self.data_in)),
            ("pins.data_out", Some(self.data_out)),
        ]
        .into_iter()
        .filter_map(|(name, pin)| pin.map(|p| (name, p)))
    }
}

impl Default for PinAssignments {
    fn default() -> Self {
        // Arduino Uno shield wiring
        Self {
            request: 9,
            ready: 8,
            reset: Some(4),
            active: None,
            clock: 13,
            data_in: 12,
            data_out: 11,
        }
    }
}

/// Board the coprocessor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum BoardVariant {
    #[default]
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "redbearlab-v1.1")]
    RedBearLabV1_1,
    #[serde(rename = "redbearlab-v2012.07")]
    RedBearLabV2012_07,
}

impl BoardVariant {
    pub const ALL: [BoardVariant; 3] = [
        BoardVariant::Standard,
        BoardVariant::RedBearLabV1_1,
        BoardVariant::RedBearLabV2012_07,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardVariant::Standard => "standard",
            BoardVariant::RedBearLabV1_1 => "redbearlab-v1.1",
            BoardVariant::RedBearLabV2012_07 => "redbearlab-v2012.07",
        }
    }
}

impl fmt::Display for BoardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board name not recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown board variant (expected standard, redbearlab-v1.1 or redbearlab-v2012.07)")]
pub struct UnknownBoardVariant;

impl FromStr for BoardVariant {
    type Err = UnknownBoardVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BoardVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .or_else(|| {
                // Tolerate the underscore spellings used in firmware defines
                if s.eq_ignore_ascii_case("redbearlab_shield_v1_1") {
                    Some(BoardVariant::RedBearLabV1_1)
                } else if s.eq_ignore_ascii_case("redbearlab_shield_v2012_07") {
                    Some(BoardVariant::RedBearLabV2012_07)
                } else {
                    None
                }
            })
            .ok_or(UnknownBoardVariant)
    }
}

/// One step of a reset pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    High,
    Low,
    DelayMs(u32),
}

/// Board-specific behaviour selected at initialisation
#[derive(Debug, PartialEq, Eq)]
pub struct BoardProfile {
    pub variant: BoardVariant,
    /// Sequence driven on the reset line by a pin reset
    pub reset_sequence: &'static [ResetStep],
}

static STANDARD: BoardProfile = BoardProfile {
    variant: BoardVariant::Standard,
    reset_sequence: &[ResetStep::High, ResetStep::Low, ResetStep::High],
};

// Inverted reset behind a power-on-reset circuit
static REDBEARLAB_V1_1: BoardProfile = BoardProfile {
    variant: BoardVariant::RedBearLabV1_1,
    reset_sequence: &[
        ResetStep::High,
        ResetStep::DelayMs(POR_RESET_DELAY_MS),
        ResetStep::Low,
    ],
};

static REDBEARLAB_V2012_07: BoardProfile = BoardProfile {
    variant: BoardVariant::RedBearLabV2012_07,
    reset_sequence: &[
        ResetStep::High,
        ResetStep::DelayMs(POR_RESET_DELAY_MS),
        ResetStep::Low,
    ],
};

impl BoardProfile {
    pub fn for_variant(variant: BoardVariant) -> &'static BoardProfile {
        match variant {
            BoardVariant::Standard => &STANDARD,
            BoardVariant::RedBearLabV1_1 => &REDBEARLAB_V1_1,
            BoardVariant::RedBearLabV2012_07 => &REDBEARLAB_V2012_07,
        }
    }

    /// Total time the reset sequence blocks for
    pub fn reset_duration_ms(&self) -> u32 {
        self.reset_sequence
            .iter()
            .map(|step| match step {
                ResetStep::DelayMs(ms) => *ms,
                _ => 0,
            })
            .sum()
    }
}
