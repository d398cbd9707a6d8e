// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Transport error types

use core::fmt;

use acilink_config::ConfigValidationError;

use crate::frame::FrameError;

/// Lines the transport drives or reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Request,
    Ready,
    Reset,
    Active,
    Clock,
    DataIn,
    DataOut,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Line::Request => "REQN",
            Line::Ready => "RDYN",
            Line::Reset => "RESET",
            Line::Active => "ACTIVE",
            Line::Clock => "SCK",
            Line::DataIn => "MISO",
            Line::DataOut => "MOSI",
        })
    }
}

/// Faults that stop a transport operation
///
/// The platform's own error value is logged where it happens; only the
/// failing component is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("SPI exchange failed")]
    Bus,

    #[error("{line} line fault")]
    Line { line: Line },

    #[error("wake source fault")]
    Wake,
}

/// Why [`send`](crate::Transport::send) rejected a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("frame of {len} bytes exceeds maximum of {max}")]
    FrameTooLong { len: usize, max: usize },

    #[error("transmit queue full")]
    QueueFull,
}

impl From<FrameError> for SendError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::TooLong { len, max } => SendError::FrameTooLong { len, max },
        }
    }
}

/// Log a platform error and map it to a line fault
pub(crate) fn line_fault<E: fmt::Debug>(line: Line) -> impl FnOnce(E) -> TransportError {
    move |err| {
        tracing::error!(target: "acilink-transport", %line, error = ?err, "line fault");
        TransportError::Line { line }
    }
}
