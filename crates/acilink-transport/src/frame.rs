// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! ACI frame buffer
//!
//! A frame is exactly what crosses the bus in one handshake:
//!
//! ```text
//! ┌──────────┬───────────────────────────┐
//! │ Length   │ Payload                   │
//! │ (1 byte) │ (0..=MAX_LENGTH bytes)    │
//! └──────────┴───────────────────────────┘
//! ```
//!
//! Received frames also carry the status byte the coprocessor shifts out
//! while the host sends the length. The transport never looks inside the
//! payload.

use core::fmt;

/// Largest payload a frame can carry
pub const MAX_LENGTH: usize = 31;

/// Frame construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame of {len} bytes exceeds maximum of {max}")]
    TooLong { len: usize, max: usize },
}

/// One length-prefixed message
///
/// `buffer[0]` is the length byte as sent on the bus, `buffer[1..=len]`
/// the payload. Bytes past the payload are always zero, so equality is
/// equality of status and wire bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    status: u8,
    buffer: [u8; MAX_LENGTH + 1],
}

impl Frame {
    /// Zero-length placeholder sent when the transmit queue is empty
    pub const EMPTY: Frame = Frame {
        status: 0,
        buffer: [0; MAX_LENGTH + 1],
    };

    /// Build an outbound frame
    ///
    /// # Errors
    ///
    /// `FrameError::TooLong` if `payload` is longer than [`MAX_LENGTH`]
    pub fn new(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_LENGTH {
            return Err(FrameError::TooLong {
                len: payload.len(),
                max: MAX_LENGTH,
            });
        }
        let mut frame = Frame::EMPTY;
        frame.buffer[0] = payload.len() as u8;
        frame.buffer[1..=payload.len()].copy_from_slice(payload);
        Ok(frame)
    }

    /// Frame as received from the bus
    ///
    /// Anything clocked in past the declared length is dropped.
    pub(crate) fn received(status: u8, mut buffer: [u8; MAX_LENGTH + 1]) -> Self {
        let len = (buffer[0] as usize).min(MAX_LENGTH);
        buffer[0] = len as u8;
        buffer[len + 1..].fill(0);
        Frame { status, buffer }
    }

    /// Payload length
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer[0] as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer[0] == 0
    }

    /// Status byte reported by the coprocessor (0 on outbound frames)
    #[inline]
    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer[1..=self.len()]
    }

    /// Length byte followed by the payload
    pub fn as_wire(&self) -> &[u8] {
        &self.buffer[..=self.len()]
    }

    /// Byte at wire position `index`, or 0 past the end of the buffer
    #[inline]
    pub(crate) fn wire_byte(&self, index: usize) -> u8 {
        self.buffer.get(index).copied().unwrap_or(0)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::EMPTY
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    fn try_from(payload: &[u8]) -> Result<Self, Self::Error> {
        Frame::new(payload)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("status", &self.status)
            .field("len", &self.len())
            .field("payload", &self.payload())
            .finish()
    }
}

/// `<len> : <hex wire bytes>` rendering used by the debug echo
///
/// The hex list starts with the length byte itself.
pub struct FrameDump<'a>(pub &'a Frame);

impl fmt::Display for FrameDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :", self.0.len())?;
        for byte in self.0.as_wire() {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}
