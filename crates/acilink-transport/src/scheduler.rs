// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Transfer scheduling
//!
//! Decides on each wake (foreground poll or ready-line interrupt) whether a
//! handshake runs, and masks the ready-line interrupt while the receive
//! queue has no room.
//!
//! ```text
//!            rx full? ──yes──> mask wake, skip (backpressure)
//!               │no
//!         RDYN asserted? ──no──> tx pending? ──yes──> assert REQN
//!               │yes
//!     transfer(tx head or empty frame)
//!               │
//!     event? ──yes──> enqueue rx, mask wake if rx now full
//!               │
//!     rx room and tx pending? ──yes──> assert REQN
//! ```

use acilink_hal::{GpioProvider, SpiBus, WakeSource, WakeTrigger};

use crate::engine::TransferEngine;
use crate::error::TransportError;
use crate::frame::Frame;
use crate::lines::LineController;
use crate::queue::SharedQueue;

/// What woke the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Poll,
    Interrupt,
}

/// What a scheduler tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Receive queue full; no transfer attempted
    Backpressure,
    /// RDYN not asserted; REQN asserted because commands are waiting
    RequestedReady,
    /// RDYN not asserted and nothing to send
    Idle,
    /// A handshake ran
    Transferred {
        /// A command left the transmit queue
        sent: bool,
        /// An event entered the receive queue
        received: bool,
        /// Payload byte pairs exchanged after negotiation
        exchanged: u8,
    },
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Completed handshakes
    pub transfers: u32,
    pub frames_sent: u32,
    pub frames_received: u32,
    /// Payload byte pairs exchanged after negotiation, summed
    pub bytes_exchanged: u32,
    /// Ticks skipped because the receive queue was full
    pub backpressure_skips: u32,
}

/// Wake-source owner and transfer decision logic
pub struct Scheduler<W> {
    wake: W,
    interrupt_driven: bool,
    trigger: WakeTrigger,
}

impl<W: WakeSource> Scheduler<W> {
    pub fn new(wake: W, interrupt_driven: bool, trigger: WakeTrigger) -> Self {
        Self {
            wake,
            interrupt_driven,
            trigger,
        }
    }

    #[inline]
    pub fn interrupt_driven(&self) -> bool {
        self.interrupt_driven
    }

    pub fn is_armed(&self) -> bool {
        self.wake.is_armed()
    }

    /// Unmask the ready-line interrupt (interrupt-driven mode only)
    pub fn arm(&mut self) -> Result<(), TransportError> {
        if !self.interrupt_driven {
            return Ok(());
        }
        tracing::trace!(target: "acilink-transport", trigger = ?self.trigger, "arming RDYN wake");
        let trigger = self.trigger;
        self.wake.arm(trigger).map_err(|err| {
            tracing::error!(target: "acilink-transport", error = ?err, "wake arm failed");
            TransportError::Wake
        })
    }

    /// Mask the ready-line interrupt
    pub fn disarm(&mut self) -> Result<(), TransportError> {
        if !self.interrupt_driven {
            return Ok(());
        }
        tracing::trace!(target: "acilink-transport", "masking RDYN wake");
        self.wake.disarm().map_err(|err| {
            tracing::error!(target: "acilink-transport", error = ?err, "wake disarm failed");
            TransportError::Wake
        })
    }

    /// Run one scheduling step
    ///
    /// A failed handshake leaves both queues as they were.
    ///
    /// # Panics
    ///
    /// If a received event cannot be stored. The backpressure guard makes
    /// this unreachable unless the receive queue is filled behind the
    /// scheduler's back, and dropping the event would desynchronise the
    /// next handshake.
    pub fn tick<B: SpiBus, G: GpioProvider, const N: usize>(
        &mut self,
        wake: Wake,
        engine: &mut TransferEngine<B>,
        lines: &mut LineController<G>,
        tx: &SharedQueue<N>,
        rx: &SharedQueue<N>,
        stats: &mut TransportStats,
    ) -> Result<TickOutcome, TransportError> {
        if rx.is_full() {
            stats.backpressure_skips = stats.backpressure_skips.wrapping_add(1);
            tracing::trace!(target: "acilink-transport", ?wake, "receive queue full, skipping");
            // Wake stays masked while full
            if self.is_armed() {
                self.disarm()?;
            }
            return Ok(TickOutcome::Backpressure);
        }

        if !lines.ready_asserted()? {
            if tx.is_empty() {
                return Ok(TickOutcome::Idle);
            }
            lines.assert_request()?;
            return Ok(TickOutcome::RequestedReady);
        }

        let pending = tx.peek();
        let outgoing = pending.unwrap_or(Frame::EMPTY);
        let transfer = engine.transfer(lines, &outgoing)?;

        let sent = pending.is_some();
        if sent {
            tx.dequeue();
            stats.frames_sent = stats.frames_sent.wrapping_add(1);
        }
        stats.transfers = stats.transfers.wrapping_add(1);
        stats.bytes_exchanged = stats.bytes_exchanged.wrapping_add(transfer.exchanged as u32);

        let received = !transfer.received.is_empty();
        if received {
            store_received(rx, transfer.received);
            stats.frames_received = stats.frames_received.wrapping_add(1);
            if rx.is_full() {
                self.disarm()?;
            }
        }

        if !rx.is_full() && !tx.is_empty() {
            lines.assert_request()?;
        }

        Ok(TickOutcome::Transferred {
            sent,
            received,
            exchanged: transfer.exchanged,
        })
    }

    pub fn release(self) -> W {
        self.wake
    }
}

/// Enqueue an event that has already been clocked off the bus
fn store_received<const N: usize>(rx: &SharedQueue<N>, event: Frame) {
    if let Err(event) = rx.enqueue(event) {
        panic!(
            "ACI receive queue overflow: event {:?} arrived with no room ({} frames queued)",
            event,
            rx.len()
        );
    }
}
