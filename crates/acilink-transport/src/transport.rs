// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Application-facing transport
//!
//! [`Transport`] owns the bus, the lines, the delay source, the wake source
//! and both frame queues. Commands go in with [`Transport::send`], events
//! come out with [`Transport::try_receive`].
//!
//! ## Polled mode
//!
//! Every `try_receive` (and `peek_receive`) runs one scheduler tick first,
//! so calling it from the main loop is enough to keep traffic moving.
//!
//! ## Interrupt-driven mode
//!
//! The platform calls [`Transport::on_ready_interrupt`] from the RDYN
//! interrupt. The transport is shared with the foreground through a
//! critical-section mutex:
//!
//! ```rust,ignore
//! static ACI: Mutex<RefCell<Option<Transport<Bus, Lines, Delay, RdynIrq>>>> =
//!     Mutex::new(RefCell::new(None));
//!
//! #[interrupt]
//! fn EXTI0() {
//!     critical_section::with(|cs| {
//!         if let Some(aci) = ACI.borrow_ref_mut(cs).as_mut() {
//!             let _ = aci.on_ready_interrupt();
//!         }
//!     });
//! }
//! ```

use acilink_config::{validate_config, AciConfig, SETTLE_DELAY_MS};
use acilink_hal::{GpioProvider, NoWake, SpiBus, TimeProvider, WakeSource};

use crate::engine::TransferEngine;
use crate::error::{SendError, TransportError};
use crate::frame::{Frame, FrameDump};
use crate::lines::LineController;
use crate::queue::{SharedQueue, DEFAULT_QUEUE_CAPACITY};
use crate::scheduler::{Scheduler, TickOutcome, TransportStats, Wake};

/// Flow-controlled ACI transport
///
/// `N` is the capacity of each queue.
pub struct Transport<B, G, T, W = NoWake, const N: usize = DEFAULT_QUEUE_CAPACITY> {
    config: AciConfig,
    engine: TransferEngine<B>,
    lines: LineController<G>,
    time: T,
    scheduler: Scheduler<W>,
    tx: SharedQueue<N>,
    rx: SharedQueue<N>,
    debug_echo: bool,
    stats: TransportStats,
}

impl<B, G, T, W, const N: usize> Transport<B, G, T, W, N>
where
    B: SpiBus,
    G: GpioProvider,
    T: TimeProvider,
    W: WakeSource,
{
    /// Bring up the link
    ///
    /// Validates `config`, configures the bus, empties both queues, sets line
    /// directions, pulses reset, parks the lines at their idle levels, waits
    /// for the coprocessor to settle and, in interrupt-driven mode, unmasks
    /// the ready-line wake.
    ///
    /// # Errors
    ///
    /// `TransportError::Config` for an invalid configuration; any HAL fault
    /// met along the way.
    pub fn initialize(
        config: AciConfig,
        bus: B,
        gpio: G,
        time: T,
        wake: W,
    ) -> Result<Self, TransportError> {
        validate_config(&config).inspect_err(|err| {
            tracing::error!(target: "acilink-transport", %err, "rejecting configuration");
        })?;

        let mut transport = Self {
            engine: TransferEngine::new(bus, config.bus),
            lines: LineController::new(gpio, config.pins),
            time,
            scheduler: Scheduler::new(wake, config.interrupt_driven, config.wake_trigger),
            tx: SharedQueue::new(),
            rx: SharedQueue::new(),
            debug_echo: config.debug_echo,
            stats: TransportStats::default(),
            config,
        };

        transport.engine.configure()?;
        transport.lines.configure()?;
        transport.pin_reset()?;
        transport.lines.drive_idle()?;
        transport.time.delay_ms(SETTLE_DELAY_MS);
        transport.scheduler.arm()?;

        tracing::info!(
            target: "acilink-transport",
            board = %transport.config.board,
            interrupt_driven = transport.config.interrupt_driven,
            queue_capacity = N,
            "ACI transport initialised"
        );
        Ok(transport)
    }

    /// Queue a command for the coprocessor
    ///
    /// REQN is asserted straight away when the receive queue can take the
    /// reply; otherwise the request waits until an event is consumed.
    ///
    /// # Errors
    ///
    /// `SendError::QueueFull` if the transmit queue has no room
    pub fn send(&mut self, frame: Frame) -> Result<(), SendError> {
        self.tx.enqueue(frame).map_err(|_| SendError::QueueFull)?;

        if !self.rx.is_full() {
            // Frame is queued either way; the next tick retries the request
            if let Err(err) = self.lines.assert_request() {
                tracing::warn!(target: "acilink-transport", %err, "could not request transfer after send");
            }
        }
        if self.debug_echo {
            tracing::info!(target: "acilink::echo", "C {}", FrameDump(&frame));
        }
        Ok(())
    }

    /// Build a frame from `payload` and queue it
    ///
    /// # Errors
    ///
    /// `SendError::FrameTooLong` if `payload` exceeds [`MAX_LENGTH`](crate::MAX_LENGTH),
    /// `SendError::QueueFull` if the transmit queue has no room
    pub fn send_bytes(&mut self, payload: &[u8]) -> Result<(), SendError> {
        self.send(Frame::new(payload)?)
    }

    /// Take the oldest received event, if any
    ///
    /// In polled mode a scheduler tick runs first. A failed tick is only
    /// reported when there is no stored event to hand out. Consuming an
    /// event unmasks the ready-line wake again in interrupt-driven mode.
    pub fn try_receive(&mut self) -> Result<Option<Frame>, TransportError> {
        let ticked = self.foreground_tick();

        let Some(event) = self.rx.dequeue() else {
            return ticked.map(|()| None);
        };
        if let Err(err) = ticked {
            tracing::warn!(target: "acilink-transport", %err, "tick failed, delivering stored event");
        }

        if self.debug_echo {
            tracing::info!(target: "acilink::echo", "E {}", FrameDump(&event));
        }
        // Event is already out of the queue; later ticks retry these
        if let Err(err) = self.resume_flow() {
            tracing::warn!(target: "acilink-transport", %err, "could not resume flow after receive");
        }
        Ok(Some(event))
    }

    /// Look at the oldest received event without taking it
    ///
    /// In polled mode a scheduler tick runs first. A failed tick is only
    /// reported when there is no stored event to show.
    pub fn peek_receive(&mut self) -> Result<Option<Frame>, TransportError> {
        let ticked = self.foreground_tick();
        match self.rx.peek() {
            Some(event) => Ok(Some(event)),
            None => ticked.map(|()| None),
        }
    }

    fn foreground_tick(&mut self) -> Result<(), TransportError> {
        if self.scheduler.interrupt_driven() || self.rx.is_full() {
            return Ok(());
        }
        self.poll().map(|_| ())
    }

    /// Unmask the wake and re-request once the receive queue has room
    fn resume_flow(&mut self) -> Result<(), TransportError> {
        if self.rx.is_full() {
            return Ok(());
        }
        if self.scheduler.interrupt_driven() && !self.scheduler.is_armed() {
            self.scheduler.arm()?;
        }
        if !self.tx.is_empty() {
            self.lines.assert_request()?;
        }
        Ok(())
    }

    /// Run one scheduler tick from the foreground
    pub fn poll(&mut self) -> Result<TickOutcome, TransportError> {
        self.tick(Wake::Poll)
    }

    /// Ready-line interrupt entry point
    ///
    /// Never blocks beyond one handshake.
    pub fn on_ready_interrupt(&mut self) -> Result<TickOutcome, TransportError> {
        self.tick(Wake::Interrupt)
    }

    fn tick(&mut self, wake: Wake) -> Result<TickOutcome, TransportError> {
        self.scheduler.tick(
            wake,
            &mut self.engine,
            &mut self.lines,
            &self.tx,
            &self.rx,
            &mut self.stats,
        )
    }

    /// Drop every queued command and event
    ///
    /// The wake source is masked while both queues are cleared in one
    /// critical section, then unmasked (interrupt-driven mode only).
    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.scheduler.disarm()?;

        critical_section::with(|cs| {
            self.tx.borrow_mut(cs).clear();
            self.rx.borrow_mut(cs).clear();
        });
        tracing::debug!(target: "acilink-transport", "queues flushed");

        // Also undoes a mask left by backpressure, since rx is now empty
        self.scheduler.arm()
    }

    /// Pulse the reset line with the board's sequence
    pub fn pin_reset(&mut self) -> Result<(), TransportError> {
        let profile = self.config.board_profile();
        self.lines.pin_reset(profile, &mut self.time)
    }

    pub fn receive_queue_full(&self) -> bool {
        self.rx.is_full()
    }

    pub fn receive_queue_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn transmit_queue_full(&self) -> bool {
        self.tx.is_full()
    }

    pub fn transmit_queue_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Turn the `C`/`E` frame echo on or off
    pub fn set_debug_echo(&mut self, enable: bool) {
        self.debug_echo = enable;
    }

    pub fn debug_echo(&self) -> bool {
        self.debug_echo
    }

    /// Level of the ACTIVE line, if one is wired
    pub fn active(&mut self) -> Result<Option<bool>, TransportError> {
        self.lines.active_high()
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    pub fn config(&self) -> &AciConfig {
        &self.config
    }

    /// Tear down and hand back the platform resources
    pub fn release(self) -> (B, G, T, W) {
        (
            self.engine.release(),
            self.lines.release(),
            self.time,
            self.scheduler.release(),
        )
    }
}
