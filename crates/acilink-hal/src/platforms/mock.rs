// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Simulated radio coprocessor
//!
//! Models the slave side of the request/ready handshake so the transport can
//! be exercised on the host. A single [`MockCoprocessor`] hands out the bus,
//! GPIO, delay and wake handles; they share state, so the test keeps the
//! coprocessor and inspects it after the transport has taken the handles.
//!
//! Wire behaviour per handshake (bytes indexed from the start of the
//! exchange, request line low):
//!
//! | Byte | Host sends | Coprocessor replies |
//! |------|------------|---------------------|
//! | 0 | command length | status byte |
//! | 1 | first command byte | length of pending event (0 if none) |
//! | n >= 2 | command byte n-1 | event byte n-2 |
//!
//! The ready line (active low) is asserted while the request line is
//! asserted or an event is pending, unless a test overrides it.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::hal::{
    BusSettings, ErrorType, GpioProvider, PinMode, SpiBus, TimeProvider, WakeSource, WakeTrigger,
};

/// Faults the simulated hardware can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Injected bus fault
    BusFault,
    /// Injected fault on a line
    LineFault(u8),
    /// Injected fault on the wake source
    WakeFault,
}

/// One completed handshake as seen on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockTransaction {
    /// Bytes the host shifted out, in application bit order
    pub host_bytes: Vec<u8>,
    /// Bytes the coprocessor shifted out, in application bit order
    pub device_bytes: Vec<u8>,
}

impl MockTransaction {
    /// Length byte the host declared
    pub fn host_length(&self) -> u8 {
        self.host_bytes.first().copied().unwrap_or(0)
    }

    /// Number of byte pairs exchanged after the two negotiation bytes
    pub fn payload_exchanges(&self) -> usize {
        self.host_bytes.len().saturating_sub(2)
    }
}

#[derive(Debug)]
struct MockState {
    request_pin: u8,
    ready_pin: u8,

    levels: HashMap<u8, bool>,
    modes: HashMap<u8, PinMode>,
    history: HashMap<u8, Vec<bool>>,

    status: u8,
    filler: u8,
    events: VecDeque<Vec<u8>>,
    commands: Vec<Vec<u8>>,
    current: Option<(MockTransaction, Option<Vec<u8>>)>,
    transactions: Vec<MockTransaction>,

    ready_override: Option<bool>,
    bus_fault_after: Option<usize>,
    line_fault: Option<u8>,
    wake_fault: bool,

    settings: Option<BusSettings>,
    delays_us: Vec<u32>,
    armed: Option<WakeTrigger>,
    arm_count: usize,
    disarm_count: usize,
}

impl MockState {
    fn request_asserted(&self) -> bool {
        // Request line is active low and idles high
        !self.levels.get(&self.request_pin).copied().unwrap_or(true)
    }

    fn ready_asserted(&self) -> bool {
        match self.ready_override {
            Some(asserted) => asserted,
            None => self.request_asserted() || !self.events.is_empty(),
        }
    }

    fn wire_reversed(&self) -> bool {
        self.settings.map(|s| !s.bit_order.hardware_lsb_first()).unwrap_or(false)
    }

    fn exchange(&mut self, wire_out: u8) -> Result<u8, MockError> {
        if let Some(remaining) = self.bus_fault_after.as_mut() {
            if *remaining == 0 {
                return Err(MockError::BusFault);
            }
            *remaining -= 1;
        }

        let reversed = self.wire_reversed();
        let host_byte = if reversed { wire_out.reverse_bits() } else { wire_out };

        if self.current.is_none() {
            let event = self.events.front().cloned();
            self.current = Some((MockTransaction::default(), event));
        }
        let status = self.status;
        let Some((txn, event)) = self.current.as_mut() else {
            return Err(MockError::BusFault);
        };

        let index = txn.host_bytes.len();
        let reply = match index {
            0 => status,
            1 => event.as_ref().map(|e| e.len() as u8).unwrap_or(0),
            n => event
                .as_ref()
                .and_then(|e| e.get(n - 2).copied())
                .unwrap_or(self.filler),
        };
        txn.host_bytes.push(host_byte);
        txn.device_bytes.push(reply);

        Ok(if reversed { reply.reverse_bits() } else { reply })
    }

    fn close_transaction(&mut self) {
        let Some((txn, event)) = self.current.take() else {
            return;
        };

        let declared = txn.host_length() as usize;
        if declared > 0 && txn.host_bytes.len() > declared {
            self.commands.push(txn.host_bytes[1..=declared].to_vec());
        }
        if event.is_some() && txn.host_bytes.len() >= 2 {
            self.events.pop_front();
        }
        self.transactions.push(txn);
    }

    fn drive(&mut self, pin: u8, high: bool) -> Result<(), MockError> {
        if self.line_fault == Some(pin) {
            return Err(MockError::LineFault(pin));
        }
        self.levels.insert(pin, high);
        self.history.entry(pin).or_default().push(high);
        if pin == self.request_pin && high {
            self.close_transaction();
        }
        Ok(())
    }
}

/// Simulated coprocessor and the handles that drive it
#[derive(Debug, Clone)]
pub struct MockCoprocessor {
    state: Rc<RefCell<MockState>>,
}

impl MockCoprocessor {
    /// Create a coprocessor wired to the given request and ready pins
    pub fn new(request_pin: u8, ready_pin: u8) -> Self {
        let state = MockState {
            request_pin,
            ready_pin,
            levels: HashMap::new(),
            modes: HashMap::new(),
            history: HashMap::new(),
            status: 0,
            filler: 0,
            events: VecDeque::new(),
            commands: Vec::new(),
            current: None,
            transactions: Vec::new(),
            ready_override: None,
            bus_fault_after: None,
            line_fault: None,
            wake_fault: false,
            settings: None,
            delays_us: Vec::new(),
            armed: None,
            arm_count: 0,
            disarm_count: 0,
        };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    /// SPI handle
    pub fn bus(&self) -> MockBus {
        MockBus { state: Rc::clone(&self.state) }
    }

    /// GPIO handle
    pub fn gpio(&self) -> MockGpio {
        MockGpio { state: Rc::clone(&self.state) }
    }

    /// Delay handle
    pub fn time(&self) -> MockTime {
        MockTime { state: Rc::clone(&self.state) }
    }

    /// Wake source handle
    pub fn wake(&self) -> MockWake {
        MockWake { state: Rc::clone(&self.state) }
    }

    // ===== Scripting =====

    /// Queue an event the coprocessor will push on a following handshake
    pub fn queue_event(&self, data: &[u8]) {
        self.state.borrow_mut().events.push_back(data.to_vec());
    }

    /// Status byte returned as the first byte of every handshake
    pub fn set_status(&self, status: u8) {
        self.state.borrow_mut().status = status;
    }

    /// Byte shifted out once the current event (if any) is exhausted
    pub fn set_filler(&self, byte: u8) {
        self.state.borrow_mut().filler = byte;
    }

    /// Force the ready line (`Some(true)` = asserted) or restore automatic behaviour
    pub fn set_ready_override(&self, asserted: Option<bool>) {
        self.state.borrow_mut().ready_override = asserted;
    }

    /// Let `n` more bytes through, then fail every exchange
    pub fn fail_bus_after(&self, n: usize) {
        self.state.borrow_mut().bus_fault_after = Some(n);
    }

    /// Fail every write to `pin`
    pub fn fail_line(&self, pin: Option<u8>) {
        self.state.borrow_mut().line_fault = pin;
    }

    /// Fail every arm/disarm request
    pub fn fail_wake(&self, fail: bool) {
        self.state.borrow_mut().wake_fault = fail;
    }

    /// Clear injected faults
    pub fn heal(&self) {
        let mut state = self.state.borrow_mut();
        state.bus_fault_after = None;
        state.line_fault = None;
        state.wake_fault = false;
    }

    // ===== Inspection =====

    /// Command payloads the host delivered, oldest first
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.state.borrow().commands.clone()
    }

    /// Every completed handshake
    pub fn transactions(&self) -> Vec<MockTransaction> {
        self.state.borrow().transactions.clone()
    }

    /// Events not yet delivered to the host
    pub fn pending_events(&self) -> usize {
        self.state.borrow().events.len()
    }

    /// Whether the host is currently asserting the request line
    pub fn request_asserted(&self) -> bool {
        self.state.borrow().request_asserted()
    }

    /// Whether the coprocessor is asserting the ready line
    pub fn ready_asserted(&self) -> bool {
        self.state.borrow().ready_asserted()
    }

    /// Whether a real MCU would be entering the ready-line interrupt now
    pub fn interrupt_pending(&self) -> bool {
        let state = self.state.borrow();
        state.armed.is_some() && state.ready_asserted()
    }

    /// Last level driven on `pin`
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.state.borrow().levels.get(&pin).copied()
    }

    /// Every level driven on `pin`, in order
    pub fn history(&self, pin: u8) -> Vec<bool> {
        self.state.borrow().history.get(&pin).cloned().unwrap_or_default()
    }

    /// Mode last configured for `pin`
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.state.borrow().modes.get(&pin).copied()
    }

    /// Bus settings applied by the host
    pub fn bus_settings(&self) -> Option<BusSettings> {
        self.state.borrow().settings
    }

    /// Every delay requested, in microseconds
    pub fn delays_us(&self) -> Vec<u32> {
        self.state.borrow().delays_us.clone()
    }

    /// Current wake trigger, if armed
    pub fn armed(&self) -> Option<WakeTrigger> {
        self.state.borrow().armed
    }

    /// Number of arm and disarm calls seen
    pub fn arm_counts(&self) -> (usize, usize) {
        let state = self.state.borrow();
        (state.arm_count, state.disarm_count)
    }
}

/// SPI handle of a [`MockCoprocessor`]
#[derive(Debug, Clone)]
pub struct MockBus {
    state: Rc<RefCell<MockState>>,
}

impl ErrorType for MockBus {
    type Error = MockError;
}

impl SpiBus for MockBus {
    fn configure(&mut self, settings: &BusSettings) -> Result<(), Self::Error> {
        self.state.borrow_mut().settings = Some(*settings);
        Ok(())
    }

    fn exchange_byte(&mut self, out: u8) -> Result<u8, Self::Error> {
        self.state.borrow_mut().exchange(out)
    }
}

/// GPIO handle of a [`MockCoprocessor`]
#[derive(Debug, Clone)]
pub struct MockGpio {
    state: Rc<RefCell<MockState>>,
}

impl ErrorType for MockGpio {
    type Error = MockError;
}

impl GpioProvider for MockGpio {
    fn configure(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error> {
        self.state.borrow_mut().modes.insert(pin, mode);
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.state.borrow_mut().drive(pin, true)
    }

    fn set_low(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.state.borrow_mut().drive(pin, false)
    }

    fn is_high(&mut self, pin: u8) -> Result<bool, Self::Error> {
        let state = self.state.borrow();
        if pin == state.ready_pin {
            return Ok(!state.ready_asserted());
        }
        Ok(state.levels.get(&pin).copied().unwrap_or(false))
    }
}

/// Delay handle of a [`MockCoprocessor`]; records instead of sleeping
#[derive(Debug, Clone)]
pub struct MockTime {
    state: Rc<RefCell<MockState>>,
}

impl TimeProvider for MockTime {
    fn delay_us(&mut self, us: u32) {
        self.state.borrow_mut().delays_us.push(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms.saturating_mul(1000));
    }
}

/// Wake source handle of a [`MockCoprocessor`]
#[derive(Debug, Clone)]
pub struct MockWake {
    state: Rc<RefCell<MockState>>,
}

impl ErrorType for MockWake {
    type Error = MockError;
}

impl WakeSource for MockWake {
    fn arm(&mut self, trigger: WakeTrigger) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.wake_fault {
            return Err(MockError::WakeFault);
        }
        state.armed = Some(trigger);
        state.arm_count += 1;
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.wake_fault {
            return Err(MockError::WakeFault);
        }
        state.armed = None;
        state.disarm_count += 1;
        Ok(())
    }

    fn is_armed(&self) -> bool {
        self.state.borrow().armed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQN: u8 = 9;
    const RDYN: u8 = 8;

    fn handshake(bus: &mut MockBus, gpio: &mut MockGpio, out: &[u8]) -> Vec<u8> {
        gpio.set_low(REQN).unwrap();
        let reply = out.iter().map(|b| bus.exchange_byte(*b).unwrap()).collect();
        gpio.set_high(REQN).unwrap();
        reply
    }

    #[test]
    fn test_event_delivery() {
        let chip = MockCoprocessor::new(REQN, RDYN);
        chip.set_status(0x42);
        chip.queue_event(&[0x81, 0x02]);
        let (mut bus, mut gpio) = (chip.bus(), chip.gpio());

        let reply = handshake(&mut bus, &mut gpio, &[0, 0, 0, 0]);
        assert_eq!(reply, vec![0x42, 2, 0x81, 0x02]);
        assert_eq!(chip.pending_events(), 0);
        assert!(chip.commands().is_empty());
    }

    #[test]
    fn test_command_capture() {
        let chip = MockCoprocessor::new(REQN, RDYN);
        let (mut bus, mut gpio) = (chip.bus(), chip.gpio());

        handshake(&mut bus, &mut gpio, &[3, 0x0A, 0x0B, 0x0C]);
        assert_eq!(chip.commands(), vec![vec![0x0A, 0x0B, 0x0C]]);
        assert_eq!(chip.transactions()[0].payload_exchanges(), 2);
    }

    #[test]
    fn test_ready_follows_request() {
        let chip = MockCoprocessor::new(REQN, RDYN);
        let mut gpio = chip.gpio();

        gpio.set_high(REQN).unwrap();
        assert!(gpio.is_high(RDYN).unwrap());
        gpio.set_low(REQN).unwrap();
        assert!(gpio.is_low(RDYN).unwrap());

        chip.set_ready_override(Some(false));
        assert!(gpio.is_high(RDYN).unwrap());
    }

    #[test]
    fn test_reversed_wire() {
        let chip = MockCoprocessor::new(REQN, RDYN);
        chip.set_status(0x01);
        let mut bus = chip.bus();
        bus.configure(&BusSettings {
            bit_order: crate::hal::BitOrder::MsbFirstReversed,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(bus.exchange_byte(0x80).unwrap(), 0x80);
        assert_eq!(chip.state.borrow().current.as_ref().unwrap().0.host_bytes, vec![0x01]);
    }

    #[test]
    fn test_bus_fault_injection() {
        let chip = MockCoprocessor::new(REQN, RDYN);
        chip.fail_bus_after(1);
        let mut bus = chip.bus();

        assert!(bus.exchange_byte(0).is_ok());
        assert_eq!(bus.exchange_byte(0), Err(MockError::BusFault));
        chip.heal();
        assert!(bus.exchange_byte(0).is_ok());
    }
}
