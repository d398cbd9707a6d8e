// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end transport tests against the simulated coprocessor

use acilink_config::{AciConfig, BoardVariant, ConfigValidationError};
use acilink_hal::platforms::{MockBus, MockCoprocessor, MockGpio, MockTime, MockWake};
use acilink_hal::{BitOrder, PinMode, WakeTrigger};
use acilink_transport::{
    Frame, SendError, TickOutcome, Transport, TransportError, MAX_LENGTH,
};

type MockTransport<const N: usize> = Transport<MockBus, MockGpio, MockTime, MockWake, N>;

const REQN: u8 = 9;
const RDYN: u8 = 8;
const RESET: u8 = 4;

fn bring_up<const N: usize>(config: AciConfig) -> (MockCoprocessor, MockTransport<N>) {
    let chip = MockCoprocessor::new(config.pins.request, config.pins.ready);
    let transport = Transport::initialize(config, chip.bus(), chip.gpio(), chip.time(), chip.wake())
        .expect("transport initialises");
    (chip, transport)
}

fn polled() -> AciConfig {
    AciConfig::default()
}

fn interrupt_driven() -> AciConfig {
    AciConfig {
        interrupt_driven: true,
        ..AciConfig::default()
    }
}

// ===== Initialisation =====

#[test]
fn initialize_sets_up_lines_and_bus() {
    let (chip, _transport) = bring_up::<4>(polled());

    assert_eq!(chip.bus_settings(), Some(AciConfig::default().bus));
    assert_eq!(chip.mode(RDYN), Some(PinMode::InputPullUp));
    assert_eq!(chip.mode(REQN), Some(PinMode::Output));
    assert_eq!(chip.mode(RESET), Some(PinMode::Output));
    assert_eq!(chip.history(RESET), vec![true, false, true]);

    // MISO, MOSI, SCK parked low and REQN released
    assert_eq!(chip.level(12), Some(false));
    assert_eq!(chip.level(11), Some(false));
    assert_eq!(chip.level(13), Some(false));
    assert_eq!(chip.level(REQN), Some(true));

    assert_eq!(chip.delays_us(), vec![30_000]);
    assert_eq!(chip.armed(), None);
}

#[test]
fn initialize_arms_wake_in_interrupt_mode() {
    let config = AciConfig {
        wake_trigger: WakeTrigger::FallingEdge,
        ..interrupt_driven()
    };
    let (chip, _transport) = bring_up::<4>(config);
    assert_eq!(chip.armed(), Some(WakeTrigger::FallingEdge));
}

#[test]
fn initialize_rejects_conflicting_pins_before_touching_hardware() {
    let mut config = polled();
    config.pins.reset = Some(REQN);
    let chip = MockCoprocessor::new(REQN, RDYN);

    let result: Result<MockTransport<4>, _> =
        Transport::initialize(config, chip.bus(), chip.gpio(), chip.time(), chip.wake());

    assert!(matches!(
        result,
        Err(TransportError::Config(ConfigValidationError::PinConflict { pin: REQN, .. }))
    ));
    assert_eq!(chip.mode(RDYN), None);
    assert_eq!(chip.bus_settings(), None);
}

#[test]
fn redbearlab_reset_waits_for_power_on_reset() {
    let config = AciConfig {
        board: BoardVariant::RedBearLabV1_1,
        ..polled()
    };
    let (chip, mut transport) = bring_up::<4>(config);

    assert_eq!(chip.history(RESET), vec![true, false]);
    assert_eq!(chip.delays_us(), vec![100_000, 30_000]);

    transport.pin_reset().unwrap();
    assert_eq!(chip.history(RESET), vec![true, false, true, false]);
}

#[test]
fn active_line_is_configured_and_readable() {
    let mut config = polled();
    config.pins.active = Some(2);
    let (chip, mut transport) = bring_up::<4>(config);

    assert_eq!(chip.mode(2), Some(PinMode::Input));
    assert_eq!(transport.active(), Ok(Some(false)));
}

// ===== Polled operation =====

#[test]
fn four_commands_leave_in_order() {
    let (chip, mut transport) = bring_up::<4>(polled());

    for len in [3usize, 5, 0, 10] {
        let payload: Vec<u8> = (1..=len as u8).collect();
        transport.send_bytes(&payload).unwrap();
    }
    assert!(transport.transmit_queue_full());
    assert!(chip.request_asserted());

    for _ in 0..4 {
        assert_eq!(transport.try_receive(), Ok(None));
    }

    assert!(transport.transmit_queue_empty());
    let lengths: Vec<u8> = chip.transactions().iter().map(|t| t.host_length()).collect();
    assert_eq!(lengths, vec![3, 5, 0, 10]);
    let exchanged: Vec<usize> = chip
        .transactions()
        .iter()
        .map(|t| t.payload_exchanges())
        .collect();
    assert_eq!(exchanged, vec![2, 4, 0, 9]);
    assert_eq!(
        chip.commands(),
        vec![vec![1, 2, 3], vec![1, 2, 3, 4, 5], (1..=10).collect::<Vec<u8>>()]
    );

    let stats = transport.stats();
    assert_eq!(stats.frames_sent, 4);
    assert_eq!(stats.transfers, 4);
    assert_eq!(stats.frames_received, 0);
    assert_eq!(stats.bytes_exchanged, 15);
    assert!(!chip.request_asserted());
}

#[test]
fn events_arrive_in_order_with_status() {
    let (chip, mut transport) = bring_up::<4>(polled());
    chip.set_status(0x12);
    chip.queue_event(&[0x81, 0x01]);
    chip.queue_event(&[0x84, 0x02, 0x03]);

    let first = transport.try_receive().unwrap().unwrap();
    assert_eq!(first.payload(), &[0x81, 0x01]);
    assert_eq!(first.status(), 0x12);

    let second = transport.try_receive().unwrap().unwrap();
    assert_eq!(second.payload(), &[0x84, 0x02, 0x03]);

    assert_eq!(transport.try_receive(), Ok(None));
    assert_eq!(transport.stats().frames_received, 2);
}

#[test]
fn peek_does_not_consume() {
    let (chip, mut transport) = bring_up::<4>(polled());
    chip.queue_event(&[0x8E]);

    let peeked = transport.peek_receive().unwrap();
    assert_eq!(peeked.map(|f| f.payload().to_vec()), Some(vec![0x8E]));
    assert_eq!(transport.peek_receive().unwrap(), peeked);
    assert_eq!(transport.try_receive().unwrap(), peeked);
    assert!(transport.receive_queue_empty());
}

#[test]
fn full_receive_queue_stops_transfers() {
    let (chip, mut transport) = bring_up::<2>(polled());
    for tag in 1..=3u8 {
        chip.queue_event(&[0x80 | tag]);
    }

    transport.poll().unwrap();
    transport.poll().unwrap();
    assert!(transport.receive_queue_full());

    let handshakes = chip.transactions().len();
    assert_eq!(transport.poll(), Ok(TickOutcome::Backpressure));
    assert_eq!(chip.transactions().len(), handshakes);
    assert_eq!(chip.pending_events(), 1);
    assert_eq!(transport.stats().backpressure_skips, 1);

    let tags: Vec<u8> = std::iter::from_fn(|| transport.try_receive().unwrap())
        .map(|f| f.payload()[0])
        .collect();
    assert_eq!(tags, vec![0x81, 0x82, 0x83]);
}

#[test]
fn send_waits_for_receive_room_before_requesting() {
    let (chip, mut transport) = bring_up::<2>(polled());
    chip.queue_event(&[0x81]);
    chip.queue_event(&[0x82]);
    transport.poll().unwrap();
    transport.poll().unwrap();
    assert!(transport.receive_queue_full());

    transport.send_bytes(&[0x0C]).unwrap();
    assert!(!chip.request_asserted());

    let event = transport.try_receive().unwrap();
    assert_eq!(event.map(|f| f.payload()[0]), Some(0x81));
    assert!(chip.request_asserted());
}

#[test]
fn send_rejections() {
    let (_chip, mut transport) = bring_up::<2>(polled());

    assert_eq!(
        transport.send_bytes(&[0u8; MAX_LENGTH + 1]),
        Err(SendError::FrameTooLong { len: 32, max: 31 })
    );

    transport.send(Frame::new(&[1]).unwrap()).unwrap();
    transport.send(Frame::new(&[2]).unwrap()).unwrap();
    assert_eq!(transport.send(Frame::new(&[3]).unwrap()), Err(SendError::QueueFull));
    assert!(transport.transmit_queue_full());
}

#[test]
fn bus_fault_keeps_command_queued() {
    let (chip, mut transport) = bring_up::<4>(polled());
    transport.send_bytes(&[0x0A, 0x0B]).unwrap();
    chip.fail_bus_after(1);

    assert_eq!(transport.try_receive(), Err(TransportError::Bus));
    assert!(!transport.transmit_queue_empty());
    assert!(!chip.request_asserted());
    assert!(chip.commands().is_empty());

    chip.heal();
    // REQN was released by the failed handshake, so the first tick asks again
    assert_eq!(transport.poll(), Ok(TickOutcome::RequestedReady));
    assert!(matches!(transport.poll(), Ok(TickOutcome::Transferred { sent: true, .. })));
    assert_eq!(chip.commands(), vec![vec![0x0A, 0x0B]]);
    assert!(transport.transmit_queue_empty());
}

#[test]
fn bus_fault_does_not_strand_stored_events() {
    let (chip, mut transport) = bring_up::<4>(polled());
    chip.queue_event(&[0x81, 0x01]);
    transport.poll().unwrap();
    assert!(!transport.receive_queue_empty());

    chip.set_ready_override(Some(true));
    chip.fail_bus_after(0);

    let peeked = transport.peek_receive().unwrap();
    assert_eq!(peeked.map(|f| f.payload().to_vec()), Some(vec![0x81, 0x01]));
    let event = transport.try_receive().unwrap();
    assert_eq!(event, peeked);
    assert!(transport.receive_queue_empty());

    // Nothing stored any more, so the fault surfaces
    assert_eq!(transport.try_receive(), Err(TransportError::Bus));
    assert_eq!(transport.peek_receive(), Err(TransportError::Bus));
}

#[test]
fn reversed_bit_order_is_transparent() {
    let mut config = polled();
    config.bus.bit_order = BitOrder::MsbFirstReversed;
    let (chip, mut transport) = bring_up::<4>(config);
    chip.queue_event(&[0x01, 0x02, 0x80]);

    transport.send_bytes(&[0x06, 0x40]).unwrap();
    let event = transport.try_receive().unwrap().unwrap();

    assert_eq!(event.payload(), &[0x01, 0x02, 0x80]);
    assert_eq!(chip.commands(), vec![vec![0x06, 0x40]]);
}

#[test]
fn flush_drops_everything() {
    let (chip, mut transport) = bring_up::<4>(polled());
    chip.queue_event(&[0x81]);
    transport.poll().unwrap();
    transport.send_bytes(&[1]).unwrap();
    transport.send_bytes(&[2]).unwrap();

    transport.flush().unwrap();

    assert!(transport.transmit_queue_empty());
    assert!(transport.receive_queue_empty());
    // Line configuration is untouched
    assert_eq!(chip.mode(REQN), Some(PinMode::Output));
}

#[test]
fn debug_echo_toggles() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (chip, mut transport) = bring_up::<4>(AciConfig {
        debug_echo: true,
        ..polled()
    });
    assert!(transport.debug_echo());

    chip.queue_event(&[0x81, 0x00]);
    transport.send_bytes(&[0x01, 0x02]).unwrap();
    assert!(transport.try_receive().unwrap().is_some());

    transport.set_debug_echo(false);
    assert!(!transport.debug_echo());
}

// ===== Interrupt-driven operation =====

fn service_interrupts<const N: usize>(chip: &MockCoprocessor, transport: &mut MockTransport<N>) -> usize {
    let mut serviced = 0;
    while chip.interrupt_pending() {
        transport.on_ready_interrupt().unwrap();
        serviced += 1;
        assert!(serviced < 64, "interrupt storm");
    }
    serviced
}

#[test]
fn interrupt_mode_masks_wake_when_receive_queue_fills() {
    let (chip, mut transport) = bring_up::<2>(interrupt_driven());
    for tag in 1..=3u8 {
        chip.queue_event(&[0x80 | tag]);
    }

    assert_eq!(service_interrupts(&chip, &mut transport), 2);
    assert!(transport.receive_queue_full());
    assert_eq!(chip.armed(), None);
    assert_eq!(chip.pending_events(), 1);

    // A command queued while full waits for room
    transport.send_bytes(&[0x0C]).unwrap();
    assert!(!chip.request_asserted());

    // Consuming from a full queue unmasks the wake and asks for the command's slot
    let first = transport.try_receive().unwrap();
    assert_eq!(first.map(|f| f.payload()[0]), Some(0x81));
    assert_eq!(chip.armed(), Some(WakeTrigger::LowLevel));
    assert_eq!(chip.arm_counts(), (2, 1));
    assert!(chip.request_asserted());

    assert_eq!(service_interrupts(&chip, &mut transport), 1);
    assert_eq!(chip.commands(), vec![vec![0x0C]]);
    assert!(transport.transmit_queue_empty());
    let tags: Vec<u8> = std::iter::from_fn(|| transport.try_receive().unwrap())
        .map(|f| f.payload()[0])
        .collect();
    assert_eq!(tags, vec![0x82, 0x83]);
}

#[test]
fn interrupt_mode_recovers_from_failed_wake_mask() {
    let (chip, mut transport) = bring_up::<2>(interrupt_driven());
    for tag in 1..=3u8 {
        chip.queue_event(&[0x80 | tag]);
    }

    transport.on_ready_interrupt().unwrap();
    chip.fail_wake(true);
    assert_eq!(transport.on_ready_interrupt(), Err(TransportError::Wake));
    assert!(transport.receive_queue_full());
    assert!(chip.interrupt_pending());

    chip.heal();
    assert_eq!(transport.on_ready_interrupt(), Ok(TickOutcome::Backpressure));
    assert!(!chip.interrupt_pending());
    assert_eq!(chip.armed(), None);

    let tags: Vec<u8> = std::iter::from_fn(|| transport.try_receive().unwrap())
        .map(|f| f.payload()[0])
        .collect();
    assert_eq!(tags, vec![0x81, 0x82]);
    assert_eq!(chip.armed(), Some(WakeTrigger::LowLevel));
    assert_eq!(chip.pending_events(), 1);
}

#[test]
fn interrupt_mode_try_receive_does_not_poll() {
    let (chip, mut transport) = bring_up::<4>(interrupt_driven());
    chip.queue_event(&[0x81]);

    assert_eq!(transport.try_receive(), Ok(None));
    assert!(chip.transactions().is_empty());

    service_interrupts(&chip, &mut transport);
    assert!(transport.try_receive().unwrap().is_some());
}

#[test]
fn interrupt_mode_send_pipelines_commands() {
    let (chip, mut transport) = bring_up::<4>(interrupt_driven());
    transport.send_bytes(&[0x01]).unwrap();
    transport.send_bytes(&[0x02, 0x02]).unwrap();
    transport.send_bytes(&[0x03, 0x03, 0x03]).unwrap();
    assert!(chip.interrupt_pending());

    assert_eq!(service_interrupts(&chip, &mut transport), 3);
    assert!(transport.transmit_queue_empty());
    assert_eq!(chip.commands().len(), 3);
    assert!(!chip.request_asserted());
}

#[test]
fn interrupt_mode_flush_rearms_wake() {
    let (chip, mut transport) = bring_up::<2>(interrupt_driven());
    chip.queue_event(&[0x81]);
    chip.queue_event(&[0x82]);
    service_interrupts(&chip, &mut transport);
    assert_eq!(chip.armed(), None);

    transport.flush().unwrap();

    assert!(transport.receive_queue_empty());
    assert_eq!(chip.armed(), Some(WakeTrigger::LowLevel));
}
