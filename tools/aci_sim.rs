// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! ACI link simulator.
//!
//! Runs the transport against the simulated coprocessor: queues a batch of
//! events on the chip side and a batch of commands on the host side, then
//! services the link (polled or interrupt-driven) until both directions are
//! drained. Prints a JSON summary on stdout; logs go to stderr.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use acilink::config::{self, AciConfig, ConfigError};
use acilink::hal::platforms::{MockBus, MockCoprocessor, MockGpio, MockTime, MockWake};
use acilink::observability::{debug_flags_help, init_logging, parse_debug_flags};
use acilink::transport::{SendError, TickOutcome, Transport, MAX_LENGTH};
use anyhow::{bail, Context, Result};
use serde_json::json;

/// Upper bound on service rounds before the run is declared stuck
const MAX_ROUNDS: usize = 10_000;

type SimTransport = Transport<MockBus, MockGpio, MockTime, MockWake>;

struct Args {
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
    events: usize,
    commands: usize,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: aci_sim [--config <path>] [--board <name>] [--interrupt] [--echo]\n\
         \x20              [--events <n>] [--commands <n>] [--debug-<crate>]\n\n\
         Defaults:\n\
         - config: acilink.toml found via ACILINK_CONFIG_PATH or the working directory,\n\
         \x20 built-in defaults if none exists\n\
         - events: 8\n\
         - commands: 8\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_count(value: Option<String>) -> usize {
    value
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| usage_and_exit())
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config_path: None,
        overrides: HashMap::new(),
        events: 8,
        commands: 8,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config_path = Some(PathBuf::from(v));
            }
            "--board" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.overrides.insert("board".to_string(), v);
            }
            "--interrupt" => {
                parsed
                    .overrides
                    .insert("interrupt_driven".to_string(), "true".to_string());
            }
            "--echo" => {
                parsed
                    .overrides
                    .insert("debug_echo".to_string(), "true".to_string());
            }
            "--events" => parsed.events = parse_count(args.next()),
            "--commands" => parsed.commands = parse_count(args.next()),
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    parsed
}

fn resolve_config(args: &Args) -> Result<AciConfig> {
    match config::load_config(args.config_path.as_deref(), Some(&args.overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if args.config_path.is_none() => {
            tracing::info!("no acilink.toml found, using built-in defaults");
            let mut config = AciConfig::default();
            config::apply_environment_overrides(&mut config)?;
            config::apply_cli_overrides(&mut config, &args.overrides)?;
            config::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(err).context("Failed to load configuration"),
    }
}

/// Deterministic payload `index` of length `1..=MAX_LENGTH`
fn payload(index: usize, seed: u8) -> Vec<u8> {
    let len = 1 + (index * 7) % MAX_LENGTH;
    (0..len)
        .map(|i| seed.wrapping_add((index + i) as u8))
        .collect()
}

fn service(aci: &mut SimTransport, chip: &MockCoprocessor) -> Result<()> {
    if aci.config().interrupt_driven {
        while chip.interrupt_pending() {
            match aci.on_ready_interrupt()? {
                TickOutcome::Transferred { .. } => {}
                _ => break,
            }
        }
    } else {
        aci.poll()?;
    }
    Ok(())
}

fn run(config: AciConfig, events: usize, commands: usize) -> Result<serde_json::Value> {
    let chip = MockCoprocessor::new(config.pins.request, config.pins.ready);
    for index in 0..events {
        chip.queue_event(&payload(index, 0x80));
    }

    let board = config.board;
    let interrupt_driven = config.interrupt_driven;
    let mut aci: SimTransport =
        Transport::initialize(config, chip.bus(), chip.gpio(), chip.time(), chip.wake())
            .context("Failed to initialise transport")?;

    let mut next_command = 0;
    let mut received = 0;
    let mut rounds = 0;

    loop {
        if next_command < commands {
            match aci.send_bytes(&payload(next_command, 0x10)) {
                Ok(()) => next_command += 1,
                Err(SendError::QueueFull) => {}
                Err(err) => return Err(err.into()),
            }
        }

        service(&mut aci, &chip)?;
        while aci.try_receive()?.is_some() {
            received += 1;
        }

        let drained = next_command == commands
            && aci.transmit_queue_empty()
            && chip.pending_events() == 0
            && aci.receive_queue_empty();
        if drained {
            break;
        }

        rounds += 1;
        if rounds >= MAX_ROUNDS {
            bail!(
                "link stalled after {} rounds: {} of {} commands sent, {} of {} events received",
                rounds,
                next_command,
                commands,
                received,
                events
            );
        }
    }

    let stats = aci.stats();
    let delivered = chip.commands().len();
    let (arms, disarms) = chip.arm_counts();

    Ok(json!({
        "board": board.as_str(),
        "interrupt_driven": interrupt_driven,
        "rounds": rounds,
        "commands": { "queued": commands, "delivered": delivered },
        "events": { "queued": events, "received": received },
        "transport": {
            "transfers": stats.transfers,
            "frames_sent": stats.frames_sent,
            "frames_received": stats.frames_received,
            "bytes_exchanged": stats.bytes_exchanged,
            "backpressure_skips": stats.backpressure_skips,
        },
        "wake": { "arms": arms, "disarms": disarms },
    }))
}

fn main() -> Result<()> {
    let debug_flags = parse_debug_flags();
    init_logging(&debug_flags)?;

    let args = parse_args();
    let config = resolve_config(&args)?;
    tracing::info!(
        board = %config.board,
        interrupt_driven = config.interrupt_driven,
        events = args.events,
        commands = args.commands,
        "starting simulation"
    );

    let summary = run(config, args.events, args.commands)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let delivered = summary["commands"]["delivered"].as_u64().unwrap_or(0);
    let received = summary["events"]["received"].as_u64().unwrap_or(0);
    if delivered != args.commands as u64 || received != args.events as u64 {
        bail!(
            "lost traffic: {} of {} commands delivered, {} of {} events received",
            delivered,
            args.commands,
            received,
            args.events
        );
    }
    Ok(())
}
