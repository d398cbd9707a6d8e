// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! # acilink Transport
//!
//! Flow-controlled, half-duplex transport between a host MCU and an
//! nRF8001-class radio coprocessor over SPI plus two handshake lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  Application: send / try_receive / flush        │
//! ├─────────────────────────────────────────────────┤
//! │  Transport (tx queue, rx queue, stats, echo)    │
//! ├─────────────────────────────────────────────────┤
//! │  Scheduler (backpressure, REQN, wake masking)   │
//! ├────────────────────────┬────────────────────────┤
//! │  TransferEngine (SPI)  │  LineController (GPIO) │
//! ├────────────────────────┴────────────────────────┤
//! │  acilink-hal traits (platform implementations)  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is `no_std` and allocation-free; queues are fixed-size
//! `heapless` deques behind `critical-section` mutexes.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod engine;
pub mod error;
pub mod frame;
pub mod lines;
pub mod queue;
pub mod scheduler;
pub mod transport;

pub use engine::{negotiate_length, Transfer, TransferEngine};
pub use error::{Line, SendError, TransportError};
pub use frame::{Frame, FrameDump, FrameError, MAX_LENGTH};
pub use lines::LineController;
pub use queue::{BoundedQueue, SharedQueue, DEFAULT_QUEUE_CAPACITY};
pub use scheduler::{Scheduler, TickOutcome, TransportStats, Wake};
pub use transport::Transport;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
