// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Maze I/O Coprocessor Firmware
//!
//! Real-time I/O firmware for a two-wheeled maze robot. The coprocessor speaks a compact binary
//! serial protocol to the host computer while stepping both drive motors along a ramped speed
//! profile and scanning the infrared wall sensors.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Hardware capability traits, the simulated backend and (with `board`) STM32 bindings |
//! | [`control`] | Acceleration table and the dual-axis step generator |
//! | [`sensors`] | IR wall scanner, battery and button monitor |
//! | [`protocol`] | Command/event wire format, frame decoder and the main-loop engine |
//! | [`telemetry`] | Filtered event reporting ahead of every command dispatch |
//! | [`shared`] | State shared between the main loop and the timer interrupts |
//! | [`sim`] | Deterministic timer scheduler used to run the firmware on a host |
//!
//! ## Getting Started
//!
//! Run the host test-suite:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

// Must stay first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod error;
pub mod hw;
pub mod protocol;
pub mod sensors;
pub mod shared;
pub mod sim;
pub mod telemetry;

pub use error::{Error, Result};
pub use shared::Shared;
