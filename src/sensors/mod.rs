// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-side sensing: the IR wall scanner and the battery/button monitor.

pub mod monitor;
pub mod scanner;

pub use monitor::{Monitor, SpeedSample};
pub use scanner::{IrSensor, Scanner};
