// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Motion Control
//!
//! Open-loop stepper control for the two drive wheels.
//!
//! ## Modules
//!
//! - [`accel_table`] - Speed-index to step-period lookup, rewritable at runtime.
//! - [`motion`] - Ramped dual-axis step generator with distance countdown and wall-edge
//!   correction.

pub mod accel_table;
pub mod motion;

pub use accel_table::AccelTable;
pub use motion::{AxisTick, Motion};
