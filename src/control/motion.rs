// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Dual-axis step generator.
//!
//! Each wheel has its own periodic timer. Every tick looks up the step period for the axis' speed
//! index, shortens it while a steering trim is pending, ramps the index toward the target speed
//! and emits one step. The left tick also owns the shared distance countdown: it stops both axes
//! when the countdown reaches zero and applies the extend-one-cell and wall-edge corrections.
//!
//! Writers per field:
//! - `distance_to_go`: main loop while stopped ([`Motion::start_move`]), left tick while moving.
//! - speed index: its own axis tick, and the left tick when it halts both axes.
//! - trim counters: the IR scan tick sets them, the owning axis tick counts them down. A lost
//!   count-down only stretches a correction by one step.
//! - `wall_edge_pending`: set by the IR scan tick, consumed by the left tick, cleared by the
//!   protocol engine at the start of a straight move.

use portable_atomic::{AtomicBool, AtomicI16, AtomicU16, AtomicU32, Ordering};

use crate::config::Registers;
use crate::control::accel_table::{AccelTable, MAX_INDEX};
use crate::hw::Axis;

/// What a motor tick wants done with the hardware.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AxisTick {
    /// Period to program for the next tick.
    pub period: u16,
    /// Both step timers must be disarmed.
    pub halt: bool,
    /// Emit a step pulse. False for a tick that arrives after the move stopped.
    pub step: bool,
}

struct AxisState {
    index: AtomicU16,
    target: AtomicU16,
    trim: AtomicU16,
    ticks: AtomicU32,
}

impl AxisState {
    const fn new() -> Self {
        Self {
            index: AtomicU16::new(0),
            target: AtomicU16::new(0),
            trim: AtomicU16::new(0),
            ticks: AtomicU32::new(0),
        }
    }
}

pub struct Motion {
    table: AccelTable,
    left: AxisState,
    right: AxisState,
    distance_to_go: AtomicI16,
    distance_to_test: AtomicI16,
    distance_test_flag: AtomicBool,
    extend_pending: AtomicBool,
    wall_edge_pending: AtomicBool,
    large_trim: AtomicBool,
    corrector: AtomicI16,
    running: AtomicBool,
}

/// Period reduced to 3/4 for a large steering correction.
#[inline]
fn three_quarters(period: u16) -> u16 {
    (period >> 1) + (period >> 2)
}

/// Period reduced to 7/8 for a normal steering correction.
#[inline]
fn seven_eighths(period: u16) -> u16 {
    (period >> 1) + (period >> 2) + (period >> 3)
}

/// Next speed index: brake when the remaining distance is shorter than the index, otherwise walk
/// toward the target one step at a time.
fn ramp(index: u16, target: u16, distance_to_go: i16) -> u16 {
    if i32::from(distance_to_go) < i32::from(index) || index > target {
        index.saturating_sub(1)
    } else if index < target {
        index + 1
    } else {
        index
    }
}

impl Motion {
    pub const fn new() -> Self {
        Self {
            table: AccelTable::new(),
            left: AxisState::new(),
            right: AxisState::new(),
            distance_to_go: AtomicI16::new(0),
            distance_to_test: AtomicI16::new(0),
            distance_test_flag: AtomicBool::new(false),
            extend_pending: AtomicBool::new(false),
            wall_edge_pending: AtomicBool::new(false),
            large_trim: AtomicBool::new(false),
            corrector: AtomicI16::new(0),
            running: AtomicBool::new(false),
        }
    }

    #[inline]
    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::Left => &self.left,
            Axis::Right => &self.right,
        }
    }

    #[inline]
    pub fn table(&self) -> &AccelTable {
        &self.table
    }

    /// Arm a move of `distance` steps toward speed index `speed`.
    ///
    /// The caller starts the step timers afterwards. A distance of zero or less halts on the
    /// first left tick.
    pub fn start_move(&self, distance: i16, speed: u16, corrector: i16) {
        let target = speed.min(MAX_INDEX);
        self.distance_to_go.store(distance, Ordering::Relaxed);
        self.left.target.store(target, Ordering::Relaxed);
        self.right.target.store(target, Ordering::Relaxed);
        self.corrector.store(corrector, Ordering::Relaxed);
        self.extend_pending.store(false, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
    }

    /// Stop both axes. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.left.index.store(0, Ordering::Relaxed);
        self.right.index.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Carry on one more cell before stopping.
    pub fn extend_one_cell(&self) {
        self.extend_pending.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn distance_to_go(&self) -> i16 {
        self.distance_to_go.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn speed_index(&self, axis: Axis) -> u16 {
        self.axis(axis).index.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn corrector(&self) -> i16 {
        self.corrector.load(Ordering::Relaxed)
    }

    // ----- Steering and wall-edge inputs from the IR scanner -----

    /// Shorten the next `steps` periods of `axis`.
    pub fn request_trim(&self, axis: Axis, steps: u16) {
        self.axis(axis).trim.store(steps, Ordering::Relaxed);
    }

    #[inline]
    pub fn trim_remaining(&self, axis: Axis) -> u16 {
        self.axis(axis).trim.load(Ordering::Relaxed)
    }

    pub fn set_large_trim(&self, large: bool) {
        self.large_trim.store(large, Ordering::Relaxed);
    }

    #[inline]
    pub fn large_trim(&self) -> bool {
        self.large_trim.load(Ordering::Relaxed)
    }

    pub fn flag_wall_edge(&self) {
        self.wall_edge_pending.store(true, Ordering::Relaxed);
    }

    pub fn clear_wall_edge(&self) {
        self.wall_edge_pending.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn wall_edge_pending(&self) -> bool {
        self.wall_edge_pending.load(Ordering::Relaxed)
    }

    // ----- Distance test -----

    /// Start counting down `distance` steps; zero disables the test.
    pub fn set_distance_to_test(&self, distance: i16) {
        self.distance_to_test.store(distance, Ordering::Relaxed);
    }

    #[inline]
    pub fn distance_to_test(&self) -> i16 {
        self.distance_to_test.load(Ordering::Relaxed)
    }

    /// One-shot: true once per elapsed test distance.
    pub fn take_distance_test_flag(&self) -> bool {
        self.distance_test_flag.swap(false, Ordering::Relaxed)
    }

    // ----- Step counters -----

    pub fn tick_counts(&self) -> (u32, u32) {
        (
            self.left.ticks.load(Ordering::Relaxed),
            self.right.ticks.load(Ordering::Relaxed),
        )
    }

    pub fn take_tick_counts(&self) -> (u32, u32) {
        (
            self.left.ticks.swap(0, Ordering::Relaxed),
            self.right.ticks.swap(0, Ordering::Relaxed),
        )
    }

    // ----- Timer ticks -----

    /// Advance one axis by one step.
    ///
    /// Once stopped, a tick changes nothing and asks for the resting period without a step.
    pub fn tick(&self, axis: Axis, regs: &Registers) -> AxisTick {
        if !self.is_moving() {
            return AxisTick {
                period: self.table.period(0),
                halt: false,
                step: false,
            };
        }

        let state = self.axis(axis);
        let index = state.index.load(Ordering::Relaxed);

        let mut period = self.table.period(index);
        let trim = state.trim.load(Ordering::Relaxed);
        if trim > 0 {
            period = if self.large_trim.load(Ordering::Relaxed) {
                three_quarters(period)
            } else {
                seven_eighths(period)
            };
            state.trim.store(trim - 1, Ordering::Relaxed);
        }

        let target = state.target.load(Ordering::Relaxed);
        let next = ramp(index, target, self.distance_to_go());
        state.index.store(next, Ordering::Relaxed);

        let ticks = state.ticks.load(Ordering::Relaxed);
        state.ticks.store(ticks.saturating_add(1), Ordering::Relaxed);

        let halt = match axis {
            Axis::Left => self.count_down(regs),
            Axis::Right => false,
        };

        AxisTick {
            period,
            halt,
            step: true,
        }
    }

    /// Left-tick bookkeeping. Returns true when both axes must stop.
    fn count_down(&self, regs: &Registers) -> bool {
        let cell = regs.cell_distance();
        let remaining = self.distance_to_go();

        let halt = remaining <= 1;
        if halt {
            self.distance_to_go.store(0, Ordering::Relaxed);
            self.stop();
        } else {
            let mut remaining = remaining - 1;
            if self.extend_pending.swap(false, Ordering::Relaxed) {
                remaining = remaining.saturating_add(cell);
            }
            if remaining < cell && self.wall_edge_pending.load(Ordering::Relaxed) {
                remaining = regs.wall_edge_offset();
                self.wall_edge_pending.store(false, Ordering::Relaxed);
            }
            self.distance_to_go.store(remaining, Ordering::Relaxed);
        }

        let to_test = self.distance_to_test();
        if to_test > 0 {
            if to_test == 1 {
                self.distance_test_flag.store(true, Ordering::Relaxed);
                self.distance_to_test.store(cell, Ordering::Relaxed);
            } else {
                self.distance_to_test.store(to_test - 1, Ordering::Relaxed);
            }
        }

        halt
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_shortens_period() {
        assert_eq!(three_quarters(800), 600);
        assert_eq!(seven_eighths(800), 700);
    }

    #[test]
    fn ramp_profile() {
        // accelerate, cruise, brake near the end, brake above target
        assert_eq!(ramp(10, 50, 1000), 11);
        assert_eq!(ramp(50, 50, 1000), 50);
        assert_eq!(ramp(50, 50, 20), 49);
        assert_eq!(ramp(60, 50, 1000), 59);
        assert_eq!(ramp(0, 50, -3), 0);
    }
}
