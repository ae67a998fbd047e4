// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compiled-in defaults and the runtime-tunable configuration registers.
//!
//! Every register has exactly one writer, the protocol engine running in the main loop. The timer
//! interrupts only load them, so plain atomic loads/stores are enough.

use portable_atomic::{AtomicI16, AtomicU16, Ordering};

// ----- Motion defaults -----

/// Step count for one maze cell.
pub const DEFAULT_CELL_DISTANCE: i16 = 347;
/// Distance from a side wall edge to the centre of the cell, in steps.
pub const DEFAULT_WALL_EDGE_OFFSET: i16 = 230;
/// Target speed index for moves.
pub const DEFAULT_SPEED: u16 = 50;
/// Number of motor steps a steering trim lasts.
pub const DEFAULT_CORRECTOR: i16 = 10;

// ----- IR threshold defaults -----

pub const DEFAULT_FRONT_LONG_THRESHOLD: u16 = 15;
pub const DEFAULT_FRONT_SHORT_THRESHOLD: u16 = 50;
pub const DEFAULT_LEFT_SIDE_THRESHOLD: u16 = 200;
pub const DEFAULT_RIGHT_SIDE_THRESHOLD: u16 = 200;
pub const DEFAULT_LEFT_45_THRESHOLD: u16 = 360;
pub const DEFAULT_RIGHT_45_THRESHOLD: u16 = 540;
pub const DEFAULT_LEFT_45_TOO_CLOSE: u16 = 580;
pub const DEFAULT_RIGHT_45_TOO_CLOSE: u16 = 760;

// ----- Board timing -----

/// Host link baud rate.
pub const HOST_BAUD: u32 = 57_600;

/// IR scan tick period in microseconds (125 kHz / 0x7FF).
pub const SCAN_PERIOD_US: u32 = 16_376;
/// Battery and button monitor tick period in microseconds (125 kHz / 0x1000).
pub const MONITOR_PERIOD_US: u32 = 32_768;
/// Motor timers count at 1 MHz; first tick after arming fires after this many counts.
pub const MOTOR_START_PERIOD: u16 = 0x000A;

/// Interrupt priorities, higher preempts lower.
pub const SCAN_PRIORITY: u8 = 1;
pub const MONITOR_PRIORITY: u8 = 1;
pub const MOTOR_PRIORITY: u8 = 4;

// ----- Telemetry -----

/// Unchanged battery samples before the value is sent anyway.
pub const BATTERY_RESEND_COUNT: u8 = 20;
/// Consecutive monitor ticks a button must hold a new level before it counts.
pub const BUTTON_DEBOUNCE_TICKS: u8 = 3;
/// Monitor ticks of host silence before the link watchdog relocks (~131 ms).
pub const LINK_SILENCE_TICKS: u8 = 4;
/// Monitor ticks between speed samples while moving.
pub const SPEED_SAMPLE_TICKS: u8 = 1;

/// One of the eight IR thresholds, in wire order (`0xD8 + index`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Threshold {
    FrontLong,
    FrontShort,
    LeftSide,
    RightSide,
    Left45,
    Right45,
    Left45TooClose,
    Right45TooClose,
}

impl Threshold {
    pub const ALL: [Threshold; 8] = [
        Threshold::FrontLong,
        Threshold::FrontShort,
        Threshold::LeftSide,
        Threshold::RightSide,
        Threshold::Left45,
        Threshold::Right45,
        Threshold::Left45TooClose,
        Threshold::Right45TooClose,
    ];

    /// Map the low three bits of an IR-control parameter onto a threshold.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub const fn default_value(self) -> u16 {
        match self {
            Threshold::FrontLong => DEFAULT_FRONT_LONG_THRESHOLD,
            Threshold::FrontShort => DEFAULT_FRONT_SHORT_THRESHOLD,
            Threshold::LeftSide => DEFAULT_LEFT_SIDE_THRESHOLD,
            Threshold::RightSide => DEFAULT_RIGHT_SIDE_THRESHOLD,
            Threshold::Left45 => DEFAULT_LEFT_45_THRESHOLD,
            Threshold::Right45 => DEFAULT_RIGHT_45_THRESHOLD,
            Threshold::Left45TooClose => DEFAULT_LEFT_45_TOO_CLOSE,
            Threshold::Right45TooClose => DEFAULT_RIGHT_45_TOO_CLOSE,
        }
    }
}

/// Runtime-tunable scalars.
pub struct Registers {
    cell_distance: AtomicI16,
    wall_edge_offset: AtomicI16,
    speed: AtomicU16,
    corrector: AtomicI16,
    thresholds: [AtomicU16; 8],
}

impl Registers {
    pub const fn new() -> Self {
        Self {
            cell_distance: AtomicI16::new(DEFAULT_CELL_DISTANCE),
            wall_edge_offset: AtomicI16::new(DEFAULT_WALL_EDGE_OFFSET),
            speed: AtomicU16::new(DEFAULT_SPEED),
            corrector: AtomicI16::new(DEFAULT_CORRECTOR),
            thresholds: [
                AtomicU16::new(DEFAULT_FRONT_LONG_THRESHOLD),
                AtomicU16::new(DEFAULT_FRONT_SHORT_THRESHOLD),
                AtomicU16::new(DEFAULT_LEFT_SIDE_THRESHOLD),
                AtomicU16::new(DEFAULT_RIGHT_SIDE_THRESHOLD),
                AtomicU16::new(DEFAULT_LEFT_45_THRESHOLD),
                AtomicU16::new(DEFAULT_RIGHT_45_THRESHOLD),
                AtomicU16::new(DEFAULT_LEFT_45_TOO_CLOSE),
                AtomicU16::new(DEFAULT_RIGHT_45_TOO_CLOSE),
            ],
        }
    }

    #[inline]
    pub fn cell_distance(&self) -> i16 {
        self.cell_distance.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_cell_distance(&self, steps: i16) {
        self.cell_distance.store(steps, Ordering::Relaxed);
    }

    #[inline]
    pub fn wall_edge_offset(&self) -> i16 {
        self.wall_edge_offset.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_wall_edge_offset(&self, steps: i16) {
        self.wall_edge_offset.store(steps, Ordering::Relaxed);
    }

    #[inline]
    pub fn speed(&self) -> u16 {
        self.speed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_speed(&self, speed: u16) {
        self.speed.store(speed, Ordering::Relaxed);
    }

    #[inline]
    pub fn corrector(&self) -> i16 {
        self.corrector.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_corrector(&self, steps: i16) {
        self.corrector.store(steps, Ordering::Relaxed);
    }

    #[inline]
    pub fn threshold(&self, which: Threshold) -> u16 {
        self.thresholds[which.index()].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_threshold(&self, which: Threshold, value: u16) {
        self.thresholds[which.index()].store(value, Ordering::Relaxed);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_start_at_defaults() {
        let regs = Registers::new();
        for t in Threshold::ALL {
            assert_eq!(regs.threshold(t), t.default_value());
        }
    }

    #[test]
    fn threshold_index_round_trips_through_wire_order() {
        for (i, t) in Threshold::ALL.iter().enumerate() {
            assert_eq!(Threshold::from_index(i as u8), Some(*t));
        }
        assert_eq!(Threshold::from_index(8), None);
    }
}
