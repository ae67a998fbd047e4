// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Round-robin infrared wall scanner.
//!
//! One sensor bank is sampled per tick, cycling front → diagonals → sides and starting with the
//! sides after power-up. Each reading is the receiver level with its emitter on minus the level
//! with it off, which cancels ambient light.
//!
//! - Front: long/short range wall detection.
//! - Diagonals (45°): steering. A wall closer than the threshold requests a trim on that side's
//!   motor, and a wall closer than the "too close" threshold makes the trim a large one. No
//!   steering happens once a front wall is in short range.
//! - Sides (90°): wall presence. A wall that disappears raises the wall-edge flag used by the
//!   motion controller to resynchronise with the cell centre.
//!
//! Every field here is written only by the scan tick (or, for `enabled`, only by the main loop)
//! and read opportunistically elsewhere. The trim report is the one field the main loop also
//! takes, by swapping it back to zero.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use crate::config::{Registers, Threshold};
use crate::control::Motion;
use crate::hw::{AdcChannel, Axis, EmitterBank, IrFrontEnd};

/// Trim report bits.
pub const TRIM_LEFT: u8 = 0x01;
pub const TRIM_RIGHT: u8 = 0x02;
pub const TRIM_LARGE: u8 = 0x04;

/// The five IR receivers, in the order of their level events (`0x61..=0x65`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrSensor {
    Front,
    Left90,
    Left45,
    Right90,
    Right45,
}

impl IrSensor {
    pub const ALL: [IrSensor; 5] = [
        IrSensor::Front,
        IrSensor::Left90,
        IrSensor::Left45,
        IrSensor::Right90,
        IrSensor::Right45,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn channel(self) -> AdcChannel {
        match self {
            IrSensor::Front => AdcChannel::Front,
            IrSensor::Left90 => AdcChannel::Left90,
            IrSensor::Left45 => AdcChannel::Left45,
            IrSensor::Right90 => AdcChannel::Right90,
            IrSensor::Right45 => AdcChannel::Right45,
        }
    }
}

/// Scan phase of the next tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Front = 1,
    Diagonal = 2,
    Side = 3,
}

impl Phase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            2 => Phase::Diagonal,
            3 => Phase::Side,
            _ => Phase::Front,
        }
    }

    fn next(self) -> Self {
        match self {
            Phase::Front => Phase::Diagonal,
            Phase::Diagonal => Phase::Side,
            Phase::Side => Phase::Front,
        }
    }
}

pub struct Scanner {
    enabled: AtomicBool,
    phase: AtomicU8,
    readings: [AtomicU16; 5],
    front_detected: AtomicBool,
    left_wall: AtomicBool,
    right_wall: AtomicBool,
    trim_report: AtomicU8,
}

impl Scanner {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            phase: AtomicU8::new(Phase::Side as u8),
            readings: [const { AtomicU16::new(0) }; 5],
            front_detected: AtomicBool::new(false),
            left_wall: AtomicBool::new(false),
            right_wall: AtomicBool::new(false),
            trim_report: AtomicU8::new(0),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reading(&self, sensor: IrSensor) -> u16 {
        self.readings[sensor.index()].load(Ordering::Relaxed)
    }

    /// Front wall within long range, as of the last front phase.
    #[inline]
    pub fn front_detected(&self) -> bool {
        self.front_detected.load(Ordering::Relaxed)
    }

    /// Side wall presence `(left, right)` from the last side phase.
    pub fn walls(&self) -> (bool, bool) {
        (
            self.left_wall.load(Ordering::Relaxed),
            self.right_wall.load(Ordering::Relaxed),
        )
    }

    /// Bit 0 front long, bit 1 front short, bit 2 left wall, bit 3 right wall.
    pub fn front_side_bitmap(&self, regs: &Registers) -> u8 {
        let front = self.reading(IrSensor::Front);
        let mut bits = 0;
        if front > regs.threshold(Threshold::FrontLong) {
            bits |= 0x01;
        }
        if front > regs.threshold(Threshold::FrontShort) {
            bits |= 0x02;
        }
        if self.reading(IrSensor::Left90) > regs.threshold(Threshold::LeftSide) {
            bits |= 0x04;
        }
        if self.reading(IrSensor::Right90) > regs.threshold(Threshold::RightSide) {
            bits |= 0x08;
        }
        bits
    }

    /// Bit 0 left 45, bit 1 right 45, bit 2 left too close, bit 3 right too close.
    pub fn diagonal_bitmap(&self, regs: &Registers) -> u8 {
        let l45 = self.reading(IrSensor::Left45);
        let r45 = self.reading(IrSensor::Right45);
        let mut bits = 0;
        if l45 > regs.threshold(Threshold::Left45) {
            bits |= 0x01;
        }
        if r45 > regs.threshold(Threshold::Right45) {
            bits |= 0x02;
        }
        if l45 > regs.threshold(Threshold::Left45TooClose) {
            bits |= 0x04;
        }
        if r45 > regs.threshold(Threshold::Right45TooClose) {
            bits |= 0x08;
        }
        bits
    }

    /// Latest trim request not yet taken.
    pub fn take_trim_report(&self) -> u8 {
        self.trim_report.swap(0, Ordering::Relaxed)
    }

    /// Run one scan phase. Does nothing while scanning is disabled.
    pub fn tick<IO: IrFrontEnd>(&self, io: &mut IO, regs: &Registers, motion: &Motion) {
        if !self.is_enabled() {
            return;
        }

        let phase = Phase::from_u8(self.phase.load(Ordering::Relaxed));
        match phase {
            Phase::Front => self.scan_front(io, regs),
            Phase::Diagonal => self.scan_diagonals(io, regs, motion),
            Phase::Side => self.scan_sides(io, regs, motion),
        }
        self.phase.store(phase.next() as u8, Ordering::Relaxed);
    }

    fn store(&self, sensor: IrSensor, value: u16) {
        self.readings[sensor.index()].store(value, Ordering::Relaxed);
    }

    fn scan_front<IO: IrFrontEnd>(&self, io: &mut IO, regs: &Registers) {
        let [front] = sample(io, EmitterBank::Front, [IrSensor::Front]);
        self.store(IrSensor::Front, front);
        self.front_detected.store(
            front > regs.threshold(Threshold::FrontLong),
            Ordering::Relaxed,
        );
    }

    fn scan_diagonals<IO: IrFrontEnd>(&self, io: &mut IO, regs: &Registers, motion: &Motion) {
        let [r45, l45] = sample(
            io,
            EmitterBank::Diagonal,
            [IrSensor::Right45, IrSensor::Left45],
        );
        self.store(IrSensor::Right45, r45);
        self.store(IrSensor::Left45, l45);

        motion.set_large_trim(false);
        if self.reading(IrSensor::Front) >= regs.threshold(Threshold::FrontShort) {
            return;
        }

        let steps = u16::try_from(motion.corrector()).unwrap_or(0);
        let mut report = 0;
        let mut large = false;
        if l45 > regs.threshold(Threshold::Left45) {
            large |= l45 > regs.threshold(Threshold::Left45TooClose);
            motion.request_trim(Axis::Left, steps);
            report |= TRIM_LEFT;
        }
        if r45 > regs.threshold(Threshold::Right45) {
            large |= r45 > regs.threshold(Threshold::Right45TooClose);
            motion.request_trim(Axis::Right, steps);
            report |= TRIM_RIGHT;
        }
        if large {
            motion.set_large_trim(true);
            report |= TRIM_LARGE;
        }
        if report != 0 {
            self.trim_report.store(report, Ordering::Relaxed);
        }
    }

    fn scan_sides<IO: IrFrontEnd>(&self, io: &mut IO, regs: &Registers, motion: &Motion) {
        let [r90, l90] = sample(io, EmitterBank::Side, [IrSensor::Right90, IrSensor::Left90]);
        self.store(IrSensor::Right90, r90);
        self.store(IrSensor::Left90, l90);

        let left = l90 > regs.threshold(Threshold::LeftSide);
        let right = r90 > regs.threshold(Threshold::RightSide);
        let was_left = self.left_wall.swap(left, Ordering::Relaxed);
        let was_right = self.right_wall.swap(right, Ordering::Relaxed);

        if (was_left && !left) || (was_right && !right) {
            motion.flag_wall_edge();
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Differential read of one emitter bank: ambient first, then lit.
fn sample<IO: IrFrontEnd, const N: usize>(
    io: &mut IO,
    bank: EmitterBank,
    sensors: [IrSensor; N],
) -> [u16; N] {
    let ambient = sensors.map(|s| io.read_channel(s.channel()));
    io.set_emitter(bank, true);
    io.settle();
    let mut lit = [0u16; N];
    for (slot, s) in lit.iter_mut().zip(sensors) {
        *slot = io.read_channel(s.channel());
    }
    io.set_emitter(bank, false);

    let mut out = [0u16; N];
    for ((o, l), a) in out.iter_mut().zip(lit).zip(ambient) {
        *o = l.saturating_sub(a);
    }
    out
}
