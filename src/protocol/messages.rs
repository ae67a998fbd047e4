// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command and event messages exchanged with the host.
//!
//! A command is one byte, top nibble = category and bottom nibble = parameter, followed by zero to
//! three payload bytes. An event is one opcode byte, optionally followed by up to four data bytes.
//! Multi-byte values are big-endian on the wire.

use heapless::Vec;

use crate::config::Threshold;
use crate::hw::{Button, Heading, LedId, ResetCause};
use crate::sensors::scanner::IrSensor;

/// Handshake that unlocks the link.
pub const UNLOCK_SEQUENCE: [u8; 4] = [0xFE, 0xFC, 0xF8, 0xFE];

// Command categories (top nibble)
pub const CAT_LED_OFF: u8 = 0x0;
pub const CAT_LED_ON: u8 = 0x1;
pub const CAT_ALL_LEDS: u8 = 0x2;
pub const CAT_DISABLE_SERIAL: u8 = 0x5;
pub const CAT_DISABLE_SERIAL_ALT: u8 = 0x6;
pub const CAT_POLL: u8 = 0x8;
pub const CAT_REQUEST_STATE: u8 = 0x9;
pub const CAT_MOVE: u8 = 0xC;
pub const CAT_IR_CONTROL: u8 = 0xD;
pub const CAT_SYSTEM: u8 = 0xF;

// Commands with a payload
pub const CMD_FORWARD: u8 = 0xC1;
pub const CMD_TURN_RIGHT: u8 = 0xC2;
pub const CMD_TURN_LEFT: u8 = 0xC3;
pub const CMD_SET_SPEED: u8 = 0xC4;
pub const CMD_SET_CORRECTOR: u8 = 0xC5;
pub const CMD_SET_CELL_DISTANCE: u8 = 0xC7;
pub const CMD_SET_WALL_EDGE_OFFSET: u8 = 0xC8;
pub const CMD_SET_TEST_DISTANCE: u8 = 0xC9;
pub const CMD_READ_CONFIG: u8 = 0xCF;
pub const CMD_WRITE_ACCEL_LOW: u8 = 0xF9;
pub const CMD_WRITE_ACCEL_HIGH: u8 = 0xFA;
pub const CMD_READ_ACCEL_LOW: u8 = 0xFB;
pub const CMD_READ_ACCEL_HIGH: u8 = 0xFD;

// Event opcodes
pub const EV_BATTERY: u8 = 0x10;
pub const EV_MOVE_FINISHED: u8 = 0x20;
pub const EV_DISTANCE_TEST: u8 = 0x21;
pub const EV_SPEED_SAMPLE: u8 = 0x22;
pub const EV_TICK_COUNTS: u8 = 0x26;
pub const EV_BUTTON_A_RELEASE: u8 = 0x30;
pub const EV_BUTTON_B_RELEASE: u8 = 0x31;
pub const EV_BUTTON_A_PRESS: u8 = 0x38;
pub const EV_BUTTON_B_PRESS: u8 = 0x39;
pub const EV_FRONT_SIDE_BITMAP: u8 = 0x40;
pub const EV_DIAGONAL_BITMAP: u8 = 0x50;
pub const EV_IR_LEVEL: u8 = 0x61;
pub const EV_TRIM_REPORT: u8 = 0x70;
pub const EV_POLL_REPLY: u8 = 0x80;
pub const EV_UNLOCK_FROM_LOCK: u8 = 0xC0;
pub const EV_UNLOCK_FROM_UNLOCK: u8 = 0xC1;
pub const EV_LOCK_BY_TIMER: u8 = 0xC2;
pub const EV_LOCK_BY_COMMAND: u8 = 0xC3;
pub const EV_ACCEL_VALUE: u8 = 0xCE;
pub const EV_CONFIG_VALUE: u8 = 0xCF;
pub const EV_INVALID_COMMAND: u8 = 0xE2;
pub const EV_ACK: u8 = 0xEF;

/// Longest encoded event.
pub const MAX_EVENT_LEN: usize = 5;

/// What a 0x9n command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    ResetCause,
    TickCounts,
    Battery,
    FrontSideBitmap,
    DiagonalBitmap,
    IrLevel(IrSensor),
}

/// Configuration value readable through `0xCF`. The sub byte is the opcode that sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigRegister {
    Speed,
    Corrector,
    CellDistance,
    WallEdgeOffset,
    TestDistance,
}

impl ConfigRegister {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            CMD_SET_SPEED => Some(Self::Speed),
            CMD_SET_CORRECTOR => Some(Self::Corrector),
            CMD_SET_CELL_DISTANCE => Some(Self::CellDistance),
            CMD_SET_WALL_EDGE_OFFSET => Some(Self::WallEdgeOffset),
            CMD_SET_TEST_DISTANCE => Some(Self::TestDistance),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Speed => CMD_SET_SPEED,
            Self::Corrector => CMD_SET_CORRECTOR,
            Self::CellDistance => CMD_SET_CELL_DISTANCE,
            Self::WallEdgeOffset => CMD_SET_WALL_EDGE_OFFSET,
            Self::TestDistance => CMD_SET_TEST_DISTANCE,
        }
    }
}

/// Optional reports toggled by `0xF0..=0xF5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportToggle {
    TickCounts,
    Trim,
    SpeedSamples,
}

/// A fully decoded host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    LedOff(LedId),
    LedOn(LedId),
    /// Bit n-1 drives LED n.
    AllLeds(u16),
    DisableSerial,
    Poll(u8),
    Request(Report),
    Stop,
    Move { heading: Heading, distance: i16 },
    SetSpeed(u16),
    SetCorrector(i16),
    ExtendCell,
    SetCellDistance(i16),
    SetWallEdgeOffset(i16),
    SetTestDistance(i16),
    ReadConfig(ConfigRegister),
    IrScanning(bool),
    SetThreshold(Threshold, u16),
    SetReport(ReportToggle, bool),
    LinkWatchdog(bool),
    WriteAccel { index: u16, period: u16 },
    ReadAccel { index: u16 },
    /// A system byte that is not a known command, typically a repeated unlock handshake.
    AlreadyUnlocked,
}

/// A device-to-host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Reset(ResetCause),
    /// 10-bit reading.
    Battery(u16),
    MoveFinished,
    DistanceTest,
    SpeedSample { left: u16, right: u16 },
    TickCounts { left: u16, right: u16 },
    Button { button: Button, pressed: bool },
    FrontSideBitmap(u8),
    DiagonalBitmap(u8),
    IrLevel { sensor: IrSensor, level: u16 },
    Trim(u8),
    PollReply(u8),
    UnlockFromLock,
    UnlockFromUnlock,
    LockByTimer,
    LockByCommand,
    AccelValue(u16),
    ConfigValue { register: ConfigRegister, value: u16 },
    InvalidCommand,
    Ack,
}

impl Event {
    /// Wire bytes of this event.
    pub fn encode(&self) -> Vec<u8, MAX_EVENT_LEN> {
        match *self {
            Event::Reset(cause) => frame([cause as u8]),
            Event::Battery(v) => {
                let v = v & 0x03FF;
                frame([EV_BATTERY | (v >> 8) as u8, v as u8])
            }
            Event::MoveFinished => frame([EV_MOVE_FINISHED]),
            Event::DistanceTest => frame([EV_DISTANCE_TEST]),
            Event::SpeedSample { left, right } => {
                let op = EV_SPEED_SAMPLE + u8::from(left > 0xFF) + (u8::from(right > 0xFF) << 1);
                frame([op, left as u8, right as u8])
            }
            Event::TickCounts { left, right } => {
                let [lh, ll] = left.to_be_bytes();
                let [rh, rl] = right.to_be_bytes();
                frame([EV_TICK_COUNTS, lh, ll, rh, rl])
            }
            Event::Button { button, pressed } => frame([match (button, pressed) {
                (Button::A, false) => EV_BUTTON_A_RELEASE,
                (Button::B, false) => EV_BUTTON_B_RELEASE,
                (Button::A, true) => EV_BUTTON_A_PRESS,
                (Button::B, true) => EV_BUTTON_B_PRESS,
            }]),
            Event::FrontSideBitmap(bits) => frame([EV_FRONT_SIDE_BITMAP | (bits & 0x0F)]),
            Event::DiagonalBitmap(bits) => frame([EV_DIAGONAL_BITMAP | (bits & 0x0F)]),
            Event::IrLevel { sensor, level } => {
                let [hi, lo] = level.to_be_bytes();
                frame([EV_IR_LEVEL + sensor.index() as u8, hi, lo])
            }
            Event::Trim(bits) => frame([EV_TRIM_REPORT | (bits & 0x0F)]),
            Event::PollReply(n) => frame([EV_POLL_REPLY | (n & 0x0F)]),
            Event::UnlockFromLock => frame([EV_UNLOCK_FROM_LOCK]),
            Event::UnlockFromUnlock => frame([EV_UNLOCK_FROM_UNLOCK]),
            Event::LockByTimer => frame([EV_LOCK_BY_TIMER]),
            Event::LockByCommand => frame([EV_LOCK_BY_COMMAND]),
            Event::AccelValue(v) => {
                let [hi, lo] = v.to_be_bytes();
                frame([EV_ACCEL_VALUE, hi, lo])
            }
            Event::ConfigValue { register, value } => {
                let [hi, lo] = value.to_be_bytes();
                frame([EV_CONFIG_VALUE, register.code(), hi, lo])
            }
            Event::InvalidCommand => frame([EV_INVALID_COMMAND]),
            Event::Ack => frame([EV_ACK]),
        }
    }
}

/// Big-endian 16-bit value from two wire bytes.
#[inline]
pub fn read_i16(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

#[inline]
pub fn read_u16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Wire bytes of a 16-bit value.
#[inline]
pub fn write_i16(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

fn frame<const N: usize>(bytes: [u8; N]) -> Vec<u8, MAX_EVENT_LEN> {
    const { assert!(N <= MAX_EVENT_LEN, "event longer than MAX_EVENT_LEN") };
    let mut out = Vec::new();
    out.extend(bytes);
    out
}
