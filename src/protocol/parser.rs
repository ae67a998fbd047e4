// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-at-a-time decoders for the host link.
//!
//! [`Decoder`] turns command bytes into [`Command`]s. It never waits for payload bytes; a partial
//! frame is simply held until the rest arrives, so the main loop keeps reporting telemetry while
//! a frame is in flight. [`UnlockMatcher`] recognises the handshake while the link is locked.

use crate::config::Threshold;
use crate::error::{Error, Result};
use crate::hw::{Heading, LedId};
use crate::protocol::messages::*;
use crate::sensors::scanner::IrSensor;

/// Longest command payload.
const MAX_PAYLOAD: usize = 3;

/// Payload bytes that follow `op`.
pub fn payload_len(op: u8) -> usize {
    match op {
        0x20..=0x2F => 1,
        CMD_FORWARD..=CMD_SET_CORRECTOR => 2,
        CMD_SET_CELL_DISTANCE..=CMD_SET_TEST_DISTANCE => 2,
        CMD_READ_CONFIG => 1,
        0xD8..=0xDF => 2,
        CMD_WRITE_ACCEL_LOW | CMD_WRITE_ACCEL_HIGH => 3,
        CMD_READ_ACCEL_LOW | CMD_READ_ACCEL_HIGH => 1,
        _ => 0,
    }
}

enum State {
    WaitCommand,
    WaitPayload { op: u8, have: usize },
}

pub struct Decoder {
    state: State,
    payload: [u8; MAX_PAYLOAD],
}

impl Decoder {
    pub const fn new() -> Self {
        Self {
            state: State::WaitCommand,
            payload: [0; MAX_PAYLOAD],
        }
    }

    /// Process a single incoming byte. Returns `Some` once a frame is complete.
    pub fn push(&mut self, byte: u8) -> Option<Result<Command>> {
        match self.state {
            State::WaitCommand => {
                if payload_len(byte) == 0 {
                    return Some(decode(byte, &[]));
                }
                self.state = State::WaitPayload { op: byte, have: 0 };
                None
            }
            State::WaitPayload { op, have } => {
                self.payload[have] = byte;
                let have = have + 1;
                if have < payload_len(op) {
                    self.state = State::WaitPayload { op, have };
                    return None;
                }
                self.state = State::WaitCommand;
                Some(decode(op, &self.payload[..have]))
            }
        }
    }

    /// True while a command byte has been seen but its payload is incomplete.
    pub fn is_mid_frame(&self) -> bool {
        matches!(self.state, State::WaitPayload { .. })
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.state = State::WaitCommand;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn word(payload: &[u8], at: usize) -> [u8; 2] {
    [payload[at], payload[at + 1]]
}

fn led(number: u8) -> Result<LedId> {
    LedId::new(number).ok_or(Error::LedOutOfRange(number))
}

/// Decode a complete frame. `payload` is exactly `payload_len(op)` bytes long.
fn decode(op: u8, payload: &[u8]) -> Result<Command> {
    let param = op & 0x0F;
    match op >> 4 {
        CAT_LED_OFF => Ok(Command::LedOff(led(param)?)),
        CAT_LED_ON => Ok(Command::LedOn(led(param)?)),
        CAT_ALL_LEDS => {
            let mask = u16::from(payload[0]) | (u16::from(param & 0x01) << 8);
            Ok(Command::AllLeds(mask))
        }
        CAT_DISABLE_SERIAL | CAT_DISABLE_SERIAL_ALT => Ok(Command::DisableSerial),
        CAT_POLL => Ok(Command::Poll(param)),
        CAT_REQUEST_STATE => decode_request(op),
        CAT_MOVE => decode_move(op, payload),
        CAT_IR_CONTROL => decode_ir(op, payload),
        CAT_SYSTEM => Ok(decode_system(op, payload)),
        _ => Err(Error::UnknownCategory(op)),
    }
}

fn decode_request(op: u8) -> Result<Command> {
    let report = match op & 0x0F {
        0x0 => Report::ResetCause,
        0x1 => Report::TickCounts,
        0x4 => Report::Battery,
        0x8 => Report::FrontSideBitmap,
        0x9 => Report::DiagonalBitmap,
        0xA => Report::IrLevel(IrSensor::Front),
        0xB => Report::IrLevel(IrSensor::Left90),
        0xC => Report::IrLevel(IrSensor::Left45),
        0xD => Report::IrLevel(IrSensor::Right90),
        0xE => Report::IrLevel(IrSensor::Right45),
        _ => return Err(Error::UnknownSubCommand(op)),
    };
    Ok(Command::Request(report))
}

fn decode_move(op: u8, payload: &[u8]) -> Result<Command> {
    let cmd = match op {
        0xC0 => Command::Stop,
        CMD_FORWARD => Command::Move {
            heading: Heading::Forward,
            distance: read_i16(word(payload, 0)),
        },
        CMD_TURN_RIGHT => Command::Move {
            heading: Heading::TurnRight,
            distance: read_i16(word(payload, 0)),
        },
        CMD_TURN_LEFT => Command::Move {
            heading: Heading::TurnLeft,
            distance: read_i16(word(payload, 0)),
        },
        CMD_SET_SPEED => Command::SetSpeed(read_u16(word(payload, 0))),
        CMD_SET_CORRECTOR => Command::SetCorrector(read_i16(word(payload, 0))),
        0xC6 => Command::ExtendCell,
        CMD_SET_CELL_DISTANCE => Command::SetCellDistance(read_i16(word(payload, 0))),
        CMD_SET_WALL_EDGE_OFFSET => Command::SetWallEdgeOffset(read_i16(word(payload, 0))),
        CMD_SET_TEST_DISTANCE => Command::SetTestDistance(read_i16(word(payload, 0))),
        CMD_READ_CONFIG => {
            let register =
                ConfigRegister::from_code(payload[0]).ok_or(Error::UnknownRegister(payload[0]))?;
            Command::ReadConfig(register)
        }
        _ => return Err(Error::UnknownSubCommand(op)),
    };
    Ok(cmd)
}

fn decode_ir(op: u8, payload: &[u8]) -> Result<Command> {
    match op & 0x0F {
        0x0 => Ok(Command::IrScanning(false)),
        0x1 => Ok(Command::IrScanning(true)),
        n @ 0x8..=0xF => {
            let which = Threshold::from_index(n - 8).ok_or(Error::UnknownSubCommand(op))?;
            Ok(Command::SetThreshold(which, read_u16(word(payload, 0))))
        }
        _ => Err(Error::UnknownSubCommand(op)),
    }
}

fn decode_system(op: u8, payload: &[u8]) -> Command {
    match op {
        0xF0 => Command::SetReport(ReportToggle::TickCounts, false),
        0xF1 => Command::SetReport(ReportToggle::TickCounts, true),
        0xF2 => Command::SetReport(ReportToggle::Trim, false),
        0xF3 => Command::SetReport(ReportToggle::Trim, true),
        0xF4 => Command::SetReport(ReportToggle::SpeedSamples, false),
        0xF5 => Command::SetReport(ReportToggle::SpeedSamples, true),
        0xF6 => Command::LinkWatchdog(false),
        0xF7 => Command::LinkWatchdog(true),
        CMD_WRITE_ACCEL_LOW | CMD_WRITE_ACCEL_HIGH => Command::WriteAccel {
            index: accel_index(op, payload[0]),
            period: read_u16(word(payload, 1)),
        },
        CMD_READ_ACCEL_LOW | CMD_READ_ACCEL_HIGH => Command::ReadAccel {
            index: accel_index(op, payload[0]),
        },
        _ => Command::AlreadyUnlocked,
    }
}

/// Table address from the address byte; the "high" opcodes address the upper half.
fn accel_index(op: u8, addr: u8) -> u16 {
    match op {
        CMD_WRITE_ACCEL_HIGH | CMD_READ_ACCEL_HIGH => u16::from(addr) + 256,
        _ => u16::from(addr),
    }
}

/// Recognises [`UNLOCK_SEQUENCE`] one byte at a time.
///
/// A wrong byte restarts the match; if that byte is itself the first byte of the handshake it
/// counts as the start of a new attempt.
pub struct UnlockMatcher {
    matched: usize,
}

impl UnlockMatcher {
    pub const fn new() -> Self {
        Self { matched: 0 }
    }

    /// Returns true when `byte` completes the handshake.
    pub fn push(&mut self, byte: u8) -> bool {
        if byte == UNLOCK_SEQUENCE[self.matched] {
            self.matched += 1;
        } else if byte == UNLOCK_SEQUENCE[0] {
            self.matched = 1;
        } else {
            self.matched = 0;
        }

        if self.matched == UNLOCK_SEQUENCE.len() {
            self.matched = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.matched = 0;
    }
}

impl Default for UnlockMatcher {
    fn default() -> Self {
        Self::new()
    }
}
