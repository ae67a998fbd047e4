// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Crate-wide error type.
//!
//! Nothing in the firmware unwinds: every error ends up as an event on the wire (usually the
//! invalid-command event) and the main loop carries on.

use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for this crate.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Top nibble does not name a command category.
    #[display("unknown command category in {_0:#04x}")]
    UnknownCategory(#[error(not(source))] u8),

    /// Category is known but the parameter nibble is not.
    #[display("unknown sub-command {_0:#04x}")]
    UnknownSubCommand(#[error(not(source))] u8),

    /// LED commands only address LEDs 1..=9.
    #[display("LED index {_0} out of range")]
    LedOutOfRange(#[error(not(source))] u8),

    /// Config readback for a register that has no readback.
    #[display("no readable config register {_0:#04x}")]
    UnknownRegister(#[error(not(source))] u8),

    /// Acceleration table address past the end of the table.
    #[display("acceleration table index {_0} out of range")]
    AccelIndexOutOfRange(#[error(not(source))] u16),
}
