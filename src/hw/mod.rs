// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware capabilities
//!
//! The core logic never touches registers. It talks to the board through the small traits below,
//! one per concern, so the same code runs on the STM32 board and on the host under [`sim`].
//!
//! | Trait | Used from |
//! | ----- | --------- |
//! | [`HostLink`], [`Leds`], [`MotorDriver`] | main loop |
//! | [`IrFrontEnd`] | IR scan tick |
//! | [`Stepper`] | motor ticks |
//! | [`AdcRead`], [`Buttons`] | monitor tick |

use core::convert::Infallible;

pub mod led;
pub mod sim;

#[cfg(feature = "board")]
pub mod adc;
#[cfg(feature = "board")]
pub mod board;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod timers;
#[cfg(feature = "board")]
pub mod usart;

pub use led::{ActiveLevel, Led, LedId};

/// Analogue input channels as wired on the sensor board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcChannel {
    Right90 = 0,
    Right45 = 1,
    Front = 2,
    Left45 = 3,
    Left90 = 4,
    Battery = 5,
}

impl AdcChannel {
    pub const COUNT: usize = 6;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// IR emitters are switched in banks, one per scan phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EmitterBank {
    Front,
    Side,
    Diagonal,
}

/// One drive wheel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Left,
    Right,
}

/// Combination of wheel directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Forward,
    Reverse,
    TurnLeft,
    TurnRight,
}

impl Heading {
    /// Direction line levels `(left, right)`; the motors are mounted mirrored.
    pub fn direction_levels(self) -> (bool, bool) {
        match self {
            Heading::Forward => (true, false),
            Heading::Reverse => (false, true),
            Heading::TurnLeft => (false, false),
            Heading::TurnRight => (true, true),
        }
    }
}

/// The two user buttons.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Grey button.
    A,
    /// Blue button.
    B,
}

/// Why the processor last came out of reset. Reported as the first event after boot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ResetCause {
    Unknown = 0x00,
    PowerOn = 0x01,
    BrownOut = 0x02,
    Watchdog = 0x03,
    Software = 0x04,
    External = 0x05,
    Exception = 0x06,
}

/// Byte link to the host computer.
pub trait HostLink {
    /// Take one received byte, or `WouldBlock` when nothing is waiting.
    fn try_read(&mut self) -> nb::Result<u8, Infallible>;

    /// Queue one byte for transmission, blocking while the transmit buffer is full.
    fn write(&mut self, byte: u8);

    fn write_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write(b);
        }
    }
}

/// Trait for reading a single channel from an ADC peripheral.
pub trait AdcRead {
    /// 10-bit conversion result.
    fn read_channel(&mut self, ch: AdcChannel) -> u16;
}

/// Receivers plus the emitter banks that light them.
pub trait IrFrontEnd: AdcRead {
    fn set_emitter(&mut self, bank: EmitterBank, on: bool);

    /// Wait for a freshly switched emitter to reach full output.
    fn settle(&mut self);
}

/// Status and direction LEDs.
pub trait Leds {
    fn set_led(&mut self, led: LedId, on: bool);
}

/// Motor driver controls owned by the main loop.
pub trait MotorDriver {
    /// Power stage enable.
    fn set_enabled(&mut self, enabled: bool);

    fn set_heading(&mut self, heading: Heading);

    /// Arm both step timers with the start period.
    fn start_stepping(&mut self);

    /// Disarm both step timers.
    fn stop_stepping(&mut self);
}

/// Step timer and clock line for the motor tick handlers.
pub trait Stepper {
    /// Program the period (1 µs counts) until the next tick of `axis`.
    fn set_period(&mut self, axis: Axis, period: u16);

    /// Emit one fixed-width step pulse.
    fn pulse(&mut self, axis: Axis);

    /// Disarm both step timers.
    fn halt_all(&mut self);
}

/// User buttons, sampled raw (debouncing lives in the monitor).
pub trait Buttons {
    fn pressed(&mut self, button: Button) -> bool;
}
