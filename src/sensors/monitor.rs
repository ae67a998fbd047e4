// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slow housekeeping tick: battery voltage, button debouncing, speed samples and the host-silence
//! counter used by the link watchdog.
//!
//! Results are handed to the main loop through "ready"/"changed" flags. The tick sets a flag, the
//! main loop takes it; the tick only debounces a new button level once the previous change has
//! been taken, so no edge is ever overwritten before it is reported.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use crate::config::{BUTTON_DEBOUNCE_TICKS, SPEED_SAMPLE_TICKS};
use crate::control::Motion;
use crate::hw::{AdcChannel, AdcRead, Axis, Button, Buttons};

/// Mask of a 10-bit conversion.
const ADC_MASK: u16 = 0x03FF;

/// Convert a raw battery reading to millivolts (33k/12k divider, 5 V reference).
pub fn battery_millivolts(raw: u16) -> u32 {
    u32::from(raw & ADC_MASK) * 5 * 45_000 / (12 * 1024)
}

struct Debounce {
    stored: AtomicBool,
    changed: AtomicBool,
    countdown: AtomicU8,
}

impl Debounce {
    const fn new() -> Self {
        Self {
            stored: AtomicBool::new(false),
            changed: AtomicBool::new(false),
            countdown: AtomicU8::new(BUTTON_DEBOUNCE_TICKS),
        }
    }

    fn sample(&self, pressed: bool) {
        let pending = self.changed.load(Ordering::Acquire);
        if !pending && pressed != self.stored.load(Ordering::Relaxed) {
            let left = self.countdown.load(Ordering::Relaxed).saturating_sub(1);
            if left == 0 {
                self.stored.store(pressed, Ordering::Relaxed);
                self.changed.store(true, Ordering::Release);
                self.countdown.store(BUTTON_DEBOUNCE_TICKS, Ordering::Relaxed);
            } else {
                self.countdown.store(left, Ordering::Relaxed);
            }
        } else {
            self.countdown.store(BUTTON_DEBOUNCE_TICKS, Ordering::Relaxed);
        }
    }

    fn take(&self) -> Option<bool> {
        if self.changed.load(Ordering::Acquire) {
            let pressed = self.stored.load(Ordering::Relaxed);
            self.changed.store(false, Ordering::Release);
            Some(pressed)
        } else {
            None
        }
    }
}

/// A speed sample taken while moving.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedSample {
    pub left: u16,
    pub right: u16,
}

pub struct Monitor {
    battery: AtomicU16,
    battery_ready: AtomicBool,
    button_a: Debounce,
    button_b: Debounce,
    left_speed: AtomicU16,
    right_speed: AtomicU16,
    speed_ready: AtomicBool,
    speed_countdown: AtomicU8,
    silence: AtomicU8,
}

impl Monitor {
    pub const fn new() -> Self {
        Self {
            battery: AtomicU16::new(0),
            battery_ready: AtomicBool::new(false),
            button_a: Debounce::new(),
            button_b: Debounce::new(),
            left_speed: AtomicU16::new(0),
            right_speed: AtomicU16::new(0),
            speed_ready: AtomicBool::new(false),
            speed_countdown: AtomicU8::new(SPEED_SAMPLE_TICKS),
            silence: AtomicU8::new(0),
        }
    }

    fn debounce(&self, button: Button) -> &Debounce {
        match button {
            Button::A => &self.button_a,
            Button::B => &self.button_b,
        }
    }

    /// Run one monitor tick.
    pub fn tick<IO: AdcRead + Buttons>(&self, io: &mut IO, motion: &Motion) {
        self.battery
            .store(io.read_channel(AdcChannel::Battery), Ordering::Relaxed);
        self.battery_ready.store(true, Ordering::Release);

        for button in [Button::A, Button::B] {
            let pressed = io.pressed(button);
            self.debounce(button).sample(pressed);
        }

        if motion.is_moving() {
            let left = self.speed_countdown.load(Ordering::Relaxed).saturating_sub(1);
            if left == 0 {
                self.left_speed
                    .store(motion.speed_index(Axis::Left), Ordering::Relaxed);
                self.right_speed
                    .store(motion.speed_index(Axis::Right), Ordering::Relaxed);
                self.speed_ready.store(true, Ordering::Release);
                self.speed_countdown
                    .store(SPEED_SAMPLE_TICKS, Ordering::Relaxed);
            } else {
                self.speed_countdown.store(left, Ordering::Relaxed);
            }
        }

        let quiet = self.silence.load(Ordering::Relaxed);
        self.silence.store(quiet.saturating_add(1), Ordering::Relaxed);
    }

    /// Latest raw battery reading.
    #[inline]
    pub fn battery(&self) -> u16 {
        self.battery.load(Ordering::Relaxed) & ADC_MASK
    }

    /// New battery reading since the last call, if any.
    pub fn take_battery(&self) -> Option<u16> {
        if self.battery_ready.swap(false, Ordering::AcqRel) {
            Some(self.battery())
        } else {
            None
        }
    }

    /// Debounced level change of `button` since the last call: `Some(pressed)`.
    pub fn take_button(&self, button: Button) -> Option<bool> {
        self.debounce(button).take()
    }

    pub fn take_speed_sample(&self) -> Option<SpeedSample> {
        if self.speed_ready.swap(false, Ordering::AcqRel) {
            Some(SpeedSample {
                left: self.left_speed.load(Ordering::Relaxed),
                right: self.right_speed.load(Ordering::Relaxed),
            })
        } else {
            None
        }
    }

    pub fn clear_speed_sample(&self) {
        self.speed_ready.store(false, Ordering::Release);
    }

    /// Monitor ticks since the host last sent a byte.
    #[inline]
    pub fn silence(&self) -> u8 {
        self.silence.load(Ordering::Relaxed)
    }

    pub fn note_host_activity(&self) {
        self.silence.store(0, Ordering::Relaxed);
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_change_needs_three_stable_ticks_and_is_reported_once() {
        let d = Debounce::new();
        d.sample(true);
        d.sample(true);
        assert_eq!(d.take(), None);
        d.sample(true);
        assert_eq!(d.take(), Some(true));
        assert_eq!(d.take(), None);
    }

    #[test]
    fn bounce_restarts_the_count() {
        let d = Debounce::new();
        d.sample(true);
        d.sample(true);
        d.sample(false);
        d.sample(true);
        d.sample(true);
        assert_eq!(d.take(), None);
        d.sample(true);
        assert_eq!(d.take(), Some(true));
    }

    #[test]
    fn battery_conversion_matches_divider() {
        // 850 counts is about 15.56 V on the 4-cell pack
        assert_eq!(battery_millivolts(850), 15_563);
    }
}
