// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Simulated hardware for running the firmware on a host.
//!
//! Split the same way as the interrupt contexts on the board: [`SimHost`] is what the main loop
//! owns (serial link, LEDs, motor driver), [`SimSensors`] is shared by the scan and monitor ticks
//! (ADC, emitters, buttons) and [`SimStepper`] is what the motor ticks drive.

use core::convert::Infallible;

use heapless::{Deque, Vec};

use crate::hw::{
    AdcChannel, AdcRead, Axis, Button, Buttons, EmitterBank, Heading, HostLink, IrFrontEnd, LedId,
    Leds, MotorDriver, Stepper,
};

/// Bytes the simulated host can queue toward the device.
pub const RX_CAPACITY: usize = 256;
/// Bytes the device can send before the test drains them.
pub const TX_CAPACITY: usize = 4096;

/// Main-loop side of the board.
pub struct SimHost {
    rx: Deque<u8, RX_CAPACITY>,
    tx: Vec<u8, TX_CAPACITY>,
    leds: [bool; LedId::COUNT],
    driver_enabled: bool,
    heading: Option<Heading>,
    armed: bool,
}

impl SimHost {
    pub const fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            leds: [false; LedId::COUNT],
            driver_enabled: false,
            heading: None,
            armed: false,
        }
    }

    /// Queue bytes from the host. Bytes past the receive capacity are dropped, like an overrun.
    pub fn send(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.rx.push_back(b).is_err() {
                break;
            }
        }
    }

    /// Received bytes not yet read by the firmware.
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Drain everything the firmware has sent.
    pub fn take_tx(&mut self) -> Vec<u8, TX_CAPACITY> {
        core::mem::take(&mut self.tx)
    }

    pub fn led(&self, led: LedId) -> bool {
        self.leds[led.index()]
    }

    pub fn driver_enabled(&self) -> bool {
        self.driver_enabled
    }

    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// Both step timers are running.
    pub fn timers_armed(&self) -> bool {
        self.armed
    }

    /// Called when a motor tick disarmed the timers from interrupt context.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostLink for SimHost {
    fn try_read(&mut self) -> nb::Result<u8, Infallible> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, byte: u8) {
        // A full buffer means the test forgot to drain.
        if self.tx.push(byte).is_err() {
            panic!("simulated TX buffer full ({TX_CAPACITY} bytes)");
        }
    }
}

impl Leds for SimHost {
    fn set_led(&mut self, led: LedId, on: bool) {
        self.leds[led.index()] = on;
    }
}

impl MotorDriver for SimHost {
    fn set_enabled(&mut self, enabled: bool) {
        self.driver_enabled = enabled;
    }

    fn set_heading(&mut self, heading: Heading) {
        self.heading = Some(heading);
    }

    fn start_stepping(&mut self) {
        self.armed = true;
    }

    fn stop_stepping(&mut self) {
        self.armed = false;
    }
}

/// Analogue front end: each IR channel reads its ambient level, plus its reflection while the
/// emitter bank that lights it is on.
pub struct SimSensors {
    ambient: [u16; AdcChannel::COUNT],
    reflection: [u16; AdcChannel::COUNT],
    emitters: [bool; 3],
    buttons: [bool; 2],
    /// Number of emitter switch-ons, for checking the scan sequence.
    pub flashes: u32,
}

fn bank_of(channel: AdcChannel) -> Option<EmitterBank> {
    match channel {
        AdcChannel::Front => Some(EmitterBank::Front),
        AdcChannel::Left45 | AdcChannel::Right45 => Some(EmitterBank::Diagonal),
        AdcChannel::Left90 | AdcChannel::Right90 => Some(EmitterBank::Side),
        AdcChannel::Battery => None,
    }
}

fn bank_index(bank: EmitterBank) -> usize {
    match bank {
        EmitterBank::Front => 0,
        EmitterBank::Side => 1,
        EmitterBank::Diagonal => 2,
    }
}

impl SimSensors {
    pub const fn new() -> Self {
        Self {
            ambient: [0; AdcChannel::COUNT],
            reflection: [0; AdcChannel::COUNT],
            emitters: [false; 3],
            buttons: [false; 2],
            flashes: 0,
        }
    }

    pub fn set_ambient(&mut self, channel: AdcChannel, level: u16) {
        self.ambient[channel.index()] = level;
    }

    /// Extra level seen while the channel's emitter is on.
    pub fn set_reflection(&mut self, channel: AdcChannel, level: u16) {
        self.reflection[channel.index()] = level;
    }

    pub fn set_battery(&mut self, raw: u16) {
        self.ambient[AdcChannel::Battery.index()] = raw;
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.buttons[button as usize] = pressed;
    }

    pub fn emitter_on(&self, bank: EmitterBank) -> bool {
        self.emitters[bank_index(bank)]
    }
}

impl Default for SimSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcRead for SimSensors {
    fn read_channel(&mut self, ch: AdcChannel) -> u16 {
        let lit = bank_of(ch).is_some_and(|bank| self.emitter_on(bank));
        let level = self.ambient[ch.index()]
            .saturating_add(if lit { self.reflection[ch.index()] } else { 0 });
        level.min(0x03FF)
    }
}

impl IrFrontEnd for SimSensors {
    fn set_emitter(&mut self, bank: EmitterBank, on: bool) {
        if on {
            self.flashes += 1;
        }
        self.emitters[bank_index(bank)] = on;
    }

    fn settle(&mut self) {}
}

impl Buttons for SimSensors {
    fn pressed(&mut self, button: Button) -> bool {
        self.buttons[button as usize]
    }
}

/// Step outputs driven from the motor ticks.
#[derive(Default)]
pub struct SimStepper {
    periods: [u16; 2],
    pulses: [u32; 2],
    halted: bool,
}

impl SimStepper {
    pub const fn new() -> Self {
        Self {
            periods: [0; 2],
            pulses: [0; 2],
            halted: false,
        }
    }

    /// Last period programmed for `axis`.
    pub fn period(&self, axis: Axis) -> u16 {
        self.periods[axis as usize]
    }

    /// Step pulses emitted on `axis` since start-up.
    pub fn pulses(&self, axis: Axis) -> u32 {
        self.pulses[axis as usize]
    }

    /// True once after a tick disarmed the timers.
    pub fn take_halt(&mut self) -> bool {
        core::mem::take(&mut self.halted)
    }
}

impl Stepper for SimStepper {
    fn set_period(&mut self, axis: Axis, period: u16) {
        self.periods[axis as usize] = period;
    }

    fn pulse(&mut self, axis: Axis) {
        self.pulses[axis as usize] += 1;
    }

    fn halt_all(&mut self) {
        self.halted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ir_channel_only_sees_its_own_bank() {
        let mut s = SimSensors::new();
        s.set_ambient(AdcChannel::Front, 10);
        s.set_reflection(AdcChannel::Front, 100);
        assert_eq!(s.read_channel(AdcChannel::Front), 10);
        s.set_emitter(EmitterBank::Side, true);
        assert_eq!(s.read_channel(AdcChannel::Front), 10);
        s.set_emitter(EmitterBank::Front, true);
        assert_eq!(s.read_channel(AdcChannel::Front), 110);
    }

    #[test]
    #[should_panic(expected = "TX buffer full")]
    fn undrained_output_is_not_silently_truncated() {
        let mut h = SimHost::new();
        for _ in 0..=TX_CAPACITY {
            h.write(0xEF);
        }
    }

    #[test]
    fn link_reads_in_order_then_would_block() {
        let mut h = SimHost::new();
        h.send(&[1, 2]);
        assert_eq!(h.try_read(), Ok(1));
        assert_eq!(h.try_read(), Ok(2));
        assert_eq!(h.try_read(), Err(nb::Error::WouldBlock));
    }
}
