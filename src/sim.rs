// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Deterministic scheduler that runs the firmware against [`hw::sim`](crate::hw::sim) devices.
//!
//! Time is a virtual microsecond counter. The four timers fire at their board periods and the
//! main loop is polled every [`LOOP_PERIOD_US`]. Timers due at the same instant fire in interrupt
//! priority order (motors, then scan, then monitor) before the main loop runs, which matches what
//! the board does when several interrupts are pending on return to thread mode.

use crate::config::{MONITOR_PERIOD_US, MOTOR_START_PERIOD, SCAN_PERIOD_US};
use crate::hw::sim::{SimHost, SimSensors, SimStepper, TX_CAPACITY};
use crate::hw::{Axis, ResetCause};
use crate::protocol::messages::UNLOCK_SEQUENCE;
use crate::protocol::{Engine, LinkState};
use crate::shared::Shared;

/// Spacing of main-loop iterations; a little under one byte time at the host baud rate.
pub const LOOP_PERIOD_US: u64 = 100;

pub struct Simulator {
    pub shared: Shared,
    pub engine: Engine,
    pub host: SimHost,
    pub sensors: SimSensors,
    pub stepper: SimStepper,
    now: u64,
    next_scan: u64,
    next_monitor: u64,
    next_loop: u64,
    next_motor: [Option<u64>; 2],
}

impl Simulator {
    /// Power on: build the state and announce the reset cause.
    pub fn new(reset_cause: ResetCause) -> Self {
        let mut sim = Self {
            shared: Shared::new(),
            engine: Engine::new(reset_cause),
            host: SimHost::new(),
            sensors: SimSensors::new(),
            stepper: SimStepper::new(),
            now: 0,
            next_scan: u64::from(SCAN_PERIOD_US),
            next_monitor: u64::from(MONITOR_PERIOD_US),
            next_loop: 0,
            next_motor: [None; 2],
        };
        sim.engine.boot(&mut sim.host);
        sim
    }

    /// Virtual time in microseconds.
    #[inline]
    pub fn now_us(&self) -> u64 {
        self.now
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.host.send(bytes);
    }

    pub fn take_output(&mut self) -> heapless::Vec<u8, TX_CAPACITY> {
        self.host.take_tx()
    }

    /// Send the handshake, run until the engine has consumed it and discard the reply.
    pub fn unlock(&mut self) {
        self.send(&UNLOCK_SEQUENCE);
        self.run_until(10_000, |sim| sim.engine.link_state() == LinkState::Unlocked);
        self.take_output();
    }

    /// Advance virtual time by `us`.
    pub fn run_for(&mut self, us: u64) {
        let end = self.now + us;
        while self.next_event() <= end {
            self.step();
        }
        self.now = end;
    }

    /// Run until `done` holds or `limit_us` elapses. Returns whether `done` was reached.
    pub fn run_until<F>(&mut self, limit_us: u64, mut done: F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        let end = self.now + limit_us;
        while self.next_event() <= end {
            self.step();
            if done(self) {
                return true;
            }
        }
        self.now = end;
        done(self)
    }

    /// Run until every queued host byte has been consumed.
    pub fn drain_input(&mut self) {
        self.run_until(1_000_000, |sim| sim.host.pending_rx() == 0);
    }

    fn next_event(&self) -> u64 {
        let mut next = self.next_scan.min(self.next_monitor).min(self.next_loop);
        for t in self.next_motor.iter().flatten() {
            next = next.min(*t);
        }
        next
    }

    /// Jump to the next event and run everything due then.
    fn step(&mut self) {
        self.now = self.next_event();

        for (slot, axis) in [(0, Axis::Left), (1, Axis::Right)] {
            if self.next_motor[slot] == Some(self.now) {
                let tick = self.shared.motor_tick(axis, &mut self.stepper);
                self.next_motor[slot] = Some(self.now + u64::from(tick.period.max(1)));
                if self.stepper.take_halt() {
                    self.next_motor = [None; 2];
                    self.host.disarm();
                }
            }
        }

        if self.next_scan == self.now {
            self.shared.scan_tick(&mut self.sensors);
            self.next_scan += u64::from(SCAN_PERIOD_US);
        }

        if self.next_monitor == self.now {
            self.shared.monitor_tick(&mut self.sensors);
            self.next_monitor += u64::from(MONITOR_PERIOD_US);
        }

        if self.next_loop == self.now {
            self.engine.poll(&self.shared, &mut self.host);
            self.next_loop += LOOP_PERIOD_US;
            self.sync_motor_timers();
        }
    }

    /// Mirror the driver's arm/disarm requests onto the motor timers.
    fn sync_motor_timers(&mut self) {
        let scheduled = self.next_motor.iter().any(Option::is_some);
        if self.host.timers_armed() && !scheduled {
            let first = self.now + u64::from(MOTOR_START_PERIOD);
            self.next_motor = [Some(first); 2];
        } else if !self.host.timers_armed() && scheduled {
            self.next_motor = [None; 2];
        }
    }
}
