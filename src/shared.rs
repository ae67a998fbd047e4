// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! State shared between the main loop and the timer interrupts.
//!
//! `Shared` is built in a `static` on the board and on the stack in host tests. Every field is an
//! atomic with one designated writer (documented on the owning type), so the interrupt handlers
//! only need `&Shared`. The `*_tick` methods are the whole body of each timer interrupt.

use crate::config::Registers;
use crate::control::{AxisTick, Motion};
use crate::hw::{AdcRead, Axis, Buttons, IrFrontEnd, Stepper};
use crate::sensors::{Monitor, Scanner};

pub struct Shared {
    pub config: Registers,
    pub motion: Motion,
    pub scanner: Scanner,
    pub monitor: Monitor,
}

impl Shared {
    pub const fn new() -> Self {
        Self {
            config: Registers::new(),
            motion: Motion::new(),
            scanner: Scanner::new(),
            monitor: Monitor::new(),
        }
    }

    /// IR scan timer.
    pub fn scan_tick<IO: IrFrontEnd>(&self, io: &mut IO) {
        self.scanner.tick(io, &self.config, &self.motion);
    }

    /// Left or right step timer. A halting tick still steps, then disarms both timers. A tick
    /// that lands after a stop only reprograms the period.
    pub fn motor_tick<S: Stepper>(&self, axis: Axis, stepper: &mut S) -> AxisTick {
        let tick = self.motion.tick(axis, &self.config);
        stepper.set_period(axis, tick.period);
        if tick.step {
            stepper.pulse(axis);
        }
        if tick.halt {
            stepper.halt_all();
        }
        tick
    }

    /// Battery and button timer.
    pub fn monitor_tick<IO: AdcRead + Buttons>(&self, io: &mut IO) {
        self.monitor.tick(io, &self.motion);
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}
