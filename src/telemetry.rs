// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Event reporting run once per main-loop iteration, before any command is dispatched.
//!
//! Order is fixed: battery, move completion (or, while moving, speed and trim reports), buttons,
//! distance test. State changes made by the interrupts therefore reach the host before the next
//! command can disturb them.

use crate::config::BATTERY_RESEND_COUNT;
use crate::hw::{Button, HostLink};
use crate::protocol::messages::{Event, ReportToggle};
use crate::sensors::monitor::battery_millivolts;
use crate::shared::Shared;

/// Send one event.
pub fn send<L: HostLink + ?Sized>(link: &mut L, event: Event) {
    trace!("event {}", event);
    link.write_all(&event.encode());
}

pub struct Reporter {
    last_battery: Option<u16>,
    battery_countdown: u8,
    move_in_progress: bool,
    tick_reports: bool,
    trim_reports: bool,
    speed_reports: bool,
}

impl Reporter {
    pub const fn new() -> Self {
        Self {
            last_battery: None,
            battery_countdown: BATTERY_RESEND_COUNT,
            move_in_progress: false,
            tick_reports: false,
            trim_reports: false,
            speed_reports: false,
        }
    }

    pub fn set_report(&mut self, which: ReportToggle, enabled: bool) {
        match which {
            ReportToggle::TickCounts => self.tick_reports = enabled,
            ReportToggle::Trim => self.trim_reports = enabled,
            ReportToggle::SpeedSamples => self.speed_reports = enabled,
        }
    }

    pub fn report_enabled(&self, which: ReportToggle) -> bool {
        match which {
            ReportToggle::TickCounts => self.tick_reports,
            ReportToggle::Trim => self.trim_reports,
            ReportToggle::SpeedSamples => self.speed_reports,
        }
    }

    /// A move was just started; drop reports left over from the previous one.
    pub fn move_started(&mut self, shared: &Shared) {
        self.move_in_progress = true;
        shared.scanner.take_trim_report();
        shared.monitor.clear_speed_sample();
    }

    /// A move started and not yet reported as finished.
    #[inline]
    pub fn move_in_progress(&self) -> bool {
        self.move_in_progress
    }

    /// Emit every pending event.
    pub fn report<L: HostLink>(&mut self, shared: &Shared, link: &mut L) {
        self.report_battery(shared, link);
        self.report_motion(shared, link);

        for button in [Button::A, Button::B] {
            if let Some(pressed) = shared.monitor.take_button(button) {
                send(link, Event::Button { button, pressed });
            }
        }

        if shared.motion.take_distance_test_flag() {
            send(link, Event::DistanceTest);
            send(
                link,
                Event::FrontSideBitmap(shared.scanner.front_side_bitmap(&shared.config)),
            );
        }
    }

    fn report_battery<L: HostLink>(&mut self, shared: &Shared, link: &mut L) {
        let Some(level) = shared.monitor.take_battery() else {
            return;
        };

        let unchanged = self.last_battery == Some(level);
        if unchanged {
            self.battery_countdown = self.battery_countdown.saturating_sub(1);
            if self.battery_countdown > 0 {
                return;
            }
        }

        self.last_battery = Some(level);
        self.battery_countdown = BATTERY_RESEND_COUNT;
        trace!("battery {} mV", battery_millivolts(level));
        send(link, Event::Battery(level));
    }

    fn report_motion<L: HostLink>(&mut self, shared: &Shared, link: &mut L) {
        if !self.move_in_progress {
            return;
        }

        if !shared.motion.is_moving() {
            self.move_in_progress = false;
            debug!("move finished");
            send(link, Event::MoveFinished);
            if self.tick_reports {
                let (left, right) = shared.motion.take_tick_counts();
                send(link, tick_counts(left, right));
            }
            return;
        }

        if self.speed_reports {
            if let Some(sample) = shared.monitor.take_speed_sample() {
                send(
                    link,
                    Event::SpeedSample {
                        left: sample.left,
                        right: sample.right,
                    },
                );
            }
        }

        if self.trim_reports {
            let bits = shared.scanner.take_trim_report();
            if bits != 0 {
                send(link, Event::Trim(bits));
            }
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick count event, each count saturated to 16 bits.
pub fn tick_counts(left: u32, right: u32) -> Event {
    Event::TickCounts {
        left: u16::try_from(left).unwrap_or(u16::MAX),
        right: u16::try_from(right).unwrap_or(u16::MAX),
    }
}
