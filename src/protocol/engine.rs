// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Main-loop protocol engine.
//!
//! While the link is locked every received byte goes to the unlock matcher and nothing else
//! happens. Once unlocked, each [`Engine::poll`] first runs the telemetry reporter, then feeds at
//! most one received byte to the decoder and dispatches the command it completes. Every
//! dispatched frame, valid or not, ends with the acknowledgement event.

use crate::config::LINK_SILENCE_TICKS;
use crate::error::Error;
use crate::hw::{Heading, HostLink, LedId, Leds, MotorDriver, ResetCause};
use crate::protocol::messages::{Command, ConfigRegister, Event, Report};
use crate::protocol::parser::{Decoder, UnlockMatcher};
use crate::shared::Shared;
use crate::telemetry::{self, send, Reporter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Locked,
    Unlocked,
}

pub struct Engine {
    link: LinkState,
    unlock: UnlockMatcher,
    decoder: Decoder,
    reporter: Reporter,
    reset_cause: ResetCause,
    watchdog: bool,
}

impl Engine {
    pub const fn new(reset_cause: ResetCause) -> Self {
        Self {
            link: LinkState::Locked,
            unlock: UnlockMatcher::new(),
            decoder: Decoder::new(),
            reporter: Reporter::new(),
            reset_cause,
            watchdog: false,
        }
    }

    /// Announce the reset cause. Call once before the first [`Engine::poll`].
    pub fn boot<L: HostLink>(&mut self, link: &mut L) {
        info!("boot, reset cause {}", self.reset_cause);
        send(link, Event::Reset(self.reset_cause));
    }

    #[inline]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    #[inline]
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    #[inline]
    pub fn watchdog_enabled(&self) -> bool {
        self.watchdog
    }

    /// One main-loop iteration. Never blocks on the host link.
    pub fn poll<IO>(&mut self, shared: &Shared, io: &mut IO)
    where
        IO: HostLink + Leds + MotorDriver,
    {
        match self.link {
            LinkState::Locked => self.poll_locked(shared, io),
            LinkState::Unlocked => self.poll_unlocked(shared, io),
        }
    }

    fn poll_locked<IO: HostLink>(&mut self, shared: &Shared, io: &mut IO) {
        let Ok(byte) = io.try_read() else {
            return;
        };
        shared.monitor.note_host_activity();

        if self.unlock.push(byte) {
            info!("link unlocked");
            self.link = LinkState::Unlocked;
            self.decoder.reset();
            send(io, Event::UnlockFromLock);
            send(io, Event::Ack);
        }
    }

    fn poll_unlocked<IO>(&mut self, shared: &Shared, io: &mut IO)
    where
        IO: HostLink + Leds + MotorDriver,
    {
        if self.watchdog && shared.monitor.silence() > LINK_SILENCE_TICKS {
            warn!("host silent, relocking link");
            self.relock();
            send(io, Event::LockByTimer);
            return;
        }

        self.reporter.report(shared, io);

        let Ok(byte) = io.try_read() else {
            return;
        };
        shared.monitor.note_host_activity();

        match self.decoder.push(byte) {
            None => {}
            Some(Ok(cmd)) => {
                self.dispatch(cmd, shared, io);
                send(io, Event::Ack);
            }
            Some(Err(e)) => {
                self.reject(e, io);
                send(io, Event::Ack);
            }
        }
    }

    fn relock(&mut self) {
        self.link = LinkState::Locked;
        self.unlock.reset();
        self.decoder.reset();
    }

    fn reject<L: HostLink>(&mut self, err: Error, link: &mut L) {
        warn!("invalid command: {}", err);
        send(link, Event::InvalidCommand);
    }

    fn dispatch<IO>(&mut self, cmd: Command, shared: &Shared, io: &mut IO)
    where
        IO: HostLink + Leds + MotorDriver,
    {
        let config = &shared.config;
        let motion = &shared.motion;

        match cmd {
            Command::LedOff(led) => io.set_led(led, false),
            Command::LedOn(led) => io.set_led(led, true),
            Command::AllLeds(mask) => {
                for led in LedId::all() {
                    io.set_led(led, mask & (1 << led.index()) != 0);
                }
            }
            Command::DisableSerial => {
                info!("link locked by host");
                send(io, Event::LockByCommand);
                self.relock();
            }
            Command::Poll(n) => send(io, Event::PollReply(n)),
            Command::Request(report) => self.send_report(report, shared, io),

            Command::Stop => {
                io.stop_stepping();
                motion.stop();
                io.set_enabled(false);
                motion.clear_wall_edge();
                debug!("motors off");
            }
            Command::Move { heading, distance } => {
                io.set_enabled(true);
                if heading == Heading::Forward {
                    motion.clear_wall_edge();
                }
                io.set_heading(heading);
                motion.start_move(distance, config.speed(), config.corrector());
                io.start_stepping();
                self.reporter.move_started(shared);
                debug!("move {} by {}", heading, distance);
            }
            Command::SetSpeed(v) => config.set_speed(v),
            Command::SetCorrector(v) => config.set_corrector(v),
            Command::ExtendCell => motion.extend_one_cell(),
            Command::SetCellDistance(v) => config.set_cell_distance(v),
            Command::SetWallEdgeOffset(v) => config.set_wall_edge_offset(v),
            Command::SetTestDistance(v) => motion.set_distance_to_test(v),
            Command::ReadConfig(register) => {
                let value = match register {
                    ConfigRegister::Speed => config.speed(),
                    ConfigRegister::Corrector => config.corrector() as u16,
                    ConfigRegister::CellDistance => config.cell_distance() as u16,
                    ConfigRegister::WallEdgeOffset => config.wall_edge_offset() as u16,
                    ConfigRegister::TestDistance => motion.distance_to_test() as u16,
                };
                send(io, Event::ConfigValue { register, value });
            }

            Command::IrScanning(on) => {
                if on {
                    shared.scanner.enable();
                } else {
                    shared.scanner.disable();
                }
                debug!("IR scanning {}", on);
            }
            Command::SetThreshold(which, v) => config.set_threshold(which, v),

            Command::SetReport(which, on) => self.reporter.set_report(which, on),
            Command::LinkWatchdog(on) => {
                self.watchdog = on;
                info!("link watchdog {}", on);
            }
            Command::WriteAccel { index, period } => {
                let table = motion.table();
                match table.write(index, period).and_then(|()| table.read(index)) {
                    Ok(v) => {
                        debug!("accel[{}] = {}", index, v);
                        send(io, Event::AccelValue(v));
                    }
                    Err(e) => self.reject(e, io),
                }
            }
            Command::ReadAccel { index } => match motion.table().read(index) {
                Ok(v) => send(io, Event::AccelValue(v)),
                Err(e) => self.reject(e, io),
            },
            Command::AlreadyUnlocked => send(io, Event::UnlockFromUnlock),
        }
    }

    fn send_report<L: HostLink>(&self, report: Report, shared: &Shared, link: &mut L) {
        let event = match report {
            Report::ResetCause => Event::Reset(self.reset_cause),
            Report::TickCounts => {
                let (left, right) = shared.motion.tick_counts();
                telemetry::tick_counts(left, right)
            }
            Report::Battery => Event::Battery(shared.monitor.battery()),
            Report::FrontSideBitmap => {
                Event::FrontSideBitmap(shared.scanner.front_side_bitmap(&shared.config))
            }
            Report::DiagonalBitmap => {
                Event::DiagonalBitmap(shared.scanner.diagonal_bitmap(&shared.config))
            }
            Report::IrLevel(sensor) => Event::IrLevel {
                sensor,
                level: shared.scanner.reading(sensor),
            },
        };
        send(link, event);
    }
}
