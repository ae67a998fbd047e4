// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

mod common;

use common::events;
use maze_io::hw::{AdcChannel, Axis, Heading, ResetCause};
use maze_io::protocol::LinkState;
use maze_io::sim::Simulator;

#[test]
fn boot_announces_the_reset_cause() {
    let mut sim = Simulator::new(ResetCause::Watchdog);
    assert_eq!(sim.take_output().as_slice(), &[0x03]);
    assert_eq!(sim.engine.link_state(), LinkState::Locked);

    // nothing else until unlocked
    sim.run_for(500_000);
    assert!(sim.take_output().is_empty());
}

#[test]
fn forward_move_runs_to_completion() {
    let mut sim = Simulator::new(ResetCause::PowerOn);
    sim.unlock();

    sim.send(&[0xC1, 0x00, 0x64]);
    let done = sim.run_until(5_000_000, |sim| {
        sim.host.pending_rx() == 0 && !sim.engine.reporter().move_in_progress()
    });
    assert!(done);
    assert!(sim.now_us() < 5_000_000);

    let out = events(&sim.take_output());
    let finished = out.iter().filter(|e| e[0] == 0x20).count();
    assert_eq!(finished, 1);
    assert_eq!(sim.stepper.pulses(Axis::Left), 100);
    assert!(!sim.host.timers_armed());
    assert!(sim.host.driver_enabled());
    assert_eq!(sim.host.heading(), Some(Heading::Forward));
    assert!(!sim.shared.motion.is_moving());

    // no further steps once halted
    let right = sim.stepper.pulses(Axis::Right);
    sim.run_for(100_000);
    assert_eq!(sim.stepper.pulses(Axis::Right), right);
}

#[test]
fn stop_mid_move_disarms_the_motors() {
    let mut sim = Simulator::new(ResetCause::PowerOn);
    sim.unlock();

    sim.send(&[0xC1, 0x10, 0x00]);
    sim.run_for(200_000);
    assert!(sim.shared.motion.is_moving());
    let pulses = sim.stepper.pulses(Axis::Left);
    assert!(pulses > 0);

    sim.send(&[0xC0]);
    sim.drain_input();
    sim.run_for(1_000);
    assert!(!sim.shared.motion.is_moving());
    assert!(!sim.host.driver_enabled());

    let pulses = sim.stepper.pulses(Axis::Left);
    sim.run_for(100_000);
    assert_eq!(sim.stepper.pulses(Axis::Left), pulses);

    let out = events(&sim.take_output());
    assert_eq!(out.iter().filter(|e| e[0] == 0x20).count(), 1);
}

#[test]
fn battery_reports_over_one_second() {
    let mut sim = Simulator::new(ResetCause::PowerOn);
    sim.sensors.set_battery(812);
    sim.unlock();

    sim.run_for(1_000_000);
    let out = events(&sim.take_output());
    let battery: Vec<_> = out.iter().filter(|e| (0x10..=0x13).contains(&e[0])).collect();
    // first reading, then the twentieth unchanged one
    assert_eq!(battery.len(), 2);
    assert_eq!(battery[0], &vec![0x13, 0x2C]);
}

#[test]
fn scanning_reports_walls_on_request() {
    let mut sim = Simulator::new(ResetCause::PowerOn);
    sim.sensors.set_reflection(AdcChannel::Left90, 400);
    sim.sensors.set_reflection(AdcChannel::Right90, 400);
    sim.unlock();

    sim.send(&[0xD1]);
    sim.run_for(100_000);
    sim.take_output();

    sim.send(&[0x98, 0x9B]);
    sim.drain_input();
    sim.run_for(1_000);
    let out: Vec<_> = events(&sim.take_output())
        .into_iter()
        .filter(|e| !(0x10..=0x13).contains(&e[0]))
        .collect();
    assert_eq!(out, [vec![0x4C], vec![0xEF], vec![0x62, 0x01, 0x90], vec![0xEF]]);
}

#[test]
fn watchdog_relocks_a_silent_link() {
    let mut sim = Simulator::new(ResetCause::PowerOn);
    sim.unlock();
    sim.send(&[0xF7]);
    sim.drain_input();

    let relocked = sim.run_until(1_000_000, |sim| sim.engine.link_state() == LinkState::Locked);
    assert!(relocked);
    let out = events(&sim.take_output());
    assert_eq!(out.last(), Some(&vec![0xC2]));

    sim.unlock();
    assert_eq!(sim.engine.link_state(), LinkState::Unlocked);
}

#[test]
fn link_stays_open_without_the_watchdog() {
    let mut sim = Simulator::new(ResetCause::PowerOn);
    sim.unlock();
    sim.run_for(1_000_000);
    assert_eq!(sim.engine.link_state(), LinkState::Unlocked);
}
