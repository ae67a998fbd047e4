// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

mod common;

use common::{events, without_battery, Rig};
use maze_io::hw::sim::{SimSensors, SimStepper};
use maze_io::hw::{AdcChannel, Axis, Button};

const ACK: u8 = 0xEF;

/// One monitor tick followed by one main-loop pass; returns what was sent.
fn monitor_pass(rig: &mut Rig, sensors: &mut SimSensors) -> Vec<Vec<u8>> {
    rig.shared.monitor_tick(sensors);
    rig.poll();
    events(&rig.host.take_tx())
}

#[test]
fn battery_first_sample_then_every_twentieth_unchanged() {
    let mut rig = Rig::unlocked();
    let mut sensors = SimSensors::new();
    sensors.set_battery(700);

    assert_eq!(monitor_pass(&mut rig, &mut sensors), [vec![0x12, 0xBC]]);
    for _ in 1..20 {
        assert!(monitor_pass(&mut rig, &mut sensors).is_empty());
    }
    assert_eq!(monitor_pass(&mut rig, &mut sensors), [vec![0x12, 0xBC]]);
}

#[test]
fn battery_change_is_sent_immediately() {
    let mut rig = Rig::unlocked();
    let mut sensors = SimSensors::new();
    sensors.set_battery(700);
    monitor_pass(&mut rig, &mut sensors);
    monitor_pass(&mut rig, &mut sensors);

    sensors.set_battery(699);
    assert_eq!(monitor_pass(&mut rig, &mut sensors), [vec![0x12, 0xBB]]);
    assert!(monitor_pass(&mut rig, &mut sensors).is_empty());
}

#[test]
fn nothing_is_reported_while_locked() {
    let mut rig = Rig::locked();
    let mut sensors = SimSensors::new();
    sensors.set_battery(512);
    for _ in 0..30 {
        assert!(monitor_pass(&mut rig, &mut sensors).is_empty());
    }
}

#[test]
fn buttons_report_debounced_edges() {
    let mut rig = Rig::unlocked();
    let mut sensors = SimSensors::new();
    let pass = |rig: &mut Rig, sensors: &mut SimSensors| {
        rig.shared.monitor_tick(sensors);
        rig.poll();
        without_battery(&rig.host.take_tx())
    };

    sensors.set_button(Button::A, true);
    assert!(pass(&mut rig, &mut sensors).is_empty());
    assert!(pass(&mut rig, &mut sensors).is_empty());
    assert_eq!(pass(&mut rig, &mut sensors), [vec![0x38]]);
    for _ in 0..5 {
        assert!(pass(&mut rig, &mut sensors).is_empty());
    }

    // a one-tick glitch is ignored
    sensors.set_button(Button::A, false);
    pass(&mut rig, &mut sensors);
    sensors.set_button(Button::A, true);
    for _ in 0..5 {
        assert!(pass(&mut rig, &mut sensors).is_empty());
    }

    sensors.set_button(Button::A, false);
    sensors.set_button(Button::B, true);
    pass(&mut rig, &mut sensors);
    pass(&mut rig, &mut sensors);
    assert_eq!(pass(&mut rig, &mut sensors), [vec![0x30], vec![0x39]]);
}

#[test]
fn move_finished_is_sent_once() {
    let mut rig = Rig::unlocked();
    let mut stepper = SimStepper::new();

    assert_eq!(rig.exchange(&[0xC1, 0x00, 0x05]), [ACK]);
    assert!(rig.host.timers_armed());
    assert!(rig.host.driver_enabled());

    for _ in 0..4 {
        rig.shared.motor_tick(Axis::Left, &mut stepper);
        rig.poll();
        assert!(rig.host.take_tx().is_empty());
    }
    rig.shared.motor_tick(Axis::Left, &mut stepper);
    rig.poll();
    assert_eq!(events(&rig.host.take_tx()), [vec![0x20]]);

    rig.poll();
    assert!(rig.host.take_tx().is_empty());
    assert_eq!(rig.exchange(&[0xC0]), [ACK]);
}

#[test]
fn tick_counts_follow_move_finished_when_enabled() {
    let mut rig = Rig::unlocked();
    let mut stepper = SimStepper::new();
    assert_eq!(rig.exchange(&[0xF1]), [ACK]);

    rig.exchange(&[0xC1, 0x00, 0x05]);
    for _ in 0..3 {
        rig.shared.motor_tick(Axis::Right, &mut stepper);
    }
    for _ in 0..5 {
        rig.shared.motor_tick(Axis::Left, &mut stepper);
    }
    rig.poll();
    assert_eq!(
        events(&rig.host.take_tx()),
        [vec![0x20], vec![0x26, 0x00, 0x05, 0x00, 0x03]]
    );
    assert_eq!(rig.shared.motion.tick_counts(), (0, 0));
}

#[test]
fn speed_samples_while_moving() {
    let mut rig = Rig::unlocked();
    let mut sensors = SimSensors::new();
    let mut stepper = SimStepper::new();

    rig.exchange(&[0xC1, 0x01, 0x00]);
    for _ in 0..3 {
        rig.shared.motor_tick(Axis::Left, &mut stepper);
    }
    rig.shared.monitor_tick(&mut sensors);
    rig.poll();
    // not enabled
    assert!(without_battery(&rig.host.take_tx()).is_empty());

    assert_eq!(rig.exchange(&[0xF5]), [ACK]);
    rig.shared.motor_tick(Axis::Right, &mut stepper);
    rig.shared.monitor_tick(&mut sensors);
    rig.poll();
    assert_eq!(without_battery(&rig.host.take_tx()), [vec![0x22, 3, 1]]);
}

#[test]
fn trim_reports_while_moving() {
    let mut rig = Rig::unlocked();
    let mut sensors = SimSensors::new();
    sensors.set_reflection(AdcChannel::Left45, 400);

    assert_eq!(rig.exchange(&[0xD1]), [ACK]);
    assert_eq!(rig.exchange(&[0xF3]), [ACK]);

    // a trim before the move is stale
    for _ in 0..3 {
        rig.shared.scan_tick(&mut sensors);
    }
    assert_ne!(rig.shared.scanner.take_trim_report(), 0);
    for _ in 0..3 {
        rig.shared.scan_tick(&mut sensors);
    }
    rig.exchange(&[0xC1, 0x01, 0x00]);
    rig.poll();
    assert!(rig.host.take_tx().is_empty());

    rig.shared.scan_tick(&mut sensors);
    rig.shared.scan_tick(&mut sensors);
    rig.shared.scan_tick(&mut sensors);
    rig.poll();
    assert_eq!(events(&rig.host.take_tx()), [vec![0x71]]);
}

#[test]
fn distance_test_reports_walls_at_the_mark() {
    let mut rig = Rig::unlocked();
    let mut sensors = SimSensors::new();
    let mut stepper = SimStepper::new();
    sensors.set_reflection(AdcChannel::Left90, 300);

    rig.exchange(&[0xD1]);
    for _ in 0..3 {
        rig.shared.scan_tick(&mut sensors);
    }

    assert_eq!(rig.exchange(&[0xC9, 0x00, 0x02]), [ACK]);
    rig.exchange(&[0xC1, 0x01, 0x00]);
    rig.shared.motor_tick(Axis::Left, &mut stepper);
    rig.poll();
    assert!(rig.host.take_tx().is_empty());

    rig.shared.motor_tick(Axis::Left, &mut stepper);
    rig.poll();
    assert_eq!(events(&rig.host.take_tx()), [vec![0x21], vec![0x44]]);
}
