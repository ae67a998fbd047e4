// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

use maze_io::hw::sim::{SimSensors, SimStepper};
use maze_io::hw::{AdcChannel, Axis};
use maze_io::Shared;

fn seven_eighths(p: u16) -> u16 {
    (p >> 1) + (p >> 2) + (p >> 3)
}

fn three_quarters(p: u16) -> u16 {
    (p >> 1) + (p >> 2)
}

#[test]
fn hundred_step_move_counts_down_and_halts_once() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(100, 50, 10);

    for n in 1..100 {
        let tick = shared.motor_tick(Axis::Left, &mut stepper);
        assert!(!tick.halt, "halted early at step {n}");
        assert_eq!(shared.motion.distance_to_go(), 100 - n);
    }

    let tick = shared.motor_tick(Axis::Left, &mut stepper);
    assert!(tick.halt);
    assert!(stepper.take_halt());
    assert!(!shared.motion.is_moving());
    assert_eq!(shared.motion.distance_to_go(), 0);
    // the halting tick still steps
    assert_eq!(stepper.pulses(Axis::Left), 100);
}

#[test]
fn non_positive_distance_halts_on_first_tick() {
    for distance in [0, 1, -5] {
        let shared = Shared::new();
        let mut stepper = SimStepper::new();
        shared.motion.start_move(distance, 50, 10);
        assert!(shared.motor_tick(Axis::Left, &mut stepper).halt);
        assert_eq!(shared.motion.distance_to_go(), 0);
        assert!(!shared.motion.is_moving());
    }
}

#[test]
fn right_axis_never_halts() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(1, 50, 10);
    for _ in 0..5 {
        assert!(!shared.motor_tick(Axis::Right, &mut stepper).halt);
    }
    assert_eq!(shared.motion.distance_to_go(), 1);
}

#[test]
fn speed_ramps_to_target_and_brakes_before_the_end() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(200, 20, 0);

    let mut peak = 0;
    loop {
        let tick = shared.motor_tick(Axis::Left, &mut stepper);
        if tick.halt {
            break;
        }
        let index = shared.motion.speed_index(Axis::Left);
        let remaining = shared.motion.distance_to_go();
        assert!(i32::from(index) <= i32::from(remaining) + 1);
        peak = peak.max(index);
    }
    assert_eq!(peak, 20);
    assert_eq!(shared.motion.speed_index(Axis::Left), 0);
}

#[test]
fn step_period_follows_the_table() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(1000, 50, 0);
    let table = shared.motion.table();

    for index in 0..5 {
        let tick = shared.motor_tick(Axis::Right, &mut stepper);
        assert_eq!(tick.period, table.period(index));
        assert_eq!(stepper.period(Axis::Right), table.period(index));
    }
}

#[test]
fn trims_shorten_only_the_requested_steps() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(1000, 50, 0);
    let table = shared.motion.table();

    shared.motion.request_trim(Axis::Right, 2);
    let periods: Vec<u16> = (0..3)
        .map(|_| shared.motor_tick(Axis::Right, &mut stepper).period)
        .collect();
    assert_eq!(
        periods,
        [
            seven_eighths(table.period(0)),
            seven_eighths(table.period(1)),
            table.period(2),
        ]
    );
    assert_eq!(shared.motion.trim_remaining(Axis::Right), 0);

    // the left axis was not trimmed
    assert_eq!(shared.motor_tick(Axis::Left, &mut stepper).period, table.period(0));

    shared.motion.request_trim(Axis::Left, 1);
    shared.motion.set_large_trim(true);
    assert_eq!(
        shared.motor_tick(Axis::Left, &mut stepper).period,
        three_quarters(table.period(1))
    );
}

#[test]
fn extend_adds_one_cell() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    let cell = shared.config.cell_distance();

    shared.motion.start_move(10, 50, 0);
    shared.motion.extend_one_cell();
    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.distance_to_go(), 9 + cell);

    // consumed once
    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.distance_to_go(), 8 + cell);
}

#[test]
fn new_move_discards_a_stale_extend() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.extend_one_cell();
    shared.motion.start_move(10, 50, 0);
    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.distance_to_go(), 9);
}

#[test]
fn wall_edge_waits_for_the_last_cell_then_snaps_once() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.config.set_cell_distance(347);
    shared.config.set_wall_edge_offset(230);

    shared.motion.start_move(1000, 50, 0);
    shared.motion.flag_wall_edge();
    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.distance_to_go(), 999);
    assert!(shared.motion.wall_edge_pending());

    shared.motion.stop();
    shared.motion.start_move(300, 50, 0);
    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.distance_to_go(), 230);
    assert!(!shared.motion.wall_edge_pending());

    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.distance_to_go(), 229);
}

#[test]
fn side_wall_disappearing_resynchronises_the_move() {
    let shared = Shared::new();
    let mut sensors = SimSensors::new();
    let mut stepper = SimStepper::new();
    shared.scanner.enable();
    shared.motion.start_move(300, 50, 0);

    // one full scan cycle with a left wall present
    sensors.set_reflection(AdcChannel::Left90, 300);
    for _ in 0..3 {
        shared.scan_tick(&mut sensors);
    }
    assert_eq!(shared.scanner.walls(), (true, false));
    assert!(!shared.motion.wall_edge_pending());

    sensors.set_reflection(AdcChannel::Left90, 0);
    for _ in 0..3 {
        shared.scan_tick(&mut sensors);
    }
    assert!(shared.motion.wall_edge_pending());

    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(
        shared.motion.distance_to_go(),
        shared.config.wall_edge_offset()
    );
}

#[test]
fn distance_test_fires_every_cell() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.config.set_cell_distance(4);
    shared.motion.start_move(1000, 50, 0);
    shared.motion.set_distance_to_test(3);

    for _ in 0..2 {
        shared.motor_tick(Axis::Left, &mut stepper);
        assert!(!shared.motion.take_distance_test_flag());
    }
    shared.motor_tick(Axis::Left, &mut stepper);
    assert!(shared.motion.take_distance_test_flag());
    assert!(!shared.motion.take_distance_test_flag());
    assert_eq!(shared.motion.distance_to_test(), 4);

    for _ in 0..3 {
        shared.motor_tick(Axis::Left, &mut stepper);
        assert!(!shared.motion.take_distance_test_flag());
    }
    shared.motor_tick(Axis::Left, &mut stepper);
    assert!(shared.motion.take_distance_test_flag());
}

#[test]
fn stop_is_idempotent() {
    let shared = Shared::new();
    shared.motion.start_move(50, 10, 0);
    shared.motion.stop();
    shared.motion.stop();
    assert!(!shared.motion.is_moving());
    assert_eq!(shared.motion.speed_index(Axis::Left), 0);
    assert_eq!(shared.motion.speed_index(Axis::Right), 0);
}

#[test]
fn tick_after_stop_leaves_the_move_untouched() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(100, 50, 0);
    for _ in 0..3 {
        shared.motor_tick(Axis::Left, &mut stepper);
    }
    shared.motion.stop();

    let distance = shared.motion.distance_to_go();
    let counts = shared.motion.tick_counts();
    for axis in [Axis::Left, Axis::Right] {
        let tick = shared.motor_tick(axis, &mut stepper);
        assert!(!tick.halt);
        assert!(!tick.step);
        assert_eq!(tick.period, shared.motion.table().period(0));
        assert_eq!(shared.motion.speed_index(axis), 0);
    }
    assert_eq!(shared.motion.distance_to_go(), distance);
    assert_eq!(shared.motion.tick_counts(), counts);
    assert_eq!(stepper.pulses(Axis::Left), 3);
    assert_eq!(stepper.pulses(Axis::Right), 0);
    assert!(!stepper.take_halt());

    // the next move ramps up from rest
    shared.motion.start_move(100, 50, 0);
    shared.motor_tick(Axis::Left, &mut stepper);
    assert_eq!(shared.motion.speed_index(Axis::Left), 1);
}

#[test]
fn tick_counts_are_per_axis_and_reset_when_taken() {
    let shared = Shared::new();
    let mut stepper = SimStepper::new();
    shared.motion.start_move(100, 10, 0);
    for _ in 0..3 {
        shared.motor_tick(Axis::Left, &mut stepper);
    }
    shared.motor_tick(Axis::Right, &mut stepper);
    assert_eq!(shared.motion.take_tick_counts(), (3, 1));
    assert_eq!(shared.motion.tick_counts(), (0, 0));
}
