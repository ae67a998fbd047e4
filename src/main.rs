// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Firmware entry point: board bring-up, the four timer interrupts and the main loop.

#![no_main]
#![no_std]

use cortex_m_rt::entry;

#[cfg(not(feature = "board-log"))]
use panic_halt as _;
#[cfg(feature = "board-log")]
use {defmt_rtt as _, panic_probe as _};

use cortex_m::interrupt::free;
use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use maze_io::config::HOST_BAUD;
use maze_io::hw::adc::Adc;
use maze_io::hw::board::{
    self, MainIo, SensorIo, StepHardware, MONITOR_TIMER, SCAN_TIMER, SENSORS, STEPPERS,
};
use maze_io::hw::pins::BoardPins;
use maze_io::hw::timers::TickTimer;
use maze_io::hw::usart::Usart;
use maze_io::hw::Axis;
use maze_io::protocol::Engine;
use maze_io::Shared;

static SHARED: Shared = Shared::new();

#[entry]
fn main() -> ! {
    // Peripherals
    let Some(dp) = pac::Peripherals::take() else {
        panic!("device peripherals taken twice");
    };
    let Some(mut cp) = cortex_m::Peripherals::take() else {
        panic!("core peripherals taken twice");
    };

    let reset_cause = board::reset_cause(&dp.RCC);

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);

    // USART1 (host link)
    let usart_cfg = Config {
        baud_rate: HOST_BAUD.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_cfg,
    );

    let motors = pins.motors;
    let mut io = MainIo::new(
        Usart::new(serial),
        pins.leds,
        motors.dir_left,
        motors.dir_right,
        motors.enable,
    );

    let steppers = StepHardware::new(
        TickTimer::tim2(dp.TIM2, 0),
        TickTimer::tim3(dp.TIM3, 0),
        motors.step_left,
        motors.step_right,
    );
    let sensors = SensorIo::new(Adc::adc1(dp.ADC1), pins.ir, pins.buttons);

    let mut engine = Engine::new(reset_cause);
    engine.boot(&mut io);

    board::install(&mut cp.NVIC, steppers, sensors, dp.TIM4, dp.TIM5);

    loop {
        engine.poll(&SHARED, &mut io);
    }
}

fn motor_interrupt(axis: Axis) {
    free(|cs| {
        if let Some(steppers) = STEPPERS.borrow(cs).borrow_mut().as_mut() {
            steppers.clear_interrupt(axis);
            SHARED.motor_tick(axis, steppers);
        }
    });
}

#[interrupt]
fn TIM2() {
    motor_interrupt(Axis::Left);
}

#[interrupt]
fn TIM3() {
    motor_interrupt(Axis::Right);
}

#[interrupt]
fn TIM4() {
    free(|cs| {
        if let Some(timer) = SCAN_TIMER.borrow(cs).borrow_mut().as_mut() {
            timer.clear_interrupt();
        }
        if let Some(sensors) = SENSORS.borrow(cs).borrow_mut().as_mut() {
            SHARED.scan_tick(sensors);
        }
    });
}

#[interrupt]
fn TIM5() {
    free(|cs| {
        if let Some(timer) = MONITOR_TIMER.borrow(cs).borrow_mut().as_mut() {
            timer.clear_interrupt();
        }
        if let Some(sensors) = SENSORS.borrow(cs).borrow_mut().as_mut() {
            SHARED.monitor_tick(sensors);
        }
    });
}
