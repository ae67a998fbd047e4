// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STM32 implementations of the hardware capability traits.
//!
//! Peripherals used from interrupt handlers live in `Mutex<RefCell<Option<_>>>` statics and are
//! installed once by [`install`]. The step timers are reached from the main loop too (to arm and
//! disarm them), always inside a critical section.

use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::NVIC;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use stm32f7xx_hal::{
    gpio::{gpiob, gpiod, gpioe, Output, PushPull},
    pac::{self, Interrupt, TIM2, TIM3, TIM4, TIM5, USART1},
};

use crate::config::{
    MONITOR_PERIOD_US, MONITOR_PRIORITY, MOTOR_PRIORITY, MOTOR_START_PERIOD, SCAN_PERIOD_US,
    SCAN_PRIORITY,
};
use crate::hw::adc::Adc;
use crate::hw::pins::{ButtonPins, IrPins, LedPins};
use crate::hw::timers::TickTimer;
use crate::hw::usart::Usart;
use crate::hw::{
    AdcChannel, AdcRead, ActiveLevel, Axis, Button, Buttons, EmitterBank, Heading, HostLink,
    IrFrontEnd, Led, LedId, Leds, MotorDriver, ResetCause, Stepper,
};

/// Core clock cycles per microsecond at the default 16 MHz HSI.
const CYCLES_PER_US: u32 = 16;
/// Step pulse width.
const STEP_PULSE_US: u32 = 2;
/// Emitter rise time before the lit sample.
const EMITTER_SETTLE_US: u32 = 60;

pub static STEPPERS: Mutex<RefCell<Option<StepHardware>>> = Mutex::new(RefCell::new(None));
pub static SENSORS: Mutex<RefCell<Option<SensorIo>>> = Mutex::new(RefCell::new(None));
pub static SCAN_TIMER: Mutex<RefCell<Option<TickTimer<TIM4>>>> = Mutex::new(RefCell::new(None));
pub static MONITOR_TIMER: Mutex<RefCell<Option<TickTimer<TIM5>>>> =
    Mutex::new(RefCell::new(None));

/// Classify and clear the RCC reset flags.
pub fn reset_cause(rcc: &pac::rcc::RegisterBlock) -> ResetCause {
    let csr = rcc.csr.read();
    let cause = if csr.borrstf().bit_is_set() && csr.porrstf().bit_is_set() {
        ResetCause::PowerOn
    } else if csr.borrstf().bit_is_set() {
        ResetCause::BrownOut
    } else if csr.iwdgrstf().bit_is_set() || csr.wwdgrstf().bit_is_set() {
        ResetCause::Watchdog
    } else if csr.sftrstf().bit_is_set() {
        ResetCause::Software
    } else if csr.lpwrrstf().bit_is_set() {
        ResetCause::Exception
    } else if csr.pinrstf().bit_is_set() {
        ResetCause::External
    } else {
        ResetCause::Unknown
    };
    rcc.csr.modify(|_, w| w.rmvf().set_bit());
    cause
}

/// Step timers and clock lines, shared by both motor interrupts and the main loop.
pub struct StepHardware {
    left: TickTimer<TIM2>,
    right: TickTimer<TIM3>,
    step_left: gpioe::PE9<Output<PushPull>>,
    step_right: gpioe::PE11<Output<PushPull>>,
}

impl StepHardware {
    pub fn new(
        left: TickTimer<TIM2>,
        right: TickTimer<TIM3>,
        mut step_left: gpioe::PE9<Output<PushPull>>,
        mut step_right: gpioe::PE11<Output<PushPull>>,
    ) -> Self {
        drive(&mut step_left, false);
        drive(&mut step_right, false);
        Self {
            left,
            right,
            step_left,
            step_right,
        }
    }

    pub fn clear_interrupt(&mut self, axis: Axis) {
        match axis {
            Axis::Left => self.left.clear_interrupt(),
            Axis::Right => self.right.clear_interrupt(),
        }
    }

    fn start(&mut self) {
        if !self.left.is_running() {
            self.left.start(MOTOR_START_PERIOD);
        }
        if !self.right.is_running() {
            self.right.start(MOTOR_START_PERIOD);
        }
    }
}

impl Stepper for StepHardware {
    fn set_period(&mut self, axis: Axis, period: u16) {
        match axis {
            Axis::Left => self.left.set_period(period),
            Axis::Right => self.right.set_period(period),
        }
    }

    fn pulse(&mut self, axis: Axis) {
        match axis {
            Axis::Left => pulse(&mut self.step_left),
            Axis::Right => pulse(&mut self.step_right),
        }
    }

    fn halt_all(&mut self) {
        self.left.stop();
        self.right.stop();
    }
}

fn pulse<P: OutputPin>(pin: &mut P) {
    let _ = pin.set_high();
    cortex_m::asm::delay(STEP_PULSE_US * CYCLES_PER_US);
    let _ = pin.set_low();
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    let _ = if high { pin.set_high() } else { pin.set_low() };
}

/// ADC, emitter banks and buttons, shared by the scan and monitor interrupts.
pub struct SensorIo {
    adc: Adc,
    emit_front: gpiob::PB12<Output<PushPull>>,
    emit_side: gpiob::PB13<Output<PushPull>>,
    emit_diagonal: gpiob::PB14<Output<PushPull>>,
    buttons: ButtonPins,
}

impl SensorIo {
    pub fn new(adc: Adc, ir: IrPins, buttons: ButtonPins) -> Self {
        // The analogue pins only need to stay in analogue mode.
        let IrPins {
            emit_front,
            emit_side,
            emit_diagonal,
            ..
        } = ir;
        Self {
            adc,
            emit_front,
            emit_side,
            emit_diagonal,
            buttons,
        }
    }
}

impl AdcRead for SensorIo {
    fn read_channel(&mut self, ch: AdcChannel) -> u16 {
        self.adc.read_channel(ch)
    }
}

impl IrFrontEnd for SensorIo {
    fn set_emitter(&mut self, bank: EmitterBank, on: bool) {
        match bank {
            EmitterBank::Front => drive(&mut self.emit_front, on),
            EmitterBank::Side => drive(&mut self.emit_side, on),
            EmitterBank::Diagonal => drive(&mut self.emit_diagonal, on),
        }
    }

    fn settle(&mut self) {
        cortex_m::asm::delay(EMITTER_SETTLE_US * CYCLES_PER_US);
    }
}

impl Buttons for SensorIo {
    fn pressed(&mut self, button: Button) -> bool {
        // Active low
        let level = match button {
            Button::A => InputPin::is_low(&self.buttons.a),
            Button::B => InputPin::is_low(&self.buttons.b),
        };
        level.unwrap_or(false)
    }
}

/// The nine host-addressable LEDs.
pub struct LedBank {
    led1: Led<gpiod::PD8<Output<PushPull>>>,
    led2: Led<gpiod::PD9<Output<PushPull>>>,
    led3: Led<gpiod::PD10<Output<PushPull>>>,
    led4: Led<gpiod::PD11<Output<PushPull>>>,
    led5: Led<gpiod::PD12<Output<PushPull>>>,
    led6: Led<gpiod::PD13<Output<PushPull>>>,
    left: Led<gpiod::PD14<Output<PushPull>>>,
    right: Led<gpiod::PD15<Output<PushPull>>>,
    front: Led<gpioe::PE0<Output<PushPull>>>,
}

impl LedBank {
    pub fn new(pins: LedPins) -> Self {
        Self {
            led1: Led::new(pins.led1, ActiveLevel::High),
            led2: Led::new(pins.led2, ActiveLevel::High),
            led3: Led::new(pins.led3, ActiveLevel::High),
            led4: Led::new(pins.led4, ActiveLevel::High),
            led5: Led::new(pins.led5, ActiveLevel::High),
            led6: Led::new(pins.led6, ActiveLevel::High),
            left: Led::new(pins.left, ActiveLevel::High),
            right: Led::new(pins.right, ActiveLevel::High),
            front: Led::new(pins.front, ActiveLevel::High),
        }
    }
}

impl Leds for LedBank {
    fn set_led(&mut self, led: LedId, on: bool) {
        match led.number() {
            1 => self.led1.set(on),
            2 => self.led2.set(on),
            3 => self.led3.set(on),
            4 => self.led4.set(on),
            5 => self.led5.set(on),
            6 => self.led6.set(on),
            7 => self.left.set(on),
            8 => self.right.set(on),
            _ => self.front.set(on),
        }
    }
}

/// Everything the main loop drives: host link, LEDs and the motor driver control lines.
pub struct MainIo {
    link: Usart<USART1>,
    leds: LedBank,
    dir_left: gpioe::PE10<Output<PushPull>>,
    dir_right: gpioe::PE12<Output<PushPull>>,
    enable: gpioe::PE13<Output<PushPull>>,
}

impl MainIo {
    /// Takes the direction and enable lines; the step lines go to [`StepHardware`].
    pub fn new(
        link: Usart<USART1>,
        leds: LedPins,
        dir_left: gpioe::PE10<Output<PushPull>>,
        dir_right: gpioe::PE12<Output<PushPull>>,
        mut enable: gpioe::PE13<Output<PushPull>>,
    ) -> Self {
        drive(&mut enable, false);
        Self {
            link,
            leds: LedBank::new(leds),
            dir_left,
            dir_right,
            enable,
        }
    }
}

impl HostLink for MainIo {
    fn try_read(&mut self) -> nb::Result<u8, core::convert::Infallible> {
        self.link.try_read()
    }

    fn write(&mut self, byte: u8) {
        self.link.write_byte(byte);
    }
}

impl Leds for MainIo {
    fn set_led(&mut self, led: LedId, on: bool) {
        self.leds.set_led(led, on);
    }
}

impl MotorDriver for MainIo {
    fn set_enabled(&mut self, enabled: bool) {
        drive(&mut self.enable, enabled);
    }

    fn set_heading(&mut self, heading: Heading) {
        let (left, right) = heading.direction_levels();
        drive(&mut self.dir_left, left);
        drive(&mut self.dir_right, right);
    }

    fn start_stepping(&mut self) {
        interrupt::free(|cs| {
            if let Some(steppers) = STEPPERS.borrow(cs).borrow_mut().as_mut() {
                steppers.start();
            }
        });
    }

    fn stop_stepping(&mut self) {
        interrupt::free(|cs| {
            if let Some(steppers) = STEPPERS.borrow(cs).borrow_mut().as_mut() {
                steppers.halt_all();
            }
        });
    }
}

/// NVIC priority byte for a logical priority (higher preempts lower, 4 implemented bits).
fn nvic_priority(level: u8) -> u8 {
    (15 - level.min(15)) << 4
}

/// Hand the interrupt-side peripherals to their statics, start the periodic ticks and unmask the
/// timer interrupts.
pub fn install(
    nvic: &mut NVIC,
    steppers: StepHardware,
    sensors: SensorIo,
    scan: TIM4,
    monitor: TIM5,
) {
    let mut scan = TickTimer::tim4(scan, SCAN_PERIOD_US as u16);
    let mut monitor = TickTimer::tim5(monitor, MONITOR_PERIOD_US as u16);
    scan.start(SCAN_PERIOD_US as u16);
    monitor.start(MONITOR_PERIOD_US as u16);

    interrupt::free(|cs| {
        STEPPERS.borrow(cs).replace(Some(steppers));
        SENSORS.borrow(cs).replace(Some(sensors));
        SCAN_TIMER.borrow(cs).replace(Some(scan));
        MONITOR_TIMER.borrow(cs).replace(Some(monitor));
    });

    unsafe {
        nvic.set_priority(Interrupt::TIM2, nvic_priority(MOTOR_PRIORITY));
        nvic.set_priority(Interrupt::TIM3, nvic_priority(MOTOR_PRIORITY));
        nvic.set_priority(Interrupt::TIM4, nvic_priority(SCAN_PRIORITY));
        nvic.set_priority(Interrupt::TIM5, nvic_priority(MONITOR_PRIORITY));
        NVIC::unmask(Interrupt::TIM2);
        NVIC::unmask(Interrupt::TIM3);
        NVIC::unmask(Interrupt::TIM4);
        NVIC::unmask(Interrupt::TIM5);
    }
    info!("timers running");
}
