// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 I/O board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpioc, gpiod, gpioe, Alternate, Analog, Input, Output, PullUp, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub motors: MotorPins,
    pub ir: IrPins,
    pub buttons: ButtonPins,
}

/// LEDs 1..=9 in host numbering: 1–6 status bar, 7 left, 8 right, 9 front.
pub struct LedPins {
    pub led1: gpiod::PD8<Output<PushPull>>,
    pub led2: gpiod::PD9<Output<PushPull>>,
    pub led3: gpiod::PD10<Output<PushPull>>,
    pub led4: gpiod::PD11<Output<PushPull>>,
    pub led5: gpiod::PD12<Output<PushPull>>,
    pub led6: gpiod::PD13<Output<PushPull>>,
    pub left: gpiod::PD14<Output<PushPull>>,
    pub right: gpiod::PD15<Output<PushPull>>,
    pub front: gpioe::PE0<Output<PushPull>>,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Step/direction drivers, one shared enable line.
pub struct MotorPins {
    pub step_left: gpioe::PE9<Output<PushPull>>,
    pub step_right: gpioe::PE11<Output<PushPull>>,
    pub dir_left: gpioe::PE10<Output<PushPull>>,
    pub dir_right: gpioe::PE12<Output<PushPull>>,
    pub enable: gpioe::PE13<Output<PushPull>>,
}

/// IR receivers on ADC1_IN0..=IN4, battery divider on ADC1_IN5, and the emitter banks.
pub struct IrPins {
    pub r90: gpioa::PA0<Analog>,
    pub r45: gpioa::PA1<Analog>,
    pub front: gpioa::PA2<Analog>,
    pub l45: gpioa::PA3<Analog>,
    pub l90: gpioa::PA4<Analog>,
    pub battery: gpioa::PA5<Analog>,
    pub emit_front: gpiob::PB12<Output<PushPull>>,
    pub emit_side: gpiob::PB13<Output<PushPull>>,
    pub emit_diagonal: gpiob::PB14<Output<PushPull>>,
}

/// Grey (A) and blue (B) buttons, active low with pull-ups.
pub struct ButtonPins {
    pub a: gpioc::PC13<Input<PullUp>>,
    pub b: gpioc::PC14<Input<PullUp>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpioc: pac::GPIOC,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: LedPins {
                led1: gpiod.pd8.into_push_pull_output(),
                led2: gpiod.pd9.into_push_pull_output(),
                led3: gpiod.pd10.into_push_pull_output(),
                led4: gpiod.pd11.into_push_pull_output(),
                led5: gpiod.pd12.into_push_pull_output(),
                led6: gpiod.pd13.into_push_pull_output(),
                left: gpiod.pd14.into_push_pull_output(),
                right: gpiod.pd15.into_push_pull_output(),
                front: gpioe.pe0.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            motors: MotorPins {
                step_left: gpioe.pe9.into_push_pull_output(),
                step_right: gpioe.pe11.into_push_pull_output(),
                dir_left: gpioe.pe10.into_push_pull_output(),
                dir_right: gpioe.pe12.into_push_pull_output(),
                enable: gpioe.pe13.into_push_pull_output(),
            },

            ir: IrPins {
                r90: gpioa.pa0.into_analog(),
                r45: gpioa.pa1.into_analog(),
                front: gpioa.pa2.into_analog(),
                l45: gpioa.pa3.into_analog(),
                l90: gpioa.pa4.into_analog(),
                battery: gpioa.pa5.into_analog(),
                emit_front: gpiob.pb12.into_push_pull_output(),
                emit_side: gpiob.pb13.into_push_pull_output(),
                emit_diagonal: gpiob.pb14.into_push_pull_output(),
            },

            buttons: ButtonPins {
                a: gpioc.pc13.into_pull_up_input(),
                b: gpioc.pc14.into_pull_up_input(),
            },
        }
    }
}
