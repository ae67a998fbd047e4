// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic tick timers via direct PAC register access.
//!
//! TIM2/TIM3 drive the left/right steppers, TIM4 the IR scan and TIM5 the battery/button monitor.
//! All four count at 1 MHz from the 16 MHz APB1 timer clock and raise an update interrupt each
//! period. Writing ARR takes effect at the next update, so a motor tick programs the period of
//! the tick after it.

use stm32f7xx_hal::pac;

/// Prescaler from the 16 MHz timer clock to 1 MHz.
const PRESCALER: u16 = 15;

pub struct TickTimer<TIM> {
    tim: TIM,
}

macro_rules! tick_timer {
    ($TIM:ident, $ctor:ident, $en:ident) => {
        impl TickTimer<pac::$TIM> {
            /// Configure the timer with a period in microseconds. It stays stopped until
            /// [`start`](Self::start).
            pub fn $ctor(tim: pac::$TIM, period_us: u16) -> Self {
                let rcc = unsafe { &*pac::RCC::ptr() };
                rcc.apb1enr.modify(|_, w| w.$en().set_bit());

                // Disable counter while configuring
                tim.cr1.modify(|_, w| w.cen().clear_bit());

                tim.psc.write(|w| unsafe { w.bits(u32::from(PRESCALER)) });
                tim.arr.write(|w| unsafe { w.bits(u32::from(period_us)) });

                // Load PSC now without raising an interrupt for it
                tim.cr1.modify(|_, w| w.urs().set_bit());
                tim.egr.write(|w| w.ug().set_bit());
                tim.sr.modify(|_, w| w.uif().clear_bit());

                tim.dier.modify(|_, w| w.uie().set_bit());

                Self { tim }
            }

            /// Restart counting from zero with a new period.
            pub fn start(&mut self, period_us: u16) {
                self.tim.cnt.write(|w| unsafe { w.bits(0) });
                self.tim.arr.write(|w| unsafe { w.bits(u32::from(period_us)) });
                self.tim.cr1.modify(|_, w| w.cen().set_bit());
            }

            #[inline]
            pub fn stop(&mut self) {
                self.tim.cr1.modify(|_, w| w.cen().clear_bit());
            }

            #[inline]
            pub fn is_running(&self) -> bool {
                self.tim.cr1.read().cen().bit_is_set()
            }

            /// Period of the next cycle.
            #[inline]
            pub fn set_period(&mut self, period_us: u16) {
                self.tim.arr.write(|w| unsafe { w.bits(u32::from(period_us)) });
            }

            /// Acknowledge the update interrupt.
            #[inline]
            pub fn clear_interrupt(&mut self) {
                self.tim.sr.modify(|_, w| w.uif().clear_bit());
            }
        }
    };
}

tick_timer!(TIM2, tim2, tim2en);
tick_timer!(TIM3, tim3, tim3en);
tick_timer!(TIM4, tim4, tim4en);
tick_timer!(TIM5, tim5, tim5en);
