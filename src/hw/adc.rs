// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 in 10-bit mode using direct PAC register access.
//!
//! The IR receivers and the battery divider sit on ADC1_IN0..=IN5 (PA0..=PA5), in the order of
//! [`AdcChannel`], so the channel number is the enum index.

use stm32f7xx_hal::pac;

use crate::hw::{AdcChannel, AdcRead};

pub struct Adc {
    adc: pac::ADC1,
}

impl Adc {
    /// Create and initialize ADC1.
    pub fn adc1(adc1: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        // ADC prescaler: PCLK2 / 4
        common.ccr.modify(|_, w| w.adcpre().div4());

        // Power off to configure
        adc1.cr2.modify(|_, w| w.adon().clear_bit());

        // 10-bit, right-aligned, software trigger
        adc1.cr1.modify(|_, w| w.res().bits(0b01));
        adc1.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });

        // Long sample time on every input; the IR receivers are high impedance.
        adc1.smpr2.modify(|_, w| {
            w.smp0().bits(0b111);
            w.smp1().bits(0b111);
            w.smp2().bits(0b111);
            w.smp3().bits(0b111);
            w.smp4().bits(0b111);
            w.smp5().bits(0b111);
            w
        });

        // Sequence length = 1 conversion
        adc1.sqr1.modify(|_, w| w.l().bits(0));

        // Power on
        adc1.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc: adc1 }
    }

    /// Blocking single conversion.
    pub fn read(&mut self, channel: u8) -> u16 {
        let adc = &self.adc;

        adc.sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });

        adc.cr2.modify(|_, w| w.swstart().set_bit());

        while adc.sr.read().eoc().bit_is_clear() {}

        adc.dr.read().data().bits() & 0x03FF
    }
}

impl AdcRead for Adc {
    fn read_channel(&mut self, ch: AdcChannel) -> u16 {
        self.read(ch as u8)
    }
}
