// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host serial link over a HAL USART.
//!
//! Reads never block: an empty receive register is `WouldBlock`. Framing and overrun errors drop
//! the byte; the host recovers with a poll or by unlocking again. Writes block per byte, which is
//! fine at the few bytes per event the protocol sends.

use core::convert::Infallible;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

use crate::hw::HostLink;

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }
}

impl<U: Instance> HostLink for Usart<U> {
    fn try_read(&mut self) -> nb::Result<u8, Infallible> {
        match self.rx.read() {
            Ok(b) => Ok(b),
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(_e)) => {
                warn!("host link receive error");
                Err(nb::Error::WouldBlock)
            }
        }
    }

    fn write(&mut self, byte: u8) {
        self.write_byte(byte);
    }
}
