// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![allow(dead_code)]

use maze_io::hw::sim::SimHost;
use maze_io::hw::ResetCause;
use maze_io::protocol::messages::UNLOCK_SEQUENCE;
use maze_io::protocol::{Engine, LinkState};
use maze_io::Shared;

/// Length of the event starting with `op`.
pub fn event_len(op: u8) -> usize {
    match op {
        0x10..=0x13 => 2,
        0x22..=0x25 => 3,
        0x26 => 5,
        0x61..=0x65 => 3,
        0xCE => 3,
        0xCF => 4,
        _ => 1,
    }
}

/// Split a device output stream into events.
pub fn events(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let len = event_len(bytes[i]).min(bytes.len() - i);
        out.push(bytes[i..i + len].to_vec());
        i += len;
    }
    out
}

/// Events with battery reports removed.
pub fn without_battery(bytes: &[u8]) -> Vec<Vec<u8>> {
    events(bytes)
        .into_iter()
        .filter(|e| !(0x10..=0x13).contains(&e[0]))
        .collect()
}

/// The protocol engine on its own, with no timers running.
pub struct Rig {
    pub shared: Shared,
    pub engine: Engine,
    pub host: SimHost,
}

impl Rig {
    pub fn locked() -> Self {
        Self {
            shared: Shared::new(),
            engine: Engine::new(ResetCause::PowerOn),
            host: SimHost::new(),
        }
    }

    pub fn unlocked() -> Self {
        let mut rig = Self::locked();
        rig.exchange(&UNLOCK_SEQUENCE);
        assert_eq!(rig.engine.link_state(), LinkState::Unlocked);
        rig
    }

    pub fn poll(&mut self) {
        self.engine.poll(&self.shared, &mut self.host);
    }

    /// Send `bytes`, poll until all are consumed and return what the device sent.
    pub fn exchange(&mut self, bytes: &[u8]) -> Vec<u8> {
        self.host.send(bytes);
        while self.host.pending_rx() > 0 {
            self.poll();
        }
        self.host.take_tx().to_vec()
    }
}
