// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod engine;
pub mod messages;
pub mod parser;

pub use engine::{Engine, LinkState};
pub use messages::{Command, Event};
pub use parser::{Decoder, UnlockMatcher};
