// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: I/O-free building blocks for the tether client
//!
//! This crate provides the clock and timer abstraction, retry backoff
//! policies, wire formats and the chat data model shared by the
//! connection manager and the request lifecycle controller.

pub mod backoff;
pub mod chat;
pub mod clock;
pub mod error;
pub mod protocol;

pub use backoff::{Backoff, ConnectionBackoff, RequestBackoff};
pub use chat::{ChatMessage, Origin, Transcript};
pub use clock::{Clock, ManualClock, SystemClock, Timers};
pub use error::{Error, Result};
pub use protocol::{close_code, ClientMessage, ServerMessage};
