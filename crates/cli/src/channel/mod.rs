// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnecting chat channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ChatSession │────►│ ConnectionHandle │────►│  Transport  │────►│   Service   │
//! │ (transcript)│◄────│ (manager task)   │◄────│   (trait)   │◄────│  /chat/ws   │
//! └─────────────┘     └──────────────────┘     └─────────────┘     └─────────────┘
//!                              │
//!                              ▼
//!                     ┌──────────────────┐
//!                     │ConnectionMachine │  (pure lifecycle + backoff)
//!                     └──────────────────┘
//! ```
//!
//! # Features
//!
//! - Endpoint derived from the service address, `wss` for `https`
//! - Automatic reconnect with capped exponential backoff
//! - Clean (1000) closures never reconnect
//! - Malformed inbound frames dropped without affecting the connection
//! - Injectable transport trait for testing

mod machine;
mod manager;
mod session;
mod transport;

pub use machine::{
    Action, ConnectionMachine, ConnectionState, ConnectionStatus, RetryState, MAX_RETRIES,
};
pub use manager::{ChannelConfig, ChannelError, ConnectionHandle, ConnectionManager};
pub use session::{ChatSession, MessageSink};
pub use transport::{
    Channel, Frame, Outgoing, Transport, TransportError, TransportResult, WebSocketTransport,
};




#[cfg(test)]
pub(crate) mod transport_tests;
