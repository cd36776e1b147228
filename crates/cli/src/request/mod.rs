// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request lifecycle control for authentication.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌───────────────────┐     ┌─────────────┐
//! │ RequestHandle │────►│ RequestController │────►│   AuthApi   │
//! │  (snapshots)  │◄────│   (tokio task)    │◄────│   (trait)   │
//! └───────────────┘     └───────────────────┘     └─────────────┘
//!                                │
//!                                ▼
//!                       ┌───────────────────┐
//!                       │  RequestMachine   │  (timers, retry, cooldown)
//!                       └───────────────────┘
//! ```
//!
//! # Features
//!
//! - Slow warning after 7s, hard timeout after 20s
//! - Automatic retry with jittered backoff for server and network errors
//! - Cooldown window once retries are exhausted
//! - At most one exchange in flight; a new submission cancels the old one
//! - Diagnostics for the most recent completed exchange

mod api;
mod controller;
mod diagnostics;
mod error;
mod machine;

pub use api::{ApiFuture, AuthApi, Credentials, HttpAuthApi, Reply};
pub use controller::{Outcome, RequestController, RequestHandle};
pub use diagnostics::{Diagnostics, DiagnosticsRecorder, HttpStatus};
pub use error::RequestError;
pub use machine::{
    Action, AttemptId, RequestMachine, RequestPolicy, RequestSnapshot, RequestStatus, MAX_RETRIES,
};
