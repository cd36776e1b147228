// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle state machine.
//!
//! ```text
//!                open()                 opened(gen)
//! Disconnected ─────────► Connecting ─────────────► Connected
//!      ▲                    ▲                           │ closed(gen, code)
//!      │ clean close        │ retry timer               ▼
//!      └────────────────────┼─────────────────── code == 1000 ?
//!                           │                           │ no
//!                      Reconnecting ◄── attempt < max ──┤
//!                                                       │ attempt == max
//!                                                       ▼
//!                                                   Exhausted
//! ```
//!
//! The machine performs no I/O. Each transition returns the [`Action`]s the
//! driver must carry out, and every connection is tagged with a generation
//! so that events from a superseded transport are recognized and ignored.

use std::fmt;

use tether_core::{close_code, Backoff, ConnectionBackoff, Timers};

/// Reconnect attempts allowed after an abnormal closure.
pub const MAX_RETRIES: u32 = 5;

/// Lifecycle state of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Retries used up. Only an explicit `open` leaves this state.
    Exhausted,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Exhausted => "exhausted",
        };
        write!(f, "{s}")
    }
}

/// Retry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub next_delay_ms: u64,
    pub exhausted: bool,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open a new transport; report its events tagged with `generation`.
    Connect { generation: u64 },
    /// Close the live transport with `code`.
    Disconnect { code: u16 },
}

/// Point-in-time view of the connection for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub attempt: u32,
    /// Time until the next reconnect, while `Reconnecting`.
    pub retry_in_ms: Option<u64>,
    /// Close code of the most recent closure.
    pub last_close: Option<u16>,
}

impl ConnectionStatus {
    /// Status of a manager that has not been opened.
    pub fn disconnected() -> Self {
        ConnectionStatus {
            state: ConnectionState::Disconnected,
            attempt: 0,
            retry_in_ms: None,
            last_close: None,
        }
    }

    /// One-line human readable description.
    pub fn summary(&self) -> String {
        match self.state {
            ConnectionState::Connected => "Online".to_string(),
            ConnectionState::Connecting if self.attempt > 0 => {
                format!("Connecting (attempt {})...", self.attempt)
            }
            ConnectionState::Connecting => "Connecting...".to_string(),
            ConnectionState::Reconnecting => {
                let secs = self.retry_in_ms.unwrap_or(0).div_ceil(1000);
                format!("Disconnected. Retrying in {secs}s...")
            }
            ConnectionState::Exhausted => "Connection lost. Please reconnect.".to_string(),
            ConnectionState::Disconnected => "Disconnected".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Reconnect,
}

/// The connection lifecycle for one session.
#[derive(Debug, Clone)]
pub struct ConnectionMachine<B: Backoff = ConnectionBackoff> {
    state: ConnectionState,
    attempt: u32,
    max_retries: u32,
    backoff: B,
    generation: u64,
    timers: Timers<Timer>,
    last_close: Option<u16>,
}

impl Default for ConnectionMachine<ConnectionBackoff> {
    fn default() -> Self {
        Self::new(MAX_RETRIES, ConnectionBackoff::default())
    }
}

impl<B: Backoff> ConnectionMachine<B> {
    pub fn new(max_retries: u32, backoff: B) -> Self {
        ConnectionMachine {
            state: ConnectionState::Disconnected,
            attempt: 0,
            max_retries,
            backoff,
            generation: 0,
            timers: Timers::new(),
            last_close: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Identity of the newest transport.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the machine next needs a [`tick`](Self::tick).
    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn retry_state(&self) -> RetryState {
        RetryState {
            attempt: self.attempt,
            next_delay_ms: self.backoff.delay_ms(self.attempt),
            exhausted: self.state == ConnectionState::Exhausted,
        }
    }

    pub fn status(&self, now_ms: u64) -> ConnectionStatus {
        let retry_in_ms = match self.state {
            ConnectionState::Reconnecting => self
                .timers
                .due_at(Timer::Reconnect)
                .map(|due| due.saturating_sub(now_ms)),
            _ => None,
        };
        ConnectionStatus {
            state: self.state,
            attempt: self.attempt,
            retry_in_ms,
            last_close: self.last_close,
        }
    }

    /// Returns `true` if events tagged `generation` belong to the live transport.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
            && matches!(
                self.state,
                ConnectionState::Connecting | ConnectionState::Connected
            )
    }

    /// Explicit request to establish the channel.
    ///
    /// A no-op while already connecting or connected. From any other state
    /// this is a fresh attempt: retries reset and any pending reconnect is
    /// dropped.
    pub fn open(&mut self) -> Option<Action> {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            return None;
        }
        self.timers.disarm(Timer::Reconnect);
        self.attempt = 0;
        Some(self.begin_connect())
    }

    /// The transport for `generation` finished its handshake.
    ///
    /// Returns `false` (and changes nothing) for a stale generation.
    pub fn opened(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != ConnectionState::Connecting {
            return false;
        }
        self.state = ConnectionState::Connected;
        self.attempt = 0;
        self.last_close = None;
        true
    }

    /// The transport for `generation` closed with `code`, or failed to connect.
    ///
    /// Returns `false` (and changes nothing) for a stale generation.
    pub fn closed(&mut self, generation: u64, code: u16, now_ms: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.after_closure(code, now_ms);
        true
    }

    /// Local request to close the channel with `code`.
    ///
    /// A clean code (1000) ends the session without reconnecting. Any other
    /// code is treated like an abnormal closure and follows the retry policy.
    pub fn close(&mut self, code: u16, now_ms: u64) -> Vec<Action> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                // Whatever the old transport reports from here on is stale.
                self.generation += 1;
                self.after_closure(code, now_ms);
                vec![Action::Disconnect { code }]
            }
            ConnectionState::Reconnecting | ConnectionState::Exhausted
                if close_code::is_clean(code) =>
            {
                self.timers.disarm(Timer::Reconnect);
                self.state = ConnectionState::Disconnected;
                self.last_close = Some(code);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Fires due timers. Returns a connect action when a reconnect is due.
    pub fn tick(&mut self, now_ms: u64) -> Option<Action> {
        let mut action = None;
        while let Some(Timer::Reconnect) = self.timers.pop_due(now_ms) {
            if self.state != ConnectionState::Reconnecting {
                continue;
            }
            self.attempt += 1;
            action = Some(self.begin_connect());
        }
        action
    }

    fn begin_connect(&mut self) -> Action {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        Action::Connect {
            generation: self.generation,
        }
    }

    fn after_closure(&mut self, code: u16, now_ms: u64) {
        self.last_close = Some(code);
        if close_code::is_clean(code) {
            self.timers.disarm(Timer::Reconnect);
            self.state = ConnectionState::Disconnected;
        } else if self.attempt < self.max_retries {
            let delay = self.backoff.delay_ms(self.attempt);
            self.timers
                .arm(Timer::Reconnect, now_ms.saturating_add(delay));
            self.state = ConnectionState::Reconnecting;
        } else {
            self.timers.disarm(Timer::Reconnect);
            self.state = ConnectionState::Exhausted;
        }
    }
}
