// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request lifecycle state machine.
//!
//! Drives one logical request (which may spawn automatic retries) to a
//! terminal outcome. Each exchange sent on the wire gets a fresh
//! [`AttemptId`]; results for any other id are stale and ignored.
//!
//! ```text
//!          submit              7s                20s
//! Idle ──────────► Submitting ────► Slow ──────────────► TimingOut
//!                   │   ▲  │
//!          transient│   │  │ 2xx / terminal error
//!                   ▼   │  ▼
//!              retry timer  Succeeded | Failed
//! ```
//!
//! Once retries are used up, the next fresh submission opens a cooldown
//! window instead of sending anything.

use std::fmt;

use tether_core::{Backoff, RequestBackoff, Timers};
use tracing::debug;

use super::api::Reply;
use super::diagnostics::{Diagnostics, DiagnosticsRecorder, HttpStatus};
use super::error::RequestError;

/// Automatic retries after a transient failure.
pub const MAX_RETRIES: u32 = 3;

/// Timing and retry limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub max_retries: u32,
    /// Delay before the request is reported as slow.
    pub slow_after_ms: u64,
    /// Delay before the request is cancelled.
    pub timeout_ms: u64,
    /// Length of the cooldown window after retries are exhausted.
    pub cooldown_secs: u32,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        RequestPolicy {
            max_retries: MAX_RETRIES,
            slow_after_ms: 7_000,
            timeout_ms: 20_000,
            cooldown_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Idle,
    Submitting,
    Slow,
    TimingOut,
    Succeeded,
    Failed,
    Offline,
}

impl RequestStatus {
    /// Whether a request is being worked on, including a pending retry.
    pub fn is_busy(self) -> bool {
        matches!(self, RequestStatus::Submitting | RequestStatus::Slow)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Submitting => "submitting",
            RequestStatus::Slow => "slow",
            RequestStatus::TimingOut => "timing_out",
            RequestStatus::Succeeded => "succeeded",
            RequestStatus::Failed => "failed",
            RequestStatus::Offline => "offline",
        };
        write!(f, "{s}")
    }
}

/// Identity of one exchange on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start an exchange; report its result with this id.
    Dispatch { id: AttemptId },
    /// Cancel the exchange with this id. Its result must not be reported.
    Abort { id: AttemptId },
    /// The logical request reached its outcome.
    Finished(Result<Reply, RequestError>),
}

/// Point-in-time view of the controller for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub status: RequestStatus,
    pub attempt: u32,
    /// User-facing message for the current status.
    pub message: Option<String>,
    /// Seconds left in the cooldown window.
    pub cooldown_secs: Option<u32>,
    pub diagnostics: Option<Diagnostics>,
}

impl RequestSnapshot {
    pub fn idle() -> Self {
        RequestSnapshot {
            status: RequestStatus::Idle,
            attempt: 0,
            message: None,
            cooldown_secs: None,
            diagnostics: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Slow,
    Timeout,
    Retry,
    CooldownTick,
}

/// The request lifecycle for one controller.
#[derive(Debug, Clone)]
pub struct RequestMachine<B: Backoff = RequestBackoff> {
    policy: RequestPolicy,
    backoff: B,
    status: RequestStatus,
    attempt: u32,
    next_id: u64,
    in_flight: Option<AttemptId>,
    online: bool,
    cooldown: u32,
    message: Option<String>,
    diagnostics: DiagnosticsRecorder,
    timers: Timers<Timer>,
}

impl Default for RequestMachine<RequestBackoff> {
    fn default() -> Self {
        Self::new(RequestPolicy::default(), RequestBackoff::default())
    }
}

impl<B: Backoff> RequestMachine<B> {
    pub fn new(policy: RequestPolicy, backoff: B) -> Self {
        RequestMachine {
            policy,
            backoff,
            status: RequestStatus::Idle,
            attempt: 0,
            next_id: 0,
            in_flight: None,
            online: true,
            cooldown: 0,
            message: None,
            diagnostics: DiagnosticsRecorder::new(),
            timers: Timers::new(),
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The exchange currently on the wire.
    pub fn in_flight(&self) -> Option<AttemptId> {
        self.in_flight
    }

    /// Whether an automatic retry is scheduled.
    pub fn retry_pending(&self) -> bool {
        self.timers.is_armed(Timer::Retry)
    }

    /// When the machine next needs a [`tick`](Self::tick).
    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.last()
    }

    pub fn snapshot(&self) -> RequestSnapshot {
        RequestSnapshot {
            status: self.status,
            attempt: self.attempt,
            message: self.message.clone(),
            cooldown_secs: (self.cooldown > 0).then_some(self.cooldown),
            diagnostics: self.diagnostics.last().cloned(),
        }
    }

    /// A fresh, user-initiated submission.
    ///
    /// Rejected while offline or cooling down. If retries were used up by
    /// the previous request, and nothing is still running, this opens the
    /// cooldown window and is rejected.
    /// Otherwise any running request is cancelled and a new one starts with
    /// the retry counter at zero.
    pub fn submit(&mut self, now_ms: u64) -> Result<Vec<Action>, RequestError> {
        if !self.online {
            self.status = RequestStatus::Offline;
            self.message = Some(RequestError::Offline.to_string());
            return Err(RequestError::Offline);
        }
        if self.cooldown > 0 {
            return Err(RequestError::CoolingDown {
                remaining_secs: self.cooldown,
            });
        }
        let idle = self.in_flight.is_none() && !self.retry_pending();
        if idle && self.attempt >= self.policy.max_retries {
            return Err(self.enter_cooldown(now_ms));
        }

        let mut actions = self.abandon();
        self.attempt = 0;
        actions.extend(self.begin_attempt(now_ms));
        Ok(actions)
    }

    /// Result of the exchange `id`.
    pub fn settle(
        &mut self,
        id: AttemptId,
        result: Result<Reply, RequestError>,
        now_ms: u64,
    ) -> Vec<Action> {
        if self.in_flight != Some(id) {
            debug!(%id, "stale settlement ignored");
            return Vec::new();
        }
        self.in_flight = None;
        self.timers.disarm(Timer::Slow);
        self.timers.disarm(Timer::Timeout);

        let error = match &result {
            Ok(reply) => {
                self.diagnostics.finish(
                    now_ms,
                    HttpStatus::Code(reply.status),
                    reply.correlation_id.clone(),
                );
                RequestError::from_status(reply.status)
            }
            Err(e) => {
                self.diagnostics.finish(now_ms, HttpStatus::NetworkError, None);
                Some(e.clone())
            }
        };

        let Some(error) = error else {
            self.status = RequestStatus::Succeeded;
            self.attempt = 0;
            self.message = None;
            return vec![Action::Finished(result)];
        };

        if error.is_transient() && self.attempt < self.policy.max_retries {
            let delay = self.backoff.delay_ms(self.attempt);
            debug!(%id, attempt = self.attempt, delay_ms = delay, "transient failure, retrying");
            self.timers
                .arm(Timer::Retry, now_ms.saturating_add(delay));
            self.status = RequestStatus::Submitting;
            return Vec::new();
        }

        self.status = RequestStatus::Failed;
        self.message = Some(error.to_string());
        vec![Action::Finished(Err(error))]
    }

    /// Fires due timers.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Some(timer) = self.timers.pop_due(now_ms) {
            match timer {
                Timer::Slow => {
                    if self.in_flight.is_some() && self.status == RequestStatus::Submitting {
                        self.status = RequestStatus::Slow;
                    }
                }
                Timer::Timeout => {
                    if let Some(id) = self.in_flight.take() {
                        self.timers.disarm(Timer::Slow);
                        self.diagnostics.finish(now_ms, HttpStatus::Timeout, None);
                        self.status = RequestStatus::TimingOut;
                        self.message = Some(RequestError::Timeout.to_string());
                        actions.push(Action::Abort { id });
                        actions.push(Action::Finished(Err(RequestError::Timeout)));
                    }
                }
                Timer::Retry if !self.online => {
                    debug!(attempt = self.attempt, "offline, retry dropped");
                    self.status = RequestStatus::Offline;
                    self.message = Some(RequestError::Offline.to_string());
                    actions.push(Action::Finished(Err(RequestError::Offline)));
                }
                Timer::Retry => {
                    self.attempt += 1;
                    actions.extend(self.begin_attempt(now_ms));
                }
                Timer::CooldownTick => {
                    self.cooldown = self.cooldown.saturating_sub(1);
                    if self.cooldown == 0 {
                        self.timers.disarm(Timer::CooldownTick);
                        self.attempt = 0;
                        self.message = None;
                        self.status = if self.online {
                            RequestStatus::Idle
                        } else {
                            RequestStatus::Offline
                        };
                    }
                }
            }
        }
        actions
    }

    /// Cancels the running request, if any, without reporting an error.
    pub fn cancel(&mut self) -> Vec<Action> {
        let busy = self.in_flight.is_some() || self.retry_pending();
        let mut actions = self.abandon();
        if busy {
            actions.push(Action::Finished(Err(RequestError::Aborted)));
            self.status = RequestStatus::Idle;
            self.message = None;
        }
        actions
    }

    /// Network availability changed.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
        match (online, self.status) {
            (false, RequestStatus::Idle) => {
                self.status = RequestStatus::Offline;
                self.message = Some(RequestError::Offline.to_string());
            }
            (true, RequestStatus::Offline) => {
                self.status = RequestStatus::Idle;
                self.message = None;
            }
            _ => {}
        }
    }

    /// Drops the running exchange and any pending retry.
    fn abandon(&mut self) -> Vec<Action> {
        self.timers.disarm(Timer::Slow);
        self.timers.disarm(Timer::Timeout);
        self.timers.disarm(Timer::Retry);
        match self.in_flight.take() {
            Some(id) => vec![Action::Abort { id }],
            None => Vec::new(),
        }
    }

    fn begin_attempt(&mut self, now_ms: u64) -> Vec<Action> {
        let mut actions = self.abandon();
        self.next_id += 1;
        let id = AttemptId(self.next_id);
        self.in_flight = Some(id);
        self.status = RequestStatus::Submitting;
        self.message = None;
        self.diagnostics.begin(now_ms);
        self.timers
            .arm(Timer::Slow, now_ms.saturating_add(self.policy.slow_after_ms));
        self.timers
            .arm(Timer::Timeout, now_ms.saturating_add(self.policy.timeout_ms));
        actions.push(Action::Dispatch { id });
        actions
    }

    fn enter_cooldown(&mut self, now_ms: u64) -> RequestError {
        self.cooldown = self.policy.cooldown_secs.max(1);
        self.timers
            .arm_periodic(Timer::CooldownTick, now_ms.saturating_add(1_000), 1_000);
        self.status = RequestStatus::Failed;
        let error = RequestError::CoolingDown {
            remaining_secs: self.cooldown,
        };
        self.message = Some(error.to_string());
        error
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
