// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background request controller.
//!
//! Runs a [`RequestMachine`] inside a tokio task. Each dispatched exchange
//! is a spawned task calling [`AuthApi::login`]; aborting an attempt aborts
//! that task, and a result arriving for a superseded attempt is dropped by
//! the machine's identity check.

use std::sync::Arc;

use tether_core::{Clock, RequestBackoff};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::api::{AuthApi, Credentials, Reply};
use super::error::RequestError;
use super::machine::{Action, AttemptId, RequestMachine, RequestPolicy, RequestSnapshot};
use crate::clock::{deadline, sleep_until, MonotonicClock};

/// Resolves with the outcome of one submission.
pub type Outcome = oneshot::Receiver<Result<Reply, RequestError>>;

enum Command {
    Submit {
        credentials: Credentials,
        outcome: oneshot::Sender<Result<Reply, RequestError>>,
    },
    Cancel,
    SetOnline(bool),
}

struct Settled {
    id: AttemptId,
    result: Result<Reply, RequestError>,
}

/// Handle to a running request controller.
///
/// Dropping every handle stops the controller and aborts its exchange.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<RequestSnapshot>,
}

impl RequestHandle {
    /// Start a fresh request. Returns immediately.
    ///
    /// Any request still running is cancelled and its outcome resolves with
    /// [`RequestError::Aborted`].
    pub fn submit(&self, credentials: Credentials) -> Outcome {
        let (tx, rx) = oneshot::channel();
        let command = Command::Submit {
            credentials,
            outcome: tx,
        };
        if let Err(mpsc::error::SendError(Command::Submit { outcome, .. })) =
            self.commands.send(command)
        {
            let _ = outcome.send(Err(RequestError::Aborted));
        }
        rx
    }

    /// Cancel the running request without reporting an error.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }

    /// Report network availability.
    pub fn set_online(&self, online: bool) {
        let _ = self.commands.send(Command::SetOnline(online));
    }

    pub fn snapshot(&self) -> RequestSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<RequestSnapshot> {
        self.snapshot.clone()
    }
}

/// The controller task. Created through [`RequestController::spawn`].
pub struct RequestController<A: AuthApi, C: Clock = MonotonicClock> {
    api: Arc<A>,
    machine: RequestMachine,
    clock: C,
    credentials: Option<Credentials>,
    outcome: Option<oneshot::Sender<Result<Reply, RequestError>>>,
    exchange: Option<(AttemptId, AbortHandle)>,
    settled: mpsc::UnboundedSender<Settled>,
    snapshot: watch::Sender<RequestSnapshot>,
}

impl<A: AuthApi> RequestController<A> {
    /// Spawn a controller for login requests against `api`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(api: Arc<A>, policy: RequestPolicy, backoff: RequestBackoff) -> RequestHandle {
        Self::spawn_with_clock(api, policy, backoff, MonotonicClock::new())
    }
}

impl<A: AuthApi, C: Clock + 'static> RequestController<A, C> {
    /// Like [`spawn`](RequestController::spawn), timing the request with `clock`.
    pub fn spawn_with_clock(
        api: Arc<A>,
        policy: RequestPolicy,
        backoff: RequestBackoff,
        clock: C,
    ) -> RequestHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(RequestSnapshot::idle());

        let controller = RequestController {
            api,
            machine: RequestMachine::new(policy, backoff),
            clock,
            credentials: None,
            outcome: None,
            exchange: None,
            settled: settled_tx,
            snapshot: snapshot_tx,
        };
        tokio::spawn(controller.run(cmd_rx, settled_rx));

        RequestHandle {
            commands: cmd_tx,
            snapshot: snapshot_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut settled: mpsc::UnboundedReceiver<Settled>,
    ) {
        loop {
            let wake_at = self.machine.next_due().map(|due| deadline(&self.clock, due));

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(Settled { id, result }) = settled.recv() => {
                    if self.exchange.as_ref().is_some_and(|(current, _)| *current == id) {
                        self.exchange = None;
                    }
                    let actions = self.machine.settle(id, result, self.clock.now_ms());
                    self.perform(actions);
                }
                () = sleep_until(wake_at) => {
                    let actions = self.machine.tick(self.clock.now_ms());
                    self.perform(actions);
                }
            }

            self.publish();
        }

        if let Some((_, handle)) = self.exchange.take() {
            handle.abort();
        }
        debug!("request controller stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit {
                credentials,
                outcome,
            } => match self.machine.submit(self.clock.now_ms()) {
                Ok(actions) => {
                    if let Some(previous) = self.outcome.take() {
                        let _ = previous.send(Err(RequestError::Aborted));
                    }
                    info!(email = %credentials.email, "submitting");
                    self.credentials = Some(credentials);
                    self.outcome = Some(outcome);
                    self.perform(actions);
                }
                Err(e) => {
                    debug!("submission refused: {:?}", e);
                    let _ = outcome.send(Err(e));
                }
            },
            Command::Cancel => {
                let actions = self.machine.cancel();
                self.perform(actions);
            }
            Command::SetOnline(online) => {
                info!(online, "network availability changed");
                self.machine.set_online(online);
            }
        }
    }

    fn perform(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Dispatch { id } => self.dispatch(id),
                Action::Abort { id } => {
                    if let Some((current, handle)) = self.exchange.take() {
                        if current == id {
                            debug!(%id, "aborting exchange");
                            handle.abort();
                        } else {
                            self.exchange = Some((current, handle));
                        }
                    }
                }
                Action::Finished(result) => {
                    match &result {
                        Ok(reply) => info!(status = reply.status, "request succeeded"),
                        Err(RequestError::Aborted) => debug!("request cancelled"),
                        Err(e) => warn!("request failed: {:?}", e),
                    }
                    if let Some(outcome) = self.outcome.take() {
                        let _ = outcome.send(result);
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, id: AttemptId) {
        let Some(credentials) = self.credentials.clone() else {
            return;
        };
        debug!(%id, attempt = self.machine.attempt(), "dispatching");
        let api = Arc::clone(&self.api);
        let settled = self.settled.clone();
        let task = tokio::spawn(async move {
            let result = api.login(&credentials).await;
            let _ = settled.send(Settled { id, result });
        });
        self.exchange = Some((id, task.abort_handle()));
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}
