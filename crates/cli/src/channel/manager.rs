// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background connection manager.
//!
//! [`ConnectionManager`] owns a [`ConnectionMachine`] inside a tokio task and
//! carries out the actions it requests. Callers talk to it through a
//! cloneable [`ConnectionHandle`]: commands go in over an mpsc queue, status
//! comes back over a `watch`, and inbound replies fan out over a
//! `broadcast` so any number of consumers can attach and detach.
//!
//! The token is fixed for the lifetime of a manager. Use
//! [`ConnectionHandle::with_token`] to build a replacement.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use tether_core::protocol::{channel_endpoint, parse_reply};
use tether_core::{close_code, Clock, ConnectionBackoff};

use super::machine::{Action, ConnectionMachine, ConnectionState, ConnectionStatus, MAX_RETRIES};
use super::transport::{Channel, Frame, Outgoing, Transport, TransportError};
use crate::clock::{deadline, sleep_until, MonotonicClock};

/// Configuration for a connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Reconnect attempts after an abnormal closure.
    pub max_retries: u32,
    /// Delay between reconnect attempts.
    pub backoff: ConnectionBackoff,
    /// Inbound replies buffered per subscriber.
    pub inbound_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            max_retries: MAX_RETRIES,
            backoff: ConnectionBackoff::default(),
            inbound_capacity: 256,
        }
    }
}

/// Error type for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("not connected")]
    NotConnected,

    #[error("connection lost. Please reconnect.\n  hint: the server could not be reached after repeated retries")]
    Exhausted,

    #[error("message is empty")]
    EmptyMessage,

    #[error("connection manager has shut down")]
    Closed,

    #[error(transparent)]
    Address(#[from] tether_core::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

enum Command {
    Open,
    Send(String),
    Close(u16),
    Shutdown,
}

/// Reports from spawned connection tasks, tagged with their generation.
enum Event {
    Opened { generation: u64, channel: Channel },
    ConnectFailed { generation: u64, error: TransportError },
    Frame { generation: u64, frame: Frame },
}

type Respawn = dyn Fn(&str) -> Result<ConnectionHandle, ChannelError> + Send + Sync;

/// Handle to a running connection manager.
///
/// Dropping every handle shuts the manager down.
#[derive(Clone)]
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionStatus>,
    inbound: broadcast::Sender<String>,
    token: Arc<str>,
    respawn: Arc<Respawn>,
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("status", &*self.status.borrow())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ConnectionHandle {
    /// Establish the channel. A no-op while connecting or connected.
    pub fn open(&self) -> Result<(), ChannelError> {
        self.command(Command::Open)
    }

    /// Queue a payload for transmission. Never blocks.
    pub fn send(&self, payload: impl Into<String>) -> Result<(), ChannelError> {
        if self.state() != ConnectionState::Connected {
            return Err(ChannelError::NotConnected);
        }
        self.command(Command::Send(payload.into()))
    }

    /// Close the channel. Code 1000 is a clean close and never reconnects.
    pub fn close(&self, code: u16) -> Result<(), ChannelError> {
        self.command(Command::Close(code))
    }

    /// Close cleanly and stop the manager task.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Attach a new consumer of inbound replies.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.inbound.subscribe()
    }

    /// Status as of the most recent transition.
    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.status.borrow().state
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Waits until the published state satisfies `pred`.
    pub async fn wait_for(
        &self,
        pred: impl FnMut(&ConnectionStatus) -> bool,
    ) -> Result<ConnectionStatus, ChannelError> {
        let mut rx = self.status.clone();
        let status = rx.wait_for(pred).await.map_err(|_| ChannelError::Closed)?;
        Ok(status.clone())
    }

    /// Spawns a new, unopened manager for `token` with the same transport,
    /// address and configuration. This manager is left untouched.
    pub fn with_token(&self, token: &str) -> Result<ConnectionHandle, ChannelError> {
        (self.respawn)(token)
    }

    fn command(&self, command: Command) -> Result<(), ChannelError> {
        self.commands
            .send(command)
            .map_err(|_| ChannelError::Closed)
    }
}

struct Link {
    generation: u64,
    outgoing: mpsc::UnboundedSender<Outgoing>,
}

/// The manager task. Created through [`ConnectionManager::spawn`].
pub struct ConnectionManager<T: Transport, C: Clock = MonotonicClock> {
    transport: Arc<T>,
    service_url: String,
    endpoint: String,
    machine: ConnectionMachine,
    clock: C,
    link: Option<Link>,
    events: mpsc::UnboundedSender<Event>,
    status: watch::Sender<ConnectionStatus>,
    inbound: broadcast::Sender<String>,
}

impl<T: Transport> ConnectionManager<T> {
    /// Spawn a manager for one session. It starts `Disconnected`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        transport: Arc<T>,
        service_url: &str,
        token: &str,
        config: ChannelConfig,
    ) -> Result<ConnectionHandle, ChannelError> {
        Self::spawn_with_clock(transport, service_url, token, config, MonotonicClock::new())
    }
}

impl<T: Transport, C: Clock + Clone + 'static> ConnectionManager<T, C> {
    /// Like [`spawn`](ConnectionManager::spawn), timing reconnects with `clock`.
    pub fn spawn_with_clock(
        transport: Arc<T>,
        service_url: &str,
        token: &str,
        config: ChannelConfig,
        clock: C,
    ) -> Result<ConnectionHandle, ChannelError> {
        let endpoint = channel_endpoint(service_url, token)?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::disconnected());
        let (inbound_tx, _) = broadcast::channel(config.inbound_capacity.max(1));

        let manager = ConnectionManager {
            transport: Arc::clone(&transport),
            service_url: service_url.to_string(),
            endpoint,
            machine: ConnectionMachine::new(config.max_retries, config.backoff),
            clock: clock.clone(),
            link: None,
            events: event_tx,
            status: status_tx,
            inbound: inbound_tx.clone(),
        };
        tokio::spawn(manager.run(cmd_rx, event_rx));

        let url = service_url.to_string();
        let respawn: Arc<Respawn> = Arc::new(move |token: &str| {
            ConnectionManager::<T, C>::spawn_with_clock(
                Arc::clone(&transport),
                &url,
                token,
                config,
                clock.clone(),
            )
        });

        Ok(ConnectionHandle {
            commands: cmd_tx,
            status: status_rx,
            inbound: inbound_tx,
            token: Arc::from(token),
            respawn,
        })
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        loop {
            let wake_at = self.machine.next_due().map(|due| deadline(&self.clock, due));

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => {
                        self.close(close_code::NORMAL);
                        self.publish();
                        break;
                    }
                    Some(command) => self.handle_command(command),
                },
                Some(event) = events.recv() => self.handle_event(event),
                () = sleep_until(wake_at) => {
                    if let Some(action) = self.machine.tick(self.clock.now_ms()) {
                        self.perform(action);
                    }
                }
            }

            self.publish();
        }

        debug!(service = %self.service_url, "connection manager stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open => {
                if let Some(action) = self.machine.open() {
                    self.perform(action);
                }
            }
            Command::Send(payload) => match &self.link {
                Some(link) if self.machine.state() == ConnectionState::Connected => {
                    if link.outgoing.send(Outgoing::Text(payload)).is_err() {
                        debug!("transport gone, message dropped");
                    }
                }
                _ => debug!("not connected, message dropped"),
            },
            Command::Close(code) => self.close(code),
            Command::Shutdown => {}
        }
    }

    fn handle_event(&mut self, event: Event) {
        let now = self.clock.now_ms();
        match event {
            Event::Opened {
                generation,
                channel,
            } => {
                if !self.machine.opened(generation) {
                    debug!(generation, "stale connection opened, closing it");
                    let _ = channel.outgoing.send(Outgoing::Close(close_code::NORMAL));
                    return;
                }
                info!(service = %self.service_url, generation, "channel connected");
                tokio::spawn(forward_frames(
                    generation,
                    channel.incoming,
                    self.events.clone(),
                ));
                self.link = Some(Link {
                    generation,
                    outgoing: channel.outgoing,
                });
            }
            Event::ConnectFailed { generation, error } => {
                if self.machine.closed(generation, close_code::ABNORMAL, now) {
                    warn!(generation, "connect failed: {}", error);
                    self.log_closure();
                } else {
                    debug!(generation, "stale connect failure ignored");
                }
            }
            Event::Frame {
                generation,
                frame: Frame::Text(text),
            } => {
                if !self.is_live(generation) {
                    debug!(generation, "frame from stale connection ignored");
                    return;
                }
                match parse_reply(&text) {
                    // No subscribers is not an error.
                    Some(reply) => {
                        let _ = self.inbound.send(reply);
                    }
                    None => debug!(len = text.len(), "malformed frame dropped"),
                }
            }
            Event::Frame {
                generation,
                frame: Frame::Closed(code),
            } => {
                if self.machine.closed(generation, code, now) {
                    self.link = None;
                    self.log_closure();
                } else {
                    debug!(generation, code, "stale closure ignored");
                }
            }
        }
    }

    fn close(&mut self, code: u16) {
        let before = self.machine.state();
        for action in self.machine.close(code, self.clock.now_ms()) {
            self.perform(action);
        }
        if before != self.machine.state() {
            info!(code, from = %before, to = %self.machine.state(), "channel closed locally");
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Connect { generation } => {
                if let Some(old) = self.link.take() {
                    let _ = old.outgoing.send(Outgoing::Close(close_code::NORMAL));
                }
                info!(
                    service = %self.service_url,
                    generation,
                    attempt = self.machine.attempt(),
                    "connecting"
                );
                let transport = Arc::clone(&self.transport);
                let endpoint = self.endpoint.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let event = match transport.connect(&endpoint).await {
                        Ok(channel) => Event::Opened {
                            generation,
                            channel,
                        },
                        Err(error) => Event::ConnectFailed { generation, error },
                    };
                    let _ = events.send(event);
                });
            }
            Action::Disconnect { code } => {
                if let Some(link) = self.link.take() {
                    let _ = link.outgoing.send(Outgoing::Close(code));
                }
            }
        }
    }

    fn is_live(&self, generation: u64) -> bool {
        self.machine.state() == ConnectionState::Connected
            && self
                .link
                .as_ref()
                .is_some_and(|link| link.generation == generation)
    }

    fn log_closure(&self) {
        let status = self.machine.status(self.clock.now_ms());
        match status.state {
            ConnectionState::Reconnecting => warn!(
                code = ?status.last_close,
                attempt = status.attempt,
                retry_in_ms = ?status.retry_in_ms,
                "channel lost, reconnecting"
            ),
            ConnectionState::Exhausted => warn!(
                code = ?status.last_close,
                "channel lost, retries exhausted"
            ),
            _ => info!(code = ?status.last_close, "channel closed"),
        }
    }

    fn publish(&self) {
        let status = self.machine.status(self.clock.now_ms());
        self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}

/// Relays one connection's frames to the manager until the connection ends.
async fn forward_frames(
    generation: u64,
    mut incoming: mpsc::UnboundedReceiver<Frame>,
    events: mpsc::UnboundedSender<Event>,
) {
    while let Some(frame) = incoming.recv().await {
        let closed = matches!(frame, Frame::Closed(_));
        if events.send(Event::Frame { generation, frame }).is_err() || closed {
            return;
        }
    }
    // Transport vanished without a close frame.
    let _ = events.send(Event::Frame {
        generation,
        frame: Frame::Closed(close_code::ABNORMAL),
    });
}
