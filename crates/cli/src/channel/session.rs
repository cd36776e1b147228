// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound message queue for one chat session.
//!
//! A submitted message is echoed into the transcript before it is handed to
//! the channel, so the transcript always shows an outbound message ahead of
//! the replies it triggers. Replies are appended in arrival order.

use tether_core::{close_code, ChatMessage, ClientMessage, Transcript};
use tokio::sync::broadcast;
use tracing::debug;

use super::machine::ConnectionState;
use super::manager::{ChannelError, ConnectionHandle};

/// Where a chat session sends its encoded payloads.
pub trait MessageSink {
    fn is_connected(&self) -> bool;

    /// Queue a payload. Must not block.
    fn send(&self, payload: String) -> Result<(), ChannelError>;
}

impl MessageSink for ConnectionHandle {
    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn send(&self, payload: String) -> Result<(), ChannelError> {
        ConnectionHandle::send(self, payload)
    }
}

/// Transcript plus pending-reply indicator for one chat session.
#[derive(Debug)]
pub struct ChatSession<S: MessageSink = ConnectionHandle> {
    sink: S,
    transcript: Transcript,
    pending: bool,
}

impl<S: MessageSink> ChatSession<S> {
    pub fn new(sink: S) -> Self {
        ChatSession {
            sink,
            transcript: Transcript::new(),
            pending: false,
        }
    }

    /// Echo `text` into the transcript and send it.
    ///
    /// Surrounding whitespace is trimmed. Empty messages and messages
    /// submitted while disconnected are rejected without touching the
    /// transcript.
    pub fn submit(&mut self, text: &str) -> Result<(), ChannelError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChannelError::EmptyMessage);
        }
        if !self.sink.is_connected() {
            return Err(ChannelError::NotConnected);
        }

        let payload = ClientMessage::new(text).to_json()?;
        self.transcript.push(ChatMessage::user(text));
        self.pending = true;

        if let Err(e) = self.sink.send(payload) {
            self.pending = false;
            return Err(e);
        }
        Ok(())
    }

    /// Append a reply from the assistant and clear the pending indicator.
    pub fn receive(&mut self, reply: impl Into<String>) {
        self.transcript.push(ChatMessage::assistant(reply));
        self.pending = false;
    }

    /// Track a connection state change.
    ///
    /// A reply cannot outlive the connection it was requested on, so
    /// leaving `Connected` clears the pending indicator.
    pub fn connection_changed(&mut self, state: ConnectionState) {
        if state != ConnectionState::Connected && self.pending {
            debug!(%state, "connection left, reply no longer expected");
            self.pending = false;
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// `true` between a send and the next reply.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl ChatSession<ConnectionHandle> {
    /// Attach a new consumer of the channel's replies.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sink.subscribe()
    }

    /// Switch the session to a new token.
    ///
    /// The current manager is closed cleanly and replaced by a fresh one,
    /// which is opened right away. The transcript is kept. Returns `false`
    /// if the token is unchanged. Existing subscribers stay attached to the
    /// old manager and must call [`subscribe`](Self::subscribe) again.
    pub fn set_token(&mut self, token: &str) -> Result<bool, ChannelError> {
        if token == self.sink.token() {
            return Ok(false);
        }
        let next = self.sink.with_token(token)?;
        let _ = self.sink.close(close_code::NORMAL);
        self.sink.shutdown();
        next.open()?;
        self.sink = next;
        self.pending = false;
        Ok(true)
    }
}
