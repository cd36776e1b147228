// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::transport::{
    connect_error, Channel, Frame, Outgoing, Transport, TransportError, TransportResult,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tether_core::ServerMessage;
use tokio::sync::mpsc;

/// Mock transport for testing without real sockets.
///
/// Every accepted connection hands its server end to the paired
/// [`MockListener`], so a test can play the server.
#[derive(Clone)]
pub struct MockTransport {
    servers: mpsc::UnboundedSender<MockServer>,
    /// URLs passed to connect(), in order.
    urls: Arc<Mutex<Vec<String>>>,
    /// Number of upcoming connects that should fail.
    refusals: Arc<AtomicU32>,
}

/// Receives the server end of each accepted connection.
pub struct MockListener {
    servers: mpsc::UnboundedReceiver<MockServer>,
}

/// Server end of one mock connection.
pub struct MockServer {
    pub url: String,
    to_client: mpsc::UnboundedSender<Frame>,
    from_client: mpsc::UnboundedReceiver<Outgoing>,
}

impl MockTransport {
    pub fn new() -> (Self, MockListener) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = MockTransport {
            servers: tx,
            urls: Arc::new(Mutex::new(Vec::new())),
            refusals: Arc::new(AtomicU32::new(0)),
        };
        (transport, MockListener { servers: rx })
    }

    /// Make the next `count` connects fail.
    pub fn refuse_next(&self, count: u32) {
        self.refusals.store(count, Ordering::SeqCst);
    }

    /// URLs of every connect attempt so far.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn connect(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Channel>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            self.urls.lock().unwrap().push(url.clone());

            let refused = self
                .refusals
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if refused {
                return Err(TransportError::ConnectionFailed("mock refusal".into()));
            }

            let (out_tx, out_rx) = mpsc::unbounded_channel();
            let (in_tx, in_rx) = mpsc::unbounded_channel();
            let server = MockServer {
                url,
                to_client: in_tx,
                from_client: out_rx,
            };
            self.servers
                .send(server)
                .map_err(|_| TransportError::ConnectionClosed)?;

            Ok(Channel {
                outgoing: out_tx,
                incoming: in_rx,
            })
        })
    }
}

impl MockListener {
    /// Waits for the next accepted connection.
    pub async fn accept(&mut self) -> MockServer {
        self.servers.recv().await.expect("transport dropped")
    }

    /// Returns an accepted connection if one is waiting.
    pub fn try_accept(&mut self) -> Option<MockServer> {
        self.servers.try_recv().ok()
    }
}

impl MockServer {
    /// Send a `{"reply": ...}` frame.
    pub fn reply(&self, text: &str) {
        self.send_raw(&ServerMessage::reply(text).to_json().unwrap());
    }

    /// Send an arbitrary text frame.
    pub fn send_raw(&self, text: &str) {
        let _ = self.to_client.send(Frame::Text(text.to_string()));
    }

    /// Close the connection from the server side.
    pub fn close(&self, code: u16) {
        let _ = self.to_client.send(Frame::Closed(code));
    }

    /// Next frame the client sent.
    pub async fn recv(&mut self) -> Option<Outgoing> {
        self.from_client.recv().await
    }

    /// Frame the client sent, if one is waiting.
    pub fn try_recv(&mut self) -> Option<Outgoing> {
        self.from_client.try_recv().ok()
    }
}

#[tokio::test]
async fn test_mock_transport_connect() {
    let (transport, mut listener) = MockTransport::new();

    let mut channel = transport.connect("ws://localhost:1234/chat/ws").await.unwrap();
    let mut server = listener.accept().await;
    assert_eq!(server.url, "ws://localhost:1234/chat/ws");
    assert_eq!(transport.urls(), vec!["ws://localhost:1234/chat/ws"]);

    // Client to server
    channel
        .outgoing
        .send(Outgoing::Text("{\"message\":\"hi\"}".into()))
        .unwrap();
    assert_eq!(
        server.recv().await,
        Some(Outgoing::Text("{\"message\":\"hi\"}".into()))
    );

    // Server to client
    server.reply("hello");
    server.close(1000);
    assert_eq!(
        channel.incoming.recv().await,
        Some(Frame::Text("{\"reply\":\"hello\"}".into()))
    );
    assert_eq!(channel.incoming.recv().await, Some(Frame::Closed(1000)));
}

#[tokio::test]
async fn test_mock_transport_connect_fail() {
    let (transport, mut listener) = MockTransport::new();
    transport.refuse_next(1);

    let result = transport.connect("ws://localhost:1234").await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    assert!(listener.try_accept().is_none());

    // Only the first connect is refused.
    assert!(transport.connect("ws://localhost:1234").await.is_ok());
    assert!(listener.try_accept().is_some());
    assert_eq!(transport.urls().len(), 2);
}

#[test]
fn test_transport_error_display() {
    let err = TransportError::ConnectionFailed("refused".into());
    assert_eq!(err.to_string(), "connection failed: refused");
    assert_eq!(TransportError::ConnectionClosed.to_string(), "connection closed");
}

#[test]
fn test_handshake_errors_map_to_kinds() {
    use tokio_tungstenite::tungstenite::Error;

    assert!(matches!(
        connect_error(Error::ConnectionClosed),
        TransportError::ConnectionClosed
    ));
    assert!(matches!(
        connect_error(Error::AlreadyClosed),
        TransportError::ConnectionClosed
    ));
    assert!(matches!(
        connect_error(Error::Url(
            tokio_tungstenite::tungstenite::error::UrlError::NoHostName
        )),
        TransportError::ConnectionFailed(_)
    ));
}
