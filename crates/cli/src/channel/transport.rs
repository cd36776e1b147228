// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the chat channel.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A connected transport is represented as a [`Channel`]: a pair of queues.
//! Outgoing frames are pushed into `outgoing`, and everything that happens on
//! the wire (text frames, closure) arrives on `incoming`. The queue ends are
//! owned by pump tasks, so the connection manager never blocks on socket I/O.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tether_core::close_code;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Something observed on an open channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text frame from the server.
    Text(String),
    /// The channel closed with the given close code.
    ///
    /// Transport errors and streams ending without a close frame are
    /// reported as [`close_code::ABNORMAL`].
    Closed(u16),
}

/// A frame to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A text frame.
    Text(String),
    /// Close the channel with the given code.
    Close(u16),
}

/// An open full-duplex channel.
#[derive(Debug)]
pub struct Channel {
    /// Frames to transmit, in order.
    pub outgoing: mpsc::UnboundedSender<Outgoing>,
    /// Frames received, in the order the transport saw them.
    pub incoming: mpsc::UnboundedReceiver<Frame>,
}

/// Transport trait for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync + 'static {
    /// Connect to a remote endpoint.
    fn connect(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Channel>> + Send + '_>>;
}

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Channel>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;

            let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(connect_error)?;

            let (sink, stream) = ws_stream.split();
            let (out_tx, out_rx) = mpsc::unbounded_channel();
            let (in_tx, in_rx) = mpsc::unbounded_channel();

            tokio::spawn(pump_outgoing(sink, out_rx));
            tokio::spawn(pump_incoming(stream, in_tx));

            Ok(Channel {
                outgoing: out_tx,
                incoming: in_rx,
            })
        })
    }
}

/// Maps a handshake failure onto the transport error kinds.
pub(super) fn connect_error(error: tokio_tungstenite::tungstenite::Error) -> TransportError {
    use tokio_tungstenite::tungstenite::Error;

    match error {
        Error::ConnectionClosed | Error::AlreadyClosed => TransportError::ConnectionClosed,
        other => TransportError::ConnectionFailed(other.to_string()),
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Writes queued frames to the socket until the queue closes or a close is sent.
async fn pump_outgoing(
    mut sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    mut rx: mpsc::UnboundedReceiver<Outgoing>,
) {
    use futures_util::SinkExt;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::Message;

    while let Some(frame) = rx.recv().await {
        match frame {
            Outgoing::Text(text) => {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::debug!("send failed: {}", e);
                    return;
                }
            }
            Outgoing::Close(code) => {
                let frame = CloseFrame {
                    code: CloseCode::from(code),
                    reason: "".into(),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                let _ = sink.close().await;
                return;
            }
        }
    }

    // Manager dropped the channel without an explicit close.
    let _ = sink.close().await;
}

/// Forwards socket frames until the connection ends. Always ends with `Closed`.
async fn pump_incoming(
    mut stream: futures_util::stream::SplitStream<WsStream>,
    tx: mpsc::UnboundedSender<Frame>,
) {
    use futures_util::StreamExt;
    use tokio_tungstenite::tungstenite::Message;

    let code = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                if tx.send(Frame::Text(text.as_str().to_string())).is_err() {
                    // Nobody is listening any more.
                    return;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                break frame
                    .map(|f| u16::from(f.code))
                    .unwrap_or(close_code::ABNORMAL);
            }
            Some(Ok(_)) => {
                // Ignore ping/pong and binary frames
                continue;
            }
            Some(Err(e)) => {
                tracing::debug!("receive failed: {}", e);
                break close_code::ABNORMAL;
            }
            None => break close_code::ABNORMAL,
        }
    };

    let _ = tx.send(Frame::Closed(code));
}
