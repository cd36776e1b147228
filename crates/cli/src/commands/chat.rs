// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::channel::{ChannelError, ChatSession, ConnectionManager, ConnectionState, Transport};
use crate::colors;
use crate::config::Config;
use crate::error::Result;

/// How long to wait for the channel to wind down after end of input.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Chat over the live channel.
///
/// Each line of `input` is one message. A line is read only while the
/// channel is connected and no reply is pending; a reply owed by a
/// connection that dropped is no longer waited for. Replies go to `out`,
/// connection status changes to `err`. End of input closes the channel
/// with a normal closure.
pub async fn run<T: Transport, R: AsyncBufRead + Unpin>(
    transport: Arc<T>,
    config: &Config,
    token: &str,
    input: R,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let handle = ConnectionManager::spawn(
        transport,
        &config.service_url,
        token,
        config.channel.channel_config(),
    )?;
    let mut replies = handle.subscribe();
    let mut status = handle.watch_status();
    let mut session = ChatSession::new(handle.clone());
    let mut lines = input.lines();

    handle.open()?;

    loop {
        let ready = handle.state() == ConnectionState::Connected && !session.is_pending();
        tokio::select! {
            line = lines.next_line(), if ready => match line? {
                Some(line) => match session.submit(&line) {
                    Ok(()) | Err(ChannelError::EmptyMessage) => {}
                    Err(e) => writeln!(err, "{}", colors::status(&e.to_string()))?,
                },
                None => break,
            },
            reply = replies.recv() => match reply {
                Ok(reply) => {
                    writeln!(out, "{}: {reply}", colors::speaker("assistant"))?;
                    session.receive(reply);
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "replies dropped"),
                Err(RecvError::Closed) => break,
            },
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                session.connection_changed(current.state);
                writeln!(err, "{}", colors::status(&current.summary()))?;
                if current.state == ConnectionState::Exhausted {
                    return Err(ChannelError::Exhausted.into());
                }
            }
        }
    }

    debug!("end of input, closing channel");
    handle.shutdown();
    let stopped = handle.wait_for(|s| s.state == ConnectionState::Disconnected);
    if tokio::time::timeout(CLOSE_GRACE, stopped).await.is_err() {
        warn!("channel did not close in time");
    }
    Ok(())
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
