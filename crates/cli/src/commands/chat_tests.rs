// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tether_core::{close_code, ClientMessage};

use super::*;
use crate::channel::transport_tests::MockTransport;
use crate::channel::Outgoing;
use crate::error::Error;

fn text(message: &str) -> Option<Outgoing> {
    Some(Outgoing::Text(ClientMessage::new(message).to_json().unwrap()))
}

#[tokio::test(start_paused = true)]
async fn sends_lines_and_prints_replies() {
    let (transport, mut listener) = MockTransport::new();
    let config = Config::default();
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let server = async {
        let mut server = listener.accept().await;
        assert_eq!(server.recv().await, text("hi"));
        server.reply("hello");
        assert_eq!(server.recv().await, text("again"));
        server.reply("bye");
        assert_eq!(
            server.recv().await,
            Some(Outgoing::Close(close_code::NORMAL))
        );
        server.url
    };
    let client = run(
        Arc::new(transport),
        &config,
        "tok",
        &b"hi\n   \nagain\n"[..],
        &mut out,
        &mut err,
    );

    let (result, url) = tokio::join!(client, server);
    assert!(result.is_ok());
    assert!(url.ends_with("/chat/ws?token=tok"), "{url}");

    let out = String::from_utf8(out).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 2, "{out}");
    assert!(lines[0].ends_with("hello"));
    assert!(lines[1].ends_with("bye"));
    assert!(String::from_utf8(err).unwrap().contains("Online"));
}

#[tokio::test(start_paused = true)]
async fn end_of_input_closes_cleanly() {
    let (transport, mut listener) = MockTransport::new();
    let config = Config::default();
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let server = async {
        let mut server = listener.accept().await;
        server.recv().await
    };
    let client = run(
        Arc::new(transport),
        &config,
        "tok",
        &b""[..],
        &mut out,
        &mut err,
    );

    let (result, first) = tokio::join!(client, server);
    assert!(result.is_ok());
    assert_eq!(first, Some(Outgoing::Close(close_code::NORMAL)));
    assert!(out.is_empty());
}

#[tokio::test(start_paused = true)]
async fn gives_up_when_retries_are_exhausted() {
    let (transport, _listener) = MockTransport::new();
    transport.refuse_next(u32::MAX);
    let config = Config::default();
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let result = run(
        Arc::new(transport.clone()),
        &config,
        "tok",
        &b"never sent\n"[..],
        &mut out,
        &mut err,
    )
    .await;

    assert!(matches!(
        result,
        Err(Error::Channel(ChannelError::Exhausted))
    ));
    assert_eq!(transport.urls().len(), 6);
    let err = String::from_utf8(err).unwrap();
    assert!(err.contains("Disconnected. Retrying in 1s..."), "{err}");
    assert!(err.contains("Connection lost. Please reconnect."), "{err}");
    assert!(out.is_empty());
}

#[tokio::test]
async fn rejects_invalid_service_address() {
    let (transport, _listener) = MockTransport::new();
    let config = Config {
        service_url: "ftp://example.com".to_string(),
        ..Config::default()
    };
    let result = run(
        Arc::new(transport),
        &config,
        "tok",
        &b""[..],
        &mut Vec::new(),
        &mut Vec::new(),
    )
    .await;
    assert!(matches!(result, Err(Error::Channel(ChannelError::Address(_)))));
}

#[tokio::test(start_paused = true)]
async fn keeps_reading_after_drop_before_reply() {
    let (transport, mut listener) = MockTransport::new();
    let config = Config::default();
    let (mut out, mut err) = (Vec::new(), Vec::new());

    let server = async {
        let mut first = listener.accept().await;
        assert_eq!(first.recv().await, text("hi"));
        first.close(close_code::INTERNAL_ERROR);

        let mut second = listener.accept().await;
        assert_eq!(second.recv().await, text("again"));
        second.reply("welcome back");
        assert_eq!(
            second.recv().await,
            Some(Outgoing::Close(close_code::NORMAL))
        );
    };
    let client = run(
        Arc::new(transport),
        &config,
        "tok",
        &b"hi\nagain\n"[..],
        &mut out,
        &mut err,
    );

    let (result, ()) = tokio::time::timeout(
        std::time::Duration::from_secs(120),
        async { tokio::join!(client, server) },
    )
    .await
    .unwrap();
    assert!(result.is_ok());

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), 1, "{out}");
    assert!(out.trim_end().ends_with("welcome back"));
    assert!(String::from_utf8(err)
        .unwrap()
        .contains("Disconnected. Retrying in 1s..."));
}
