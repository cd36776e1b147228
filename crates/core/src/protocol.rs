// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire formats for the chat channel and the auth endpoints.
//!
//! The chat protocol is deliberately small:
//! - Client sends `{"message": "..."}` text frames
//! - Server answers with `{"reply": "..."}` text frames; anything else is ignored
//!
//! Auth uses plain HTTP: a form-encoded login returning a bearer token and a
//! JSON registration whose 400 responses carry a human-readable `detail`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Path of the chat channel on the service.
pub const CHANNEL_PATH: &str = "/chat/ws";
/// Path of the form-encoded login endpoint.
pub const LOGIN_PATH: &str = "/auth/token";
/// Path of the JSON registration endpoint.
pub const REGISTER_PATH: &str = "/auth/register";
/// Response header carrying the server-side correlation identifier.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// WebSocket close codes the client distinguishes.
pub mod close_code {
    /// Clean, locally requested shutdown. Never triggers a reconnect.
    pub const NORMAL: u16 = 1000;
    /// Endpoint going away (server restart, page unload).
    pub const GOING_AWAY: u16 = 1001;
    /// Connection dropped without a close frame.
    pub const ABNORMAL: u16 = 1006;
    /// Server rejected the credential.
    pub const POLICY_VIOLATION: u16 = 1008;
    /// Server hit an unexpected condition.
    pub const INTERNAL_ERROR: u16 = 1011;

    /// Returns `true` if `code` denotes a clean closure.
    pub fn is_clean(code: u16) -> bool {
        code == NORMAL
    }
}

/// Builds the chat channel endpoint for a service address and token.
///
/// `https://host` becomes `wss://host/chat/ws?token=...`, `http://host`
/// becomes `ws://host/chat/ws?token=...`. Any path, query or fragment on
/// the service address is discarded.
pub fn channel_endpoint(service_url: &str, token: &str) -> Result<String> {
    let mut url = parse_service_url(service_url)?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| Error::InvalidAddress(format!("cannot use {scheme} for '{service_url}'")))?;
    url.set_path(CHANNEL_PATH);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}

/// Builds an HTTP endpoint under the service address.
pub fn http_endpoint(service_url: &str, path: &str) -> Result<String> {
    let mut url = parse_service_url(service_url)?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}

/// Parses a service address, accepting only `http` and `https`.
pub fn parse_service_url(service_url: &str) -> Result<Url> {
    let url = Url::parse(service_url)
        .map_err(|e| Error::InvalidAddress(format!("'{service_url}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(Error::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none() {
        return Err(Error::InvalidAddress(format!("'{service_url}' has no host")));
    }
    Ok(url)
}

/// Message sent from client to server over the chat channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientMessage {
    pub message: String,
}

impl ClientMessage {
    /// Creates a chat message.
    pub fn new(message: impl Into<String>) -> Self {
        ClientMessage {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Message sent from server to client over the chat channel.
///
/// Frames without a `reply` field deserialize with `reply: None` and are
/// ignored by consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl ServerMessage {
    /// Creates a reply message.
    pub fn reply(text: impl Into<String>) -> Self {
        ServerMessage {
            reply: Some(text.into()),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Extracts the reply text from an inbound frame.
///
/// Returns `None` for malformed frames and frames without a reply.
pub fn parse_reply(frame: &str) -> Option<String> {
    ServerMessage::from_json(frame).ok().and_then(|m| m.reply)
}

/// Form fields of a login request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful login response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    /// Deserializes the response from JSON.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// JSON body of a registration request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Error body returned by the service.
///
/// `detail` is usually a string, but validation failures return a list.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorDetail {
    /// Parses an error body, returning `None` when it is not JSON.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// The detail text, when the server sent a plain string.
    pub fn message(&self) -> Option<&str> {
        self.detail.as_ref().and_then(|d| d.as_str())
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
