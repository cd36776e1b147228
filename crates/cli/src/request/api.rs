// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication exchanges with the service.
//!
//! [`AuthApi`] is the seam between the request controller and HTTP. Any
//! response, whatever its status, comes back as a [`Reply`]; only a failure
//! to get a response at all is an error.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tether_core::protocol::{
    http_endpoint, ErrorDetail, LoginForm, RegisterRequest, TokenResponse, CORRELATION_HEADER,
    LOGIN_PATH, REGISTER_PATH,
};
use tracing::debug;

use super::error::RequestError;

/// Boxed future returned by [`AuthApi`] methods.
pub type ApiFuture<'a> = Pin<Box<dyn Future<Output = Result<Reply, RequestError>> + Send + 'a>>;

/// Email and password for one login or registration.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    /// Value of the `x-correlation-id` header.
    pub correlation_id: Option<String>,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The access token from a successful login.
    pub fn access_token(&self) -> Result<String, RequestError> {
        TokenResponse::from_json(&self.body)
            .map(|t| t.access_token)
            .map_err(|e| RequestError::Malformed(e.to_string()))
    }

    /// The server's human readable `detail`, if it sent one.
    pub fn detail(&self) -> Option<String> {
        ErrorDetail::parse(&self.body).and_then(|d| d.message().map(str::to_string))
    }
}

/// Authentication endpoints.
pub trait AuthApi: Send + Sync + 'static {
    /// Exchange credentials for an access token.
    fn login<'a>(&'a self, credentials: &'a Credentials) -> ApiFuture<'a>;

    /// Create an account.
    fn register<'a>(&'a self, credentials: &'a Credentials) -> ApiFuture<'a>;
}

/// [`AuthApi`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    login_url: String,
    register_url: String,
}

impl HttpAuthApi {
    pub fn new(service_url: &str) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpAuthApi {
            client,
            login_url: http_endpoint(service_url, LOGIN_PATH)?,
            register_url: http_endpoint(service_url, REGISTER_PATH)?,
        })
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn register_url(&self) -> &str {
        &self.register_url
    }
}

impl AuthApi for HttpAuthApi {
    fn login<'a>(&'a self, credentials: &'a Credentials) -> ApiFuture<'a> {
        Box::pin(async move {
            let form = LoginForm {
                username: credentials.email.clone(),
                password: credentials.password.clone(),
            };
            let response = self
                .client
                .post(&self.login_url)
                .form(&form)
                .send()
                .await
                .map_err(network_error)?;
            read_reply(response).await
        })
    }

    fn register<'a>(&'a self, credentials: &'a Credentials) -> ApiFuture<'a> {
        Box::pin(async move {
            let body = RegisterRequest {
                email: credentials.email.clone(),
                password: credentials.password.clone(),
            };
            let response = self
                .client
                .post(&self.register_url)
                .json(&body)
                .send()
                .await
                .map_err(network_error)?;
            read_reply(response).await
        })
    }
}

fn network_error(e: reqwest::Error) -> RequestError {
    debug!("request failed without a response: {}", e);
    RequestError::Network(e.to_string())
}

async fn read_reply(response: reqwest::Response) -> Result<Reply, RequestError> {
    let status = response.status().as_u16();
    let correlation_id = response
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(network_error)?;
    debug!(status, correlation_id = ?correlation_id, "response received");
    Ok(Reply {
        status,
        correlation_id,
        body,
    })
}
