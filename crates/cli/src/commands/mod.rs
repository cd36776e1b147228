// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod chat;
pub mod login;
pub mod register;

use std::io;
use std::sync::Arc;

use tokio::io::BufReader;

use crate::channel::WebSocketTransport;
use crate::cli::Command;
use crate::config::Config;
use crate::env;
use crate::error::{Error, Result};
use crate::request::{Credentials, HttpAuthApi};

/// Run one command against the resolved configuration.
pub async fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Login {
            email,
            password,
            diagnostics,
        } => {
            let credentials = Credentials::new(email, resolve_password(password)?);
            let api = Arc::new(HttpAuthApi::new(&config.service_url)?);
            login::run(
                api,
                &config.request,
                credentials,
                diagnostics,
                &mut io::stdout(),
                &mut io::stderr(),
            )
            .await
        }
        Command::Register { email, password } => {
            let credentials = Credentials::new(email, resolve_password(password)?);
            let api = HttpAuthApi::new(&config.service_url)?;
            register::run(&api, &credentials, &mut io::stdout()).await
        }
        Command::Chat { token } => {
            let token = resolve_token(token)?;
            let input = BufReader::new(tokio::io::stdin());
            chat::run(
                Arc::new(WebSocketTransport::new()),
                config,
                &token,
                input,
                &mut io::stdout(),
                &mut io::stderr(),
            )
            .await
        }
    }
}

/// Password from the command line, falling back to `TETHER_PASSWORD`.
pub(crate) fn resolve_password(arg: Option<String>) -> Result<String> {
    arg.or_else(env::password)
        .filter(|p| !p.is_empty())
        .ok_or(Error::MissingPassword)
}

/// Token from the command line, falling back to `TETHER_TOKEN`.
pub(crate) fn resolve_token(arg: Option<String>) -> Result<String> {
    arg.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(env::token)
        .ok_or(Error::MissingToken)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
