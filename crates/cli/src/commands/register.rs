// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::request::{AuthApi, Credentials};

const REJECTED: &str = "Registration failed.";
const UNAVAILABLE: &str = "An error occurred.";

/// Create an account. Registration is sent once, without retries.
pub async fn run<A: AuthApi>(api: &A, credentials: &Credentials, out: &mut impl Write) -> Result<()> {
    let reply = match api.register(credentials).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("registration request failed: {}", e);
            return Err(Error::Registration(UNAVAILABLE.to_string()));
        }
    };

    if reply.is_success() {
        info!(email = %credentials.email, "registered");
        writeln!(
            out,
            "Account created for {}. Run 'tether login' to sign in.",
            credentials.email
        )?;
        return Ok(());
    }

    warn!(status = reply.status, correlation_id = ?reply.correlation_id, "registration rejected");
    let message = match reply.status {
        400 => reply.detail().unwrap_or_else(|| REJECTED.to_string()),
        _ => UNAVAILABLE.to_string(),
    };
    Err(Error::Registration(message))
}

#[cfg(test)]
#[path = "register_tests.rs"]
mod tests;
