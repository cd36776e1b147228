// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `<config dir>/tether/config.toml` and includes:
//! - `service_url`: Base address of the service (http or https)
//! - `[channel]`: Reconnect policy for the chat channel
//! - `[request]`: Timing, retry and cooldown policy for login requests
//!
//! Every field is optional. A missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tether_core::protocol::parse_service_url;
use tether_core::{ConnectionBackoff, RequestBackoff};

use crate::channel::ChannelConfig;
use crate::env;
use crate::error::{Error, Result};
use crate::request::RequestPolicy;

const CONFIG_DIR_NAME: &str = "tether";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the service. The chat channel is derived from it.
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default)]
    pub channel: ChannelSettings,
    #[serde(default)]
    pub request: RequestSettings,
}

/// Reconnect policy for the chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Reconnect attempts after an abnormal closure (default: 5).
    #[serde(default = "default_channel_max_retries")]
    pub max_retries: u32,
    /// First reconnect delay in milliseconds, doubled per attempt (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on the reconnect delay in milliseconds (default: 10000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

/// Timing and retry policy for login requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSettings {
    /// Automatic retries after a server or network error (default: 3).
    #[serde(default = "default_request_max_retries")]
    pub max_retries: u32,
    /// Report the request as slow after this many milliseconds (default: 7000).
    #[serde(default = "default_slow_after_ms")]
    pub slow_after_ms: u64,
    /// Cancel the request after this many milliseconds (default: 20000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Cooldown after retries are exhausted, in seconds (default: 60).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u32,
    /// First retry delay in milliseconds, doubled per attempt (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Random extra delay added to each retry, in milliseconds (default: 1000).
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

fn default_service_url() -> String {
    "https://ai-business-assistant-backend.onrender.com".to_string()
}

fn default_channel_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_request_max_retries() -> u32 {
    3
}

fn default_slow_after_ms() -> u64 {
    7_000
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cooldown_secs() -> u32 {
    60
}

fn default_jitter_ms() -> u64 {
    1_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_url: default_service_url(),
            channel: ChannelSettings::default(),
            request: RequestSettings::default(),
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        ChannelSettings {
            max_retries: default_channel_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        RequestSettings {
            max_retries: default_request_max_retries(),
            slow_after_ms: default_slow_after_ms(),
            timeout_ms: default_timeout_ms(),
            cooldown_secs: default_cooldown_secs(),
            base_delay_ms: default_base_delay_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

impl ChannelSettings {
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            max_retries: self.max_retries,
            backoff: ConnectionBackoff {
                base_ms: self.base_delay_ms,
                cap_ms: self.max_delay_ms,
            },
            ..ChannelConfig::default()
        }
    }
}

impl RequestSettings {
    pub fn policy(&self) -> RequestPolicy {
        RequestPolicy {
            max_retries: self.max_retries,
            slow_after_ms: self.slow_after_ms,
            timeout_ms: self.timeout_ms,
            cooldown_secs: self.cooldown_secs,
        }
    }

    pub fn backoff(&self) -> RequestBackoff {
        RequestBackoff {
            base_ms: self.base_delay_ms,
            jitter_ms: self.jitter_ms,
        }
    }
}

impl Config {
    /// The per-user config file location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|message| Error::Config {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }

    /// Finds, loads and validates the effective configuration.
    ///
    /// The file is `explicit` if given, else `TETHER_CONFIG`, else the
    /// per-user default. An explicitly named file must exist.
    /// `TETHER_SERVICE_URL` overrides the file's `service_url`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit.map(Path::to_path_buf).or_else(env::config_path);
        let mut config = match (named, Self::default_path()) {
            (Some(path), _) => {
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.display().to_string()));
                }
                Self::load(&path)?
            }
            (None, Some(path)) => Self::load(&path)?,
            (None, None) => Config::default(),
        };
        if let Some(url) = env::service_url() {
            config.service_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<()> {
        parse_service_url(&self.service_url)?;
        if self.request.slow_after_ms >= self.request.timeout_ms {
            return Err(Error::InvalidConfig(format!(
                "request.slow_after_ms ({}) must be less than request.timeout_ms ({})",
                self.request.slow_after_ms, self.request.timeout_ms
            )));
        }
        if self.channel.base_delay_ms > self.channel.max_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "channel.base_delay_ms ({}) must not exceed channel.max_delay_ms ({})",
                self.channel.base_delay_ms, self.channel.max_delay_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
