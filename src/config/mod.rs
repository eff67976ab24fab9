//! Configuration file structures for matrix-send.
//!
//! The configuration is a flat INI file. Every key lives in the `[DEFAULT]`
//! section:
//!
//! ```ini
//! [DEFAULT]
//! # Client-server API base of the homeserver, including the `_matrix` prefix
//! endpoint = https://matrix.example.org/_matrix/
//!
//! # Access token of the account posting the alerts
//! access_token = syt_YWxlcnQ_abcdefghijklmnop_0a1b2c
//!
//! # Room receiving the alerts
//! channel_id = !AbCdEfGh:example.org
//!
//! # Request timeout in seconds (optional, defaults to 10)
//! timeout = 10
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any key can be overridden from the environment with the `MATRIX_SEND_` prefix:
//!
//! ```bash
//! export MATRIX_SEND_ACCESS_TOKEN="syt_from_env"
//! export MATRIX_SEND_TIMEOUT=30
//! ```

mod ini;

use std::fmt;
use std::path::Path;

use anyhow::Context;
use figment::{Figment, providers::Env};
use serde::{Deserialize, Deserializer, de};

use crate::config::ini::IniFile;

/// Prefix of the environment variables overriding the configuration file.
const ENV_PREFIX: &str = "MATRIX_SEND_";

/// Request timeout used when the configuration file does not set one.
const DEFAULT_TIMEOUT: u64 = 10;

/// Settings needed to post a message into a single Matrix room.
#[derive(Deserialize)]
pub struct Config {
    /// Client-server API base of the homeserver.
    ///
    /// # Examples
    ///
    /// - `https://matrix.org/_matrix/`
    /// - `http://localhost:8008/_matrix/`
    pub endpoint: String,

    /// Access token of the sending account.
    ///
    /// Never logged.
    pub access_token: String,

    /// Room id the message is posted to, e.g. `!AbCdEfGh:example.org`.
    pub channel_id: String,

    /// Request timeout in seconds.
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_timeout"
    )]
    pub timeout: u64,
}

impl Config {
    /// Loads the configuration from the INI file at `path`.
    ///
    /// Values are layered: the `[DEFAULT]` section of the file first, then the
    /// `MATRIX_SEND_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a required key
    /// is missing, or if `timeout` is not a number of seconds.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let config = Config::load("/etc/matrix-send/config.ini")?;
    /// println!("posting to {}", config.channel_id);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();

        Figment::new()
            .merge(IniFile::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

/// Accepts the timeout either as a number (environment) or as text (INI file).
fn deserialize_timeout<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timeout {
        Seconds(u64),
        Text(String),
    }

    match Timeout::deserialize(deserializer)? {
        Timeout::Seconds(seconds) => Ok(seconds),
        Timeout::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::custom(format!("invalid timeout `{text}`, expected a number of seconds"))
        }),
    }
}
