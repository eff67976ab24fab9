//! matrix-send - Post a one-shot alert message to a Matrix room.
//!
//! This is the entry point of matrix-send, a small command-line tool meant to
//! be called by monitoring systems. It posts one message to one Matrix room
//! and reports the outcome through its exit code.
//!
//! # Configuration
//!
//! Create `~/.config/matrix-send/config.ini`:
//!
//! ```ini
//! [DEFAULT]
//! endpoint = https://matrix.example.org/_matrix/
//! access_token = syt_YWxlcnQ_abcdefghijklmnop_0a1b2c
//! channel_id = !AbCdEfGh:example.org
//! timeout = 10
//! ```
//!
//! Any key can be overridden with a `MATRIX_SEND_` environment variable, see
//! [`config`].
//!
//! # Usage
//!
//! ```bash
//! matrix-send --level CRITICAL "disk /var is full"
//! echo "backup finished" | matrix-send --level OK
//! matrix-send --config /etc/matrix-send.ini "hello"
//! ```
//!
//! # Alert Levels
//!
//! - `CRITICAL` - notice, pings the room with `@room`
//! - `DOWN` - text, pings the room with `@room`
//! - `UP`, `OK` - emote
//! - anything else (default `WARNING`) - notice
//!
//! # Exit Codes
//!
//! - `0` - the homeserver accepted the message
//! - `1` - the message could not be delivered, or the configuration is invalid
//! - `10` - the configuration file does not exist
//!
//! # Architecture
//!
//! - [`alert`] - Alert levels and message rendering
//! - [`config`] - INI configuration loading with environment overrides
//! - [`matrix`] - Matrix client-server API call
//! - [`message`] - Message input from the command line or stdin
//! - [`notifier`] - Glue between rendering and sending
//! - [`utils`] - Default configuration path
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use crate::{
    alert::AlertLevel, config::Config, matrix::MatrixSender, message::read_message,
    notifier::Notifier, utils::default_config_path,
};

mod alert;
mod config;
mod matrix;
mod message;
mod notifier;
mod utils;

/// Exit code of a delivered message.
const EXIT_SUCCESS: u8 = 0;
/// Exit code of any delivery or configuration failure.
const EXIT_FAILURE: u8 = 1;
/// Exit code of a missing configuration file.
const EXIT_CONFIG_MISSING: u8 = 10;

/// Command-line arguments of matrix-send.
///
/// # Examples
///
/// ```bash
/// matrix-send --level DOWN "web01 is unreachable"
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Message to send. Read from stdin when omitted.
    message: Option<String>,

    /// Path to the INI configuration file.
    ///
    /// Defaults to `$HOME/.config/matrix-send/config.ini`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Alert level: CRITICAL, DOWN, UP, OK or anything else.
    ///
    /// CRITICAL and DOWN ping the whole room.
    #[arg(short, long, default_value_t)]
    level: AlertLevel,
}

/// Main entry point of matrix-send.
///
/// 1. **Logging Setup**: `info` level by default, overridable with `RUST_LOG`
/// 2. **Argument Parsing**: with `clap`
/// 3. **Delivery**: see [`run`]
#[tokio::main]
async fn main() -> ExitCode {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args = Args::parse();
    debug!("starting matrix-send {}", env!("CARGO_PKG_VERSION"));

    ExitCode::from(run(args).await)
}

/// Loads the configuration, reads the message and sends it.
///
/// Returns the process exit code.
async fn run(args: Args) -> u8 {
    let config_path = match args.config {
        Some(path) => path,
        None => match default_config_path() {
            Ok(path) => path,
            Err(e) => {
                error!("{:#}", e);
                return EXIT_FAILURE;
            }
        },
    };

    if !config_path.exists() {
        error!("configuration file {} missing!", config_path.display());
        return EXIT_CONFIG_MISSING;
    }

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {:#}", e);
            return EXIT_FAILURE;
        }
    };
    debug!("loaded {:?}", config);

    let message = match read_message(args.message).await {
        Ok(message) => message,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let sender = match MatrixSender::new(&config) {
        Ok(sender) => sender,
        Err(e) => {
            error!("failed to initialize matrix sender: {:#}", e);
            return EXIT_FAILURE;
        }
    };

    if Notifier::new(sender).notify(&args.level, &message).await {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use mockito::Matcher;
    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(endpoint: &str) -> NamedTempFile {
        write_config_with_timeout(endpoint, 5)
    }

    fn write_config_with_timeout(endpoint: &str, timeout: u64) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[DEFAULT]\nendpoint = {}\naccess_token = secret\nchannel_id = !room:example.org\ntimeout = {}\n",
            endpoint, timeout
        )
        .unwrap();
        file
    }

    fn args_for(config: &NamedTempFile, level: &str, message: &str) -> Args {
        Args::try_parse_from([
            "matrix-send",
            "--config",
            config.path().to_str().unwrap(),
            "--level",
            level,
            message,
        ])
        .unwrap()
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["matrix-send"]).unwrap();
        assert_eq!(args.message, None);
        assert_eq!(args.config, None);
        assert_eq!(args.level, AlertLevel::Other("WARNING".to_string()));
    }

    #[test]
    fn test_args_all() {
        let args = Args::try_parse_from([
            "matrix-send",
            "-c",
            "/etc/matrix-send.ini",
            "-l",
            "CRITICAL",
            "disk full",
        ])
        .unwrap();
        assert_eq!(args.message.as_deref(), Some("disk full"));
        assert_eq!(args.config, Some(PathBuf::from("/etc/matrix-send.ini")));
        assert_eq!(args.level, AlertLevel::Critical);
    }

    #[test]
    fn test_args_rejects_extra_positional() {
        assert!(Args::try_parse_from(["matrix-send", "one", "two"]).is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_run_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let args = Args::try_parse_from([
            "matrix-send",
            "--config",
            path.to_str().unwrap(),
            "hello",
        ])
        .unwrap();

        assert_eq!(run(args).await, EXIT_CONFIG_MISSING);
    }

    #[tokio::test]
    #[serial]
    async fn test_run_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[DEFAULT]\nendpoint = https://matrix.example.org/_matrix/\n").unwrap();

        assert_eq!(run(args_for(&file, "OK", "hello")).await, EXIT_FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn test_run_delivered() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", Matcher::Regex(r"^/_matrix/client/r0/rooms/".to_string()))
            .match_query(Matcher::UrlEncoded(
                "access_token".to_owned(),
                "secret".to_owned(),
            ))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "msgtype": "m.text",
                "body": "@room web01 is unreachable"
            })))
            .with_status(200)
            .with_body(r#"{"event_id": "$event:example.org"}"#)
            .create_async()
            .await;

        let config = write_config(&format!("{}/_matrix/", server.url()));
        let code = run(args_for(&config, "DOWN", "web01 is unreachable")).await;

        assert_eq!(code, EXIT_SUCCESS);
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_run_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", Matcher::Regex(r"^/_matrix/client/r0/rooms/".to_string()))
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errcode": "M_UNKNOWN_TOKEN"}"#)
            .create_async()
            .await;

        let config = write_config(&format!("{}/_matrix/", server.url()));
        let code = run(args_for(&config, "UP", "web01 is back")).await;

        assert_eq!(code, EXIT_FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn test_run_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/_matrix/", listener.local_addr().unwrap());

        // Accept the connection and never answer
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let config = write_config_with_timeout(&endpoint, 1);
        let code = tokio::time::timeout(
            Duration::from_secs(10),
            run(args_for(&config, "CRITICAL", "disk full")),
        )
        .await
        .expect("the configured timeout should end the run");

        assert_eq!(code, EXIT_FAILURE);
        server.abort();
    }
}
