//! HTTP client posting room messages to the homeserver.
//!
//! This module provides the [`MatrixSender`] struct, sending a single
//! `m.room.message` event to the configured room.

use std::time::{Duration, SystemTime};

use anyhow::{Context, anyhow};
use log::{debug, info, warn};
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;
use mockall::automock;
use reqwest::{Client, StatusCode, Url, header::CONTENT_TYPE};

use crate::config::Config;
use crate::matrix::transaction::transaction_id;

/// Trait for delivering a message to the room.
///
/// This trait abstracts the HTTP call for easier testing with mocks.
#[automock]
pub trait MessageSender {
    /// Sends the message. Returns `Ok(true)` when the homeserver accepted it,
    /// `Ok(false)` when it answered with anything but `200`.
    async fn send(&self, content: &RoomMessageEventContent) -> anyhow::Result<bool>;
}

/// HTTP client for posting messages into a single Matrix room.
///
/// # Examples
///
/// ```no_run
/// let sender = MatrixSender::new(&config)?;
/// let delivered = sender.send(&render(&AlertLevel::Up, "is back")).await?;
/// ```
pub struct MatrixSender {
    /// Client-server API base, e.g. `https://matrix.org/_matrix/`
    endpoint: Url,
    /// Access token of the sending account
    access_token: String,
    /// Target room id
    channel_id: String,
    /// HTTP client
    client: Client,
}

impl MatrixSender {
    /// Create a new [MatrixSender] from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an absolute URL or if the HTTP
    /// client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("invalid endpoint {}", config.endpoint))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("failed to build http client")?;

        Ok(MatrixSender {
            endpoint,
            access_token: config.access_token.clone(),
            channel_id: config.channel_id.clone(),
            client,
        })
    }

    /// Builds the URL of the send-message call for the given transaction id.
    ///
    /// The room id and the transaction id are escaped as path segments, the
    /// access token is passed as the `access_token` query parameter.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let url = sender.message_url("m1700000000.123456")?;
    /// // https://matrix.org/_matrix/client/r0/rooms/!room:matrix.org/send/m.room.message/m1700000000.123456?access_token=...
    /// ```
    pub fn message_url(&self, transaction_id: &str) -> anyhow::Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("endpoint {} cannot be used as a base url", self.endpoint))?
            .pop_if_empty()
            .extend([
                "client",
                "r0",
                "rooms",
                self.channel_id.as_str(),
                "send",
                "m.room.message",
                transaction_id,
            ]);
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);

        Ok(url)
    }
}

impl MessageSender for MatrixSender {
    /// Request `PUT /client/r0/rooms/{channel_id}/send/m.room.message/{txn_id}`.
    ///
    /// The body is the JSON serialization of the event content:
    /// ```json
    /// {
    ///   "msgtype": "m.notice",
    ///   "format": "org.matrix.custom.html",
    ///   "body": "disk full",
    ///   "formatted_body": "disk full"
    /// }
    /// ```
    /// Only a `200` answer counts as delivered. Transport failures, timeouts
    /// included, are returned as errors.
    async fn send(&self, content: &RoomMessageEventContent) -> anyhow::Result<bool> {
        let transaction_id = transaction_id(SystemTime::now());
        let url = self.message_url(&transaction_id)?;
        let body = serde_json::to_vec(content).context("failed to serialize message")?;

        info!(
            "send {} message to room {}",
            content.msgtype(),
            &self.channel_id
        );
        debug!(
            "request PUT {} -> {}",
            url.path(),
            String::from_utf8_lossy(&body)
        );

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .send()
            .await
            // The url carries the access token
            .map_err(reqwest::Error::without_url)
            .context("failed to reach the homeserver")?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            warn!("homeserver answered {}", status);
            debug!("response body -> {}", text);
            return Ok(false);
        }

        debug!("response status {}", status);

        Ok(true)
    }
}
