//! Delivery of an alert to the room.
//!
//! The [`Notifier`] renders the message for its alert level and hands it to a
//! [`MessageSender`]. It reports delivery as a plain boolean, the caller maps it
//! to the process exit code.

use log::{error, info};

use crate::alert::{AlertLevel, render};
use crate::matrix::MessageSender;

/// Renders alerts and sends them through a [`MessageSender`].
///
/// # Examples
///
/// ```no_run
/// let notifier = Notifier::new(MatrixSender::new(&config)?);
/// let delivered = notifier.notify(&AlertLevel::Critical, "disk full").await;
/// ```
pub struct Notifier<S: MessageSender> {
    sender: S,
}

impl<S: MessageSender> Notifier<S> {
    /// Create a new [Notifier] sending through `sender`.
    pub fn new(sender: S) -> Self {
        Notifier { sender }
    }

    /// Sends `message` at the given alert `level`.
    ///
    /// Returns `true` only if the homeserver accepted the message. Failures are
    /// logged, never retried.
    pub async fn notify(&self, level: &AlertLevel, message: &str) -> bool {
        let content = render(level, message);

        match self.sender.send(&content).await {
            Ok(true) => {
                info!("{} alert delivered", level);
                true
            }
            Ok(false) => {
                error!("{} alert was rejected by the homeserver", level);
                false
            }
            Err(e) => {
                error!("failed to send {} alert: {:#}", level, e);
                false
            }
        }
    }
}
