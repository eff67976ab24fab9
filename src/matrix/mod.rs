//! Matrix client-server API plumbing.
//!
//! Only one endpoint is used: `PUT /client/r0/rooms/{roomId}/send/m.room.message/{txnId}`.
//! No login, no sync, no state: the access token comes from the configuration
//! and each run posts exactly one event.
//!
//! # Examples
//!
//! ```no_run
//! use matrix_send::matrix::{MatrixSender, MessageSender};
//!
//! # async fn example(config: Config) -> anyhow::Result<()> {
//! let sender = MatrixSender::new(&config)?;
//! let content = render(&AlertLevel::Critical, "disk full");
//! let delivered = sender.send(&content).await?;
//! # Ok(())
//! # }
//! ```

mod sender;
mod transaction;

pub use crate::matrix::sender::{MatrixSender, MessageSender};
#[cfg(test)]
pub use crate::matrix::sender::MockMessageSender;
