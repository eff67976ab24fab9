//! Reading the message to send.

use anyhow::Context;
use tokio::io::{self, AsyncRead, AsyncReadExt};

/// Returns the message given on the command line, or reads it from stdin.
///
/// Stdin is read to the end and must be valid UTF-8. The text is returned
/// verbatim, including any trailing newline.
pub async fn read_message(argument: Option<String>) -> anyhow::Result<String> {
    match argument {
        Some(message) => Ok(message),
        None => read_from(io::stdin()).await,
    }
}

async fn read_from<R: AsyncRead + Unpin>(mut reader: R) -> anyhow::Result<String> {
    let mut message = String::new();
    reader
        .read_to_string(&mut message)
        .await
        .context("failed to read message from stdin")?;

    Ok(message)
}
