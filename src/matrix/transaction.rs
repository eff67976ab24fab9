//! Client-generated transaction ids.

use std::time::{SystemTime, UNIX_EPOCH};

/// Builds the transaction id of a message sent at `now`.
///
/// The id has the form `m<seconds>.<microseconds>`, with the microseconds
/// padded to six digits. The homeserver uses it to deduplicate retransmissions
/// of the same event.
pub fn transaction_id(now: SystemTime) -> String {
    let elapsed = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("m{}.{:06}", elapsed.as_secs(), elapsed.subsec_micros())
}
