//! Alert levels and their rendering as Matrix messages.
//!
//! The alert level decides how the message is displayed by Matrix clients
//! (its `msgtype`) and whether the whole room is pinged with an `@room`
//! mention.
//!
//! | Level | msgtype | `@room` |
//! |-------|---------|---------|
//! | `CRITICAL` | `m.notice` | yes |
//! | `DOWN` | `m.text` | yes |
//! | `UP` | `m.emote` | no |
//! | `OK` | `m.emote` | no |
//! | anything else | `m.notice` | no |

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use matrix_sdk::ruma::events::{Mentions, room::message::RoomMessageEventContent};

/// Text prepended to the message of the levels pinging the whole room.
pub const ROOM_MENTION: &str = "@room ";

/// Alert level given on the command line.
///
/// Level names are matched case-sensitively. Unknown levels are kept as
/// [`AlertLevel::Other`] and rendered like a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertLevel {
    Critical,
    Down,
    Up,
    Ok,
    Other(String),
}

/// How a message is displayed by Matrix clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// `m.text`
    Text,
    /// `m.notice`
    Notice,
    /// `m.emote`
    Emote,
}

impl AlertLevel {
    /// The message kind used for this level.
    pub fn kind(&self) -> MessageKind {
        match self {
            AlertLevel::Down => MessageKind::Text,
            AlertLevel::Up | AlertLevel::Ok => MessageKind::Emote,
            AlertLevel::Critical | AlertLevel::Other(_) => MessageKind::Notice,
        }
    }

    /// Whether this level pings the whole room.
    pub fn mentions_room(&self) -> bool {
        matches!(self, AlertLevel::Critical | AlertLevel::Down)
    }
}

impl From<&str> for AlertLevel {
    fn from(level: &str) -> Self {
        match level {
            "CRITICAL" => AlertLevel::Critical,
            "DOWN" => AlertLevel::Down,
            "UP" => AlertLevel::Up,
            "OK" => AlertLevel::Ok,
            other => AlertLevel::Other(other.to_string()),
        }
    }
}

impl FromStr for AlertLevel {
    type Err = Infallible;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        Ok(AlertLevel::from(level))
    }
}

impl Default for AlertLevel {
    fn default() -> Self {
        AlertLevel::Other("WARNING".to_string())
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Critical => write!(f, "CRITICAL"),
            AlertLevel::Down => write!(f, "DOWN"),
            AlertLevel::Up => write!(f, "UP"),
            AlertLevel::Ok => write!(f, "OK"),
            AlertLevel::Other(level) => write!(f, "{}", level),
        }
    }
}

/// Builds the room message for `message` at the given alert `level`.
///
/// The text is sent both as plain `body` and as HTML `formatted_body`, so
/// markup in the message is rendered by clients. Levels pinging the room get
/// the `@room ` prefix and the room mention flag.
///
/// # Examples
///
/// ```
/// let content = render(&AlertLevel::Critical, "disk full");
/// assert_eq!(content.msgtype(), "m.notice");
/// assert_eq!(content.body(), "@room disk full");
/// ```
pub fn render(level: &AlertLevel, message: &str) -> RoomMessageEventContent {
    let text = if level.mentions_room() {
        format!("{}{}", ROOM_MENTION, message)
    } else {
        message.to_string()
    };

    let content = match level.kind() {
        MessageKind::Text => RoomMessageEventContent::text_html(text.clone(), text),
        MessageKind::Notice => RoomMessageEventContent::notice_html(text.clone(), text),
        MessageKind::Emote => RoomMessageEventContent::emote_html(text.clone(), text),
    };

    if level.mentions_room() {
        content.add_mentions(Mentions::with_room_mention())
    } else {
        content
    }
}
