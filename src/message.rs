//! Parsed chat messages and conversation roles.
//!
//! A [`Message`] is one transcript line that matched the WhatsApp line
//! grammar and survived filtering. Messages are immutable once parsed.
//!
//! # Example
//!
//! ```
//! use chatclone::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2025, 1, 26, 17, 39, 0).unwrap();
//! let msg = Message::new("Alice", "hello there", ts);
//! assert_eq!(msg.speaker(), "Alice");
//! assert_eq!(msg.word_count(), 2);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message from a WhatsApp transcript.
///
/// | Field | Description |
/// |-------|-------------|
/// | `speaker` | Sender name, trimmed, with U+200E marks removed |
/// | `body` | Message text, trimmed, with U+200E marks removed |
/// | `timestamp` | Export-local date and time, stored as UTC |
/// | `line` | 1-based physical line number in the transcript |
///
/// Timestamps are what segmentation sorts by; `line` preserves the original
/// file order for views that don't resegment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the sender.
    pub speaker: String,

    /// Text content of the message.
    pub body: String,

    /// When the message was sent, as written in the export.
    pub timestamp: DateTime<Utc>,

    /// Line number in the transcript (0 when not parsed from a file).
    #[serde(default)]
    pub line: usize,
}

impl Message {
    /// Creates a message that does not originate from a transcript line.
    pub fn new(
        speaker: impl Into<String>,
        body: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            body: body.into(),
            timestamp,
            line: 0,
        }
    }

    /// Builder method to set the transcript line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of whitespace-delimited words in the body.
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

/// Conversation role used in training data.
///
/// The speaker being cloned is the [`Assistant`](Role::Assistant); the
/// people talking to them are the [`User`](Role::User).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label written in front of each training line.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
