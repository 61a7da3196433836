//! Conversation segmentation.
//!
//! [`ConversationSegmenter`] orders messages by time, labels each one with
//! its [`Role`] and cuts the stream into blocks wherever two consecutive
//! lines are further apart than the configured gap. Each block becomes one
//! training example.
//!
//! ```text
//! Start -> Accumulating -> (gap exceeded) -> FlushAndRestart -> Accumulating -> ... -> End -> FinalFlush
//! ```
//!
//! # Example
//!
//! ```rust
//! use chatclone::segment::ConversationSegmenter;
//! use chatclone::parser::ChatExportParser;
//!
//! let text = "[1/26/25, 17:39:00] Alice: hello there\n[1/26/25, 17:39:52] Bob: hi Alice";
//! let export = ChatExportParser::new().parse_transcript(text)?;
//!
//! let seg = ConversationSegmenter::new()
//!     .segment_for_target(&export.messages, "Bob", &export.speakers)?;
//! assert_eq!(seg.block_texts(), vec!["User: hello there\nAssistant: hi Alice"]);
//! assert_eq!(seg.word_count, 4);
//! # Ok::<(), chatclone::ChatCloneError>(())
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::Message;
use crate::config::SegmenterConfig;
use crate::error::Result;
use crate::message::Role;
use crate::roles::{Participants, RoleMapping};

/// One labelled line inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// `"<Role>: <text>"`
    pub fn line(&self) -> String {
        format!("{}: {}", self.role, self.text)
    }
}

/// A run of turns with no gap larger than the threshold between neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationBlock {
    pub turns: Vec<Turn>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl ConversationBlock {
    fn start(turn: Turn, at: DateTime<Utc>) -> Self {
        Self {
            turns: vec![turn],
            started_at: at,
            ended_at: at,
        }
    }

    fn push(&mut self, turn: Turn, at: DateTime<Utc>) {
        self.turns.push(turn);
        self.ended_at = at;
    }

    /// The block as newline-joined `"Role: text"` lines.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(Turn::line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Advisory raised when the chat is too short to train on.
///
/// This never stops payload construction; callers decide whether to
/// continue anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsufficientContent {
    pub word_count: usize,
    pub min_words: usize,
}

impl fmt::Display for InsufficientContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "only {} words provided; recommended minimum is {} words",
            self.word_count, self.min_words
        )
    }
}

/// Output of one segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    pub blocks: Vec<ConversationBlock>,
    /// Words across every emitted line, role prefixes excluded.
    pub word_count: usize,
    /// Threshold the word count was checked against.
    pub min_words: usize,
    pub participants: Participants,
    /// Lines that made it into a block.
    pub emitted_lines: usize,
    /// Lines dropped as repeats of the previous emitted line.
    pub skipped_duplicates: usize,
    /// Messages from speakers without a role.
    pub skipped_unmapped: usize,
}

impl Segmentation {
    /// Each block rendered as newline-joined `"Role: text"` lines.
    pub fn block_texts(&self) -> Vec<String> {
        self.blocks.iter().map(ConversationBlock::render).collect()
    }

    /// The soft word-count gate.
    pub fn insufficient_content(&self) -> Option<InsufficientContent> {
        (self.word_count < self.min_words).then_some(InsufficientContent {
            word_count: self.word_count,
            min_words: self.min_words,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Splits a message stream into role-labelled conversation blocks.
#[derive(Debug, Clone, Default)]
pub struct ConversationSegmenter {
    config: SegmenterConfig,
}

impl ConversationSegmenter {
    /// Creates a segmenter with default configuration (1 hour gap, dedupe on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a segmenter with custom configuration.
    pub fn with_config(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segments a one-on-one chat, making `target` the assistant.
    pub fn segment_for_target(
        &self,
        messages: &[Message],
        target: &str,
        speakers: &[String],
    ) -> Result<Segmentation> {
        let roles = RoleMapping::for_target(target, speakers)?;
        Ok(self.segment(messages, &roles))
    }

    /// Segments `messages` using an explicit role mapping.
    ///
    /// Messages are stably sorted by timestamp first, so messages sharing a
    /// second keep their transcript order.
    pub fn segment(&self, messages: &[Message], roles: &RoleMapping) -> Segmentation {
        let mut ordered: Vec<&Message> = messages.iter().collect();
        ordered.sort_by_key(|m| m.timestamp);

        let max_gap = self.config.max_gap();
        let mut blocks = Vec::new();
        let mut current: Option<ConversationBlock> = None;
        let mut last_line: Option<String> = None;
        let mut previous: Option<DateTime<Utc>> = None;

        let mut word_count = 0;
        let mut emitted_lines = 0;
        let mut skipped_duplicates = 0;
        let mut skipped_unmapped = 0;

        for message in ordered {
            let Some(role) = roles.role_of(&message.speaker) else {
                skipped_unmapped += 1;
                continue;
            };
            let turn = Turn {
                role,
                text: message.body.clone(),
            };
            let line = turn.line();

            if self.config.dedupe_consecutive_identical
                && last_line.as_deref() == Some(line.as_str())
            {
                skipped_duplicates += 1;
                continue;
            }

            if previous.is_some_and(|prev| message.timestamp - prev > max_gap) {
                blocks.extend(current.take());
            }

            word_count += message.word_count();
            emitted_lines += 1;
            match current.as_mut() {
                Some(block) => block.push(turn, message.timestamp),
                None => current = Some(ConversationBlock::start(turn, message.timestamp)),
            }
            previous = Some(message.timestamp);
            last_line = Some(line);
        }
        blocks.extend(current);

        let segmentation = Segmentation {
            blocks,
            word_count,
            min_words: self.config.min_words,
            participants: roles.participants(),
            emitted_lines,
            skipped_duplicates,
            skipped_unmapped,
        };

        debug!(
            blocks = segmentation.blocks.len(),
            lines = emitted_lines,
            duplicates = skipped_duplicates,
            unmapped = skipped_unmapped,
            words = word_count,
            "segmented conversation"
        );
        if let Some(advisory) = segmentation.insufficient_content() {
            warn!(
                words = advisory.word_count,
                min_words = advisory.min_words,
                "conversation is below the recommended word count"
            );
        }

        segmentation
    }
}
