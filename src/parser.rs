//! WhatsApp export parser.
//!
//! [`ChatExportParser`] turns the bytes of an exported `.zip` into an ordered
//! list of [`Message`]s and the set of people who wrote them.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatclone::config::ParserConfig;
//! use chatclone::parser::ChatExportParser;
//!
//! let parser = ChatExportParser::with_config(ParserConfig::new());
//! let export = parser.parse_file("WhatsApp Chat - Bob.zip".as_ref())?;
//!
//! for speaker in &export.speakers {
//!     println!("{speaker}");
//! }
//! # Ok::<(), chatclone::ChatCloneError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::Message;
use crate::archive::extract_transcript;
use crate::config::ParserConfig;
use crate::error::{ChatCloneError, Result};
use crate::parsing::whatsapp::{self, SkipReason};

/// Parser for WhatsApp chat export archives.
///
/// The parser holds only configuration: every call starts from scratch, so
/// parsing the same bytes twice always yields the same result.
#[derive(Debug, Clone, Default)]
pub struct ChatExportParser {
    config: ParserConfig,
}

/// Result of parsing one export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedExport {
    /// Archive entry the transcript was read from (`None` for raw text).
    pub transcript_name: Option<String>,
    /// Messages in transcript order.
    pub messages: Vec<Message>,
    /// Distinct speakers in order of first appearance.
    pub speakers: Vec<String>,
    /// Line counters.
    pub stats: ParseStats,
    /// Non-fatal conditions the caller should surface.
    pub warnings: Vec<ParseWarning>,
}

/// Counts of what happened to each transcript line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Physical non-empty lines in the transcript.
    pub total_lines: usize,
    /// Lines matching the grammar with a valid timestamp.
    pub matched_lines: usize,
    /// Lines that became messages.
    pub kept: usize,
    /// Lines outside the grammar, including multi-line continuations.
    pub dropped_malformed: usize,
    /// Grammatical lines removed by a content filter.
    pub dropped_filtered: usize,
}

/// Non-fatal findings about an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// More than one entry matched the transcript suffix.
    MultipleTranscriptsFound {
        /// Entry that was parsed
        chosen: String,
        /// All matching entries, sorted by name
        candidates: Vec<String>,
    },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::MultipleTranscriptsFound { chosen, candidates } => write!(
                f,
                "{} transcripts found in the archive ({}); using '{}'",
                candidates.len(),
                candidates.join(", "),
                chosen
            ),
        }
    }
}

impl ChatExportParser {
    /// Creates a parser with the default two-party configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses an export archive held in memory.
    pub fn parse(&self, archive: &[u8]) -> Result<ParsedExport> {
        let transcript = extract_transcript(
            archive,
            &self.config.transcript_suffix,
            self.config.max_transcript_bytes,
        )?;

        let mut export = self.parse_transcript(&transcript.text)?;
        if transcript.candidates.len() > 1 {
            export.warnings.push(ParseWarning::MultipleTranscriptsFound {
                chosen: transcript.entry_name.clone(),
                candidates: transcript.candidates,
            });
        }
        export.transcript_name = Some(transcript.entry_name);
        Ok(export)
    }

    /// Reads and parses an export archive from disk.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedExport> {
        let bytes = fs::read(path)?;
        self.parse(&bytes)
    }

    /// Parses transcript text that has already been taken out of its archive.
    pub fn parse_transcript(&self, text: &str) -> Result<ParsedExport> {
        let mut messages = Vec::new();
        let mut speakers: Vec<String> = Vec::new();
        let mut stats = ParseStats::default();

        // Line numbers count LF-terminated lines; a lone CR also splits.
        let lines = text.split('\n').enumerate().flat_map(|(index, physical)| {
            physical
                .split('\r')
                .filter(|line| !line.is_empty())
                .map(move |line| (index + 1, line))
        });

        for (line_no, line) in lines {
            stats.total_lines += 1;

            let Some(raw) = whatsapp::match_line(line) else {
                stats.dropped_malformed += 1;
                continue;
            };
            let Some(timestamp) =
                whatsapp::parse_timestamp(raw.date, raw.time, self.config.date_order)
            else {
                stats.dropped_malformed += 1;
                continue;
            };
            stats.matched_lines += 1;

            let speaker = whatsapp::normalize(raw.speaker);
            let body = whatsapp::normalize(raw.message);

            if let Some(reason) = whatsapp::skip_reason(&speaker, &body) {
                if reason != SkipReason::EmptyBody {
                    debug!(line = line_no, ?reason, "skipping transcript line");
                }
                stats.dropped_filtered += 1;
                continue;
            }

            if !speakers.contains(&speaker) {
                speakers.push(speaker.clone());
            }
            messages.push(Message {
                speaker,
                body,
                timestamp,
                line: line_no,
            });
            stats.kept += 1;
        }

        debug!(
            total = stats.total_lines,
            kept = stats.kept,
            malformed = stats.dropped_malformed,
            filtered = stats.dropped_filtered,
            speakers = speakers.len(),
            "parsed transcript"
        );

        self.check_participants(speakers.len())?;

        Ok(ParsedExport {
            transcript_name: None,
            messages,
            speakers,
            stats,
            warnings: Vec::new(),
        })
    }

    fn check_participants(&self, count: usize) -> Result<()> {
        let accepted = if self.config.strict_two_party {
            count == 2
        } else {
            count >= 1
        };
        if accepted {
            Ok(())
        } else {
            Err(ChatCloneError::UnsupportedParticipantCount { count })
        }
    }
}
