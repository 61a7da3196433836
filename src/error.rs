//! Unified error types for chatclone.
//!
//! Every fallible operation in the crate returns [`ChatCloneError`]. Noise in
//! the transcript (lines that don't match the grammar, media placeholders,
//! system notices) is never an error: it is counted in
//! [`ParseStats`](crate::parser::ParseStats) and dropped.
//!
//! Two conditions are reported as values instead of errors:
//! - several transcript entries in one archive, reported as a
//!   [`ParseWarning`](crate::parser::ParseWarning)
//! - too few words for training, reported as an
//!   [`InsufficientContent`](crate::segment::InsufficientContent) advisory

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatclone operations.
///
/// # Example
///
/// ```rust
/// use chatclone::error::Result;
/// use chatclone::Message;
///
/// fn load() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatCloneError>;

/// The error type for all chatclone operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatCloneError {
    /// An I/O error occurred while reading an archive or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive container could not be read.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The transcript entry is not valid UTF-8.
    #[error("UTF-8 encoding error in {context}: {source}")]
    Utf8 {
        /// Description of where the error occurred
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The archive has no entry whose name ends with the transcript suffix.
    ///
    /// The user has to export the chat again.
    #[error("No '{suffix}' transcript found in the archive")]
    NoTranscriptFound {
        /// The suffix that was searched for
        suffix: String,
    },

    /// The transcript entry decompresses to more bytes than allowed.
    #[error("Transcript too large: {actual_size} bytes (maximum: {max_size} bytes)")]
    TranscriptTooLarge {
        /// Maximum allowed size in bytes
        max_size: u64,
        /// Size that was declared or read
        actual_size: u64,
    },

    /// The chat doesn't have the number of participants the parser accepts.
    ///
    /// In two-party mode exactly 2 speakers must remain after filtering.
    #[error(
        "Unsupported participant count: {count} (only one-on-one chats with exactly 2 participants are supported)"
    )]
    UnsupportedParticipantCount {
        /// Number of distinct speakers observed
        count: usize,
    },

    /// The requested speaker does not appear in the chat.
    #[error("Unknown speaker '{speaker}'")]
    UnknownSpeaker {
        /// The speaker that was requested
        speaker: String,
    },

    /// Roles can only be inferred for two speakers; anything else needs an
    /// explicit mapping.
    #[error(
        "Cannot infer roles for {count} speakers; supply an explicit speaker to role mapping"
    )]
    AmbiguousRoles {
        /// Number of speakers in the chat
        count: usize,
    },

    /// An explicit role mapping is inconsistent.
    #[error("Invalid role mapping: {message}")]
    InvalidRoleMapping {
        /// Description of what's wrong
        message: String,
    },

    /// A configuration value could not be used.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig {
        /// The configuration key or flag
        key: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// The training backend could not be reached or rejected the payload.
    ///
    /// Never retried automatically; see [`ChatCloneError::is_retryable`].
    #[error("Upstream submission failed{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    UpstreamSubmission {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Transport error or response body
        message: String,
    },
}

impl From<std::string::FromUtf8Error> for ChatCloneError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ChatCloneError::Utf8 {
            context: "transcript decoding".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatCloneError {
    /// Creates a missing-transcript error.
    pub fn no_transcript(suffix: impl Into<String>) -> Self {
        ChatCloneError::NoTranscriptFound {
            suffix: suffix.into(),
        }
    }

    /// Creates a transcript size error.
    pub fn transcript_too_large(max_size: u64, actual_size: u64) -> Self {
        ChatCloneError::TranscriptTooLarge {
            max_size,
            actual_size,
        }
    }

    /// Creates an unknown speaker error.
    pub fn unknown_speaker(speaker: impl Into<String>) -> Self {
        ChatCloneError::UnknownSpeaker {
            speaker: speaker.into(),
        }
    }

    /// Creates an invalid role mapping error.
    pub fn invalid_roles(message: impl Into<String>) -> Self {
        ChatCloneError::InvalidRoleMapping {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(key: &'static str, message: impl Into<String>) -> Self {
        ChatCloneError::InvalidConfig {
            key,
            message: message.into(),
        }
    }

    /// Creates an upstream submission error.
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        ChatCloneError::UpstreamSubmission {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatCloneError::Io(_))
    }

    /// Returns `true` if the archive itself was unusable (bad container,
    /// no transcript, oversized transcript, bad encoding).
    pub fn is_archive(&self) -> bool {
        matches!(
            self,
            ChatCloneError::Archive(_)
                | ChatCloneError::NoTranscriptFound { .. }
                | ChatCloneError::TranscriptTooLarge { .. }
                | ChatCloneError::Utf8 { .. }
        )
    }

    /// Returns `true` if this is a participant or role error.
    pub fn is_participants(&self) -> bool {
        matches!(
            self,
            ChatCloneError::UnsupportedParticipantCount { .. }
                | ChatCloneError::UnknownSpeaker { .. }
                | ChatCloneError::AmbiguousRoles { .. }
                | ChatCloneError::InvalidRoleMapping { .. }
        )
    }

    /// Returns `true` if the caller may retry the same operation unchanged.
    ///
    /// Only upstream submission failures qualify: the payload itself is
    /// already valid, so the caller can resend it as is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatCloneError::UpstreamSubmission { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
