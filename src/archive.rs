//! Transcript extraction from WhatsApp export archives.
//!
//! A WhatsApp "Export chat" produces a zip with the transcript (`_chat.txt`)
//! next to any attached media. Only the transcript is read; media entries
//! are never decompressed.

use std::io::{Cursor, Read};

use tracing::warn;
use zip::ZipArchive;

use crate::error::{ChatCloneError, Result};

/// Transcript text pulled out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Name of the archive entry that was read.
    pub entry_name: String,
    /// Decoded UTF-8 text, without byte order mark.
    pub text: String,
    /// Every entry matching the suffix, sorted by name. More than one means
    /// the choice of `entry_name` was a tie-break.
    pub candidates: Vec<String>,
}

/// Returns `true` if an entry name ends with `suffix`, ignoring ASCII and
/// Unicode case.
pub fn matches_suffix(name: &str, suffix: &str) -> bool {
    name.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// Locates and decodes the transcript entry of a zip archive.
///
/// When several entries match, the lexicographically smallest name wins so
/// the result never depends on the container's listing order.
///
/// # Errors
///
/// - [`ChatCloneError::Archive`] if the bytes are not a readable zip
/// - [`ChatCloneError::NoTranscriptFound`] if no entry matches `suffix`
/// - [`ChatCloneError::TranscriptTooLarge`] if the entry inflates past `max_bytes`
/// - [`ChatCloneError::Utf8`] if the entry is not UTF-8
pub fn extract_transcript(archive: &[u8], suffix: &str, max_bytes: u64) -> Result<Transcript> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;

    let mut candidates = Vec::new();
    for index in 0..zip.len() {
        let entry = zip.by_index_raw(index)?;
        if !entry.is_dir() && matches_suffix(entry.name(), suffix) {
            candidates.push(entry.name().to_string());
        }
    }
    candidates.sort();

    let Some(entry_name) = candidates.first().cloned() else {
        return Err(ChatCloneError::no_transcript(suffix));
    };

    if candidates.len() > 1 {
        warn!(
            chosen = %entry_name,
            count = candidates.len(),
            "archive contains several transcripts; using the first by name"
        );
    }

    let entry = zip.by_name(&entry_name)?;
    if entry.size() > max_bytes {
        return Err(ChatCloneError::transcript_too_large(max_bytes, entry.size()));
    }

    // The declared size can lie, so the read itself is capped as well.
    let mut raw = Vec::with_capacity(entry.size() as usize);
    entry.take(max_bytes.saturating_add(1)).read_to_end(&mut raw)?;
    if raw.len() as u64 > max_bytes {
        return Err(ChatCloneError::transcript_too_large(
            max_bytes,
            raw.len() as u64,
        ));
    }

    Ok(Transcript {
        entry_name,
        text: decode_text(raw)?,
        candidates,
    })
}

/// Decodes transcript bytes as UTF-8, dropping a leading byte order mark.
pub fn decode_text(raw: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(raw)?;
    Ok(match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
