//! WhatsApp transcript line grammar.
//!
//! Each physical line of a `_chat.txt` transcript either matches
//!
//! ```text
//! [<date>, <time>] <speaker>: <message>
//! ```
//!
//! or is noise. Lines that continue a multi-line message are noise too: they
//! are dropped, not appended to the previous message.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::DateOrder;

/// Left-to-right mark that iOS exports sprinkle around names and
/// attachment lines.
pub const LTR_MARK: char = '\u{200E}';

/// Name WhatsApp uses for the exporting user in some exports.
pub const SELF_PLACEHOLDER: &str = "You";

/// `[M/D/YY, HH:MM:SS] Speaker: message`, with leading LTR marks tolerated.
pub const LINE_PATTERN: &str =
    r"^\x{200E}*\[(\d{1,2}/\d{1,2}/\d{2,4}), (\d{1,2}:\d{2}:\d{2})\] (.*?): (.*)";

/// Prefixes of notices WhatsApp writes into the transcript as if someone
/// had said them.
const SYSTEM_NOTICES: &[&str] = &[
    "Messages and calls are end-to-end encrypted",
    "Messages to this chat and calls are now secured with end-to-end encryption",
    "Your security code with",
];

/// Bodies that stand in for attachments in exports made without media.
const MEDIA_PLACEHOLDERS: &[&str] = &[
    "image omitted",
    "video omitted",
    "audio omitted",
    "sticker omitted",
    "GIF omitted",
    "document omitted",
    "<Media omitted>",
];

static LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LINE_PATTERN).expect("transcript line pattern is valid"));

/// The four captured fields of a matching transcript line, unnormalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub speaker: &'a str,
    pub message: &'a str,
}

/// Splits a line into its fields, or `None` if it doesn't follow the grammar.
///
/// The speaker is the shortest run up to the first `": "`, so colons later
/// in the message are kept.
pub fn match_line(line: &str) -> Option<RawLine<'_>> {
    let caps = LINE_REGEX.captures(line)?;
    Some(RawLine {
        date: caps.get(1)?.as_str(),
        time: caps.get(2)?.as_str(),
        speaker: caps.get(3)?.as_str(),
        message: caps.get(4)?.as_str(),
    })
}

/// Removes every LTR mark and trims surrounding whitespace.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.chars().filter(|&c| c != LTR_MARK).collect();
    stripped.trim().to_string()
}

/// Returns `true` for WhatsApp's own notices (encryption banner, security
/// code changes).
pub fn is_system_notice(message: &str) -> bool {
    SYSTEM_NOTICES
        .iter()
        .any(|notice| message.starts_with(notice))
}

/// Returns `true` if the whole body is an attachment placeholder.
pub fn is_media_placeholder(message: &str) -> bool {
    MEDIA_PLACEHOLDERS.contains(&message)
}

/// Why a grammatical line did not become a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyBody,
    SystemNotice,
    MediaPlaceholder,
    SelfPlaceholder,
}

/// Applies the content filters to a normalised speaker and body.
pub fn skip_reason(speaker: &str, message: &str) -> Option<SkipReason> {
    if message.is_empty() {
        Some(SkipReason::EmptyBody)
    } else if is_system_notice(message) {
        Some(SkipReason::SystemNotice)
    } else if is_media_placeholder(message) {
        Some(SkipReason::MediaPlaceholder)
    } else if speaker == SELF_PLACEHOLDER {
        Some(SkipReason::SelfPlaceholder)
    } else {
        None
    }
}

/// Parses the date and time fields with a fixed day/month order.
///
/// Two-digit years are read as 2000-2068 / 1969-1999 (chrono `%y`).
/// Returns `None` for impossible dates such as `2/30/25`.
pub fn parse_timestamp(date: &str, time: &str, order: DateOrder) -> Option<DateTime<Utc>> {
    let year = date.rsplit('/').next()?;
    let format = order.parse_format(year.len() == 2);

    NaiveDateTime::parse_from_str(&format!("{date} {time}"), format)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_match_line_fields() {
        let line = "[1/26/25, 17:39:52] Ethan Brook: message: with colon";
        let raw = match_line(line).unwrap();
        assert_eq!(raw.date, "1/26/25");
        assert_eq!(raw.time, "17:39:52");
        assert_eq!(raw.speaker, "Ethan Brook");
        assert_eq!(raw.message, "message: with colon");
    }

    #[test]
    fn test_match_line_rejects_noise() {
        assert!(match_line("just a continuation line").is_none());
        assert!(match_line("").is_none());
        // Android style, no brackets
        assert!(match_line("26/01/2025, 17:39 - Alice: hi").is_none());
        // Missing seconds
        assert!(match_line("[1/26/25, 17:39] Alice: hi").is_none());
        // No ": " separator after the speaker
        assert!(match_line("[1/26/25, 17:39:00] Alice joined").is_none());
    }

    #[test]
    fn test_match_line_with_leading_ltr_mark() {
        let raw = match_line("\u{200E}[1/26/25, 17:39:00] Alice: \u{200E}image omitted").unwrap();
        assert_eq!(raw.speaker, "Alice");
        assert_eq!(normalize(raw.message), "image omitted");
    }

    #[test]
    fn test_match_line_empty_message() {
        let raw = match_line("[1/26/25, 17:39:00] Alice: ").unwrap();
        assert_eq!(raw.message, "");
    }

    #[test]
    fn test_normalize_strips_marks_everywhere() {
        assert_eq!(normalize("  \u{200E}Ali\u{200E}ce \u{200E} "), "Alice");
        assert_eq!(normalize("\u{200E}"), "");
        // Other zero-width characters are left alone
        assert_eq!(normalize("a\u{200B}b"), "a\u{200B}b");
    }

    #[test]
    fn test_skip_reasons() {
        assert_eq!(skip_reason("Alice", ""), Some(SkipReason::EmptyBody));
        assert_eq!(
            skip_reason(
                "Alice",
                "Messages and calls are end-to-end encrypted. No one outside of this chat can read them."
            ),
            Some(SkipReason::SystemNotice)
        );
        assert_eq!(
            skip_reason("Alice", "image omitted"),
            Some(SkipReason::MediaPlaceholder)
        );
        assert_eq!(skip_reason("You", "hi"), Some(SkipReason::SelfPlaceholder));
        assert_eq!(skip_reason("Alice", "hello there"), None);
        // Placeholders only match the whole body
        assert_eq!(skip_reason("Alice", "the image omitted earlier"), None);
        assert_eq!(skip_reason("Younes", "hi"), None);
    }

    #[test]
    fn test_parse_timestamp_month_first() {
        let ts = parse_timestamp("1/26/25", "17:39:52", DateOrder::MonthFirst).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 26, 17, 39, 52).unwrap());

        let ts = parse_timestamp("12/3/2024", "9:05:00", DateOrder::MonthFirst).unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 12, 3));
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_parse_timestamp_day_first() {
        let ts = parse_timestamp("26/1/25", "17:39:00", DateOrder::DayFirst).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 26, 17, 39, 0).unwrap());
        assert!(parse_timestamp("26/1/25", "17:39:00", DateOrder::MonthFirst).is_none());
    }

    #[test]
    fn test_parse_timestamp_invalid_date() {
        assert!(parse_timestamp("2/30/25", "10:00:00", DateOrder::MonthFirst).is_none());
        assert!(parse_timestamp("1/1/25", "25:00:00", DateOrder::MonthFirst).is_none());
    }
}
