//! Transcript-level parsing utilities.
//!
//! [`whatsapp`] holds the line grammar, normalisation, filters and timestamp
//! rules that [`ChatExportParser`](crate::parser::ChatExportParser) applies
//! line by line.

pub mod whatsapp;

pub use whatsapp::{
    RawLine, SkipReason, is_media_placeholder, is_system_notice, match_line, normalize,
    parse_timestamp, skip_reason,
};
