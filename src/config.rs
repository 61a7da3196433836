//! Configuration types for parsing, segmentation and submission.
//!
//! Every struct has a `Default`, builder-style `with_*` methods and serde
//! support so it can be loaded from a file by an embedding application.
//! Values that are normally supplied by the deployment (backend URL, word
//! threshold) can also be read from the environment.
//!
//! # Example
//!
//! ```rust
//! use chatclone::config::{DateOrder, ParserConfig, SegmenterConfig};
//!
//! let parser = ParserConfig::new()
//!     .with_strict_two_party(false)
//!     .with_date_order(DateOrder::DayFirst);
//!
//! let segmenter = SegmenterConfig::new()
//!     .with_max_gap_hours(2.0)
//!     .with_min_words(5_000);
//! ```

use std::env;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{ChatCloneError, Result};

/// Suffix of the transcript entry inside a WhatsApp export archive.
pub const DEFAULT_TRANSCRIPT_SUFFIX: &str = "_chat.txt";

/// Upper bound for the decompressed transcript (64 MiB).
pub const DEFAULT_MAX_TRANSCRIPT_BYTES: u64 = 64 * 1024 * 1024;

/// Recommended minimum number of words before training a clone.
pub const DEFAULT_MIN_WORDS: usize = 100_000;

/// Default backend request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the word threshold.
pub const MIN_WORDS_ENV: &str = "MIN_WORDS_FOR_LORA_GEN";

/// Environment variable holding the training backend base URL.
pub const BACKEND_URL_ENV: &str = "CHATCLONE_BACKEND_URL";

/// Environment variable holding the backend timeout in seconds.
pub const TIMEOUT_ENV: &str = "CHATCLONE_TIMEOUT_SECS";

/// Order of the numeric day and month fields in transcript dates.
///
/// WhatsApp writes dates in the phone's locale. The order is a fixed
/// setting and is never guessed from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `M/D/YY` as in US exports: `[1/26/25, 17:39:00]`
    #[default]
    MonthFirst,
    /// `D/M/YY` as in most European exports: `[26/1/25, 17:39:00]`
    DayFirst,
}

impl DateOrder {
    /// chrono format for `"<date> <time>"`, by width of the year field.
    pub(crate) fn parse_format(self, two_digit_year: bool) -> &'static str {
        match (self, two_digit_year) {
            (DateOrder::MonthFirst, true) => "%m/%d/%y %H:%M:%S",
            (DateOrder::MonthFirst, false) => "%m/%d/%Y %H:%M:%S",
            (DateOrder::DayFirst, true) => "%d/%m/%y %H:%M:%S",
            (DateOrder::DayFirst, false) => "%d/%m/%Y %H:%M:%S",
        }
    }
}

/// Configuration for [`ChatExportParser`](crate::parser::ChatExportParser).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Case-insensitive suffix identifying the transcript entry (default: `_chat.txt`)
    pub transcript_suffix: String,

    /// Require exactly two speakers after filtering (default: true)
    pub strict_two_party: bool,

    /// Day/month order of transcript dates (default: month first)
    pub date_order: DateOrder,

    /// Maximum decompressed transcript size in bytes (default: 64MB)
    pub max_transcript_bytes: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            transcript_suffix: DEFAULT_TRANSCRIPT_SUFFIX.to_string(),
            strict_two_party: true,
            date_order: DateOrder::default(),
            max_transcript_bytes: DEFAULT_MAX_TRANSCRIPT_BYTES,
        }
    }
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration accepting any number of speakers.
    pub fn permissive() -> Self {
        Self {
            strict_two_party: false,
            ..Self::default()
        }
    }

    /// Sets the transcript entry suffix.
    #[must_use]
    pub fn with_transcript_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.transcript_suffix = suffix.into();
        self
    }

    /// Enables or disables the two-party rule.
    #[must_use]
    pub fn with_strict_two_party(mut self, strict: bool) -> Self {
        self.strict_two_party = strict;
        self
    }

    /// Sets the date field order.
    #[must_use]
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    /// Sets the maximum decompressed transcript size.
    #[must_use]
    pub fn with_max_transcript_bytes(mut self, max: u64) -> Self {
        self.max_transcript_bytes = max;
        self
    }
}

/// Configuration for [`ConversationSegmenter`](crate::segment::ConversationSegmenter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Largest gap between consecutive lines inside one block, in hours (default: 1)
    pub max_gap_hours: f64,

    /// Drop a line identical to the previously emitted one (default: true)
    pub dedupe_consecutive_identical: bool,

    /// Word count below which the content is flagged as insufficient (default: 100k)
    pub min_words: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_gap_hours: 1.0,
            dedupe_consecutive_identical: true,
            min_words: DEFAULT_MIN_WORDS,
        }
    }
}

impl SegmenterConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults, overriding `min_words` from `MIN_WORDS_FOR_LORA_GEN`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(MIN_WORDS_ENV) {
            config.min_words = raw.trim().parse().map_err(|e| {
                ChatCloneError::invalid_config(MIN_WORDS_ENV, format!("{raw:?}: {e}"))
            })?;
        }
        Ok(config)
    }

    /// Sets the block gap threshold in hours.
    #[must_use]
    pub fn with_max_gap_hours(mut self, hours: f64) -> Self {
        self.max_gap_hours = hours;
        self
    }

    /// Enables or disables consecutive duplicate removal.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe_consecutive_identical = dedupe;
        self
    }

    /// Sets the advisory word threshold.
    #[must_use]
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    /// The gap threshold as a duration, at millisecond precision.
    ///
    /// Negative or non-finite values are treated as zero.
    pub fn max_gap(&self) -> TimeDelta {
        if !self.max_gap_hours.is_finite() || self.max_gap_hours <= 0.0 {
            return TimeDelta::zero();
        }
        let millis = (self.max_gap_hours * 3_600_000.0).round();
        if millis >= i64::MAX as f64 {
            return TimeDelta::MAX;
        }
        TimeDelta::milliseconds(millis as i64)
    }
}

/// Combined configuration for [`prepare`](crate::pipeline::prepare).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Archive and transcript parsing settings
    pub parser: ParserConfig,
    /// Block segmentation settings
    pub segmenter: SegmenterConfig,
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the parser settings.
    #[must_use]
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the segmenter settings.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.segmenter = segmenter;
        self
    }
}

/// Connection settings for the external training backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub base_url: String,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    /// Creates a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reads `CHATCLONE_BACKEND_URL` and `CHATCLONE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(BACKEND_URL_ENV)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ChatCloneError::invalid_config(BACKEND_URL_ENV, "not set"))?;

        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ChatCloneError::invalid_config(TIMEOUT_ENV, format!("{raw:?}: {e}")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            timeout_secs,
        })
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full URL of an endpoint below the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
