//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Cli`] / [`Command`] - top-level arguments and subcommands
//! - [`ExportArgs`], [`SegmentArgs`] - argument groups shared by subcommands
//! - [`TextFormat`] - the `--format` values
//!
//! The argument structs also know how to turn themselves into library
//! configuration, so the binary stays a thin shell:
//!
//! ```rust
//! use chatclone::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::try_parse_from(["chatclone", "speakers", "chat.zip", "--day-first"]).unwrap();
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{BackendConfig, DateOrder, ParserConfig, PipelineConfig, SegmenterConfig};
use crate::error::Result;
use crate::payload::RawTextFormat;
use crate::roles::RoleMapping;

/// Prepare WhatsApp chat exports as voice-clone training data.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatclone")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatclone speakers \"WhatsApp Chat - Bob.zip\"
    chatclone prepare chat.zip --target Bob -o payload.json
    chatclone prepare group.zip --permissive --target Bob --user Alice --user Carol
    chatclone submit chat.zip --target Bob --lora-id 42 --backend-url http://localhost:8000")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the speakers found in an export
    Speakers(ExportArgs),

    /// Build the training payload and write or summarise it
    Prepare(PrepareArgs),

    /// Build the training payload and send it to the backend
    Submit(SubmitArgs),
}

/// Which export to read and how to parse it.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Path to the exported .zip archive
    pub archive: PathBuf,

    /// Accept chats with any number of speakers
    #[arg(long)]
    pub permissive: bool,

    /// Dates are day/month/year instead of month/day/year
    #[arg(long)]
    pub day_first: bool,
}

impl ExportArgs {
    pub fn parser_config(&self) -> ParserConfig {
        let order = if self.day_first {
            DateOrder::DayFirst
        } else {
            DateOrder::MonthFirst
        };
        ParserConfig::new()
            .with_strict_two_party(!self.permissive)
            .with_date_order(order)
    }
}

/// Role assignment and block segmentation.
#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    /// Speaker to clone (becomes the Assistant)
    #[arg(long, value_name = "NAME")]
    pub target: String,

    /// Speaker playing the User role; repeat for group chats
    #[arg(long = "user", value_name = "NAME")]
    pub users: Vec<String>,

    /// Start a new block after this many hours of silence
    #[arg(long, value_name = "HOURS", default_value_t = 1.0)]
    pub max_gap_hours: f64,

    /// Keep consecutive identical lines
    #[arg(long)]
    pub no_dedupe: bool,

    /// Recommended minimum word count [default: $MIN_WORDS_FOR_LORA_GEN or 100000]
    #[arg(long, value_name = "N")]
    pub min_words: Option<usize>,
}

impl SegmentArgs {
    /// Segmenter settings; `min_words` falls back to the environment.
    pub fn segmenter_config(&self) -> Result<SegmenterConfig> {
        let mut config = SegmenterConfig::from_env()?
            .with_max_gap_hours(self.max_gap_hours)
            .with_dedupe(!self.no_dedupe);
        if let Some(min_words) = self.min_words {
            config = config.with_min_words(min_words);
        }
        Ok(config)
    }

    /// Explicit mapping when `--user` was given, `None` to infer it.
    pub fn role_mapping(&self) -> Result<Option<RoleMapping>> {
        if self.users.is_empty() {
            return Ok(None);
        }
        RoleMapping::explicit(self.target.clone(), self.users.iter().cloned()).map(Some)
    }
}

#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub export: ExportArgs,

    #[command(flatten)]
    pub segment: SegmentArgs,

    /// LoRA identifier for the payload [default: derived from --target]
    #[arg(long, value_name = "ID")]
    pub lora_id: Option<String>,

    /// Write the payload JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Shape of the rawText field
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: TextFormat,
}

impl PrepareArgs {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        pipeline_config(&self.export, &self.segment)
    }

    pub fn lora_id(&self) -> String {
        self.lora_id
            .clone()
            .unwrap_or_else(|| default_lora_id(&self.segment.target))
    }
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub export: ExportArgs,

    #[command(flatten)]
    pub segment: SegmentArgs,

    /// LoRA identifier registered with the backend
    #[arg(long, value_name = "ID")]
    pub lora_id: String,

    /// Shape of the rawText field; the backend reads it as JSON lines
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: TextFormat,

    /// Backend base URL [default: $CHATCLONE_BACKEND_URL]
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Request timeout in seconds [default: $CHATCLONE_TIMEOUT_SECS or 60]
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Submit even when the chat is below the recommended word count
    #[arg(long)]
    pub force: bool,
}

impl SubmitArgs {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        pipeline_config(&self.export, &self.segment)
    }

    /// Backend settings; flags override the environment.
    pub fn backend_config(&self) -> Result<BackendConfig> {
        let mut config = match &self.backend_url {
            Some(url) => BackendConfig::new(url.clone()),
            None => BackendConfig::from_env()?,
        };
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        Ok(config)
    }
}

fn pipeline_config(export: &ExportArgs, segment: &SegmentArgs) -> Result<PipelineConfig> {
    Ok(PipelineConfig::new()
        .with_parser(export.parser_config())
        .with_segmenter(segment.segmenter_config()?))
}

/// Lowercased target name with runs of other characters collapsed to `-`.
pub fn default_lora_id(target: &str) -> String {
    let mut id = String::with_capacity(target.len());
    for c in target.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            id.push(c);
        } else if !id.is_empty() && !id.ends_with('-') {
            id.push('-');
        }
    }
    let trimmed = id.trim_end_matches('-');
    if trimmed.is_empty() {
        "lora".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Values accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Newline-joined "Role: text" lines
    #[default]
    Plain,

    /// One {"text": line} record per "Role: text" line
    Jsonl,

    /// One {"text": block} record per conversation block
    Blocks,
}

impl std::fmt::Display for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextFormat::Plain => write!(f, "plain"),
            TextFormat::Jsonl => write!(f, "JSONL"),
            TextFormat::Blocks => write!(f, "JSONL (per block)"),
        }
    }
}

impl From<TextFormat> for RawTextFormat {
    fn from(format: TextFormat) -> RawTextFormat {
        match format {
            TextFormat::Plain => RawTextFormat::Plain,
            TextFormat::Jsonl => RawTextFormat::JsonLines,
            TextFormat::Blocks => RawTextFormat::JsonBlocks,
        }
    }
}
