//! # Chatclone
//!
//! Turns a WhatsApp chat export into training data for a voice clone of
//! one of its participants.
//!
//! ## Overview
//!
//! A WhatsApp "Export chat" archive goes through four steps:
//!
//! 1. **Extract** the `_chat.txt` transcript from the zip ([`archive`])
//! 2. **Parse** it into timestamped [`Message`]s, dropping system notices,
//!    media placeholders and malformed lines ([`parser`])
//! 3. **Segment** the messages into `User:`/`Assistant:` conversation blocks
//!    split on long silences ([`segment`])
//! 4. **Package** the blocks as a [`TrainingPayload`](payload::TrainingPayload)
//!    and optionally submit it to the training backend (`submit`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatclone::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let archive = std::fs::read("WhatsApp Chat - Bob.zip")?;
//!     let prepared = prepare(&archive, "Bob", &PipelineConfig::default())?;
//!
//!     if let Some(advisory) = prepared.segmentation.insufficient_content() {
//!         eprintln!("warning: {advisory}");
//!     }
//!
//!     let payload = prepared.payload("bob-v1", RawTextFormat::Plain)?;
//!     payload.write_to("payload.json".as_ref())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`archive`] - transcript lookup and decoding inside the zip
//! - [`parsing`] - WhatsApp line grammar, normalisation and filters
//! - [`parser`] - [`ChatExportParser`](parser::ChatExportParser), [`ParsedExport`](parser::ParsedExport)
//! - [`roles`] - [`RoleMapping`](roles::RoleMapping) from speakers to roles
//! - [`segment`] - [`ConversationSegmenter`](segment::ConversationSegmenter)
//! - [`payload`] - [`TrainingPayload`](payload::TrainingPayload), [`RawTextFormat`](payload::RawTextFormat)
//! - [`pipeline`] - [`prepare`](pipeline::prepare) in one call
//! - [`config`] - configuration types
//! - [`error`] - [`ChatCloneError`], [`Result`]
//! - `submit` - blocking backend client (feature `submit`)
//! - `cli` - command-line argument types (feature `cli`)

pub mod archive;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod message;
pub mod parser;
pub mod parsing;
pub mod payload;
pub mod pipeline;
pub mod roles;
pub mod segment;
#[cfg(feature = "submit")]
pub mod submit;

pub use error::{ChatCloneError, Result};
pub use message::{Message, Role};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatclone::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Message, Role};

    pub use crate::error::{ChatCloneError, Result};

    pub use crate::config::{
        BackendConfig, DateOrder, ParserConfig, PipelineConfig, SegmenterConfig,
    };

    pub use crate::parser::{ChatExportParser, ParseStats, ParseWarning, ParsedExport};

    pub use crate::roles::{Participants, RoleMapping};

    pub use crate::segment::{
        ConversationBlock, ConversationSegmenter, InsufficientContent, Segmentation,
    };

    pub use crate::payload::{RawTextFormat, TrainingPayload};

    pub use crate::pipeline::{Prepared, prepare, prepare_with_roles};

    #[cfg(feature = "submit")]
    pub use crate::submit::{SubmissionReceipt, TrainingClient};
}
