//! One-call preparation of training data from an export archive.
//!
//! [`prepare`] chains the stages the library exposes separately:
//!
//! ```text
//! archive bytes -> ChatExportParser -> RoleMapping -> ConversationSegmenter -> Prepared
//! ```
//!
//! The result still needs a LoRA id to become a
//! [`TrainingPayload`](crate::payload::TrainingPayload), see
//! [`Prepared::payload`].

use std::path::Path;

use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::parser::{ChatExportParser, ParsedExport};
use crate::payload::{RawTextFormat, TrainingPayload};
use crate::roles::RoleMapping;
use crate::segment::{ConversationSegmenter, Segmentation};

/// Everything produced on the way from archive to training blocks.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub export: ParsedExport,
    pub roles: RoleMapping,
    pub segmentation: Segmentation,
}

impl Prepared {
    /// Builds the backend payload for this chat.
    pub fn payload(
        &self,
        lora_id: impl Into<String>,
        format: RawTextFormat,
    ) -> Result<TrainingPayload> {
        TrainingPayload::from_segmentation(lora_id, &self.segmentation, format)
    }
}

/// Parses `archive` and segments it with `target` as the assistant.
///
/// Only valid for one-on-one chats; group chats need
/// [`prepare_with_roles`].
pub fn prepare(archive: &[u8], target: &str, config: &PipelineConfig) -> Result<Prepared> {
    let export = ChatExportParser::with_config(config.parser.clone()).parse(archive)?;
    let roles = RoleMapping::for_target(target, &export.speakers)?;
    Ok(finish(export, roles, config))
}

/// Parses `archive` and segments it with an explicit role mapping.
///
/// Every speaker named in `roles` must occur in the transcript.
pub fn prepare_with_roles(
    archive: &[u8],
    roles: RoleMapping,
    config: &PipelineConfig,
) -> Result<Prepared> {
    let export = ChatExportParser::with_config(config.parser.clone()).parse(archive)?;
    roles.validate_against(&export.speakers)?;
    Ok(finish(export, roles, config))
}

/// Reads an archive from disk and runs [`prepare`].
pub fn prepare_file(path: &Path, target: &str, config: &PipelineConfig) -> Result<Prepared> {
    let bytes = std::fs::read(path)?;
    prepare(&bytes, target, config)
}

fn finish(export: ParsedExport, roles: RoleMapping, config: &PipelineConfig) -> Prepared {
    let segmenter = ConversationSegmenter::with_config(config.segmenter.clone());
    let segmentation = segmenter.segment(&export.messages, &roles);
    debug!(
        assistant = roles.assistant(),
        blocks = segmentation.blocks.len(),
        "prepared export"
    );
    Prepared {
        export,
        roles,
        segmentation,
    }
}
