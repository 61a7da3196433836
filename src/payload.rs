//! Training payload sent to the external backend.
//!
//! The backend expects
//!
//! ```json
//! { "loraId": "...", "rawText": "...", "participants": { "user": "...", "assistant": "..." } }
//! ```
//!
//! `rawText` comes in three shapes, see [`RawTextFormat`]. The backend runs
//! `json.loads` on every line, so only [`RawTextFormat::JsonLines`] trains
//! on every turn.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::roles::Participants;
use crate::segment::{ConversationBlock, Segmentation};

/// Serialization of the conversation blocks inside `rawText`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawTextFormat {
    /// Every `"Role: text"` line of every block, newline-joined.
    #[default]
    Plain,
    /// One `{"text": "<Role>: <text>"}` JSON record per line of every block.
    #[serde(rename = "jsonl")]
    JsonLines,
    /// One `{"text": "<block>"}` JSON record per block.
    ///
    /// Keeps block boundaries; the block's own newlines are escaped inside
    /// the JSON string.
    #[serde(rename = "jsonl-blocks")]
    JsonBlocks,
}

impl RawTextFormat {
    /// Renders blocks in this format.
    pub fn render(self, blocks: &[ConversationBlock]) -> Result<String> {
        match self {
            RawTextFormat::Plain => Ok(blocks
                .iter()
                .map(ConversationBlock::render)
                .collect::<Vec<_>>()
                .join("\n")),
            RawTextFormat::JsonLines => {
                let mut records = Vec::new();
                for turn in blocks.iter().flat_map(|block| &block.turns) {
                    records.push(serde_json::to_string(&TextRecord { text: &turn.line() })?);
                }
                Ok(records.join("\n"))
            }
            RawTextFormat::JsonBlocks => {
                let mut records = Vec::with_capacity(blocks.len());
                for block in blocks {
                    records.push(serde_json::to_string(&TextRecord {
                        text: &block.render(),
                    })?);
                }
                Ok(records.join("\n"))
            }
        }
    }
}

impl std::fmt::Display for RawTextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawTextFormat::Plain => write!(f, "plain"),
            RawTextFormat::JsonLines => write!(f, "jsonl"),
            RawTextFormat::JsonBlocks => write!(f, "jsonl-blocks"),
        }
    }
}

impl FromStr for RawTextFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(RawTextFormat::Plain),
            "jsonl" | "ndjson" => Ok(RawTextFormat::JsonLines),
            "jsonl-blocks" | "blocks" => Ok(RawTextFormat::JsonBlocks),
            _ => Err(format!(
                "Unknown raw text format: '{}'. Expected one of: plain, jsonl, jsonl-blocks",
                s
            )),
        }
    }
}

#[derive(Serialize)]
struct TextRecord<'a> {
    text: &'a str,
}

/// Request body for the backend's voice generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPayload {
    pub lora_id: String,
    pub raw_text: String,
    pub participants: Participants,
}

impl TrainingPayload {
    /// Builds the payload from a segmentation.
    ///
    /// The word-count gate is not consulted here: a short chat still yields
    /// a payload.
    pub fn from_segmentation(
        lora_id: impl Into<String>,
        segmentation: &Segmentation,
        format: RawTextFormat,
    ) -> Result<Self> {
        Ok(Self {
            lora_id: lora_id.into(),
            raw_text: format.render(&segmentation.blocks)?,
            participants: segmentation.participants.clone(),
        })
    }

    /// The payload as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Writes the payload as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use crate::segment::ConversationSegmenter;
    use chrono::{TimeDelta, TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn segmentation() -> Segmentation {
        let base = Utc.with_ymd_and_hms(2025, 1, 26, 17, 0, 0).unwrap();
        let messages = vec![
            Message::new("Alice", "hello there", base),
            Message::new("Bob", "hi Alice", base + TimeDelta::minutes(1)),
            Message::new("Alice", "back again", base + TimeDelta::hours(3)),
        ];
        ConversationSegmenter::new()
            .segment_for_target(&messages, "Bob", &["Alice".to_string(), "Bob".to_string()])
            .unwrap()
    }

    #[test]
    fn test_plain_render() {
        let raw = RawTextFormat::Plain.render(&segmentation().blocks).unwrap();
        assert_eq!(raw, "User: hello there\nAssistant: hi Alice\nUser: back again");
    }

    #[test]
    fn test_jsonl_render_one_record_per_line() {
        let raw = RawTextFormat::JsonLines.render(&segmentation().blocks).unwrap();
        let texts: Vec<String> = raw
            .lines()
            .map(|line| {
                let record: serde_json::Value = serde_json::from_str(line).unwrap();
                record["text"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            texts,
            vec!["User: hello there", "Assistant: hi Alice", "User: back again"]
        );
    }

    #[test]
    fn test_jsonl_blocks_render_keeps_block_boundaries() {
        let raw = RawTextFormat::JsonBlocks.render(&segmentation().blocks).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["text"], "User: hello there\nAssistant: hi Alice");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["text"], "User: back again");
    }

    #[test]
    fn test_payload_json_shape() {
        let payload =
            TrainingPayload::from_segmentation("lora-42", &segmentation(), RawTextFormat::Plain)
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value["loraId"], "lora-42");
        assert_eq!(value["participants"]["user"], "Alice");
        assert_eq!(value["participants"]["assistant"], "Bob");
        assert!(value["rawText"].as_str().unwrap().starts_with("User: hello there"));
    }

    #[test]
    fn test_write_to_file() {
        let payload =
            TrainingPayload::from_segmentation("lora-1", &segmentation(), RawTextFormat::JsonLines)
                .unwrap();
        let temp = NamedTempFile::new().unwrap();
        payload.write_to(temp.path()).unwrap();

        let content = std::fs::read_to_string(temp.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["loraId"], "lora-1");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("plain".parse::<RawTextFormat>(), Ok(RawTextFormat::Plain));
        assert_eq!("JSONL".parse::<RawTextFormat>(), Ok(RawTextFormat::JsonLines));
        assert!("csv".parse::<RawTextFormat>().is_err());
        assert_eq!("blocks".parse::<RawTextFormat>(), Ok(RawTextFormat::JsonBlocks));
        assert_eq!(RawTextFormat::JsonLines.to_string(), "jsonl");
        assert_eq!(RawTextFormat::JsonBlocks.to_string(), "jsonl-blocks");
    }
}
