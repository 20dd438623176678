//! Twee story-file parser.
//!
//! A story file is a sequence of passages. Every passage starts with a header
//! line beginning with `::`; the lines up to the next header are its body.
//! Two header names are reserved:
//!
//! - `StoryTitle`: the body is the story title
//! - `StoryData`: the body is a JSON object (see [`StoryMetadata`])
//!
//! Every other passage becomes a [`Passage`] whose description is the first
//! body line and whose links are the `[[...]]` tokens found anywhere in the body.
//! Link targets are plain names; they may point forward to passages that appear
//! later in the file, or back at the passage itself.

mod metadata;
mod passage;

pub use metadata::*;
pub use passage::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Token that opens every passage header.
pub const PASSAGE_SEPARATOR: &str = "::";

/// Reserved header holding the story title.
pub const STORY_TITLE: &str = "StoryTitle";

/// Reserved header holding the JSON metadata block.
pub const STORY_DATA: &str = "StoryData";

/// Title used when the file has no `StoryTitle` passage.
pub const UNTITLED: &str = "Untitled Story";

/// Errors from parsing a story file. None of them return a partial story.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("story file has no StoryData block")]
    MissingStoryData,

    #[error("story file has more than one StoryData block")]
    DuplicateStoryData,

    #[error("unsupported story format '{found}', only Harlowe is supported")]
    UnsupportedFormat { found: String },

    #[error("malformed StoryData JSON: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("failed to read story file: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully parsed story file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStory {
    pub title: String,
    pub metadata: StoryMetadata,
    /// Passages in source order, reserved passages excluded.
    pub passages: Vec<Passage>,
}

impl ParsedStory {
    /// Look up a passage by name.
    pub fn passage(&self, name: &str) -> Option<&Passage> {
        self.passages.iter().find(|p| p.name == name)
    }

    /// Total number of links across all passages.
    pub fn link_count(&self) -> usize {
        self.passages.iter().map(|p| p.links.len()).sum()
    }

    /// Name of the passage new players start at.
    pub fn start(&self) -> &str {
        &self.metadata.start
    }
}

/// Parse story-file text.
pub fn parse(text: &str) -> Result<ParsedStory, ParseError> {
    let text = text.replace("\r\n", "\n");

    let mut title = None;
    let mut metadata = None;
    let mut passages = Vec::new();

    for (header, body) in split_passages(&text) {
        let (name, tags) = split_header(header);
        if name.is_empty() {
            continue;
        }

        match name.as_str() {
            STORY_TITLE => {
                title = Some(body.trim().to_string());
            }
            STORY_DATA => {
                if metadata.is_some() {
                    return Err(ParseError::DuplicateStoryData);
                }
                let decoded: StoryMetadata = serde_json::from_str(body.trim())?;
                if !decoded.is_supported_format() {
                    return Err(ParseError::UnsupportedFormat {
                        found: decoded.format.clone().unwrap_or_default(),
                    });
                }
                metadata = Some(decoded);
            }
            _ => passages.push(Passage::from_body(name, tags, body)),
        }
    }

    let metadata = metadata.ok_or(ParseError::MissingStoryData)?;

    Ok(ParsedStory {
        title: title.unwrap_or_else(|| UNTITLED.to_string()),
        metadata,
        passages,
    })
}

/// Read a story file fully, then parse it.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedStory, ParseError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Split text into `(header, body)` pairs. Text before the first header is dropped.
fn split_passages(text: &str) -> Vec<(&str, &str)> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with(PASSAGE_SEPARATOR) {
            starts.push(offset);
        }
        offset += line.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let chunk = &text[start + PASSAGE_SEPARATOR.len()..end];
            match chunk.split_once('\n') {
                Some((header, body)) => (header, body),
                None => (chunk, ""),
            }
        })
        .collect()
}
