//! `StoryData` metadata block.

use serde::{Deserialize, Serialize};

/// The only story format the importer understands.
pub const SUPPORTED_FORMAT: &str = "Harlowe";

/// Metadata carried by the `StoryData` passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMetadata {
    /// Interactive fiction identifier.
    #[serde(default)]
    pub ifid: Option<String>,

    /// Story format name, e.g. "Harlowe".
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default, rename = "format-version")]
    pub format_version: Option<String>,

    /// Name of the passage new players start at.
    pub start: String,

    #[serde(default)]
    pub zoom: Option<f64>,

    /// Keys the importer does not interpret (tag colors, etc).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StoryMetadata {
    /// Create metadata with only a start passage.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            ifid: None,
            format: Some(SUPPORTED_FORMAT.to_string()),
            format_version: None,
            start: start.into(),
            zoom: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the declared format is one we can import. A missing format is accepted.
    pub fn is_supported_format(&self) -> bool {
        self.format
            .as_deref()
            .map_or(true, |format| format == SUPPORTED_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_block() {
        let json = r#"{
            "ifid": "43048DD4-5A6B-4D29-BCC6-F418D5460FED",
            "format": "Harlowe",
            "format-version": "3.3.9",
            "start": "Introduction",
            "zoom": 1
        }"#;
        let metadata: StoryMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.start, "Introduction");
        assert_eq!(metadata.format_version.as_deref(), Some("3.3.9"));
        assert_eq!(metadata.zoom, Some(1.0));
        assert!(metadata.is_supported_format());
        assert!(metadata.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let json = r#"{"start": "A", "tag-colors": {"end": "red"}}"#;
        let metadata: StoryMetadata = serde_json::from_str(json).unwrap();
        assert!(metadata.extra.contains_key("tag-colors"));
        assert!(metadata.format.is_none());
        assert!(metadata.is_supported_format());
    }

    #[test]
    fn test_missing_start_is_an_error() {
        let result: Result<StoryMetadata, _> = serde_json::from_str(r#"{"format": "Harlowe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_other_format_not_supported() {
        let mut metadata = StoryMetadata::new("A");
        metadata.format = Some("SugarCube".to_string());
        assert!(!metadata.is_supported_format());
    }
}
