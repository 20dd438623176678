//! Passages and the links between them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A link from one passage to another.
///
/// The label is what the player sees; when the source gives no explicit
/// target, the label doubles as the target passage name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub target: String,
}

impl Link {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

/// One named unit of story text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub name: String,
    /// First line of the passage body, trimmed.
    pub description: String,
    /// Outgoing links in body order.
    pub links: Vec<Link>,
    /// Tags from the header's `[...]` list.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Passage {
    /// Build a passage from its header name and raw body text.
    pub fn from_body(name: impl Into<String>, tags: Vec<String>, body: &str) -> Self {
        let description = body.lines().next().unwrap_or_default().trim().to_string();
        Self {
            name: name.into(),
            description,
            links: scan_links(body),
            tags,
        }
    }

    /// A passage with no outgoing links is an ending.
    pub fn is_terminal(&self) -> bool {
        self.links.is_empty()
    }
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[\[(.*?)(?:->(.*?))?\]\]").expect("link pattern is a valid regex")
    })
}

/// Find every `[[label]]` and `[[label->target]]` token in source order.
pub fn scan_links(body: &str) -> Vec<Link> {
    link_pattern()
        .captures_iter(body)
        .map(|caps| {
            let label = caps.get(1).map_or("", |m| m.as_str()).trim();
            let target = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .unwrap_or(label);
            Link::new(label, target)
        })
        .collect()
}

/// Split a header line into the passage name and its tags.
///
/// Headers look like `Name [tag1 tag2] {"position":"1,2","size":"100,100"}`;
/// both the tag list and the annotation are optional.
pub fn split_header(header: &str) -> (String, Vec<String>) {
    let mut rest = header.trim();

    if rest.ends_with('}') {
        if let Some(open) = rest.find('{') {
            rest = rest[..open].trim_end();
        }
    }

    let mut tags = Vec::new();
    if rest.ends_with(']') {
        if let Some(open) = rest.rfind('[') {
            // `[[` would be a link, and a name cannot be only tags.
            if open > 0 && !rest[..open].ends_with('[') {
                tags = rest[open + 1..rest.len() - 1]
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                rest = rest[..open].trim_end();
            }
        }
    }

    (rest.to_string(), tags)
}
