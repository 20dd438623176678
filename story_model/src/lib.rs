//! # Story Model
//!
//! The data side of the story graph: identifiers, the records a season is made
//! of, and the Twee story-file parser. This crate does no I/O beyond reading a
//! story file on request and knows nothing about storage.
//!
//! ## Core Components
//!
//! - **entities**: Seasons, locations, decisions, destinations and player positions
//! - **twee**: Parser turning story-file text into named passages and links

pub mod entities;
pub mod twee;

pub use entities::*;
pub use twee::{parse, parse_file, Link, ParseError, ParsedStory, Passage, StoryMetadata};
