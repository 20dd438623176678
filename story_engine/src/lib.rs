//! # Story Engine
//!
//! Stores parsed stories as graphs in SQLite and walks players through them.
//! The pure story types and the Twee parser live in `story_model`.
//!
//! ## Core Components
//!
//! - **importer**: Turns a parsed story into one season graph, atomically
//! - **seasons**: Picks the live season and manages the default flag
//! - **navigation**: Player positions, choices and transitions
//! - **players**: Minimal player records
//! - **store**: The SQLite connection, schema and units of work
//! - **config**: TOML configuration with environment overrides
//!
//! ## Graph Shape
//!
//! - A **season** owns its **locations** and points at one genesis location
//! - A location with choices has exactly one **decision**
//! - A decision offers ordered **destinations**, each leading to a location
//!   of the same season
//! - A player has at most one position per season

pub mod config;
pub mod error;
pub mod importer;
pub mod navigation;
pub mod players;
pub mod seasons;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use config::*;
pub use error::*;
pub use importer::{GraphImporter, ImportPlan, ImportSummary};
pub use navigation::{Choices, NavSession, Navigator};
pub use seasons::SeasonSummary;
pub use store::{Store, Table, SCHEMA_VERSION};
