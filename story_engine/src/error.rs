//! Error types for the story engine.

use story_model::{LocationId, ParseError, PlayerId, SeasonId};
use thiserror::Error;

use crate::config::ConfigError;

/// Integrity problems found while turning a parsed story into rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("passage '{from}' links to '{target}', which is not a passage")]
    DanglingReference { from: String, target: String },

    #[error("passage '{0}' appears more than once")]
    DuplicatePassage(String),

    #[error("start passage '{0}' is not a passage")]
    MissingStartPassage(String),
}

/// Errors surfaced by every store-backed operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no seasons exist")]
    NoSeasons,

    #[error("season {0} not found")]
    SeasonNotFound(SeasonId),

    #[error("location {0} not found")]
    LocationNotFound(LocationId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("season {0} has no genesis location")]
    MissingGenesis(SeasonId),

    #[error("location {location} does not belong to season {season}")]
    LocationNotInSeason {
        location: LocationId,
        season: SeasonId,
    },

    #[error("location {to} is not a choice from location {from}")]
    UnreachableLocation { from: LocationId, to: LocationId },

    #[error("location {location} offers no choice at position {position}")]
    NoSuchChoice { location: LocationId, position: u32 },

    #[error("destination positions must be unique and contiguous from 0, got {0:?}")]
    InvalidPositions(Vec<u32>),

    #[error("location {0} already has a decision")]
    DecisionExists(LocationId),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("conflicting concurrent update, retry: {0}")]
    Conflict(String),

    #[error("store is busy, retry")]
    Busy,

    #[error("sqlite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether the caller may retry the same call. Only lost races qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict(_) | EngineError::Busy)
    }

    /// Reclassify a constraint violation as a lost race.
    pub(crate) fn into_conflict(self) -> Self {
        match self {
            EngineError::Constraint(message) => EngineError::Conflict(message),
            other => other,
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => EngineError::Busy,
            Some(ErrorCode::ConstraintViolation) => EngineError::Constraint(err.to_string()),
            _ => EngineError::Sqlite(err),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
