//! Story graph records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DecisionId, DestinationId, LocationId, PlayerId, SeasonId};

/// One complete imported story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    /// Display name, usually the story title.
    pub name: String,
    /// File the season was imported from, if any.
    pub origin_file: Option<String>,
    pub created_at: DateTime<Utc>,
    /// At most one season carries this flag.
    pub is_default: bool,
    /// Where new players start. Unset only while the graph is being written.
    pub genesis_location: Option<LocationId>,
}

impl Season {
    /// Create a new season with no genesis location.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SeasonId::new(),
            name: name.into(),
            origin_file: None,
            created_at: Utc::now(),
            is_default: false,
            genesis_location: None,
        }
    }

    /// Set the origin filename.
    pub fn with_origin_file(mut self, origin_file: impl Into<String>) -> Self {
        self.origin_file = Some(origin_file.into());
        self
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A passage persisted as a place a player can stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub description: String,
    pub season: SeasonId,
}

impl Location {
    pub fn new(season: SeasonId, description: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            description: description.into(),
            season,
        }
    }
}

/// The set of choices available when leaving one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub source: LocationId,
}

impl Decision {
    pub fn new(source: LocationId) -> Self {
        Self {
            id: DecisionId::new(),
            source,
        }
    }
}

/// One concrete choice within a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub decision: DecisionId,
    pub target: LocationId,
    /// Text shown to the player.
    pub label: String,
    /// Zero-based ordinal; contiguous within a decision.
    pub position: u32,
}

/// A choice to attach to a decision when building a graph by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDestination {
    pub target: LocationId,
    pub label: String,
    pub position: u32,
}

impl NewDestination {
    pub fn new(target: LocationId, label: impl Into<String>, position: u32) -> Self {
        Self {
            target,
            label: label.into(),
            position,
        }
    }
}

/// Where a player currently stands within one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub player: PlayerId,
    pub season: SeasonId,
    pub location: LocationId,
}

/// Minimal player record. Identity and authentication live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Check that destination positions are unique and contiguous from zero.
pub fn positions_are_contiguous(positions: impl IntoIterator<Item = u32>) -> bool {
    let mut positions: Vec<u32> = positions.into_iter().collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position as usize == index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_season() {
        let season = Season::new("Test Story").with_origin_file("story.twee");
        assert_eq!(season.name, "Test Story");
        assert_eq!(season.origin_file.as_deref(), Some("story.twee"));
        assert!(!season.is_default);
        assert!(season.genesis_location.is_none());
    }

    #[test]
    fn test_season_created_at_override() {
        let at = Utc.with_ymd_and_hms(2024, 11, 26, 6, 31, 58).unwrap();
        let season = Season::new("Dated").with_created_at(at);
        assert_eq!(season.created_at, at);
    }

    #[test]
    fn test_location_belongs_to_season() {
        let season = SeasonId::new();
        let location = Location::new(season, "A field covered in honey");
        assert_eq!(location.season, season);
    }

    #[test]
    fn test_positions_contiguous() {
        assert!(positions_are_contiguous([]));
        assert!(positions_are_contiguous([0]));
        assert!(positions_are_contiguous([2, 0, 1]));
        assert!(!positions_are_contiguous([1, 2]));
        assert!(!positions_are_contiguous([0, 0, 1]));
        assert!(!positions_are_contiguous([0, 2]));
    }
}
