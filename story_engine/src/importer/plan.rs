//! Row construction for an import, done entirely in memory.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use story_model::{
    Decision, Destination, DestinationId, Location, LocationId, ParsedStory, Season,
};

use crate::error::ImportError;

/// Every row an import will write, built and checked before the store is touched.
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub season: Season,
    pub locations: Vec<Location>,
    pub decisions: Vec<Decision>,
    pub destinations: Vec<Destination>,
    /// Location of the metadata `start` passage.
    pub genesis: LocationId,
}

/// Row counts of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub locations: usize,
    pub decisions: usize,
    pub destinations: usize,
}

impl ImportPlan {
    /// Build the rows for `story`.
    ///
    /// Every name the story mentions (passage names, link targets, the start
    /// passage) gets an identifier before any row exists, so links may point
    /// at passages that appear later in the file.
    pub fn build(
        story: &ParsedStory,
        origin_file: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ImportError> {
        let mut season = Season::new(story.title.clone()).with_created_at(created_at);
        season.origin_file = origin_file.map(str::to_string);

        let ids = assign_ids(story)?;
        let passages: HashSet<&str> = story.passages.iter().map(|p| p.name.as_str()).collect();

        let mut locations = Vec::with_capacity(story.passages.len());
        let mut decisions = Vec::new();
        let mut destinations = Vec::with_capacity(story.link_count());

        for passage in &story.passages {
            let location_id = ids[passage.name.as_str()];
            locations.push(Location {
                id: location_id,
                description: passage.description.clone(),
                season: season.id,
            });

            // Endings get no decision.
            if passage.links.is_empty() {
                continue;
            }

            let decision = Decision::new(location_id);
            for (position, link) in passage.links.iter().enumerate() {
                let target = ids
                    .get(link.target.as_str())
                    .filter(|_| passages.contains(link.target.as_str()))
                    .copied()
                    .ok_or_else(|| ImportError::DanglingReference {
                        from: passage.name.clone(),
                        target: link.target.clone(),
                    })?;

                destinations.push(Destination {
                    id: DestinationId::new(),
                    decision: decision.id,
                    target,
                    label: link.label.clone(),
                    position: position as u32,
                });
            }
            decisions.push(decision);
        }

        let start = story.start();
        let genesis = ids
            .get(start)
            .filter(|_| passages.contains(start))
            .copied()
            .ok_or_else(|| ImportError::MissingStartPassage(start.to_string()))?;

        Ok(Self {
            season,
            locations,
            decisions,
            destinations,
            genesis,
        })
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            locations: self.locations.len(),
            decisions: self.decisions.len(),
            destinations: self.destinations.len(),
        }
    }
}

/// Map every referenced, non-empty name to a fresh location id.
fn assign_ids(story: &ParsedStory) -> Result<HashMap<&str, LocationId>, ImportError> {
    let mut ids: HashMap<&str, LocationId> = HashMap::new();

    for passage in &story.passages {
        if ids.insert(passage.name.as_str(), LocationId::new()).is_some() {
            return Err(ImportError::DuplicatePassage(passage.name.clone()));
        }
    }

    let referenced = story
        .passages
        .iter()
        .flat_map(|p| p.links.iter().map(|l| l.target.as_str()))
        .chain(std::iter::once(story.start()));

    for name in referenced.filter(|name| !name.is_empty()) {
        ids.entry(name).or_insert_with(LocationId::new);
    }

    Ok(ids)
}
