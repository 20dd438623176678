//! Graph Importer - writes a parsed story as one season graph.
//!
//! The import is a single transaction, written in foreign-key order:
//! 1. **Season** with no genesis location yet
//! 2. **Locations**, one per passage
//! 3. **Decisions**, one per passage that has links
//! 4. **Destinations**, one per link, positioned by link order
//! 5. **Genesis**: point the season at its start location
//!
//! The season and its locations reference each other, so the genesis pointer
//! can only be filled in once the locations exist. Readers never see the
//! intermediate states; a failure at any step rolls back all of them.

mod plan;

pub use plan::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Transaction};
use std::path::Path;
use tracing::info;

use story_model::{ParsedStory, SeasonId};

use crate::error::Result;
use crate::seasons;
use crate::store::{to_micros, Store};

/// Imports parsed stories into a [`Store`].
#[derive(Debug, Clone, Default)]
pub struct GraphImporter {
    mark_default: bool,
}

impl GraphImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also make each imported season the default, inside the same transaction.
    pub fn mark_default(mut self, mark_default: bool) -> Self {
        self.mark_default = mark_default;
        self
    }

    /// Build the rows for `story` without touching any store.
    pub fn plan(
        &self,
        story: &ParsedStory,
        origin_file: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<ImportPlan> {
        Ok(ImportPlan::build(story, origin_file, created_at)?)
    }

    /// Import `story` as a new season and return its id.
    pub fn import(&self, store: &mut Store, story: &ParsedStory, origin_file: &str) -> Result<SeasonId> {
        self.import_at(store, story, Some(origin_file), Utc::now())
    }

    /// Import with an explicit creation timestamp.
    pub fn import_at(
        &self,
        store: &mut Store,
        story: &ParsedStory,
        origin_file: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<SeasonId> {
        let plan = self.plan(story, origin_file, created_at)?;
        self.commit(store, &plan)
    }

    /// Read, parse and import a story file. The file name becomes the origin.
    pub fn import_file(&self, store: &mut Store, path: impl AsRef<Path>) -> Result<SeasonId> {
        let path = path.as_ref();
        let story = story_model::parse_file(path)?;
        let origin = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.import(store, &story, &origin)
    }

    /// Write a plan in one transaction.
    pub fn commit(&self, store: &mut Store, plan: &ImportPlan) -> Result<SeasonId> {
        store.write(|tx| {
            write_plan(tx, plan)?;
            if self.mark_default {
                seasons::set_default_in(tx, plan.season.id)?;
            }
            Ok(())
        })?;

        let summary = plan.summary();
        info!(
            season = %plan.season.id,
            name = %plan.season.name,
            locations = summary.locations,
            decisions = summary.decisions,
            destinations = summary.destinations,
            is_default = self.mark_default,
            "imported season"
        );
        Ok(plan.season.id)
    }
}

fn write_plan(tx: &Transaction<'_>, plan: &ImportPlan) -> Result<()> {
    let season = &plan.season;
    tx.execute(
        "INSERT INTO seasons (id, name, origin_file, created_at_us, is_default, genesis_location_id)
         VALUES (?1, ?2, ?3, ?4, 0, NULL)",
        params![season.id.0, season.name, season.origin_file, to_micros(season.created_at)],
    )?;

    {
        let mut insert = tx.prepare_cached(
            "INSERT INTO locations (id, description, season_id) VALUES (?1, ?2, ?3)",
        )?;
        for location in &plan.locations {
            insert.execute(params![location.id.0, location.description, location.season.0])?;
        }
    }

    {
        let mut insert =
            tx.prepare_cached("INSERT INTO decisions (id, source_location_id) VALUES (?1, ?2)")?;
        for decision in &plan.decisions {
            insert.execute(params![decision.id.0, decision.source.0])?;
        }
    }

    {
        let mut insert = tx.prepare_cached(
            "INSERT INTO destinations (id, decision_id, target_location_id, label, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for destination in &plan.destinations {
            insert.execute(params![
                destination.id.0,
                destination.decision.0,
                destination.target.0,
                destination.label,
                destination.position,
            ])?;
        }
    }

    tx.execute(
        "UPDATE seasons SET genesis_location_id = ?1 WHERE id = ?2",
        params![plan.genesis.0, season.id.0],
    )?;
    Ok(())
}
