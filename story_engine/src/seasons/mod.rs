//! Season Selector - which story is currently live.
//!
//! The live season is the one flagged default. When no season carries the
//! flag (nothing was ever marked, or a default season was deleted) the most
//! recently created season is live instead. Only an empty store has no live
//! season.
//!
//! The "at most one default" rule is a partial unique index in the schema, so
//! concurrent [`make_default`] calls can fail but never produce two defaults.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use story_model::{LocationId, Season, SeasonId};

use crate::error::{EngineError, Result};
use crate::store::{season_from_row, to_micros, Store, SEASON_COLUMNS};

/// A season with the number of locations it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season: Season,
    pub location_count: usize,
}

/// The live season: the default one, else the newest.
pub fn current_season(store: &Store) -> Result<Season> {
    store.read(|tx| {
        let flagged = tx
            .query_row(
                &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE is_default = 1"),
                [],
                season_from_row,
            )
            .optional()?;
        if let Some(season) = flagged {
            return Ok(season);
        }

        let newest = tx
            .query_row(
                &format!(
                    "SELECT {SEASON_COLUMNS} FROM seasons
                     ORDER BY created_at_us DESC, rowid DESC LIMIT 1"
                ),
                [],
                season_from_row,
            )
            .optional()?;
        match newest {
            Some(season) => {
                warn!(season = %season.id, "no default season, falling back to newest");
                Ok(season)
            }
            None => Err(EngineError::NoSeasons),
        }
    })
}

/// Fetch one season.
pub fn get_season(store: &Store, id: SeasonId) -> Result<Season> {
    store.read(|tx| season_in(tx, id))
}

pub(crate) fn season_in(tx: &Transaction<'_>, id: SeasonId) -> Result<Season> {
    tx.query_row(
        &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE id = ?1"),
        params![id.0],
        season_from_row,
    )
    .optional()?
    .ok_or(EngineError::SeasonNotFound(id))
}

/// Make `id` the only default season.
///
/// Losing a race against another writer surfaces as a retryable
/// [`EngineError::Conflict`] or [`EngineError::Busy`].
pub fn make_default(store: &mut Store, id: SeasonId) -> Result<()> {
    store
        .write(|tx| set_default_in(tx, id))
        .map_err(EngineError::into_conflict)?;
    info!(season = %id, "default season changed");
    Ok(())
}

pub(crate) fn set_default_in(tx: &Transaction<'_>, id: SeasonId) -> Result<()> {
    let exists = tx
        .query_row("SELECT 1 FROM seasons WHERE id = ?1", params![id.0], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Err(EngineError::SeasonNotFound(id));
    }

    tx.execute(
        "UPDATE seasons SET is_default = 0 WHERE is_default = 1 AND id != ?1",
        params![id.0],
    )?;
    tx.execute("UPDATE seasons SET is_default = 1 WHERE id = ?1", params![id.0])?;
    Ok(())
}

/// Remove the default flag from every season.
pub fn clear_default(store: &mut Store) -> Result<()> {
    store.write(|tx| {
        tx.execute("UPDATE seasons SET is_default = 0 WHERE is_default = 1", [])?;
        Ok(())
    })
}

/// All seasons, oldest first, with their location counts.
///
/// Counts every location of every season; meant for admin reporting.
pub fn list_with_location_counts(store: &Store) -> Result<Vec<SeasonSummary>> {
    store.read(|tx| {
        let mut stmt = tx.prepare(&format!(
            "SELECT {SEASON_COLUMNS},
                    (SELECT COUNT(*) FROM locations WHERE locations.season_id = seasons.id)
             FROM seasons
             ORDER BY created_at_us ASC, rowid ASC"
        ))?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(SeasonSummary {
                    season: season_from_row(row)?,
                    location_count: row.get::<_, i64>(6)? as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summaries)
    })
}

/// Create an empty season for graphs built by hand.
pub fn create_season(store: &mut Store, name: &str, origin_file: Option<&str>) -> Result<SeasonId> {
    let mut season = Season::new(name).with_created_at(Utc::now());
    season.origin_file = origin_file.map(str::to_string);

    store.write(|tx| {
        tx.execute(
            "INSERT INTO seasons (id, name, origin_file, created_at_us, is_default)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![season.id.0, season.name, season.origin_file, to_micros(season.created_at)],
        )?;
        Ok(())
    })?;
    debug!(season = %season.id, name, "created season");
    Ok(season.id)
}

/// Point a season at the location its new players start from.
pub fn set_genesis(store: &mut Store, season: SeasonId, location: LocationId) -> Result<()> {
    store.write(|tx| {
        season_in(tx, season)?;
        let owner: Option<uuid::Uuid> = tx
            .query_row(
                "SELECT season_id FROM locations WHERE id = ?1",
                params![location.0],
                |row| row.get(0),
            )
            .optional()?;
        match owner {
            None => return Err(EngineError::LocationNotFound(location)),
            Some(owner) if owner != season.0 => {
                return Err(EngineError::LocationNotInSeason { location, season })
            }
            Some(_) => {}
        }

        tx.execute(
            "UPDATE seasons SET genesis_location_id = ?1 WHERE id = ?2",
            params![location.0, season.0],
        )?;
        Ok(())
    })
}

/// Delete a season with all of its locations, decisions, destinations and
/// player positions.
pub fn delete_season(store: &mut Store, id: SeasonId) -> Result<()> {
    store.write(|tx| {
        season_in(tx, id)?;
        // Drop the back-reference first so the cascade never sees it dangling.
        tx.execute(
            "UPDATE seasons SET genesis_location_id = NULL WHERE id = ?1",
            params![id.0],
        )?;
        tx.execute("DELETE FROM seasons WHERE id = ?1", params![id.0])?;
        Ok(())
    })?;
    info!(season = %id, "deleted season");
    Ok(())
}
