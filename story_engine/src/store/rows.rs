//! Row mapping shared by the store-backed modules.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use story_model::{
    DecisionId, Destination, DestinationId, Location, LocationId, Player, PlayerId, Season,
    SeasonId,
};

pub(crate) const SEASON_COLUMNS: &str =
    "id, name, origin_file, created_at_us, is_default, genesis_location_id";

pub(crate) const LOCATION_COLUMNS: &str = "id, description, season_id";

pub(crate) const DESTINATION_COLUMNS: &str =
    "id, decision_id, target_location_id, label, position";

pub(crate) const PLAYER_COLUMNS: &str = "id, display_name, created_at_us";

/// Timestamps are stored as microseconds since the Unix epoch.
pub(crate) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {micros}").into(),
        )
    })
}

pub(crate) fn season_from_row(row: &Row<'_>) -> rusqlite::Result<Season> {
    Ok(Season {
        id: SeasonId(row.get(0)?),
        name: row.get(1)?,
        origin_file: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
        is_default: row.get(4)?,
        genesis_location: row.get::<_, Option<uuid::Uuid>>(5)?.map(LocationId),
    })
}

pub(crate) fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: LocationId(row.get(0)?),
        description: row.get(1)?,
        season: SeasonId(row.get(2)?),
    })
}

pub(crate) fn destination_from_row(row: &Row<'_>) -> rusqlite::Result<Destination> {
    Ok(Destination {
        id: DestinationId(row.get(0)?),
        decision: DecisionId(row.get(1)?),
        target: LocationId(row.get(2)?),
        label: row.get(3)?,
        position: row.get(4)?,
    })
}

pub(crate) fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: PlayerId(row.get(0)?),
        display_name: row.get(1)?,
        created_at: timestamp_at(row, 2)?,
    })
}
