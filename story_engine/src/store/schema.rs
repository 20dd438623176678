//! Embedded schema. Every statement is idempotent.

/// Bumped whenever the DDL below changes shape.
pub const SCHEMA_VERSION: i64 = 1;

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
  id BLOB PRIMARY KEY,
  display_name TEXT NOT NULL,
  created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS seasons (
  id BLOB PRIMARY KEY,
  name TEXT NOT NULL,
  origin_file TEXT,
  created_at_us INTEGER NOT NULL,
  is_default INTEGER NOT NULL DEFAULT 0 CHECK (is_default IN (0, 1)),
  genesis_location_id BLOB,
  -- the genesis location must belong to this season
  FOREIGN KEY (genesis_location_id, id) REFERENCES locations (id, season_id)
);

-- at most one default season
CREATE UNIQUE INDEX IF NOT EXISTS ix_seasons_single_default
  ON seasons (is_default) WHERE is_default = 1;

CREATE INDEX IF NOT EXISTS ix_seasons_created_at ON seasons (created_at_us);

CREATE TABLE IF NOT EXISTS locations (
  id BLOB PRIMARY KEY,
  description TEXT NOT NULL,
  season_id BLOB NOT NULL REFERENCES seasons (id) ON DELETE CASCADE,
  UNIQUE (id, season_id)
);

CREATE INDEX IF NOT EXISTS ix_locations_season_id ON locations (season_id);

CREATE TABLE IF NOT EXISTS decisions (
  id BLOB PRIMARY KEY,
  source_location_id BLOB NOT NULL UNIQUE REFERENCES locations (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS destinations (
  id BLOB PRIMARY KEY,
  decision_id BLOB NOT NULL REFERENCES decisions (id) ON DELETE CASCADE,
  target_location_id BLOB NOT NULL REFERENCES locations (id) ON DELETE CASCADE,
  label TEXT NOT NULL,
  position INTEGER NOT NULL CHECK (position >= 0),
  UNIQUE (decision_id, position)
);

CREATE INDEX IF NOT EXISTS ix_destinations_target ON destinations (target_location_id);

CREATE TABLE IF NOT EXISTS player_positions (
  player_id BLOB NOT NULL REFERENCES players (id) ON DELETE CASCADE,
  season_id BLOB NOT NULL REFERENCES seasons (id) ON DELETE CASCADE,
  location_id BLOB NOT NULL,
  PRIMARY KEY (player_id, season_id),
  FOREIGN KEY (location_id, season_id) REFERENCES locations (id, season_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS ix_player_positions_location ON player_positions (location_id, season_id);
CREATE INDEX IF NOT EXISTS ix_player_positions_season ON player_positions (season_id);
"#;
