//! Player records. Positions hang off these and go away with them.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use story_model::{Player, PlayerId};

use crate::error::{EngineError, Result};
use crate::store::{player_from_row, to_micros, Store, PLAYER_COLUMNS};

/// Create a player and return its id.
pub fn register_player(store: &mut Store, display_name: &str) -> Result<PlayerId> {
    let player = Player::new(display_name);
    store.write(|tx| {
        tx.execute(
            "INSERT INTO players (id, display_name, created_at_us) VALUES (?1, ?2, ?3)",
            params![player.id.0, player.display_name, to_micros(player.created_at)],
        )?;
        Ok(())
    })?;
    debug!(player = %player.id, "registered player");
    Ok(player.id)
}

pub fn get_player(store: &Store, id: PlayerId) -> Result<Player> {
    store.read(|tx| {
        tx.query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"),
            params![id.0],
            player_from_row,
        )
        .optional()?
        .ok_or(EngineError::PlayerNotFound(id))
    })
}

/// Delete a player and every position it holds.
pub fn delete_player(store: &mut Store, id: PlayerId) -> Result<()> {
    let deleted = store.write(|tx| Ok(tx.execute("DELETE FROM players WHERE id = ?1", params![id.0])?))?;
    if deleted == 0 {
        return Err(EngineError::PlayerNotFound(id));
    }
    debug!(player = %id, "deleted player");
    Ok(())
}
