//! Navigation Engine - moves players through a season graph.
//!
//! A player's position is kept per season, so switching the default season
//! never loses progress in another one. A player with no stored position in
//! a season stands at its genesis location; that fallback is computed on
//! every lookup and never written.

mod session;

pub use session::*;

use rusqlite::{params, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use story_model::{
    positions_are_contiguous, Decision, DecisionId, Destination, DestinationId, Location,
    LocationId, NewDestination, PlayerId, SeasonId,
};

use crate::config::NavigationConfig;
use crate::error::{EngineError, Result};
use crate::seasons::season_in;
use crate::store::{destination_from_row, location_from_row, Store, DESTINATION_COLUMNS, LOCATION_COLUMNS};

/// What a player sees at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choices {
    pub location: LocationId,
    pub description: String,
    /// Ordered by ascending position. Empty at an ending.
    pub destinations: Vec<Destination>,
}

impl Choices {
    pub fn is_terminal(&self) -> bool {
        self.destinations.is_empty()
    }

    /// The destination offered at `position`.
    pub fn at(&self, position: u32) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.position == position)
    }
}

/// Reads and moves player positions.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    config: NavigationConfig,
}

impl Navigator {
    pub fn new(config: NavigationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Where `player` stands in `season`: the stored position, or the genesis
    /// location when the player has not moved there yet.
    pub fn resolve_for_player(
        &self,
        store: &Store,
        player: PlayerId,
        season: SeasonId,
    ) -> Result<LocationId> {
        store.read(|tx| position_or_genesis(tx, player, season))
    }

    /// The description and ordered destinations of a location.
    pub fn fetch_choices(&self, store: &Store, location: LocationId) -> Result<Choices> {
        store.read(|tx| {
            let found = location_in(tx, location)?;
            let destinations = destinations_from(tx, location)?;
            debug!(location = %location, choices = destinations.len(), "fetched choices");
            Ok(Choices {
                location,
                description: found.description,
                destinations,
            })
        })
    }

    /// Record that `player` now stands at `location` in `season`.
    ///
    /// Repeating a transition is harmless. Concurrent transitions for the same
    /// player and season end with whichever committed last.
    pub fn transition(
        &self,
        store: &mut Store,
        player: PlayerId,
        season: SeasonId,
        location: LocationId,
    ) -> Result<()> {
        let strict = self.config.strict_transitions;
        store.write(|tx| {
            let target = location_in(tx, location)?;
            if target.season != season {
                return Err(EngineError::LocationNotInSeason { location, season });
            }
            if !player_exists(tx, player)? {
                return Err(EngineError::PlayerNotFound(player));
            }

            if strict {
                let from = position_or_genesis(tx, player, season)?;
                let offered = from == location
                    || destinations_from(tx, from)?
                        .iter()
                        .any(|d| d.target == location);
                if !offered {
                    return Err(EngineError::UnreachableLocation { from, to: location });
                }
            }

            tx.execute(
                "INSERT INTO player_positions (player_id, season_id, location_id)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (player_id, season_id) DO UPDATE SET location_id = excluded.location_id",
                params![player.0, season.0, location.0],
            )?;
            Ok(())
        })?;

        debug!(player = %player, season = %season, location = %location, "player moved");
        Ok(())
    }

    /// Add a location to an existing season.
    pub fn create_location(
        &self,
        store: &mut Store,
        season: SeasonId,
        description: &str,
    ) -> Result<LocationId> {
        let location = Location::new(season, description);
        store.write(|tx| {
            season_in(tx, season)?;
            tx.execute(
                "INSERT INTO locations (id, description, season_id) VALUES (?1, ?2, ?3)",
                params![location.id.0, location.description, season.0],
            )?;
            Ok(())
        })?;
        Ok(location.id)
    }

    /// Give `source` its decision. Targets must live in the same season.
    pub fn create_decision(
        &self,
        store: &mut Store,
        source: LocationId,
        destinations: Vec<NewDestination>,
    ) -> Result<DecisionId> {
        let positions: Vec<u32> = destinations.iter().map(|d| d.position).collect();
        if positions.is_empty() || !positions_are_contiguous(positions.iter().copied()) {
            return Err(EngineError::InvalidPositions(positions));
        }

        let decision = Decision::new(source);
        store.write(|tx| {
            let origin = location_in(tx, source)?;
            let taken = tx
                .query_row(
                    "SELECT 1 FROM decisions WHERE source_location_id = ?1",
                    params![source.0],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if taken {
                return Err(EngineError::DecisionExists(source));
            }

            for new in &destinations {
                let target = location_in(tx, new.target)?;
                if target.season != origin.season {
                    return Err(EngineError::LocationNotInSeason {
                        location: new.target,
                        season: origin.season,
                    });
                }
            }

            tx.execute(
                "INSERT INTO decisions (id, source_location_id) VALUES (?1, ?2)",
                params![decision.id.0, source.0],
            )?;
            let mut insert = tx.prepare_cached(
                "INSERT INTO destinations (id, decision_id, target_location_id, label, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for new in &destinations {
                insert.execute(params![
                    DestinationId::new().0,
                    decision.id.0,
                    new.target.0,
                    new.label,
                    new.position,
                ])?;
            }
            Ok(())
        })?;
        Ok(decision.id)
    }
}

pub(crate) fn location_in(tx: &Transaction<'_>, id: LocationId) -> Result<Location> {
    tx.query_row(
        &format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"),
        params![id.0],
        location_from_row,
    )
    .optional()?
    .ok_or(EngineError::LocationNotFound(id))
}

fn destinations_from(tx: &Transaction<'_>, source: LocationId) -> Result<Vec<Destination>> {
    let mut stmt = tx.prepare_cached(&format!(
        "SELECT {DESTINATION_COLUMNS} FROM destinations
         WHERE decision_id = (SELECT id FROM decisions WHERE source_location_id = ?1)
         ORDER BY position ASC"
    ))?;
    let destinations = stmt
        .query_map(params![source.0], destination_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(destinations)
}

fn position_or_genesis(
    tx: &Transaction<'_>,
    player: PlayerId,
    season: SeasonId,
) -> Result<LocationId> {
    let found = season_in(tx, season)?;
    let stored = tx
        .query_row(
            "SELECT location_id FROM player_positions WHERE player_id = ?1 AND season_id = ?2",
            params![player.0, season.0],
            |row| row.get(0).map(LocationId),
        )
        .optional()?;

    stored
        .or(found.genesis_location)
        .ok_or(EngineError::MissingGenesis(season))
}

fn player_exists(tx: &Transaction<'_>, player: PlayerId) -> Result<bool> {
    Ok(tx
        .query_row("SELECT 1 FROM players WHERE id = ?1", params![player.0], |_| Ok(()))
        .optional()?
        .is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, honey_store, location_by_description};
    use crate::players;
    use crate::seasons;
    use crate::store::Table;

    fn strict() -> Navigator {
        Navigator::new(NavigationConfig {
            strict_transitions: true,
        })
    }

    #[test]
    fn test_new_player_starts_at_genesis() {
        let (store, season, player) = honey_store();
        let nav = Navigator::with_defaults();

        let location = nav.resolve_for_player(&store, player, season).unwrap();

        assert_eq!(
            location,
            location_by_description(&store, season, fixtures::INTRODUCTION)
        );
    }

    #[test]
    fn test_resolve_does_not_persist() {
        let (store, season, player) = honey_store();
        let nav = Navigator::with_defaults();

        let first = nav.resolve_for_player(&store, player, season).unwrap();
        let second = nav.resolve_for_player(&store, player, season).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count(Table::PlayerPositions).unwrap(), 0);
    }

    #[test]
    fn test_resolve_unknown_season() {
        let (store, _, player) = honey_store();
        let missing = SeasonId::new();
        assert!(matches!(
            Navigator::with_defaults().resolve_for_player(&store, player, missing),
            Err(EngineError::SeasonNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_resolve_without_genesis() {
        let (mut store, _, player) = honey_store();
        let bare = seasons::create_season(&mut store, "Draft", None).unwrap();
        assert!(matches!(
            Navigator::with_defaults().resolve_for_player(&store, player, bare),
            Err(EngineError::MissingGenesis(id)) if id == bare
        ));
    }

    #[test]
    fn test_honey_story_choices() {
        let (store, season, _) = honey_store();
        let nav = Navigator::with_defaults();

        let genesis = location_by_description(&store, season, fixtures::INTRODUCTION);
        let intro = nav.fetch_choices(&store, genesis).unwrap();
        assert_eq!(intro.description, fixtures::INTRODUCTION);
        assert_eq!(intro.destinations.len(), 1);
        assert_eq!(intro.destinations[0].label, "Begin Your Adventure");

        let awake = location_by_description(&store, season, fixtures::YOU_AWAKE);
        assert_eq!(intro.destinations[0].target, awake);

        let choices = nav.fetch_choices(&store, awake).unwrap();
        let labels: Vec<_> = choices.destinations.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Go Back To Sleep", "Begin Getting Excited"]);
        let positions: Vec<_> = choices.destinations.iter().map(|d| d.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_terminal_location_has_no_choices() {
        let (store, season, _) = honey_store();
        let ending = location_by_description(&store, season, fixtures::I_AM_HAPPY);

        let choices = Navigator::with_defaults().fetch_choices(&store, ending).unwrap();

        assert!(choices.is_terminal());
        assert_eq!(choices.description, fixtures::I_AM_HAPPY);
    }

    #[test]
    fn test_fetch_unknown_location() {
        let (store, _, _) = honey_store();
        assert!(matches!(
            Navigator::with_defaults().fetch_choices(&store, LocationId::new()),
            Err(EngineError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_transition_is_idempotent() {
        let (mut store, season, player) = honey_store();
        let nav = Navigator::with_defaults();
        let awake = location_by_description(&store, season, fixtures::YOU_AWAKE);

        nav.transition(&mut store, player, season, awake).unwrap();
        nav.transition(&mut store, player, season, awake).unwrap();

        assert_eq!(nav.resolve_for_player(&store, player, season).unwrap(), awake);
        assert_eq!(store.count(Table::PlayerPositions).unwrap(), 1);
    }

    #[test]
    fn test_positions_are_per_season() {
        let (mut store, first, player) = honey_store();
        let story = story_model::parse(fixtures::HONEY_STORY).unwrap();
        let second = crate::importer::GraphImporter::new()
            .import(&mut store, &story, "again.twee")
            .unwrap();
        let nav = Navigator::with_defaults();

        let awake = location_by_description(&store, first, fixtures::YOU_AWAKE);
        nav.transition(&mut store, player, first, awake).unwrap();

        assert_eq!(nav.resolve_for_player(&store, player, first).unwrap(), awake);
        assert_eq!(
            nav.resolve_for_player(&store, player, second).unwrap(),
            location_by_description(&store, second, fixtures::INTRODUCTION)
        );
    }

    #[test]
    fn test_transition_rejects_foreign_location() {
        let (mut store, first, player) = honey_store();
        let story = story_model::parse(fixtures::HONEY_STORY).unwrap();
        let second = crate::importer::GraphImporter::new()
            .import(&mut store, &story, "again.twee")
            .unwrap();
        let foreign = location_by_description(&store, second, fixtures::YOU_AWAKE);

        let err = Navigator::with_defaults()
            .transition(&mut store, player, first, foreign)
            .unwrap_err();

        assert!(matches!(err, EngineError::LocationNotInSeason { .. }));
        assert_eq!(store.count(Table::PlayerPositions).unwrap(), 0);
    }

    #[test]
    fn test_transition_unknown_player_and_location() {
        let (mut store, season, player) = honey_store();
        let nav = Navigator::with_defaults();
        let awake = location_by_description(&store, season, fixtures::YOU_AWAKE);

        assert!(matches!(
            nav.transition(&mut store, PlayerId::new(), season, awake),
            Err(EngineError::PlayerNotFound(_))
        ));
        assert!(matches!(
            nav.transition(&mut store, player, season, LocationId::new()),
            Err(EngineError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_default_transitions_trust_the_caller() {
        let (mut store, season, player) = honey_store();
        let ending = location_by_description(&store, season, fixtures::I_AM_HAPPY);

        // Not reachable from the genesis in one step, accepted anyway.
        Navigator::with_defaults()
            .transition(&mut store, player, season, ending)
            .unwrap();
    }

    #[test]
    fn test_strict_transitions() {
        let (mut store, season, player) = honey_store();
        let nav = strict();
        let genesis = location_by_description(&store, season, fixtures::INTRODUCTION);
        let awake = location_by_description(&store, season, fixtures::YOU_AWAKE);
        let ending = location_by_description(&store, season, fixtures::I_AM_HAPPY);

        assert!(matches!(
            nav.transition(&mut store, player, season, ending),
            Err(EngineError::UnreachableLocation { from, to }) if from == genesis && to == ending
        ));

        nav.transition(&mut store, player, season, awake).unwrap();
        // Staying put is always allowed.
        nav.transition(&mut store, player, season, awake).unwrap();
        assert_eq!(nav.resolve_for_player(&store, player, season).unwrap(), awake);
    }

    #[test]
    fn test_deleting_player_removes_positions() {
        let (mut store, season, player) = honey_store();
        let awake = location_by_description(&store, season, fixtures::YOU_AWAKE);
        Navigator::with_defaults()
            .transition(&mut store, player, season, awake)
            .unwrap();

        players::delete_player(&mut store, player).unwrap();

        assert_eq!(store.count(Table::PlayerPositions).unwrap(), 0);
        assert_eq!(store.count(Table::Locations).unwrap(), 5);
    }

    #[test]
    fn test_authoring_helpers() {
        let (mut store, _, player) = honey_store();
        let nav = Navigator::with_defaults();
        let season = seasons::create_season(&mut store, "Manual", None).unwrap();

        let hall = nav.create_location(&mut store, season, "A hall").unwrap();
        let left = nav.create_location(&mut store, season, "Left room").unwrap();
        let right = nav.create_location(&mut store, season, "Right room").unwrap();
        nav.create_decision(
            &mut store,
            hall,
            vec![
                NewDestination::new(right, "Go right", 1),
                NewDestination::new(left, "Go left", 0),
            ],
        )
        .unwrap();
        seasons::set_genesis(&mut store, season, hall).unwrap();

        assert_eq!(nav.resolve_for_player(&store, player, season).unwrap(), hall);
        let choices = nav.fetch_choices(&store, hall).unwrap();
        let labels: Vec<_> = choices.destinations.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Go left", "Go right"]);
        assert_eq!(choices.at(1).map(|d| d.target), Some(right));
    }

    #[test]
    fn test_create_decision_validation() {
        let (mut store, imported, _) = honey_store();
        let nav = Navigator::with_defaults();
        let season = seasons::create_season(&mut store, "Manual", None).unwrap();
        let a = nav.create_location(&mut store, season, "A").unwrap();
        let b = nav.create_location(&mut store, season, "B").unwrap();

        assert!(matches!(
            nav.create_decision(&mut store, a, vec![NewDestination::new(b, "skip", 1)]),
            Err(EngineError::InvalidPositions(p)) if p == vec![1]
        ));
        assert!(matches!(
            nav.create_decision(
                &mut store,
                a,
                vec![NewDestination::new(b, "x", 0), NewDestination::new(b, "y", 0)]
            ),
            Err(EngineError::InvalidPositions(_))
        ));
        assert!(matches!(
            nav.create_decision(&mut store, a, Vec::new()),
            Err(EngineError::InvalidPositions(_))
        ));

        let foreign = location_by_description(&store, imported, fixtures::YOU_AWAKE);
        assert!(matches!(
            nav.create_decision(&mut store, a, vec![NewDestination::new(foreign, "away", 0)]),
            Err(EngineError::LocationNotInSeason { .. })
        ));

        nav.create_decision(&mut store, a, vec![NewDestination::new(b, "on", 0)])
            .unwrap();
        assert!(matches!(
            nav.create_decision(&mut store, a, vec![NewDestination::new(b, "again", 0)]),
            Err(EngineError::DecisionExists(id)) if id == a
        ));
        assert_eq!(store.count(Table::Decisions).unwrap(), 5);
    }

    #[test]
    fn test_create_location_unknown_season() {
        let (mut store, _, _) = honey_store();
        assert!(matches!(
            Navigator::with_defaults().create_location(&mut store, SeasonId::new(), "void"),
            Err(EngineError::SeasonNotFound(_))
        ));
    }
}
