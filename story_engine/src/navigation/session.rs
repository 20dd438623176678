//! Per-player walk through one season.

use story_model::{LocationId, PlayerId, SeasonId};

use super::{Choices, Navigator};
use crate::error::{EngineError, Result};
use crate::seasons;
use crate::store::Store;

/// A player's session: who is playing, which season, and where they stand.
///
/// The session is a cache of the stored position. Every move goes through
/// [`Navigator::transition`], so another session for the same player sees it
/// on its next [`NavSession::refresh`].
#[derive(Debug, Clone)]
pub struct NavSession {
    navigator: Navigator,
    player: PlayerId,
    season: SeasonId,
    location: LocationId,
}

impl NavSession {
    /// Start in the current season.
    pub fn start(store: &Store, navigator: &Navigator, player: PlayerId) -> Result<Self> {
        let season = seasons::current_season(store)?;
        Self::start_in(store, navigator, player, season.id)
    }

    /// Start in an explicit season.
    pub fn start_in(
        store: &Store,
        navigator: &Navigator,
        player: PlayerId,
        season: SeasonId,
    ) -> Result<Self> {
        let location = navigator.resolve_for_player(store, player, season)?;
        Ok(Self {
            navigator: navigator.clone(),
            player,
            season,
            location,
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn season(&self) -> SeasonId {
        self.season
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn choices(&self, store: &Store) -> Result<Choices> {
        self.navigator.fetch_choices(store, self.location)
    }

    /// Take the destination offered at `position` and return where it leads.
    pub fn choose(&mut self, store: &mut Store, position: u32) -> Result<LocationId> {
        let choices = self.choices(store)?;
        let target = choices
            .at(position)
            .map(|d| d.target)
            .ok_or(EngineError::NoSuchChoice {
                location: self.location,
                position,
            })?;

        self.navigator
            .transition(store, self.player, self.season, target)?;
        self.location = target;
        Ok(target)
    }

    /// Reload the position from the store.
    pub fn refresh(&mut self, store: &Store) -> Result<LocationId> {
        self.location = self
            .navigator
            .resolve_for_player(store, self.player, self.season)?;
        Ok(self.location)
    }
}
