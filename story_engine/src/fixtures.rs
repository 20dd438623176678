//! Shared test stories and store helpers.

use rusqlite::params;
use story_model::{LocationId, PlayerId, SeasonId};

use crate::importer::GraphImporter;
use crate::players;
use crate::store::Store;

/// Five passages, six links, one ending.
pub(crate) const HONEY_STORY: &str = r#"
:: StoryTitle
Test Story

:: StoryData
{
  "ifid": "43048DD4-5A6B-4D29-BCC6-F418D5460FED",
  "format": "Harlowe",
  "format-version": "3.3.9",
  "start": "Introduction",
  "zoom": 1
}

:: Begin Getting Excited {"position":"1075,750","size":"100,100"}
You look around and begin to laugh. You see many trees and clouds.
[[I am happy]]
[[I fail to be happy and pass out->You Awake]]

:: I am happy {"position":"1075,875","size":"100,100"}
Satisfied with your happiness, and having no concern over how you came to be here in the first place, you shuffle off to find home.
YOU'VE WON

:: Introduction {"position":"900,400","size":"100,100"}
Welcome to Text Game!
[[Begin Your Adventure->You Awake]]

:: Go Back To Sleep {"position":"725,725","size":"100,100"}
Unconcerned with your stickiness, you allow the warmth from the sun and the soft breeze to coax you back to sleep.
[[You Awake]]

:: You Awake {"position":"900,600","size":"100,100"}
You awake to find yourself in a field. You are covered in honey.
[[Go Back To Sleep]]
[[Begin Getting Excited]]
"#;

pub(crate) const INTRODUCTION: &str = "Welcome to Text Game!";
pub(crate) const YOU_AWAKE: &str = "You awake to find yourself in a field. You are covered in honey.";
pub(crate) const I_AM_HAPPY: &str = "Satisfied with your happiness, and having no concern over how you came to be here in the first place, you shuffle off to find home.";

/// In-memory store holding the honey story and one registered player.
pub(crate) fn honey_store() -> (Store, SeasonId, PlayerId) {
    let mut store = Store::open_in_memory().unwrap();
    let story = story_model::parse(HONEY_STORY).unwrap();
    let season = GraphImporter::new()
        .import(&mut store, &story, "honey.twee")
        .unwrap();
    let player = players::register_player(&mut store, "tester").unwrap();
    (store, season, player)
}

/// Find a location of `season` by its description.
pub(crate) fn location_by_description(
    store: &Store,
    season: SeasonId,
    description: &str,
) -> LocationId {
    store
        .read(|tx| {
            Ok(tx.query_row(
                "SELECT id FROM locations WHERE season_id = ?1 AND description = ?2",
                params![season.0, description],
                |row| row.get(0).map(LocationId),
            )?)
        })
        .unwrap()
}
