// Runtime settings and the tiny save file. Both TOML, both optional on disk:
// the game must always boot, so missing or malformed files fall back to
// defaults.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::progression::ResetTarget;
use crate::sections::StoryFlags;

pub const SETTINGS_PATH: &str = "settings.toml";
const STORY_PATH: &str = "story.toml";

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Light bars at game start. Shipped revisions use 3 or 5.
    pub starting_light: u32,
    /// Where game-over and post-victory resets land.
    pub reset_to: ResetTarget,
    /// Seconds before a narration line advances on its own.
    pub narration_seconds: f32,
    /// Length of the input-lock window after a direction choice.
    pub footstep_seconds: f32,
    /// Seconds per portal frame in the victory sequence.
    pub portal_frame_seconds: f32,
    /// How long the congratulations text stays up before the reset.
    pub victory_hold_seconds: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_light: 5,
            reset_to: ResetTarget::Title,
            narration_seconds: 3.0,
            footstep_seconds: 0.6,
            portal_frame_seconds: 0.2,
            victory_hold_seconds: 5.0,
        }
    }
}

impl GameSettings {
    /// Read settings from disk. Out-of-range values are not checked here;
    /// they surface through `Engine::new` before the app is built.
    pub fn load(path: &str) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("ignoring malformed {path}: {err}");
                Self::default()
            }
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct StoryFile {
    has_won: bool,
}

pub fn load_story_flags() -> StoryFlags {
    let file: StoryFile = std::fs::read_to_string(STORY_PATH)
        .ok()
        .and_then(|text| toml::from_str(&text).ok())
        .unwrap_or_default();
    StoryFlags {
        has_won: file.has_won,
    }
}

pub fn save_story_flags(flags: &StoryFlags) {
    let file = StoryFile {
        has_won: flags.has_won,
    };
    match toml::to_string(&file) {
        Ok(text) => {
            if let Err(err) = std::fs::write(STORY_PATH, text) {
                warn!("could not save story flags: {err}");
            }
        }
        Err(err) => warn!("could not serialize story flags: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fill_in_from_defaults() {
        let parsed: GameSettings =
            toml::from_str("starting_light = 3\nreset_to = \"narration\"").unwrap();
        assert_eq!(parsed.starting_light, 3);
        assert_eq!(parsed.reset_to, ResetTarget::Narration);
        assert_eq!(
            parsed.footstep_seconds,
            GameSettings::default().footstep_seconds
        );
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let parsed: GameSettings = toml::from_str("").unwrap();
        assert_eq!(parsed.starting_light, 5);
        assert_eq!(parsed.reset_to, ResetTarget::Title);
    }

    #[test]
    fn story_file_round_trips() {
        let text = toml::to_string(&StoryFile { has_won: true }).unwrap();
        let back: StoryFile = toml::from_str(&text).unwrap();
        assert!(back.has_won);
    }
}
