/// Game sections and shared story state.
use bevy::prelude::*;

use crate::progression::{EngineEvent, SceneState};
use crate::settings;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum Section {
    #[default]
    Narration,
    Title,
    Playing,
    GameOver,
    Victory,
}

impl Section {
    /// The guard interrupt is an overlay over play, not a screen of its own.
    fn for_scene(scene: SceneState) -> Self {
        match scene {
            SceneState::Narration => Section::Narration,
            SceneState::TitleSlides => Section::Title,
            SceneState::Playing | SceneState::ShadowGuard => Section::Playing,
            SceneState::GameOver => Section::GameOver,
            SceneState::Victory => Section::Victory,
        }
    }
}

/// Flags that survive across runs.
#[derive(Resource, Default)]
pub struct StoryFlags {
    pub has_won: bool,
}

pub struct SectionsPlugin;

impl Plugin for SectionsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<EngineEvent>()
            .insert_resource(settings::load_story_flags())
            .add_systems(Update, follow_engine);
    }
}

/// Mirror engine scene changes into the section state, and record the first
/// win when it happens.
fn follow_engine(
    mut events: MessageReader<EngineEvent>,
    mut next_section: ResMut<NextState<Section>>,
    mut flags: ResMut<StoryFlags>,
) {
    for event in events.read() {
        match event {
            EngineEvent::SceneChanged(scene) => {
                next_section.set(Section::for_scene(*scene));
            }
            EngineEvent::Victory => {
                if !flags.has_won {
                    flags.has_won = true;
                    settings::save_story_flags(&flags);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_interrupt_stays_on_the_playing_screen() {
        assert_eq!(Section::for_scene(SceneState::ShadowGuard), Section::Playing);
        assert_eq!(Section::for_scene(SceneState::Playing), Section::Playing);
    }

    #[test]
    fn every_other_scene_has_its_own_section() {
        assert_eq!(Section::for_scene(SceneState::Narration), Section::Narration);
        assert_eq!(Section::for_scene(SceneState::TitleSlides), Section::Title);
        assert_eq!(Section::for_scene(SceneState::GameOver), Section::GameOver);
        assert_eq!(Section::for_scene(SceneState::Victory), Section::Victory);
    }
}
