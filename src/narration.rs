// Intro narration: a dark screen delivering one line at a time.

use bevy::prelude::*;

use crate::progression::{self, Engine, EngineEvent};
use crate::sections::Section;
use crate::settings::GameSettings;

pub struct NarrationPlugin;

impl Plugin for NarrationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Section::Narration), setup_narration)
            .add_systems(
                Update,
                (narration_advance, narration_text)
                    .chain()
                    .run_if(in_state(Section::Narration)),
            );
    }
}

pub const LINES: [&str; 4] = [
    "Far from home, a small light named Luma fell through a crack between dimensions.",
    "She landed in the shadow realm, where guards snuff out any light they catch.",
    "Three gates stand between Luma and the portal back to her own sky.",
    "Choose her path carefully. Every wrong turn feeds the dark.",
];

#[derive(Resource)]
struct NarrationClock(f32);

#[derive(Component)]
struct NarrationText;

fn setup_narration(mut commands: Commands) {
    commands.insert_resource(NarrationClock(0.0));
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::BLACK),
            DespawnOnExit(Section::Narration),
        ))
        .with_children(|parent| {
            parent.spawn((
                NarrationText,
                Text::new(LINES[0]),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgba(0.9, 0.9, 0.95, 1.0)),
            ));
        });
}

/// Lines advance on a timer, or sooner on Enter.
fn narration_advance(
    mut clock: ResMut<NarrationClock>,
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<GameSettings>,
    mut engine: ResMut<Engine>,
    mut events: MessageWriter<EngineEvent>,
) {
    clock.0 += time.delta_secs();
    if clock.0 >= settings.narration_seconds || keyboard.just_pressed(KeyCode::Enter) {
        clock.0 = 0.0;
        progression::publish(engine.advance(), &mut events);
    }
}

fn narration_text(engine: Res<Engine>, mut texts: Query<&mut Text, With<NarrationText>>) {
    let Ok(mut text) = texts.single_mut() else {
        return;
    };
    let line = LINES[engine.narration_line().min(LINES.len() - 1)];
    if text.0 != line {
        text.0 = line.to_string();
    }
}
