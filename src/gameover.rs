// Game over section

use bevy::prelude::*;

use crate::progression::{self, Engine, EngineEvent};
use crate::sections::Section;

pub struct GameOverPlugin;

impl Plugin for GameOverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Section::GameOver), setup_game_over)
            .add_systems(Update, game_over_input.run_if(in_state(Section::GameOver)));
    }
}

const FAIL_BACKGROUND: &str = "fail.png";

fn setup_game_over(mut commands: Commands, asset_server: Res<AssetServer>) {
    info!("the dark took the last of Luma's light");

    commands.spawn((
        ImageNode::new(asset_server.load(FAIL_BACKGROUND)),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        GlobalZIndex(-1),
        DespawnOnExit(Section::GameOver),
    ));

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                ..default()
            },
            DespawnOnExit(Section::GameOver),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Game Over"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new("Press any key"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgba(0.85, 0.85, 0.85, 1.0)),
            ));
        });
}

/// Any key resets the run.
fn game_over_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut engine: ResMut<Engine>,
    mut events: MessageWriter<EngineEvent>,
) {
    if keyboard.get_just_pressed().next().is_none() {
        return;
    }
    progression::publish(engine.confirm(), &mut events);
}
