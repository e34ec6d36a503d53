// Playing section: level backdrop, direction input, and the footstep window
// that locks input between a choice and its result.

use bevy::prelude::*;

use crate::progression::{self, Direction, Engine, EngineEvent, SceneState};
use crate::sections::Section;
use crate::settings::GameSettings;

pub struct PlayingPlugin;

impl Plugin for PlayingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Section::Playing), setup_level)
            .add_systems(OnExit(Section::Playing), clear_footstep_clock)
            .add_systems(
                Update,
                (choice_input, footstep_clock, level_backdrop)
                    .chain()
                    .run_if(in_state(Section::Playing)),
            );
    }
}

const FOOTSTEP_SOUND: &str = "audio/footsteps.ogg";

#[derive(Component)]
struct LevelBackdrop;

/// Counts up through the input-lock window after a choice.
#[derive(Resource)]
struct FootstepClock(f32);

fn setup_level(mut commands: Commands, asset_server: Res<AssetServer>, engine: Res<Engine>) {
    let Some(gate) = engine.current_level() else {
        return;
    };
    commands.spawn((
        LevelBackdrop,
        ImageNode::new(asset_server.load(gate.background)),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        GlobalZIndex(-1),
        DespawnOnExit(Section::Playing),
    ));
}

fn clear_footstep_clock(mut commands: Commands) {
    commands.remove_resource::<FootstepClock>();
}

/// A/W/D or the arrow keys choose a direction; Enter acknowledges the guard.
fn choice_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut engine: ResMut<Engine>,
    mut events: MessageWriter<EngineEvent>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        // Enter only acknowledges the guard. The engine may already have
        // left the playing scene this frame, ahead of the section state.
        if engine.scene() == SceneState::ShadowGuard {
            progression::publish(engine.confirm(), &mut events);
        }
        return;
    }

    let direction = if keyboard.any_just_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        Direction::Left
    } else if keyboard.any_just_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        Direction::Straight
    } else if keyboard.any_just_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        Direction::Right
    } else {
        return;
    };

    let submitted = engine.submit_choice(direction);
    if submitted
        .iter()
        .any(|event| matches!(event, EngineEvent::ChoiceAccepted(_)))
    {
        commands.insert_resource(FootstepClock(0.0));
        commands.spawn((
            AudioPlayer::new(asset_server.load(FOOTSTEP_SOUND)),
            PlaybackSettings::DESPAWN,
        ));
    }
    progression::publish(submitted, &mut events);
}

/// Commit the deferred choice once the lock window has elapsed.
fn footstep_clock(
    mut commands: Commands,
    clock: Option<ResMut<FootstepClock>>,
    time: Res<Time>,
    settings: Res<GameSettings>,
    mut engine: ResMut<Engine>,
    mut events: MessageWriter<EngineEvent>,
) {
    let Some(mut clock) = clock else {
        return;
    };
    clock.0 += time.delta_secs();
    if clock.0 < settings.footstep_seconds {
        return;
    }
    commands.remove_resource::<FootstepClock>();
    progression::publish(engine.resolve_pending(), &mut events);
}

/// Swap the backdrop when the engine moves to the next gate.
fn level_backdrop(
    mut events: MessageReader<EngineEvent>,
    engine: Res<Engine>,
    asset_server: Res<AssetServer>,
    mut backdrops: Query<&mut ImageNode, With<LevelBackdrop>>,
) {
    for event in events.read() {
        if matches!(event, EngineEvent::LevelChanged(_)) {
            let Some(gate) = engine.current_level() else {
                continue;
            };
            if let Ok(mut image) = backdrops.single_mut() {
                image.image = asset_server.load(gate.background);
            }
        }
    }
}
