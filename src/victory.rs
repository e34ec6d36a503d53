// Victory section: the portal opens, the congratulations hold, and the run
// resets on its own. No input skips any of it.

use bevy::prelude::*;

use crate::progression::{self, Engine, EngineEvent};
use crate::sections::Section;
use crate::settings::GameSettings;

pub struct VictoryPlugin;

impl Plugin for VictoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Section::Victory), setup_victory)
            .add_systems(OnExit(Section::Victory), exit_victory)
            .add_systems(Update, victory_sequence.run_if(in_state(Section::Victory)));
    }
}

const PORTAL_FRAMES: [&str; 7] = [
    "portal/portal1.png",
    "portal/portal2.png",
    "portal/portal3.png",
    "portal/portal4.png",
    "portal/portal5.png",
    "portal/portal6.png",
    "portal/portal7.png",
];

const WIN_LINES: [&str; 3] = [
    "Congratulations!",
    "You helped Luma find her way back to her dimension.",
    "She can now search for her parents!",
];

#[derive(Resource)]
struct VictoryState {
    phase: VictoryPhase,
    timer: f32,
}

enum VictoryPhase {
    Portal { frame: usize },
    WinText,
}

#[derive(Component)]
struct PortalImage;

fn setup_victory(mut commands: Commands, asset_server: Res<AssetServer>) {
    info!("the portal opens");

    commands.insert_resource(VictoryState {
        phase: VictoryPhase::Portal { frame: 0 },
        timer: 0.0,
    });
    commands.spawn((
        PortalImage,
        ImageNode::new(asset_server.load(PORTAL_FRAMES[0])),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        DespawnOnExit(Section::Victory),
    ));
}

/// Cycle the portal frames once, hold the win text, then tell the engine the
/// sequence is over.
fn victory_sequence(
    mut commands: Commands,
    mut state: ResMut<VictoryState>,
    time: Res<Time>,
    settings: Res<GameSettings>,
    asset_server: Res<AssetServer>,
    mut portals: Query<&mut ImageNode, With<PortalImage>>,
    mut engine: ResMut<Engine>,
    mut events: MessageWriter<EngineEvent>,
) {
    state.timer += time.delta_secs();
    match state.phase {
        VictoryPhase::Portal { frame } => {
            if state.timer < settings.portal_frame_seconds {
                return;
            }
            state.timer = 0.0;
            let next = frame + 1;
            if next >= PORTAL_FRAMES.len() {
                state.phase = VictoryPhase::WinText;
                spawn_win_text(&mut commands);
            } else {
                state.phase = VictoryPhase::Portal { frame: next };
                if let Ok(mut image) = portals.single_mut() {
                    image.image = asset_server.load(PORTAL_FRAMES[next]);
                }
            }
        }
        VictoryPhase::WinText => {
            if state.timer >= settings.victory_hold_seconds {
                progression::publish(engine.victory_complete(), &mut events);
            }
        }
    }
}

fn spawn_win_text(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::BLACK),
            GlobalZIndex(50),
            DespawnOnExit(Section::Victory),
        ))
        .with_children(|parent| {
            for (index, line) in WIN_LINES.iter().enumerate() {
                parent.spawn((
                    Text::new(*line),
                    TextFont {
                        font_size: if index == 0 { 32.0 } else { 18.0 },
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            }
        });
}

fn exit_victory(mut commands: Commands) {
    commands.remove_resource::<VictoryState>();
}
