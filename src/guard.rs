// Shadow guard overlay: one persistent entity, hidden until a wrong turn.

use bevy::prelude::*;
use rand::Rng;

use crate::progression::{Engine, EngineEvent};

pub struct GuardPlugin;

impl Plugin for GuardPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_guard_overlay)
            .add_systems(Update, (guard_visibility, guard_tremble).chain());
    }
}

/// Art for the roaming guard, shown for wrong turns off the ambush path.
const ROAMING_GUARD: &str = "guards/guard0.png";
const GUARD_SIZE: f32 = 200.0;
/// Max tremble offset in pixels while the guard looms.
const TREMBLE: f32 = 3.0;

#[derive(Component)]
struct GuardOverlay;

fn spawn_guard_overlay(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((
        GuardOverlay,
        ImageNode::new(asset_server.load(ROAMING_GUARD)),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Px(GUARD_SIZE),
            height: Val::Px(GUARD_SIZE),
            left: Val::Percent(50.0),
            top: Val::Percent(50.0),
            margin: UiRect {
                left: Val::Px(-GUARD_SIZE / 2.0),
                top: Val::Px(-GUARD_SIZE / 2.0),
                ..default()
            },
            ..default()
        },
        GlobalZIndex(100),
        Visibility::Hidden,
    ));
}

/// Show the right guard art on a wrong turn, hide it when acknowledged. The
/// ambush path has its gate's own guard; any other wrong turn meets the
/// roaming one.
fn guard_visibility(
    mut events: MessageReader<EngineEvent>,
    engine: Res<Engine>,
    asset_server: Res<AssetServer>,
    mut overlays: Query<(&mut ImageNode, &mut Visibility), With<GuardOverlay>>,
) {
    for event in events.read() {
        match event {
            EngineEvent::GuardShown { level, ambush } => {
                let Ok((mut image, mut visibility)) = overlays.single_mut() else {
                    continue;
                };
                let path = if *ambush {
                    engine
                        .gate(*level)
                        .map(|gate| gate.guard_image)
                        .unwrap_or(ROAMING_GUARD)
                } else {
                    ROAMING_GUARD
                };
                debug!("shadow guard at gate {}: {path}", level + 1);
                image.image = asset_server.load(path);
                *visibility = Visibility::Inherited;
            }
            EngineEvent::GuardHidden => {
                if let Ok((_, mut visibility)) = overlays.single_mut() {
                    *visibility = Visibility::Hidden;
                }
            }
            _ => {}
        }
    }
}

/// The guard looms and trembles while visible.
fn guard_tremble(engine: Res<Engine>, mut overlays: Query<&mut Node, With<GuardOverlay>>) {
    if !engine.progress().guard_visible {
        return;
    }
    let Ok(mut node) = overlays.single_mut() else {
        return;
    };
    let mut rng = rand::rng();
    node.margin.left = Val::Px(-GUARD_SIZE / 2.0 + rng.random_range(-TREMBLE..TREMBLE));
    node.margin.top = Val::Px(-GUARD_SIZE / 2.0 + rng.random_range(-TREMBLE..TREMBLE));
}
