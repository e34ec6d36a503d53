// In-play HUD: star meter, gate label, Luma's expression, and the prompt
// box.

use bevy::prelude::*;
use rand::Rng;

use crate::progression::{Engine, EngineEvent};
use crate::sections::Section;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Section::Playing), setup_hud).add_systems(
            Update,
            (hud_refresh, star_flicker)
                .chain()
                .run_if(in_state(Section::Playing)),
        );
    }
}

const LIT_STAR: Color = Color::srgb(1.0, 0.9, 0.2);
const DIM_STAR: Color = Color::srgb(0.3, 0.3, 0.35);
/// Light value at or below which the remaining stars start to gutter.
const FLICKER_BELOW: u32 = 2;

/// Luma's face for a given light value. At zero there is no face to show.
fn expression(light: u32) -> Option<&'static str> {
    match light {
        0 => None,
        1..=2 => Some("expressions/unhappy.png"),
        3..=4 => Some("expressions/worry.png"),
        _ => Some("expressions/happy.png"),
    }
}

#[derive(Component)]
struct LightStar(u32);

#[derive(Component)]
struct GateLabel;

#[derive(Component)]
struct ExpressionPortrait;

#[derive(Component)]
struct PromptText;

fn setup_hud(mut commands: Commands, asset_server: Res<AssetServer>, engine: Res<Engine>) {
    let light = engine.progress().light;

    // Star meter, top left.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                column_gap: Val::Px(6.0),
                ..default()
            },
            DespawnOnExit(Section::Playing),
        ))
        .with_children(|parent| {
            for index in 0..engine.starting_light() {
                parent.spawn((
                    LightStar(index),
                    Text::new("*"),
                    TextFont {
                        font_size: 28.0,
                        ..default()
                    },
                    TextColor(if index < light { LIT_STAR } else { DIM_STAR }),
                ));
            }
        });

    // Gate number, top right.
    commands.spawn((
        GateLabel,
        Text::new(format!("Gate {}", engine.progress().level + 1)),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.84, 0.0)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            ..default()
        },
        DespawnOnExit(Section::Playing),
    ));

    // Expression portrait, bottom left.
    if let Some(path) = expression(light) {
        commands.spawn((
            ExpressionPortrait,
            ImageNode::new(asset_server.load(path)),
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(10.0),
                left: Val::Px(10.0),
                width: Val::Px(80.0),
                height: Val::Px(80.0),
                ..default()
            },
            DespawnOnExit(Section::Playing),
        ));
    }

    // Prompt box, bottom center.
    let prompt = engine
        .current_level()
        .map(|gate| gate.prompt)
        .unwrap_or_default();
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                bottom: Val::Px(20.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            DespawnOnExit(Section::Playing),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        padding: UiRect::all(Val::Px(12.0)),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.4)),
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
                ))
                .with_children(|body| {
                    body.spawn((
                        PromptText,
                        Text::new(prompt),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

/// Apply meter and gate notifications to the HUD widgets.
fn hud_refresh(
    mut events: MessageReader<EngineEvent>,
    engine: Res<Engine>,
    asset_server: Res<AssetServer>,
    mut stars: Query<(&LightStar, &mut TextColor)>,
    mut labels: Query<&mut Text, (With<GateLabel>, Without<PromptText>)>,
    mut prompts: Query<&mut Text, (With<PromptText>, Without<GateLabel>)>,
    mut portraits: Query<(&mut ImageNode, &mut Visibility), With<ExpressionPortrait>>,
) {
    for event in events.read() {
        match event {
            EngineEvent::MeterChanged(light) => {
                for (star, mut color) in &mut stars {
                    color.0 = if star.0 < *light { LIT_STAR } else { DIM_STAR };
                }
                if let Ok((mut image, mut visibility)) = portraits.single_mut() {
                    match expression(*light) {
                        Some(path) => {
                            image.image = asset_server.load(path);
                            *visibility = Visibility::Inherited;
                        }
                        None => *visibility = Visibility::Hidden,
                    }
                }
            }
            EngineEvent::LevelChanged(index) => {
                if let Ok(mut label) = labels.single_mut() {
                    label.0 = format!("Gate {}", index + 1);
                }
                if let Ok(mut prompt) = prompts.single_mut() {
                    if let Some(gate) = engine.current_level() {
                        prompt.0 = gate.prompt.to_string();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Failing light gutters: the stars still lit flicker when few are left.
fn star_flicker(engine: Res<Engine>, mut stars: Query<(&LightStar, &mut TextColor)>) {
    let light = engine.progress().light;
    if light == 0 || light > FLICKER_BELOW {
        return;
    }
    let mut rng = rand::rng();
    for (star, mut color) in &mut stars {
        if star.0 < light {
            let dim: f32 = rng.random_range(0.6..1.0);
            color.0 = Color::srgb(dim, 0.9 * dim, 0.2 * dim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_follows_the_meter() {
        assert_eq!(expression(5), Some("expressions/happy.png"));
        assert_eq!(expression(4), Some("expressions/worry.png"));
        assert_eq!(expression(3), Some("expressions/worry.png"));
        assert_eq!(expression(2), Some("expressions/unhappy.png"));
        assert_eq!(expression(1), Some("expressions/unhappy.png"));
        assert_eq!(expression(0), None);
    }
}
