// Title art and lore slides, shown as one key-through sequence.

use bevy::prelude::*;

use crate::progression::{self, Engine, EngineEvent};
use crate::sections::{Section, StoryFlags};

pub struct TitlePlugin;

impl Plugin for TitlePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Section::Title), setup_title).add_systems(
            Update,
            (title_advance, title_slide)
                .chain()
                .run_if(in_state(Section::Title)),
        );
    }
}

pub const SLIDES: [&str; 9] = [
    "titles/title1.png",
    "titles/title2.png",
    "titles/title3.png",
    "titles/title4.png",
    "lore/lore1.png",
    "lore/lore2.png",
    "lore/lore3.png",
    "lore/lore4.png",
    "lore/lore5.png",
];

#[derive(Component)]
struct SlideImage;

#[derive(Component)]
struct StartHint;

fn setup_title(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    engine: Res<Engine>,
    flags: Res<StoryFlags>,
) {
    commands.spawn((
        SlideImage,
        ImageNode::new(asset_server.load(SLIDES[engine.slide().min(SLIDES.len() - 1)])),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        GlobalZIndex(-1),
        DespawnOnExit(Section::Title),
    ));

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::FlexEnd,
                align_items: AlignItems::Center,
                row_gap: Val::Px(8.0),
                padding: UiRect::bottom(Val::Px(40.0)),
                ..default()
            },
            DespawnOnExit(Section::Title),
        ))
        .with_children(|parent| {
            if flags.has_won {
                parent.spawn((
                    Text::new("You have escaped before."),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::srgba(0.7, 0.7, 0.8, 0.8)),
                ));
            }
            parent.spawn((
                StartHint,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

/// Any key steps through the slides; the engine starts play from the last
/// one.
fn title_advance(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut engine: ResMut<Engine>,
    mut events: MessageWriter<EngineEvent>,
) {
    if keyboard.get_just_pressed().next().is_none() {
        return;
    }
    progression::publish(engine.confirm(), &mut events);
}

fn title_slide(
    engine: Res<Engine>,
    asset_server: Res<AssetServer>,
    mut slides: Query<&mut ImageNode, With<SlideImage>>,
    mut hints: Query<&mut Text, With<StartHint>>,
) {
    if let Ok(mut image) = slides.single_mut() {
        image.image = asset_server.load(SLIDES[engine.slide().min(SLIDES.len() - 1)]);
    }

    let Ok(mut hint) = hints.single_mut() else {
        return;
    };
    let wanted = if engine.on_last_slide() {
        "Press any key to start the game"
    } else {
        ""
    };
    if hint.0 != wanted {
        hint.0 = wanted.to_string();
    }
}
