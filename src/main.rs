// Main
mod gameover;
mod guard;
mod hud;
mod levels;
mod narration;
mod playing;
mod progression;
mod sections;
mod settings;
mod title;
mod victory;

use bevy::prelude::*;

use gameover::GameOverPlugin;
use guard::GuardPlugin;
use hud::HudPlugin;
use narration::NarrationPlugin;
use playing::PlayingPlugin;
use progression::{Engine, EngineConfig};
use sections::{Section, SectionsPlugin};
use settings::GameSettings;
use title::TitlePlugin;
use victory::VictoryPlugin;

fn main() {
    let settings = GameSettings::load(settings::SETTINGS_PATH);
    let engine = levels::campaign()
        .and_then(|campaign| {
            Engine::new(
                campaign,
                EngineConfig {
                    starting_light: settings.starting_light,
                    narration_lines: narration::LINES.len(),
                    slide_count: title::SLIDES.len(),
                    reset_to: settings.reset_to,
                },
            )
        })
        .unwrap_or_else(|err| {
            eprintln!("invalid game configuration: {err}");
            std::process::exit(1);
        });

    App::new()
        .add_plugins(DefaultPlugins)
        .init_state::<Section>()
        .insert_resource(settings)
        .insert_resource(engine)
        .add_plugins((
            SectionsPlugin,
            NarrationPlugin,
            TitlePlugin,
            PlayingPlugin,
            GuardPlugin,
            HudPlugin,
            GameOverPlugin,
            VictoryPlugin,
        ))
        .add_systems(Startup, spawn_camera)
        .run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
