// Progression engine: the level/attempt/light state machine that decides
// whether a choice is correct and what happens next. Pure game logic; the
// section plugins drive it and relay its notifications.

use bevy::prelude::*;
use serde::Deserialize;
use strum::{Display, EnumIter};

use crate::levels::{ConfigError, LevelDefinition, LevelSet};

/// A direction choice. The input alphabet is closed; keys that map to
/// nothing are dropped before they reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Direction {
    Left,
    Straight,
    Right,
}

/// Which scene the machine is in. Exactly one is active. `ShadowGuard` is a
/// sub-state of play: it is entered only from `Playing` and returns only to
/// `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Narration,
    TitleSlides,
    Playing,
    ShadowGuard,
    GameOver,
    Victory,
}

/// Where a full reset lands. Source revisions disagree on this, so it is a
/// setting rather than a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetTarget {
    #[default]
    Title,
    Narration,
}

/// Per-run progress. Owned by the engine; recreated identically by every
/// reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub level: usize,
    pub attempt: usize,
    pub light: u32,
    pub input_locked: bool,
    pub guard_visible: bool,
}

impl ProgressState {
    fn new(light: u32) -> Self {
        Self {
            level: 0,
            attempt: 0,
            light,
            input_locked: false,
            guard_visible: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub starting_light: u32,
    pub narration_lines: usize,
    pub slide_count: usize,
    pub reset_to: ResetTarget,
}

/// One-shot notifications for the presentation layer.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    SceneChanged(SceneState),
    LevelChanged(usize),
    MeterChanged(u32),
    /// A choice was taken and the footstep window has begun.
    ChoiceAccepted(Direction),
    /// `ambush` is set when the wrong direction was the gate's own ambush
    /// path rather than a stray wrong turn.
    GuardShown { level: usize, ambush: bool },
    GuardHidden,
    GameOver,
    Victory,
}

/// The HUD draws at most this many light bars.
pub const MAX_LIGHT: u32 = 5;

#[derive(Resource)]
pub struct Engine {
    levels: LevelSet,
    starting_light: u32,
    narration_lines: usize,
    slide_count: usize,
    reset_to: ResetTarget,
    scene: SceneState,
    narration_line: usize,
    slide: usize,
    progress: ProgressState,
    /// The one deferred choice awaiting the end of its footstep window.
    pending: Option<Direction>,
}

impl Engine {
    pub fn new(levels: LevelSet, config: EngineConfig) -> Result<Self, ConfigError> {
        if config.starting_light == 0 || config.starting_light > MAX_LIGHT {
            return Err(ConfigError::LightOutOfRange(config.starting_light));
        }
        Ok(Self {
            levels,
            starting_light: config.starting_light,
            narration_lines: config.narration_lines,
            slide_count: config.slide_count,
            reset_to: config.reset_to,
            scene: SceneState::Narration,
            narration_line: 0,
            slide: 0,
            progress: ProgressState::new(config.starting_light),
            pending: None,
        })
    }

    pub fn scene(&self) -> SceneState {
        self.scene
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn starting_light(&self) -> u32 {
        self.starting_light
    }

    pub fn gate(&self, index: usize) -> Option<&LevelDefinition> {
        self.levels.get(index)
    }

    pub fn current_level(&self) -> Option<&LevelDefinition> {
        self.levels.get(self.progress.level)
    }

    pub fn narration_line(&self) -> usize {
        self.narration_line
    }

    pub fn slide(&self) -> usize {
        self.slide
    }

    pub fn on_last_slide(&self) -> bool {
        self.slide + 1 >= self.slide_count
    }

    /// Advance the narration line or slide pointer. No-op anywhere else.
    pub fn advance(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        match self.scene {
            SceneState::Narration => {
                if self.narration_line + 1 < self.narration_lines {
                    self.narration_line += 1;
                } else {
                    self.set_scene(SceneState::TitleSlides, &mut events);
                }
            }
            SceneState::TitleSlides => {
                if self.slide + 1 < self.slide_count {
                    self.slide += 1;
                }
            }
            _ => {}
        }
        events
    }

    /// Context-sensitive acknowledgement: step the slides and start the game
    /// from the last one, dismiss the guard, or leave the fail screen.
    pub fn confirm(&mut self) -> Vec<EngineEvent> {
        match self.scene {
            SceneState::Narration => self.advance(),
            SceneState::TitleSlides => {
                if self.on_last_slide() {
                    self.start_playing()
                } else {
                    self.slide += 1;
                    Vec::new()
                }
            }
            SceneState::ShadowGuard => {
                let mut events = Vec::new();
                self.progress.guard_visible = false;
                self.progress.input_locked = false;
                self.set_scene(SceneState::Playing, &mut events);
                events.push(EngineEvent::GuardHidden);
                events
            }
            SceneState::GameOver => self.reset(),
            SceneState::Playing | SceneState::Victory => Vec::new(),
        }
    }

    /// Record a direction choice and lock input for the footstep window.
    /// The result is committed later by [`Engine::resolve_pending`];
    /// submissions while locked are dropped, not queued.
    pub fn submit_choice(&mut self, direction: Direction) -> Vec<EngineEvent> {
        if self.scene != SceneState::Playing || self.progress.input_locked {
            return Vec::new();
        }
        debug!("choice submitted: {direction}");
        self.progress.input_locked = true;
        self.pending = Some(direction);
        vec![EngineEvent::ChoiceAccepted(direction)]
    }

    /// Commit the deferred choice once its footstep window has elapsed.
    pub fn resolve_pending(&mut self) -> Vec<EngineEvent> {
        let Some(direction) = self.pending.take() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let Some(gate) = self.levels.get(self.progress.level) else {
            return events;
        };
        let Some(&expected) = gate.required.get(self.progress.attempt) else {
            return events;
        };
        let steps = gate.required.len();
        let penalty = gate.penalty;
        let ambush = gate.ambush;

        if direction == expected {
            // A correct answer advances the attempt counter; it never
            // restores lost light.
            self.progress.input_locked = false;
            self.progress.attempt += 1;
            if self.progress.attempt >= steps {
                self.progress.level += 1;
                self.progress.attempt = 0;
                if self.progress.level >= self.levels.len() {
                    // Campaign complete. An empty meter still loses, even
                    // at this boundary.
                    if self.progress.light == 0 {
                        self.set_scene(SceneState::GameOver, &mut events);
                        events.push(EngineEvent::GameOver);
                    } else {
                        self.set_scene(SceneState::Victory, &mut events);
                        events.push(EngineEvent::Victory);
                    }
                } else {
                    events.push(EngineEvent::LevelChanged(self.progress.level));
                }
            }
        } else {
            self.progress.light = self.progress.light.saturating_sub(penalty);
            events.push(EngineEvent::MeterChanged(self.progress.light));
            if self.progress.light == 0 {
                self.progress.input_locked = false;
                self.set_scene(SceneState::GameOver, &mut events);
                events.push(EngineEvent::GameOver);
            } else {
                // Input stays locked until the guard is acknowledged. The
                // failed attempt is replayed, not skipped.
                self.progress.guard_visible = true;
                self.set_scene(SceneState::ShadowGuard, &mut events);
                events.push(EngineEvent::GuardShown {
                    level: self.progress.level,
                    ambush: direction == ambush,
                });
            }
        }
        events
    }

    /// Reinitialize per-run state and return to the configured reset target.
    /// Idempotent: repeated calls land in the same state.
    pub fn reset(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.pending = None;
        self.narration_line = 0;
        self.slide = 0;
        self.progress = ProgressState::new(self.starting_light);
        let target = match self.reset_to {
            ResetTarget::Title => SceneState::TitleSlides,
            ResetTarget::Narration => SceneState::Narration,
        };
        self.set_scene(target, &mut events);
        events
    }

    /// External signal that the portal animation finished; performs the
    /// implicit reset. The victory scene accepts no other input.
    pub fn victory_complete(&mut self) -> Vec<EngineEvent> {
        if self.scene != SceneState::Victory {
            return Vec::new();
        }
        self.reset()
    }

    fn start_playing(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.pending = None;
        self.progress = ProgressState::new(self.starting_light);
        self.set_scene(SceneState::Playing, &mut events);
        events.push(EngineEvent::LevelChanged(0));
        events
    }

    fn set_scene(&mut self, scene: SceneState, events: &mut Vec<EngineEvent>) {
        if self.scene != scene {
            debug!("scene {:?} -> {:?}", self.scene, scene);
            self.scene = scene;
            events.push(EngineEvent::SceneChanged(scene));
        }
    }
}

/// Relay engine notifications into the message bus.
pub fn publish(events: Vec<EngineEvent>, writer: &mut MessageWriter<EngineEvent>) {
    for event in events {
        writer.write(event);
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::levels::LevelSet;
    use Direction::{Left, Right, Straight};

    fn gate(required: &'static [Direction], ambush: Direction, penalty: u32) -> LevelDefinition {
        LevelDefinition {
            required,
            ambush,
            penalty,
            prompt: "",
            background: "",
            guard_image: "",
        }
    }

    /// The canonical three-gate shape: two three-step gates at penalty 1,
    /// a two-step final gate at penalty 2.
    fn three_gates() -> LevelSet {
        LevelSet::new(vec![
            gate(&[Right, Straight, Left], Straight, 1),
            gate(&[Straight, Left, Right], Right, 1),
            gate(&[Left, Straight], Left, 2),
        ])
        .unwrap()
    }

    fn engine(levels: LevelSet, light: u32, reset_to: ResetTarget) -> Engine {
        Engine::new(
            levels,
            EngineConfig {
                starting_light: light,
                narration_lines: 2,
                slide_count: 3,
                reset_to,
            },
        )
        .unwrap()
    }

    /// Walk through the narration and slides until play begins.
    fn playing_engine(light: u32) -> Engine {
        let mut engine = engine(three_gates(), light, ResetTarget::Title);
        engine.advance();
        engine.advance();
        assert_eq!(engine.scene(), SceneState::TitleSlides);
        engine.advance();
        engine.advance();
        assert!(engine.on_last_slide());
        engine.confirm();
        assert_eq!(engine.scene(), SceneState::Playing);
        engine
    }

    fn submit_and_resolve(engine: &mut Engine, direction: Direction) -> Vec<EngineEvent> {
        let mut events = engine.submit_choice(direction);
        events.extend(engine.resolve_pending());
        events
    }

    fn clear_gate(engine: &mut Engine) -> Vec<EngineEvent> {
        let steps: Vec<Direction> = engine.current_level().unwrap().required.to_vec();
        let mut events = Vec::new();
        for step in steps {
            events.extend(submit_and_resolve(engine, step));
        }
        events
    }

    fn wrong_for(engine: &Engine) -> Direction {
        let expected = engine.current_level().unwrap().required[engine.progress().attempt];
        Direction::iter().find(|d| *d != expected).unwrap()
    }

    #[test]
    fn correct_sequence_clears_gate_without_spending_light() {
        let mut engine = playing_engine(3);
        let events = clear_gate(&mut engine);
        assert_eq!(engine.progress().level, 1);
        assert_eq!(engine.progress().attempt, 0);
        assert_eq!(engine.progress().light, 3);
        assert!(events.contains(&EngineEvent::LevelChanged(1)));
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::MeterChanged(_))));
    }

    #[test]
    fn wrong_choice_costs_penalty_at_every_attempt_index() {
        for prefix in 0..3 {
            let mut engine = playing_engine(3);
            let steps: Vec<Direction> = engine.current_level().unwrap().required.to_vec();
            for step in steps.iter().take(prefix) {
                submit_and_resolve(&mut engine, *step);
            }
            let wrong = wrong_for(&engine);
            let events = submit_and_resolve(&mut engine, wrong);
            assert_eq!(engine.progress().light, 2, "attempt index {prefix}");
            assert_eq!(engine.scene(), SceneState::ShadowGuard);
            assert_eq!(engine.progress().attempt, prefix, "wrong answers never advance");
            assert!(events.contains(&EngineEvent::MeterChanged(2)));
        }
    }

    #[test]
    fn final_gate_penalty_is_doubled() {
        let mut engine = playing_engine(5);
        clear_gate(&mut engine);
        clear_gate(&mut engine);
        assert_eq!(engine.progress().level, 2);
        let wrong = wrong_for(&engine);
        submit_and_resolve(&mut engine, wrong);
        assert_eq!(engine.progress().light, 3);
    }

    #[test]
    fn meter_saturates_at_zero() {
        let mut engine = playing_engine(1);
        clear_gate(&mut engine);
        clear_gate(&mut engine);
        // Penalty 2 against a single remaining bar must clamp, not wrap.
        let wrong = wrong_for(&engine);
        submit_and_resolve(&mut engine, wrong);
        assert_eq!(engine.progress().light, 0);
        assert_eq!(engine.scene(), SceneState::GameOver);
    }

    #[test]
    fn empty_meter_ends_the_game_mid_gate() {
        let mut engine = playing_engine(1);
        let wrong = wrong_for(&engine);
        let events = submit_and_resolve(&mut engine, wrong);
        assert_eq!(engine.scene(), SceneState::GameOver);
        assert!(events.contains(&EngineEvent::GameOver));
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::GuardShown { .. })));
    }

    #[test]
    fn exhausting_the_meter_on_the_final_gate_is_game_over_not_victory() {
        let mut engine = playing_engine(2);
        clear_gate(&mut engine);
        clear_gate(&mut engine);
        let wrong = wrong_for(&engine);
        let events = submit_and_resolve(&mut engine, wrong);
        assert_eq!(engine.progress().light, 0);
        assert_eq!(engine.scene(), SceneState::GameOver);
        assert!(!events.contains(&EngineEvent::Victory));
    }

    #[test]
    fn clearing_every_gate_with_light_left_is_victory() {
        let mut engine = playing_engine(1);
        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(clear_gate(&mut engine));
        }
        assert_eq!(engine.scene(), SceneState::Victory);
        assert_eq!(engine.progress().light, 1);
        assert!(events.contains(&EngineEvent::Victory));
    }

    #[test]
    fn single_step_gate_advances_the_level() {
        // Scenario from the one-attempt revisions: gate 0 requires [Right].
        let levels = LevelSet::new(vec![
            gate(&[Right], Straight, 1),
            gate(&[Left, Straight], Left, 1),
        ])
        .unwrap();
        let mut engine = engine(levels, 3, ResetTarget::Title);
        engine.advance();
        engine.advance();
        engine.confirm();
        engine.confirm();
        engine.confirm();
        assert_eq!(engine.scene(), SceneState::Playing);

        let events = submit_and_resolve(&mut engine, Right);
        assert_eq!(engine.progress().level, 1);
        assert_eq!(engine.progress().light, 3);
        assert!(events.contains(&EngineEvent::LevelChanged(1)));
    }

    #[test]
    fn guard_acknowledgement_replays_the_failed_attempt() {
        let mut engine = playing_engine(3);
        // Gate 0 expects Right first; Left is a stray wrong turn.
        let events = submit_and_resolve(&mut engine, Left);
        assert_eq!(engine.scene(), SceneState::ShadowGuard);
        assert!(engine.progress().guard_visible);
        assert!(engine.progress().input_locked);
        assert!(events.contains(&EngineEvent::GuardShown {
            level: 0,
            ambush: false
        }));

        let events = engine.confirm();
        assert_eq!(engine.scene(), SceneState::Playing);
        assert_eq!(engine.progress().attempt, 0);
        assert!(!engine.progress().guard_visible);
        assert!(!engine.progress().input_locked);
        assert!(events.contains(&EngineEvent::GuardHidden));
    }

    #[test]
    fn ambush_direction_is_flagged() {
        let mut engine = playing_engine(3);
        // Straight is gate 0's ambush path.
        let events = submit_and_resolve(&mut engine, Straight);
        assert!(events.contains(&EngineEvent::GuardShown {
            level: 0,
            ambush: true
        }));
    }

    #[test]
    fn submissions_while_locked_are_dropped() {
        let mut engine = playing_engine(3);
        assert_eq!(engine.submit_choice(Right).len(), 1);
        let before = engine.progress().clone();
        assert!(engine.submit_choice(Left).is_empty());
        assert_eq!(*engine.progress(), before);

        // The pending choice is still the first one.
        engine.resolve_pending();
        assert_eq!(engine.progress().attempt, 1);
        assert_eq!(engine.progress().light, 3);
    }

    #[test]
    fn correct_answers_never_restore_light() {
        let mut engine = playing_engine(3);
        submit_and_resolve(&mut engine, Left);
        engine.confirm();
        clear_gate(&mut engine);
        assert_eq!(engine.progress().level, 1);
        assert_eq!(engine.progress().light, 2);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = playing_engine(3);
        let wrong = wrong_for(&engine);
        submit_and_resolve(&mut engine, wrong);

        let first = engine.reset();
        let progress = engine.progress().clone();
        let scene = engine.scene();
        assert!(first.contains(&EngineEvent::SceneChanged(SceneState::TitleSlides)));

        for _ in 0..3 {
            let again = engine.reset();
            assert_eq!(*engine.progress(), progress);
            assert_eq!(engine.scene(), scene);
            // Already there: no scene notification goes out twice.
            assert!(again.is_empty());
        }
    }

    #[test]
    fn reset_can_be_configured_to_replay_the_narration() {
        let mut engine = engine(three_gates(), 1, ResetTarget::Narration);
        engine.advance();
        engine.advance();
        engine.advance();
        engine.advance();
        engine.confirm();
        let wrong = wrong_for(&engine);
        submit_and_resolve(&mut engine, wrong);
        assert_eq!(engine.scene(), SceneState::GameOver);

        engine.confirm();
        assert_eq!(engine.scene(), SceneState::Narration);
        assert_eq!(engine.narration_line(), 0);
        assert_eq!(engine.progress().light, 1);
    }

    #[test]
    fn game_over_confirm_resets_the_run() {
        let mut engine = playing_engine(1);
        let wrong = wrong_for(&engine);
        submit_and_resolve(&mut engine, wrong);
        assert_eq!(engine.scene(), SceneState::GameOver);

        engine.confirm();
        assert_eq!(engine.scene(), SceneState::TitleSlides);
        assert_eq!(engine.slide(), 0);
        assert_eq!(engine.progress().light, 1);
        assert_eq!(engine.progress().level, 0);
    }

    #[test]
    fn victory_waits_for_the_portal_signal() {
        let mut engine = playing_engine(2);
        for _ in 0..3 {
            clear_gate(&mut engine);
        }
        assert_eq!(engine.scene(), SceneState::Victory);

        // No user input skips the sequence.
        assert!(engine.submit_choice(Left).is_empty());
        assert!(engine.confirm().is_empty());
        assert!(engine.advance().is_empty());
        assert_eq!(engine.scene(), SceneState::Victory);

        let events = engine.victory_complete();
        assert_eq!(engine.scene(), SceneState::TitleSlides);
        assert_eq!(engine.progress().light, 2);
        assert_eq!(engine.progress().level, 0);
        assert!(events.contains(&EngineEvent::SceneChanged(SceneState::TitleSlides)));

        // The signal arrives exactly once; later calls do nothing.
        assert!(engine.victory_complete().is_empty());
    }

    #[test]
    fn choices_outside_play_are_ignored() {
        let mut engine = engine(three_gates(), 3, ResetTarget::Title);
        assert_eq!(engine.scene(), SceneState::Narration);
        assert!(engine.submit_choice(Left).is_empty());
        assert!(engine.resolve_pending().is_empty());
        assert_eq!(engine.progress().light, 3);
    }

    #[test]
    fn advance_and_confirm_are_no_ops_during_play() {
        let mut engine = playing_engine(3);
        let before = engine.progress().clone();
        assert!(engine.advance().is_empty());
        assert!(engine.confirm().is_empty());
        assert_eq!(*engine.progress(), before);
        assert_eq!(engine.scene(), SceneState::Playing);
    }

    #[test]
    fn narration_walks_its_lines_then_hands_off() {
        let mut engine = engine(three_gates(), 3, ResetTarget::Title);
        assert_eq!(engine.narration_line(), 0);
        engine.advance();
        assert_eq!(engine.narration_line(), 1);
        assert_eq!(engine.scene(), SceneState::Narration);
        let events = engine.advance();
        assert!(events.contains(&EngineEvent::SceneChanged(SceneState::TitleSlides)));
    }

    #[test]
    fn confirm_steps_slides_before_the_last_one() {
        let mut engine = engine(three_gates(), 3, ResetTarget::Title);
        engine.advance();
        engine.advance();
        assert_eq!(engine.slide(), 0);
        assert!(engine.confirm().is_empty());
        assert_eq!(engine.slide(), 1);
        assert_eq!(engine.scene(), SceneState::TitleSlides);
    }

    #[test]
    fn starting_light_is_range_checked() {
        for light in [0, 6] {
            let result = Engine::new(
                three_gates(),
                EngineConfig {
                    starting_light: light,
                    narration_lines: 1,
                    slide_count: 1,
                    reset_to: ResetTarget::Title,
                },
            );
            assert!(matches!(result, Err(ConfigError::LightOutOfRange(_))));
        }
    }
}
