//! Top-level orchestrator
//!
//! Owns the progression store, the world state and the active battle, and
//! routes player input to whichever engine currently has focus. This is the
//! only writer of the progression store; battles and the resolver report
//! outcomes back here and the orchestrator applies them in
//! mutate -> notify -> persist order.

use glam::{Vec2, Vec3};

use crate::battle::{
    BattleCommand, BattleConfig, BattleEngine, BattleEvent, BattleOutcome, Opponent, ReflexBattle,
    TurnBattle,
};
use crate::config::MonolithConfig;
use crate::consts::*;
use crate::interact::{InteractOutcome, InteractionResolver, find_nearest_interactable};
use crate::progress::{CharacterId, ProgressionStore};
use crate::roamers::RoamerField;
use crate::ui::Toast;
use crate::vfx::{EffectKind, EffectList};

/// Which scene owns the frame (and player input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    CharacterSelect,
    Overworld,
    Battle,
}

/// Per-frame player commands (one-shots are cleared by the shell)
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Ground-plane movement direction (x = east, y = south)
    pub move_dir: Vec2,
    /// Interact with the nearest monolith or roamer
    pub interact: bool,
    /// Attack / strike, depending on the active engine
    pub strike: bool,
    /// Cycle through unlocked characters
    pub cycle: bool,
    /// Starter pick on the character-select screen
    pub pick_starter: Option<CharacterId>,
}

/// Notifications for the shell, drained each frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Forwarded from the active battle engine
    Battle(BattleEvent),
    /// A monolith with project metadata was unlocked by battle
    ShowProjectPanel { monolith_id: String },
}

/// The running battle session plus what it was about
struct ActiveBattle {
    engine: Box<dyn BattleEngine>,
    opponent: Opponent,
    /// Set when the fight guards a monolith
    monolith_id: Option<String>,
    /// The command this engine understands
    command: BattleCommand,
}

/// Everything the game needs for one session
pub struct Game {
    store: ProgressionStore,
    mode: Mode,
    monoliths: Vec<MonolithConfig>,
    roamers: RoamerField,
    resolver: InteractionResolver,
    pub toast: Toast,
    pub effects: EffectList,
    battle: Option<ActiveBattle>,
    player_pos: Vec3,
    events: Vec<GameEvent>,
    /// Seed for the next reflex battle's jitter
    battle_seed: u64,
}

impl Game {
    pub fn new(store: ProgressionStore, monoliths: Vec<MonolithConfig>, seed: u64) -> Self {
        let mode = if store.state().current_character.is_some() {
            Mode::Overworld
        } else {
            Mode::CharacterSelect
        };
        let mut roamers = RoamerField::new();
        roamers.sync(store.state());
        log::info!(
            "Game ready: {} monoliths, starting in {:?}",
            monoliths.len(),
            mode
        );
        Self {
            store,
            mode,
            monoliths,
            roamers,
            resolver: InteractionResolver::new(),
            toast: Toast::new(),
            effects: EffectList::new(),
            battle: None,
            player_pos: Vec3::ZERO,
            events: Vec::new(),
            battle_seed: seed,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn store(&self) -> &ProgressionStore {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut ProgressionStore {
        &mut self.store
    }

    pub fn monoliths(&self) -> &[MonolithConfig] {
        &self.monoliths
    }

    pub fn roamers(&self) -> &RoamerField {
        &self.roamers
    }

    pub fn player_position(&self) -> Vec3 {
        self.player_pos
    }

    /// Place the player (the movement controller is a collaborator; tests
    /// and the shell both drive this directly when needed)
    pub fn set_player_position(&mut self, pos: Vec3) {
        self.player_pos = pos;
    }

    /// Drain shell notifications
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the running battle is the reflex variant (hearts HUD) rather
    /// than the turn-based one (HP bar HUD); None outside battles
    pub fn battle_is_reflex(&self) -> Option<bool> {
        self.battle
            .as_ref()
            .map(|b| matches!(b.opponent, Opponent::Character(_)))
    }

    /// Contextual hint line, or None while muted
    pub fn hint(&self) -> Option<&'static str> {
        if self.mode != Mode::Overworld {
            return None;
        }
        let roamers = self.roamers.positions();
        let nearest = find_nearest_interactable(
            self.player_pos,
            &self.monoliths,
            &roamers,
            PROXIMITY_RADIUS,
        );
        self.resolver.hint(nearest.as_ref())
    }

    /// Advance one frame
    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        self.toast.tick(dt);
        self.effects.tick(dt);

        match self.mode {
            Mode::CharacterSelect => {
                if let Some(id) = input.pick_starter {
                    self.store.set_starter(id);
                    self.roamers.sync(self.store.state());
                    self.mode = Mode::Overworld;
                }
            }
            Mode::Overworld => {
                self.update_overworld(input, dt);
            }
            Mode::Battle => {
                self.update_battle(input, dt);
            }
        }
    }

    fn update_overworld(&mut self, input: &FrameInput, dt: f32) {
        if input.move_dir != Vec2::ZERO {
            let dir = input.move_dir.normalize_or_zero();
            self.player_pos.x += dir.x * WALK_SPEED * dt;
            self.player_pos.z += dir.y * WALK_SPEED * dt;
        }

        self.resolver.tick(dt);
        self.roamers.update(dt);

        if input.cycle {
            self.cycle_character();
        }
        if input.interact {
            self.handle_interact();
        }
    }

    fn update_battle(&mut self, input: &FrameInput, dt: f32) {
        let Some(active) = self.battle.as_mut() else {
            // Defensive: no session means the overworld owns the frame again
            self.mode = Mode::Overworld;
            return;
        };

        active.engine.tick(dt);
        if input.strike {
            active.engine.command(active.command);
        }

        let battle_events = active.engine.take_events();
        self.events
            .extend(battle_events.into_iter().map(GameEvent::Battle));

        if let Some(outcome) = active.engine.poll_outcome() {
            self.finish_battle(outcome);
        }
    }

    fn handle_interact(&mut self) {
        let roamers = self.roamers.positions();
        let outcome = self.resolver.interact(
            self.player_pos,
            &self.monoliths,
            &roamers,
            self.store.party(),
        );
        match outcome {
            InteractOutcome::None => {}
            InteractOutcome::StartRoamerBattle(id) => {
                self.start_battle(Opponent::Character(id), None);
            }
            InteractOutcome::StartMonolithBattle { monolith_id } => {
                self.start_battle(Opponent::Monolith, Some(monolith_id));
            }
            InteractOutcome::Unlock { monolith_id } => {
                self.unlock_monolith_with_reward(&monolith_id);
            }
            InteractOutcome::Blocked { message } => {
                self.toast.show(message);
            }
        }
    }

    /// Unlock a monolith and schedule its reward burst
    fn unlock_monolith_with_reward(&mut self, monolith_id: &str) {
        self.store.unlock_monolith(monolith_id);
        self.roamers.sync(self.store.state());
        self.toast.show(format!("Unlocked project: {monolith_id}"));
        if let Some(monolith) = self.monoliths.iter().find(|m| m.id == monolith_id) {
            self.effects.spawn(
                EffectKind::ActivationBurst,
                monolith.position(),
                monolith.category.accent_color(),
                ACTIVATION_EFFECT_SECS,
            );
        }
    }

    /// Enter battle mode with the engine matching the fight type: reflex for
    /// roamer rivals, turn-based for monolith patterns.
    fn start_battle(&mut self, opponent: Opponent, monolith_id: Option<String>) {
        let Some(player) = self.store.state().current_character else {
            return;
        };
        let config = BattleConfig { player, opponent };
        let (engine, command): (Box<dyn BattleEngine>, BattleCommand) = match opponent {
            Opponent::Character(_) => {
                let mut engine = ReflexBattle::new(self.battle_seed);
                self.battle_seed = self.battle_seed.wrapping_add(1);
                engine.start(config);
                (Box::new(engine), BattleCommand::Strike)
            }
            Opponent::Monolith => {
                let mut engine = TurnBattle::new();
                engine.start(config);
                (Box::new(engine), BattleCommand::Attack)
            }
        };

        self.effects.spawn(
            EffectKind::StagingCircle,
            self.player_pos,
            player.accent_color(),
            STAGING_CIRCLE_SECS,
        );
        self.battle = Some(ActiveBattle {
            engine,
            opponent,
            monolith_id,
            command,
        });
        self.mode = Mode::Battle;
    }

    /// Apply a finished battle to the progression state and hand the frame
    /// back to the overworld.
    fn finish_battle(&mut self, outcome: BattleOutcome) {
        let Some(active) = self.battle.take() else {
            return;
        };
        self.mode = Mode::Overworld;
        log::info!("Battle over: {:?} vs {}", outcome, active.opponent.label());

        if outcome != BattleOutcome::Win {
            return;
        }
        match active.opponent {
            Opponent::Character(id) => {
                self.store.unlock_character(id);
                self.store.switch_character(id);
                // Reconciliation retires the defeated roamer
                self.roamers.sync(self.store.state());
                self.toast.show(format!("{} joins you!", id.label()));
            }
            Opponent::Monolith => {
                if let Some(monolith_id) = active.monolith_id {
                    self.unlock_monolith_with_reward(&monolith_id);
                    self.events.push(GameEvent::ShowProjectPanel { monolith_id });
                }
            }
        }
    }

    /// Abort any running battle (counts as an enemy win)
    pub fn abort_battle(&mut self) {
        if let Some(active) = self.battle.as_mut() {
            active.engine.abort();
            if let Some(outcome) = active.engine.poll_outcome() {
                self.finish_battle(outcome);
            }
        }
    }

    /// Switch to the next unlocked character in roster order
    fn cycle_character(&mut self) {
        let roster = &self.store.state().unlocked_characters;
        if roster.len() < 2 {
            return;
        }
        let current = self.store.state().current_character;
        let idx = current
            .and_then(|c| roster.iter().position(|r| *r == c))
            .unwrap_or(0);
        let next = roster[(idx + 1) % roster.len()];
        self.store.switch_character(next);
        self.roamers.sync(self.store.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_monoliths;
    use crate::progress::CharacterId::{Art, Collab, Design};

    fn fresh_game() -> Game {
        Game::new(ProgressionStore::default(), default_monoliths(), 42)
    }

    fn started_game() -> Game {
        let mut game = fresh_game();
        let input = FrameInput {
            pick_starter: Some(Design),
            ..Default::default()
        };
        game.update(&input, SIM_DT);
        game
    }

    /// Park the player on top of a roamer and press E
    fn challenge_roamer(game: &mut Game, id: CharacterId) {
        let pos = game
            .roamers()
            .positions()
            .into_iter()
            .find(|(rid, _)| *rid == id)
            .map(|(_, pos)| pos)
            .expect("roamer is in the field");
        game.set_player_position(pos);
        let input = FrameInput {
            interact: true,
            ..Default::default()
        };
        game.update(&input, SIM_DT);
    }

    #[test]
    fn test_boot_modes() {
        let game = fresh_game();
        assert_eq!(game.mode(), Mode::CharacterSelect);

        let mut store = ProgressionStore::default();
        store.set_starter(Art);
        let game = Game::new(store, default_monoliths(), 42);
        assert_eq!(game.mode(), Mode::Overworld);
    }

    #[test]
    fn test_pick_starter_enters_overworld() {
        let game = started_game();
        assert_eq!(game.mode(), Mode::Overworld);
        assert_eq!(game.store().state().current_character, Some(Design));
        assert_eq!(game.store().state().unlocked_characters, vec![Design]);
        // The other two characters now roam
        assert_eq!(game.roamers().len(), 2);
    }

    #[test]
    fn test_rival_battle_unlocks_and_switches() {
        let mut game = started_game();
        challenge_roamer(&mut game, Art);
        assert_eq!(game.mode(), Mode::Battle);

        // Hold the strike key; charges land at 0.4s, 1.3s and 2.2s
        let input = FrameInput {
            strike: true,
            ..Default::default()
        };
        let mut time = 0.0f32;
        while game.mode() == Mode::Battle && time < 10.0 {
            game.update(&input, 0.05);
            time += 0.05;
        }

        assert_eq!(game.mode(), Mode::Overworld);
        assert_eq!(
            game.store().state().unlocked_characters,
            vec![Design, Art]
        );
        assert_eq!(game.store().state().current_character, Some(Art));
        // The defeated rival no longer roams
        assert!(!game.roamers().contains(Art));
        assert!(game.roamers().contains(Collab));
    }

    #[test]
    fn test_gated_monolith_blocks_then_opens() {
        let mut game = started_game();
        let gated_pos = game
            .monoliths()
            .iter()
            .find(|m| m.id == "tide-gallery")
            .unwrap()
            .position();
        game.set_player_position(gated_pos);

        let interact = FrameInput {
            interact: true,
            ..Default::default()
        };
        game.update(&interact, SIM_DT);
        assert_eq!(game.mode(), Mode::Overworld);
        assert!(game.toast.visible().is_some());
        assert!(game.store().state().unlocked_monoliths.is_empty());
        assert_eq!(game.hint(), None); // muted after the block

        // With Art in the party the same interaction unlocks
        game.store_mut().unlock_character(Art);
        game.update(&interact, SIM_DT);
        assert_eq!(
            game.store().state().unlocked_monoliths,
            vec!["tide-gallery"]
        );
        assert!(!game.effects.is_empty());

        // A second activation stays idempotent
        game.update(&interact, SIM_DT);
        assert_eq!(
            game.store().state().unlocked_monoliths,
            vec!["tide-gallery"]
        );
    }

    #[test]
    fn test_monolith_battle_uses_turns_and_rewards() {
        let mut game = started_game();
        let armed_pos = game
            .monoliths()
            .iter()
            .find(|m| m.id == "archive-spire")
            .unwrap()
            .position();
        game.set_player_position(armed_pos);

        let interact = FrameInput {
            interact: true,
            ..Default::default()
        };
        game.update(&interact, SIM_DT);
        assert_eq!(game.mode(), Mode::Battle);

        // Mash attack; it only lands during the player's turn
        let attack = FrameInput {
            strike: true,
            ..Default::default()
        };
        let mut time = 0.0f32;
        while game.mode() == Mode::Battle && time < 30.0 {
            game.update(&attack, 0.25);
            time += 0.25;
        }

        assert_eq!(game.mode(), Mode::Overworld);
        assert_eq!(
            game.store().state().unlocked_monoliths,
            vec!["archive-spire"]
        );
        let events = game.take_events();
        assert!(events.contains(&GameEvent::ShowProjectPanel {
            monolith_id: "archive-spire".into()
        }));
    }

    #[test]
    fn test_abort_battle_leaves_progress_untouched() {
        let mut game = started_game();
        challenge_roamer(&mut game, Art);
        assert_eq!(game.mode(), Mode::Battle);

        game.abort_battle();
        assert_eq!(game.mode(), Mode::Overworld);
        assert_eq!(game.store().state().unlocked_characters, vec![Design]);
        // The rival still roams, ready for a rematch
        assert!(game.roamers().contains(Art));
    }

    #[test]
    fn test_cycle_character() {
        let mut game = started_game();
        game.store_mut().unlock_character(Art);

        let cycle = FrameInput {
            cycle: true,
            ..Default::default()
        };
        game.update(&cycle, SIM_DT);
        assert_eq!(game.store().state().current_character, Some(Art));
        game.update(&cycle, SIM_DT);
        assert_eq!(game.store().state().current_character, Some(Design));
    }

    #[test]
    fn test_movement_integrates_walk_speed() {
        let mut game = started_game();
        let input = FrameInput {
            move_dir: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        game.update(&input, 0.5);
        assert!((game.player_position().x - WALK_SPEED * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_interact_with_nothing_near_is_a_noop() {
        let mut game = started_game();
        game.set_player_position(Vec3::new(500.0, 0.0, 500.0));
        let interact = FrameInput {
            interact: true,
            ..Default::default()
        };
        game.update(&interact, SIM_DT);
        assert_eq!(game.mode(), Mode::Overworld);
        assert!(game.toast.visible().is_none());
    }
}
