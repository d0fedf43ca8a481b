//! Reflex-cooldown battle engine
//!
//! No discrete turns: both sides run independent cooldowns ticked every
//! frame. The enemy lands a hit whenever its cooldown drains (then re-arms to
//! a randomized delay); the player banks a "ready" charge and spends it with
//! a strike command. First side out of hearts loses, immediately.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::battle::{BattleCommand, BattleConfig, BattleEngine, BattleEvent, BattleOutcome};
use crate::consts::*;

/// One reflex battle session
pub struct ReflexBattle {
    config: Option<BattleConfig>,
    active: bool,
    player_hearts: u8,
    enemy_hearts: u8,
    player_cooldown: f32,
    enemy_cooldown: f32,
    ready: bool,
    rng: Pcg32,
    outcome: Option<BattleOutcome>,
    events: Vec<BattleEvent>,
}

impl ReflexBattle {
    /// The seed only feeds the enemy's re-arm jitter; everything else is
    /// deterministic in the tick sequence.
    pub fn new(seed: u64) -> Self {
        Self {
            config: None,
            active: false,
            player_hearts: REFLEX_MAX_HEARTS,
            enemy_hearts: REFLEX_MAX_HEARTS,
            player_cooldown: 0.0,
            enemy_cooldown: 0.0,
            ready: false,
            rng: Pcg32::seed_from_u64(seed),
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Begin a session, discarding any prior one.
    pub fn start(&mut self, config: BattleConfig) {
        self.active = true;
        self.player_hearts = REFLEX_MAX_HEARTS;
        self.enemy_hearts = REFLEX_MAX_HEARTS;
        self.player_cooldown = PLAYER_FIRST_COOLDOWN;
        self.enemy_cooldown = ENEMY_FIRST_COOLDOWN;
        self.ready = false;
        self.outcome = None;
        self.events.clear();
        self.config = Some(config);

        log::info!(
            "Reflex battle: {} vs {}",
            config.player.label(),
            config.opponent.label()
        );
        self.events
            .push(BattleEvent::PlayerHealth(self.player_hearts as i32));
        self.events
            .push(BattleEvent::OpponentHealth(self.enemy_hearts as i32));
        self.events.push(BattleEvent::StrikeReady(false));
        self.events.push(BattleEvent::Message(
            "Press SPACE to strike when charged.".into(),
        ));
    }

    pub fn player_hearts(&self) -> u8 {
        self.player_hearts
    }

    pub fn enemy_hearts(&self) -> u8 {
        self.enemy_hearts
    }

    pub fn player_cooldown(&self) -> f32 {
        self.player_cooldown
    }

    pub fn strike_ready(&self) -> bool {
        self.ready
    }

    fn hit_player(&mut self) {
        self.player_hearts = self.player_hearts.saturating_sub(1);
        self.events
            .push(BattleEvent::PlayerHealth(self.player_hearts as i32));
        self.events.push(BattleEvent::AttackLanded { on_player: true });
        if self.player_hearts == 0 {
            self.finish(BattleOutcome::Lose);
        }
    }

    fn hit_enemy(&mut self) {
        self.enemy_hearts = self.enemy_hearts.saturating_sub(1);
        self.events
            .push(BattleEvent::OpponentHealth(self.enemy_hearts as i32));
        self.events.push(BattleEvent::AttackLanded { on_player: false });
        if self.enemy_hearts == 0 {
            self.finish(BattleOutcome::Win);
        }
    }

    /// Mark the session inactive, then record the outcome: nothing can
    /// mutate the battle after completion is observable.
    fn finish(&mut self, outcome: BattleOutcome) {
        self.active = false;
        self.ready = false;
        if let Some(config) = self.config.take() {
            log::info!(
                "Reflex battle over: {:?} vs {}",
                outcome,
                config.opponent.label()
            );
        }
        self.events.push(BattleEvent::StrikeReady(false));
        self.outcome = Some(outcome);
    }
}

impl BattleEngine for ReflexBattle {
    fn is_active(&self) -> bool {
        self.active
    }

    fn tick(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.player_cooldown = (self.player_cooldown - dt).max(0.0);
        self.enemy_cooldown = (self.enemy_cooldown - dt).max(0.0);

        if self.enemy_cooldown <= 0.0 {
            self.enemy_cooldown =
                ENEMY_COOLDOWN_BASE + self.rng.random_range(0.0..ENEMY_COOLDOWN_SPAN);
            self.hit_player();
            if !self.active {
                return;
            }
        }

        if self.player_cooldown <= 0.0 && !self.ready {
            self.ready = true;
            self.events.push(BattleEvent::StrikeReady(true));
            self.events
                .push(BattleEvent::Message("Strike now! (SPACE)".into()));
        }
    }

    fn command(&mut self, cmd: BattleCommand) -> bool {
        if cmd != BattleCommand::Strike || !self.active || self.player_cooldown > 0.0 {
            return false;
        }
        self.player_cooldown = PLAYER_STRIKE_COOLDOWN;
        self.ready = false;
        self.events.push(BattleEvent::StrikeReady(false));
        self.events.push(BattleEvent::Message("Charging...".into()));
        self.hit_enemy();
        true
    }

    fn abort(&mut self) {
        if self.active {
            self.finish(BattleOutcome::Lose);
        }
    }

    fn poll_outcome(&mut self) -> Option<BattleOutcome> {
        self.outcome.take()
    }

    fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }
}
