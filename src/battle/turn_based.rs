//! Turn-based battle state machine
//!
//! `Start -> PlayerTurn <-> EnemyTurn -> {Win | Lose}` with an `Idle` parking
//! phase while a scheduled transition is pending. Transitions are not
//! detached timers: the session owns a single pending action advanced by
//! `tick`, so discarding the session cancels whatever was scheduled.

use crate::battle::{BattleCommand, BattleConfig, BattleEngine, BattleEvent, BattleOutcome};
use crate::consts::*;

/// State-machine tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No session, or parked while a player attack resolves
    Idle,
    /// Intro banner before the first player turn
    Start,
    /// Waiting for the player's attack command
    PlayerTurn,
    EnemyTurn,
    Win,
    Lose,
}

/// What happens when the pending delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    BeginPlayerTurn,
    ResolvePlayerAttack,
    EnemyStrike,
    ResolveEnemyAttack,
    Finish,
}

/// One turn-based battle session
pub struct TurnBattle {
    config: Option<BattleConfig>,
    active: bool,
    phase: TurnPhase,
    player_hp: i32,
    opponent_hp: i32,
    pending: Option<(f32, PendingAction)>,
    outcome: Option<BattleOutcome>,
    events: Vec<BattleEvent>,
}

impl Default for TurnBattle {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnBattle {
    pub fn new() -> Self {
        Self {
            config: None,
            active: false,
            phase: TurnPhase::Idle,
            player_hp: TURN_MAX_HEALTH,
            opponent_hp: TURN_MAX_HEALTH,
            pending: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Begin a session. Any prior session is discarded along with its
    /// pending transition.
    pub fn start(&mut self, config: BattleConfig) {
        self.active = true;
        self.player_hp = TURN_MAX_HEALTH;
        self.opponent_hp = TURN_MAX_HEALTH;
        self.pending = None;
        self.outcome = None;
        self.events.clear();
        self.config = Some(config);

        log::info!(
            "Turn battle: {} vs {}",
            config.player.label(),
            config.opponent.label()
        );
        self.events.push(BattleEvent::PlayerHealth(self.player_hp));
        self.events
            .push(BattleEvent::OpponentHealth(self.opponent_hp));
        self.events.push(BattleEvent::Message(format!(
            "Battle starts! {} vs {}",
            config.player.label(),
            config.opponent.label()
        )));
        self.events.push(BattleEvent::CommandMenu(false));
        self.phase = TurnPhase::Start;
        self.schedule(TURN_INTRO_SECS, PendingAction::BeginPlayerTurn);
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn player_hp(&self) -> i32 {
        self.player_hp
    }

    pub fn opponent_hp(&self) -> i32 {
        self.opponent_hp
    }

    /// Queue the one scheduled transition. While an action is pending no
    /// command is actionable, so nothing can race the transition.
    fn schedule(&mut self, delay: f32, action: PendingAction) {
        self.pending = Some((delay, action));
    }

    fn enter_player_turn(&mut self) {
        self.phase = TurnPhase::PlayerTurn;
        self.events.push(BattleEvent::CommandMenu(true));
        self.events.push(BattleEvent::Message("Your turn!".into()));
    }

    fn enter_enemy_turn(&mut self) {
        self.phase = TurnPhase::EnemyTurn;
        self.events
            .push(BattleEvent::Message("Enemy's turn!".into()));
        self.schedule(TURN_RESOLVE_SECS, PendingAction::EnemyStrike);
    }

    fn enter_outcome(&mut self, won: bool) {
        self.phase = if won { TurnPhase::Win } else { TurnPhase::Lose };
        self.events.push(BattleEvent::Message(
            if won { "You win!" } else { "You lose!" }.into(),
        ));
        self.schedule(TURN_OUTCOME_SECS, PendingAction::Finish);
    }

    /// Tear the session down and surface the outcome. The session is cleared
    /// before the outcome becomes observable, so completion fires once.
    fn finish(&mut self) {
        let won = self.player_hp > 0;
        self.active = false;
        self.pending = None;
        self.phase = TurnPhase::Idle;
        if let Some(config) = self.config.take() {
            log::info!(
                "Turn battle over: {} {} {}",
                config.player.label(),
                if won { "beats" } else { "falls to" },
                config.opponent.label()
            );
        }
        self.events.push(BattleEvent::CommandMenu(false));
        self.outcome = Some(if won {
            BattleOutcome::Win
        } else {
            BattleOutcome::Lose
        });
    }

    fn apply(&mut self, action: PendingAction) {
        match action {
            PendingAction::BeginPlayerTurn => self.enter_player_turn(),
            PendingAction::ResolvePlayerAttack => {
                if self.opponent_hp <= 0 {
                    self.enter_outcome(true);
                } else {
                    self.enter_enemy_turn();
                }
            }
            PendingAction::EnemyStrike => {
                self.events.push(BattleEvent::Message("Enemy attacks!".into()));
                self.player_hp = (self.player_hp - ENEMY_ATTACK_DAMAGE).max(0);
                self.events.push(BattleEvent::PlayerHealth(self.player_hp));
                self.events.push(BattleEvent::AttackLanded { on_player: true });
                self.schedule(TURN_RESOLVE_SECS, PendingAction::ResolveEnemyAttack);
            }
            PendingAction::ResolveEnemyAttack => {
                if self.player_hp <= 0 {
                    self.enter_outcome(false);
                } else {
                    self.enter_player_turn();
                }
            }
            PendingAction::Finish => self.finish(),
        }
    }
}

impl BattleEngine for TurnBattle {
    fn is_active(&self) -> bool {
        self.active
    }

    fn tick(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        if let Some((remaining, action)) = self.pending.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                let action = *action;
                self.pending = None;
                self.apply(action);
            }
        }
    }

    fn command(&mut self, cmd: BattleCommand) -> bool {
        if cmd != BattleCommand::Attack || !self.active || self.phase != TurnPhase::PlayerTurn {
            return false;
        }
        self.events.push(BattleEvent::CommandMenu(false));
        self.events.push(BattleEvent::Message("You attack!".into()));
        self.opponent_hp = (self.opponent_hp - PLAYER_ATTACK_DAMAGE).max(0);
        self.events
            .push(BattleEvent::OpponentHealth(self.opponent_hp));
        self.events
            .push(BattleEvent::AttackLanded { on_player: false });
        // Park until the hit resolves; a second attack this turn is invalid
        self.phase = TurnPhase::Idle;
        self.schedule(TURN_RESOLVE_SECS, PendingAction::ResolvePlayerAttack);
        true
    }

    fn abort(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.pending = None;
        self.config = None;
        self.phase = TurnPhase::Idle;
        self.events.push(BattleEvent::CommandMenu(false));
        self.outcome = Some(BattleOutcome::Lose);
    }

    fn poll_outcome(&mut self) -> Option<BattleOutcome> {
        self.outcome.take()
    }

    fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }
}
