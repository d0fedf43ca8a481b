//! Proximity scanning and interaction dispatch
//!
//! Finds the nearest interactable strictly within the interaction radius
//! (monoliths take priority over roamers on ties), gates monolith access
//! against the party, and tells the orchestrator what to do: start a battle,
//! unlock, or surface a blocked message. A short mute timer keeps the blocked
//! hint from flickering on repeated attempts.

use glam::Vec3;

use crate::config::MonolithConfig;
use crate::consts::*;
use crate::gate::gate_allows;
use crate::ground_distance_sq;
use crate::progress::CharacterId;

/// The closest interactable world entity, if any
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NearestTarget<'a> {
    Monolith(&'a MonolithConfig),
    Roamer(CharacterId),
}

/// What an interact attempt resolved to; the orchestrator owns the follow-up
#[derive(Debug, Clone, PartialEq)]
pub enum InteractOutcome {
    /// Nothing in range
    None,
    /// Challenge the roaming rival
    StartRoamerBattle(CharacterId),
    /// The monolith declares a battle pattern; fight it first
    StartMonolithBattle { monolith_id: String },
    /// Gate passed, no battle required: unlock directly
    Unlock { monolith_id: String },
    /// Gate failed or the party is empty
    Blocked { message: String },
}

/// Linear scan for the closest entity strictly within `radius`.
///
/// Monoliths are scanned before roamers; a later candidate replaces an
/// earlier one only when strictly closer, so ties keep the first found.
pub fn find_nearest_interactable<'a>(
    player_pos: Vec3,
    monoliths: &'a [MonolithConfig],
    roamers: &[(CharacterId, Vec3)],
    radius: f32,
) -> Option<NearestTarget<'a>> {
    let radius_sq = radius * radius;
    let mut nearest: Option<NearestTarget<'a>> = None;
    let mut nearest_dist_sq = f32::INFINITY;

    for monolith in monoliths {
        let d = ground_distance_sq(monolith.position(), player_pos);
        if d < radius_sq && d < nearest_dist_sq {
            nearest = Some(NearestTarget::Monolith(monolith));
            nearest_dist_sq = d;
        }
    }
    for &(id, pos) in roamers {
        let d = ground_distance_sq(pos, player_pos);
        if d < radius_sq && d < nearest_dist_sq {
            nearest = Some(NearestTarget::Roamer(id));
            nearest_dist_sq = d;
        }
    }

    nearest
}

/// Interaction dispatcher with hint-mute bookkeeping
pub struct InteractionResolver {
    /// Seconds the hint stays muted; a plain countdown, not a state machine
    hint_mute: f32,
}

impl Default for InteractionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionResolver {
    pub fn new() -> Self {
        Self { hint_mute: 0.0 }
    }

    /// Advance the hint-mute countdown
    pub fn tick(&mut self, dt: f32) {
        self.hint_mute = (self.hint_mute - dt).max(0.0);
    }

    pub fn hint_suppressed(&self) -> bool {
        self.hint_mute > 0.0
    }

    /// Contextual hint line for the UI collaborator
    pub fn hint(&self, nearest: Option<&NearestTarget>) -> Option<&'static str> {
        if self.hint_suppressed() {
            return None;
        }
        Some(match nearest {
            Some(NearestTarget::Roamer(_)) => "Press E to challenge",
            Some(NearestTarget::Monolith(_)) => "Press E to interact",
            None => "WASD to move, E to interact",
        })
    }

    /// Resolve an interact command against the world.
    ///
    /// `party` is the unlocked-characters set. Gate failures mute the hint
    /// for a cooldown window so the blocked toast is not spammed.
    pub fn interact(
        &mut self,
        player_pos: Vec3,
        monoliths: &[MonolithConfig],
        roamers: &[(CharacterId, Vec3)],
        party: &[CharacterId],
    ) -> InteractOutcome {
        let Some(nearest) =
            find_nearest_interactable(player_pos, monoliths, roamers, PROXIMITY_RADIUS)
        else {
            return InteractOutcome::None;
        };

        match nearest {
            NearestTarget::Roamer(id) => InteractOutcome::StartRoamerBattle(id),
            NearestTarget::Monolith(monolith) => {
                if party.is_empty() || !gate_allows(monolith.gate.as_ref(), party) {
                    self.hint_mute = HINT_SUPPRESS_SECS;
                    return InteractOutcome::Blocked {
                        message: "A different skill is required to interface with this monolith."
                            .into(),
                    };
                }
                if monolith.battle_pattern.is_some() {
                    InteractOutcome::StartMonolithBattle {
                        monolith_id: monolith.id.clone(),
                    }
                } else {
                    InteractOutcome::Unlock {
                        monolith_id: monolith.id.clone(),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonolithConfig;
    use crate::gate::GateRule;
    use crate::progress::CharacterId::{Art, Collab, Design};

    fn monolith(id: &str, x: f32, z: f32) -> MonolithConfig {
        MonolithConfig {
            id: id.to_string(),
            title: id.to_string(),
            category: Design,
            position: [x, 0.0, z],
            gate: None,
            battle_pattern: None,
            project: None,
        }
    }

    #[test]
    fn test_nothing_in_range() {
        let monoliths = [monolith("far", 50.0, 0.0)];
        let nearest =
            find_nearest_interactable(Vec3::ZERO, &monoliths, &[], PROXIMITY_RADIUS);
        assert!(nearest.is_none());
    }

    #[test]
    fn test_radius_boundary_is_strict() {
        let monoliths = [monolith("edge", PROXIMITY_RADIUS, 0.0)];
        assert!(
            find_nearest_interactable(Vec3::ZERO, &monoliths, &[], PROXIMITY_RADIUS).is_none()
        );
        let monoliths = [monolith("inside", PROXIMITY_RADIUS - 0.01, 0.0)];
        assert!(
            find_nearest_interactable(Vec3::ZERO, &monoliths, &[], PROXIMITY_RADIUS).is_some()
        );
    }

    #[test]
    fn test_nearest_wins() {
        let monoliths = [monolith("near", 1.0, 0.0), monolith("nearer", 0.5, 0.0)];
        let nearest =
            find_nearest_interactable(Vec3::ZERO, &monoliths, &[], PROXIMITY_RADIUS).unwrap();
        assert!(matches!(nearest, NearestTarget::Monolith(m) if m.id == "nearer"));
    }

    #[test]
    fn test_monolith_beats_roamer_on_tie() {
        let monoliths = [monolith("tied", 1.0, 0.0)];
        let roamers = [(Art, Vec3::new(1.0, 0.0, 0.0))];
        let nearest =
            find_nearest_interactable(Vec3::ZERO, &monoliths, &roamers, PROXIMITY_RADIUS)
                .unwrap();
        assert!(matches!(nearest, NearestTarget::Monolith(_)));
    }

    #[test]
    fn test_roamer_interaction_starts_battle() {
        let roamers = [(Collab, Vec3::new(0.5, 0.0, 0.0))];
        let mut resolver = InteractionResolver::new();
        let outcome = resolver.interact(Vec3::ZERO, &[], &roamers, &[Design]);
        assert_eq!(outcome, InteractOutcome::StartRoamerBattle(Collab));
    }

    #[test]
    fn test_gate_blocks_and_mutes_hint() {
        let mut gated = monolith("gated", 1.0, 0.0);
        gated.gate = Some(GateRule {
            all: Some(vec![Art]),
            any: None,
        });
        let monoliths = [gated];
        let mut resolver = InteractionResolver::new();

        let outcome = resolver.interact(Vec3::ZERO, &monoliths, &[], &[Design]);
        assert!(matches!(outcome, InteractOutcome::Blocked { .. }));
        assert!(resolver.hint_suppressed());
        assert_eq!(resolver.hint(None), None);

        // The mute expires on its own
        resolver.tick(HINT_SUPPRESS_SECS);
        assert!(!resolver.hint_suppressed());

        // Unlocking the required character opens the gate
        let outcome = resolver.interact(Vec3::ZERO, &monoliths, &[], &[Design, Art]);
        assert_eq!(
            outcome,
            InteractOutcome::Unlock {
                monolith_id: "gated".into()
            }
        );
    }

    #[test]
    fn test_empty_party_is_blocked_even_without_gate() {
        let monoliths = [monolith("open", 1.0, 0.0)];
        let mut resolver = InteractionResolver::new();
        let outcome = resolver.interact(Vec3::ZERO, &monoliths, &[], &[]);
        assert!(matches!(outcome, InteractOutcome::Blocked { .. }));
    }

    #[test]
    fn test_battle_pattern_monolith_starts_battle() {
        let mut armed = monolith("armed", 1.0, 0.0);
        armed.battle_pattern = Some("light-triangle".into());
        let monoliths = [armed];
        let mut resolver = InteractionResolver::new();
        let outcome = resolver.interact(Vec3::ZERO, &monoliths, &[], &[Design]);
        assert_eq!(
            outcome,
            InteractOutcome::StartMonolithBattle {
                monolith_id: "armed".into()
            }
        );
    }

    #[test]
    fn test_hint_text_by_target() {
        let resolver = InteractionResolver::new();
        let m = monolith("m", 1.0, 0.0);
        assert_eq!(
            resolver.hint(Some(&NearestTarget::Monolith(&m))),
            Some("Press E to interact")
        );
        assert_eq!(
            resolver.hint(Some(&NearestTarget::Roamer(Art))),
            Some("Press E to challenge")
        );
        assert_eq!(resolver.hint(None), Some("WASD to move, E to interact"));
    }
}
