//! Roaming rival characters
//!
//! Every character that is neither the active character nor already unlocked
//! wanders the island waiting to be challenged. The set is reconciled
//! against the progression state on every change: a plain set diff, not
//! incremental patching - the roster is three characters.

use glam::Vec3;

use crate::progress::{ALL_CHARACTERS, CharacterId, ProgressionState};

/// One wandering rival
#[derive(Debug, Clone)]
pub struct Roamer {
    pub id: CharacterId,
    /// Orbit parameters, derived from the roster index so respawns land on
    /// the same path
    radius: f32,
    speed: f32,
    height: f32,
    offset: f32,
    pub position: Vec3,
}

impl Roamer {
    fn new(id: CharacterId) -> Self {
        let index = ALL_CHARACTERS.iter().position(|c| *c == id).unwrap_or(0) as f32;
        Self {
            id,
            radius: 9.0 + index * 2.5,
            speed: 0.3 + index * 0.1,
            height: 1.1,
            offset: index * 2.1,
            position: Vec3::ZERO,
        }
    }
}

/// The set of currently-instantiated roamers
#[derive(Debug, Default)]
pub struct RoamerField {
    roamers: Vec<Roamer>,
    elapsed: f32,
}

/// Characters that should be roaming: everyone who is neither active nor
/// unlocked. Before a starter is picked nobody roams.
pub fn wanted_roamers(state: &ProgressionState) -> Vec<CharacterId> {
    let Some(current) = state.current_character else {
        return Vec::new();
    };
    if state.unlocked_characters.is_empty() {
        return Vec::new();
    }
    ALL_CHARACTERS
        .iter()
        .copied()
        .filter(|id| *id != current && !state.unlocked_characters.contains(id))
        .collect()
}

impl RoamerField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile against the progression state: spawn newly-wanted rivals,
    /// despawn collected ones.
    pub fn sync(&mut self, state: &ProgressionState) {
        let wanted = wanted_roamers(state);

        for id in &wanted {
            if !self.roamers.iter().any(|r| r.id == *id) {
                log::info!("Roamer spawned: {}", id.label());
                let mut roamer = Roamer::new(*id);
                roamer.position = orbit_position(&roamer, self.elapsed);
                self.roamers.push(roamer);
            }
        }
        self.roamers.retain(|r| {
            let keep = wanted.contains(&r.id);
            if !keep {
                log::info!("Roamer removed: {}", r.id.label());
            }
            keep
        });
    }

    /// Advance the wander orbits
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        for roamer in &mut self.roamers {
            roamer.position = orbit_position(roamer, self.elapsed);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Roamer> {
        self.roamers.iter()
    }

    pub fn len(&self) -> usize {
        self.roamers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roamers.is_empty()
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.roamers.iter().any(|r| r.id == id)
    }

    /// (id, position) pairs for proximity scanning
    pub fn positions(&self) -> Vec<(CharacterId, Vec3)> {
        self.roamers.iter().map(|r| (r.id, r.position)).collect()
    }
}

fn orbit_position(roamer: &Roamer, elapsed: f32) -> Vec3 {
    let angle = elapsed * roamer.speed + roamer.offset;
    let bob = (elapsed * 2.0 + roamer.offset).sin() * 0.08;
    Vec3::new(
        angle.cos() * roamer.radius,
        roamer.height + bob,
        angle.sin() * roamer.radius,
    )
}
