//! Timed visual effect bookkeeping
//!
//! The core never renders; it only tracks fire-and-forget effect handles so
//! the render collaborator can play them at the right place and drop them
//! when finished. Each effect is position + kind + a progress clock.

use glam::Vec3;

/// What the render collaborator should play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Expanding ring burst when a monolith unlocks
    ActivationBurst,
    /// Circle drawn under the player while a battle is staged
    StagingCircle,
}

/// A running effect
#[derive(Debug, Clone)]
pub struct TimedEffect {
    pub kind: EffectKind,
    pub position: Vec3,
    /// Accent color as a CSS hex string
    pub color: &'static str,
    elapsed: f32,
    duration: f32,
}

impl TimedEffect {
    /// Normalized progress in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).min(1.0)
    }
}

/// All currently-running effects
#[derive(Debug, Default)]
pub struct EffectList {
    effects: Vec<TimedEffect>,
}

impl EffectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, kind: EffectKind, position: Vec3, color: &'static str, duration: f32) {
        self.effects.push(TimedEffect {
            kind,
            position,
            color,
            elapsed: 0.0,
            duration,
        });
    }

    /// Advance clocks and drop finished effects
    pub fn tick(&mut self, dt: f32) {
        for effect in &mut self.effects {
            effect.elapsed += dt;
        }
        self.effects.retain(|e| e.elapsed < e.duration);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
