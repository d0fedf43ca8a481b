//! UI collaborator state
//!
//! The core drives the DOM through plain setters and never reads it back.
//! This module keeps the pieces of UI state that have timing or formatting
//! logic: the auto-dismissing toast and the text builders for hearts and the
//! status panel.

use crate::consts::TOAST_SECS;
use crate::progress::ProgressionState;

/// A transient message with auto-dismiss
#[derive(Debug, Default)]
pub struct Toast {
    text: String,
    remaining: f32,
}

impl Toast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a message for the default duration, replacing any current one
    pub fn show(&mut self, text: impl Into<String>) {
        self.show_for(text, TOAST_SECS);
    }

    pub fn show_for(&mut self, text: impl Into<String>, secs: f32) {
        self.text = text.into();
        self.remaining = secs;
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// The message to display, if still within its window
    pub fn visible(&self) -> Option<&str> {
        (self.remaining > 0.0).then_some(self.text.as_str())
    }
}

/// Render a heart row: filled hearts for remaining health, hollow for lost
pub fn heart_string(value: u8, max: u8) -> String {
    let filled = "\u{2665}".repeat(value.min(max) as usize);
    let empty = "\u{25e6}".repeat(max.saturating_sub(value) as usize);
    format!("{filled}{empty}")
}

/// Status panel lines: active character, roster, monolith count
pub fn status_lines(state: &ProgressionState, total_monoliths: usize) -> Vec<String> {
    let Some(current) = state.current_character else {
        return Vec::new();
    };
    let roster = state
        .unlocked_characters
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        format!("Current: {}", current.label()),
        format!("Unlocked: {roster}"),
        format!(
            "Monoliths: {} / {}",
            state.unlocked_monoliths.len(),
            total_monoliths
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CharacterId::{Art, Design};

    #[test]
    fn test_toast_auto_dismisses() {
        let mut toast = Toast::new();
        assert!(toast.visible().is_none());

        toast.show("Unlocked project: tide-gallery");
        assert_eq!(toast.visible(), Some("Unlocked project: tide-gallery"));

        toast.tick(TOAST_SECS / 2.0);
        assert!(toast.visible().is_some());
        toast.tick(TOAST_SECS);
        assert!(toast.visible().is_none());
    }

    #[test]
    fn test_new_toast_replaces_and_restarts() {
        let mut toast = Toast::new();
        toast.show("first");
        toast.tick(TOAST_SECS - 0.1);
        toast.show("second");
        toast.tick(0.2);
        assert_eq!(toast.visible(), Some("second"));
    }

    #[test]
    fn test_heart_string() {
        assert_eq!(heart_string(3, 3), "\u{2665}\u{2665}\u{2665}");
        assert_eq!(heart_string(1, 3), "\u{2665}\u{25e6}\u{25e6}");
        assert_eq!(heart_string(0, 3), "\u{25e6}\u{25e6}\u{25e6}");
    }

    #[test]
    fn test_status_hidden_before_starter() {
        assert!(status_lines(&ProgressionState::default(), 4).is_empty());
    }

    #[test]
    fn test_status_lines() {
        let state = ProgressionState {
            current_character: Some(Art),
            unlocked_characters: vec![Design, Art],
            unlocked_monoliths: vec!["brand-atlas".into()],
        };
        let lines = status_lines(&state, 4);
        assert_eq!(lines[0], "Current: Art");
        assert_eq!(lines[1], "Unlocked: Design, Art");
        assert_eq!(lines[2], "Monoliths: 1 / 4");
    }
}
