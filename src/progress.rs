//! Persistent character and monolith progression
//!
//! The store is the single source of truth for which characters have been
//! collected and which monoliths have been activated. All mutation goes
//! through named operations; each successful mutation notifies subscribers
//! synchronously, then writes the full snapshot to LocalStorage.

use serde::{Deserialize, Serialize};

/// The three playable archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterId {
    Design,
    Art,
    Collab,
}

/// All characters, in roster order
pub const ALL_CHARACTERS: [CharacterId; 3] =
    [CharacterId::Design, CharacterId::Art, CharacterId::Collab];

impl CharacterId {
    /// Display label for UI text
    pub fn label(&self) -> &'static str {
        match self {
            CharacterId::Design => "Design",
            CharacterId::Art => "Art",
            CharacterId::Collab => "Collab",
        }
    }

    /// Accent color as a CSS hex string
    pub fn accent_color(&self) -> &'static str {
        match self {
            CharacterId::Design => "#38bdf8",
            CharacterId::Art => "#f472b6",
            CharacterId::Collab => "#22d3ee",
        }
    }
}

/// Persisted progression snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Active character; always a member of `unlocked_characters` when set
    pub current_character: Option<CharacterId>,
    /// Collected characters in unlock order, no duplicates
    pub unlocked_characters: Vec<CharacterId>,
    /// Activated monolith ids, no duplicates
    pub unlocked_monoliths: Vec<String>,
}

impl ProgressionState {
    /// Check the invariants a trusted snapshot must uphold
    pub fn is_consistent(&self) -> bool {
        if let Some(current) = self.current_character {
            if !self.unlocked_characters.contains(&current) {
                return false;
            }
        }
        let unique_chars = self
            .unlocked_characters
            .iter()
            .enumerate()
            .all(|(i, c)| !self.unlocked_characters[..i].contains(c));
        let unique_monoliths = self
            .unlocked_monoliths
            .iter()
            .enumerate()
            .all(|(i, m)| !self.unlocked_monoliths[..i].contains(m));
        unique_chars && unique_monoliths
    }
}

/// Handle returned by [`ProgressionStore::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Listener = Box<dyn FnMut(&ProgressionState)>;

/// Progression context object: state plus subscriber list.
///
/// Created once at boot, dropped at shutdown (or scoped per test). There is
/// exactly one writer - the orchestrator - so mutation needs no locking, only
/// the mutate / notify / persist ordering every operation follows.
pub struct ProgressionStore {
    state: ProgressionState,
    listeners: Vec<(SubscriberId, Listener)>,
    next_subscriber: u64,
}

impl Default for ProgressionStore {
    fn default() -> Self {
        Self::new(ProgressionState::default())
    }
}

impl ProgressionStore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rival_isle_progress_v1";

    pub fn new(state: ProgressionState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_subscriber: 0,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    /// The gate-evaluation party: every unlocked character
    pub fn party(&self) -> &[CharacterId] {
        &self.state.unlocked_characters
    }

    /// Register a listener; it is invoked immediately with the current state
    /// and again after every successful mutation.
    pub fn subscribe(&mut self, mut listener: Listener) -> SubscriberId {
        listener(&self.state);
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }

    /// Pick the starting character. Resets the unlocked roster to just that
    /// character; always succeeds.
    pub fn set_starter(&mut self, id: CharacterId) {
        self.state.current_character = Some(id);
        self.state.unlocked_characters = vec![id];
        log::info!("Starter chosen: {}", id.label());
        self.commit();
    }

    /// Switch the active character. Fails (no-op) unless already unlocked.
    pub fn switch_character(&mut self, id: CharacterId) -> bool {
        if !self.state.unlocked_characters.contains(&id) {
            return false;
        }
        self.state.current_character = Some(id);
        self.commit();
        true
    }

    /// Add a character to the roster. Idempotent: a second unlock of the same
    /// character neither notifies nor persists.
    pub fn unlock_character(&mut self, id: CharacterId) {
        if self.state.unlocked_characters.contains(&id) {
            return;
        }
        self.state.unlocked_characters.push(id);
        log::info!("Character unlocked: {}", id.label());
        self.commit();
    }

    /// Mark a monolith as activated. Idempotent, same contract as characters.
    pub fn unlock_monolith(&mut self, id: &str) {
        if self.state.unlocked_monoliths.iter().any(|m| m == id) {
            return;
        }
        self.state.unlocked_monoliths.push(id.to_string());
        log::info!("Monolith unlocked: {id}");
        self.commit();
    }

    /// Notify subscribers, then persist. Called after every state change.
    fn commit(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        self.save();
    }

    /// Serialize the snapshot for persistence
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(&self.state).ok()
    }

    /// Parse a persisted snapshot. Malformed JSON and snapshots that violate
    /// the invariants both yield `None` - callers fall back to defaults.
    pub fn parse_snapshot(json: &str) -> Option<ProgressionState> {
        let state: ProgressionState = serde_json::from_str(json).ok()?;
        state.is_consistent().then_some(state)
    }

    /// Load progression from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(state) = Self::parse_snapshot(&json) {
                    log::info!(
                        "Loaded progression ({} characters, {} monoliths)",
                        state.unlocked_characters.len(),
                        state.unlocked_monoliths.len()
                    );
                    return Self::new(state);
                }
                log::warn!("Discarding malformed progression snapshot");
            }
        }

        log::info!("No saved progression, starting fresh");
        Self::default()
    }

    /// Save progression to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Some(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save(&self) {
        // No-op for native
    }
}
