//! Custom vs native player choice.
//!
//! The choice lives in browser-local storage under [`STORAGE_KEY`]. Only the
//! value `"native"` selects the native element; anything else, including a
//! missing entry, means the custom player.

pub const STORAGE_KEY: &str = "nexus.player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerKind {
    #[default]
    Custom,
    Native,
}

impl PlayerKind {
    pub fn toggled(self) -> Self {
        match self {
            PlayerKind::Custom => PlayerKind::Native,
            PlayerKind::Native => PlayerKind::Custom,
        }
    }

    /// Label for the switch button, naming the player it switches *to*.
    pub fn switch_label(self) -> &'static str {
        match self {
            PlayerKind::Custom => "Use native player",
            PlayerKind::Native => "Use custom player",
        }
    }
}

/// Key-value storage that survives page loads.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

pub fn load(store: &impl PreferenceStore) -> PlayerKind {
    match store.get(STORAGE_KEY).as_deref() {
        Some("native") => PlayerKind::Native,
        _ => PlayerKind::Custom,
    }
}

/// Flip the stored preference and return the new choice.
pub fn toggle(store: &mut impl PreferenceStore) -> PlayerKind {
    let next = load(store).toggled();
    match next {
        PlayerKind::Native => store.set(STORAGE_KEY, "native"),
        PlayerKind::Custom => store.remove(STORAGE_KEY),
    }
    next
}
