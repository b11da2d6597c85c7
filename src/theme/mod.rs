//! Persisted light/dark preference

use serde::Serialize;
use tracing::warn;

use crate::store::{SharedStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Saved value wins; without one (or an empty one), follow the system
    /// preference. Any other saved value than `dark` means light.
    pub fn resolve(saved: Option<&str>, system_prefers_dark: bool) -> Self {
        match saved.filter(|value| !value.is_empty()) {
            Some("dark") => ThemeMode::Dark,
            Some(_) => ThemeMode::Light,
            None if system_prefers_dark => ThemeMode::Dark,
            None => ThemeMode::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Theme flag backed by the shared key-value store
pub struct ThemeSettings {
    store: SharedStore,
    mode: ThemeMode,
}

impl ThemeSettings {
    /// Resolve the initial mode; nothing is written until the first toggle
    pub fn load(store: SharedStore, system_prefers_dark: bool) -> Self {
        let mode = ThemeMode::resolve(store.get(THEME_KEY).as_deref(), system_prefers_dark);
        Self { store, mode }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    /// Flip the mode and persist it
    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.toggled();
        if let Err(e) = self.store.set(THEME_KEY, self.mode.as_str()) {
            warn!(error = %e, "Failed to persist theme");
        }
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn test_resolve() {
        assert_eq!(ThemeMode::resolve(Some("dark"), false), ThemeMode::Dark);
        assert_eq!(ThemeMode::resolve(Some("light"), true), ThemeMode::Light);
        assert_eq!(ThemeMode::resolve(None, true), ThemeMode::Dark);
        assert_eq!(ThemeMode::resolve(None, false), ThemeMode::Light);
    }

    #[test]
    fn test_first_run_follows_system_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let theme = ThemeSettings::load(store.clone(), true);
        assert!(theme.is_dark());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_empty_saved_value_follows_system() {
        assert_eq!(ThemeMode::resolve(Some(""), true), ThemeMode::Dark);
        assert_eq!(ThemeMode::resolve(Some(""), false), ThemeMode::Light);

        let store = Arc::new(MemoryStore::with_entries([(THEME_KEY, "")]));
        assert!(ThemeSettings::load(store, true).is_dark());
    }

    #[test]
    fn test_toggle_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut theme = ThemeSettings::load(store.clone(), false);

        assert_eq!(theme.toggle(), ThemeMode::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));

        let reloaded = ThemeSettings::load(store.clone(), false);
        assert_eq!(reloaded.mode(), ThemeMode::Dark);

        assert_eq!(theme.toggle(), ThemeMode::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }
}
