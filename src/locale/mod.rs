//! Locale collaborator
//!
//! The shell only needs the current locale, a way to change it and key
//! lookup. `Catalog` serves the shell's own strings from an embedded table.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

const BUILTIN_CATALOG: &str = include_str!("../../locales/shell.json");

/// Locale used when a key is missing from the current table
pub const FALLBACK_LOCALE: &str = "en";

pub trait Locale: Send + Sync {
    fn current(&self) -> String;
    fn set_locale(&self, code: &str);
    /// Translated text, or the key itself when nothing matches
    fn translate(&self, key: &str) -> String;
}

/// Translation tables keyed by locale code, then by message key
pub struct Catalog {
    current: RwLock<String>,
    tables: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// The shell's embedded strings (en, vi)
    pub fn builtin(default_locale: &str) -> Self {
        Self::from_json(BUILTIN_CATALOG, default_locale).unwrap_or_else(|e| {
            warn!(error = %e, "Embedded catalog is invalid, translations fall back to keys");
            Self {
                current: RwLock::new(default_locale.to_string()),
                tables: HashMap::new(),
            }
        })
    }

    pub fn from_json(json: &str, default_locale: &str) -> Result<Self, serde_json::Error> {
        let tables = serde_json::from_str(json)?;
        Ok(Self {
            current: RwLock::new(default_locale.to_string()),
            tables,
        })
    }

    /// Known locale codes, sorted
    pub fn locales(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.tables.keys().cloned().collect();
        codes.sort();
        codes
    }
}

impl Locale for Catalog {
    fn current(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_locale(&self, code: &str) {
        if !self.tables.contains_key(code) {
            debug!(code, "Switching to a locale without a table");
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = code.to_string();
    }

    fn translate(&self, key: &str) -> String {
        let current = self.current();
        [current.as_str(), FALLBACK_LOCALE]
            .iter()
            .find_map(|code| self.tables.get(*code).and_then(|t| t.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Header language toggle: Vietnamese and English swap, anything else goes
/// to Vietnamese
pub fn toggled_locale(current: &str) -> &'static str {
    if current == "vi" {
        "en"
    } else {
        "vi"
    }
}

/// Short label shown on the language toggle
pub fn locale_badge(current: &str) -> &'static str {
    if current == "vi" {
        "VN"
    } else {
        "EN"
    }
}
