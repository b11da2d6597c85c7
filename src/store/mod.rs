//! Persisted selection store
//!
//! A flat string key/value surface with two backends, plus the typed
//! accessors the selection controller and the theme use on top of it.
//!
//! - `memory`: process-local map (tests, ephemeral sessions)
//! - `file`: JSON object on disk, atomically replaced on every write
//!
//! Reads never fail. A write is visible to the next read in this process as
//! soon as `set` returns, even if the durable flush reported an error.

pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key of the persisted company id
pub const SELECTED_COMPANY_KEY: &str = "selectedCompany";
/// Key of the persisted branch code (empty string means "none")
pub const SELECTED_BRANCH_KEY: &str = "selectedBranch";
/// Key of the persisted theme flag
pub const THEME_KEY: &str = "theme";

/// Flat, synchronous key-value persistence
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key was never written
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value; visible to `get` immediately
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Shared store handle
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Open the backend described by the configuration.
pub fn open_store(config: &StoreConfig) -> SharedStore {
    match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::File { path } => Arc::new(FileStore::open(path.clone())),
    }
}

/// Typed company/branch accessors over a key-value store
///
/// No validation happens here and nothing is broadcast; both are the
/// controller's job.
#[derive(Clone)]
pub struct SelectionStore {
    inner: SharedStore,
}

impl SelectionStore {
    pub fn new(inner: SharedStore) -> Self {
        Self { inner }
    }

    /// Persisted company id, `None` if never written or written empty
    pub fn selected_company(&self) -> Option<String> {
        non_empty(self.inner.get(SELECTED_COMPANY_KEY))
    }

    pub fn set_selected_company(&self, company_id: &str) -> Result<(), StoreError> {
        self.inner.set(SELECTED_COMPANY_KEY, company_id)
    }

    /// Persisted branch code, `None` if never written or cleared
    pub fn selected_branch(&self) -> Option<String> {
        non_empty(self.inner.get(SELECTED_BRANCH_KEY))
    }

    /// Persist a branch code; `None` stores the empty value
    pub fn set_selected_branch(&self, branch_code: Option<&str>) -> Result<(), StoreError> {
        self.inner.set(SELECTED_BRANCH_KEY, branch_code.unwrap_or(""))
    }

    /// Read-only view for views that react to branch broadcasts
    pub fn reader(&self) -> ScopeReader {
        ScopeReader {
            store: self.clone(),
        }
    }
}

/// Read-only access to the persisted scope
///
/// Handed to notifier subscribers so they can re-derive the current branch
/// after a "branch changed" signal without being able to write.
#[derive(Clone)]
pub struct ScopeReader {
    store: SelectionStore,
}

impl ScopeReader {
    pub fn company(&self) -> Option<String> {
        self.store.selected_company()
    }

    pub fn branch(&self) -> Option<String> {
        self.store.selected_branch()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
