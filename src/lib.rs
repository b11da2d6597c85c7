//! Org Shell - headless dashboard shell with an organizational context
//!
//! Every authenticated page of the dashboard renders inside this shell:
//! header (theme and language toggles, mobile menu), collapsible sidebar,
//! mobile drawer, breadcrumbs and footer. The shell also owns the active
//! company/branch pair that scopes every data view.
//!
//! ## Architecture
//! Selection flows one way:
//! Directory -> SelectionController -> SelectionStore (persist) -> BranchNotifier (broadcast)
//!
//! The shell's own presentation reads controller state (`snapshot()`) and
//! only mutates it through `select_company` / `select_branch`. Independent
//! views elsewhere in the UI subscribe to the notifier instead and re-read
//! the persisted branch through a `ScopeReader`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use org_shell::{AppShell, AuthStatus, ShellAction, ShellConfig, StaticAuth};
//!
//! # async fn run() -> org_shell::ShellResult<()> {
//! let auth = Arc::new(StaticAuth::new(AuthStatus::authenticated()));
//! let mut shell = AppShell::from_config(ShellConfig::from_env()?, auth, false)?;
//!
//! shell.sync_session().await;
//! shell.dispatch(ShellAction::SelectCompany("c2".into())).await?;
//! let view = shell.view();
//! # let _ = view;
//! # Ok(())
//! # }
//! ```

// Error taxonomy and configuration
pub mod config;
pub mod error;
pub mod telemetry;

// Organizational context
pub mod directory;
pub mod notifier;
pub mod selection;
pub mod store;

// Collaborators
pub mod locale;
pub mod session;
pub mod theme;

// Presentation
pub mod navigation;
pub mod shell;

pub use config::{DirectoryConfig, ShellConfig, StoreConfig};
pub use error::{ConfigError, DirectoryError, SelectionError, ShellError, ShellResult, StoreError};

pub use directory::{Branch, Company, DirectoryClient, HttpDirectoryClient, InMemoryDirectory};
pub use notifier::{BranchChanged, BranchNotifier, BranchSubscription, BranchWatcher};
pub use selection::{
    BranchResolution, ContextSnapshot, LoadPhase, Selection, SelectionChange, SelectionController,
};
pub use store::{
    open_store, FileStore, KeyValueStore, MemoryStore, ScopeReader, SelectionStore, SharedStore,
};

pub use locale::{Catalog, Locale};
pub use session::{AuthProvider, AuthStatus, GateDecision, StaticAuth};
pub use theme::{ThemeMode, ThemeSettings};

pub use navigation::{build_nav, Breadcrumb, NavItem};
pub use shell::{AppShell, ShellAction, ShellParts, ShellView};
