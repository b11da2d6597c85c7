//! Selection Controller
//!
//! Owns the active company/branch pair. It loads companies, reconciles them
//! with the persisted selection, cascades into branch loading and applies
//! the defaulting policy:
//!
//! 1. Restore: not a user action and the stored branch is still listed
//! 2. Fallback: otherwise the first listed branch
//! 3. Clear: the company has no branches
//!
//! Every branch resolution is persisted before it is broadcast, so a
//! subscriber that re-reads the store on the signal sees the new value.
//!
//! Directory failures never stop the machine: they are logged and the
//! affected list is left empty.
//!
//! Branch fetches may overlap when the user switches company twice in quick
//! succession. Each fetch captures its company id and a request token; a
//! result is only applied if it is still the latest request and its company
//! is still the selected one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::directory::{Branch, Company, DirectoryClient};
use crate::error::SelectionError;
use crate::notifier::BranchNotifier;
use crate::store::{ScopeReader, SelectionStore};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    LoadingCompanies,
    CompaniesReady,
    LoadingBranches,
    BranchesReady,
}

/// The active organizational scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub company_id: Option<String>,
    pub branch_code: Option<String>,
}

/// How a branch load ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchResolution {
    /// Stored branch re-applied (broadcast)
    Restored(String),
    /// First branch selected, persisted (broadcast)
    Defaulted(String),
    /// Company has no branches, empty value persisted (broadcast)
    Cleared,
    /// Fetch failed; branch left unset, nothing persisted or broadcast
    Failed,
    /// Result arrived after a newer request and was dropped
    Discarded,
}

impl BranchResolution {
    /// True when this resolution fired the notifier
    pub fn broadcast(&self) -> bool {
        matches!(
            self,
            BranchResolution::Restored(_) | BranchResolution::Defaulted(_) | BranchResolution::Cleared
        )
    }
}

/// Outcome of `select_company`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Company was already selected; nothing written, nothing broadcast
    Unchanged,
    /// Company switched; branch cascade finished with this resolution
    Changed(BranchResolution),
}

/// Serializable view of the controller for presentation and the CLI
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    pub phase: LoadPhase,
    pub is_loading: bool,
    pub companies: Vec<Company>,
    pub branches: Vec<Branch>,
    pub selection: Selection,
}

#[derive(Debug)]
struct ControllerState {
    phase: LoadPhase,
    is_loading: bool,
    companies: Vec<Company>,
    branches: Vec<Branch>,
    selection: Selection,
    /// Token of the most recent branch fetch
    branch_request: u64,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Idle,
            is_loading: false,
            companies: Vec::new(),
            branches: Vec::new(),
            selection: Selection::default(),
            branch_request: 0,
        }
    }
}

/// State machine behind the company/branch selectors
///
/// Shared by reference (`Arc<SelectionController>`); the internal lock is
/// never held across a directory fetch.
pub struct SelectionController {
    directory: Arc<dyn DirectoryClient>,
    store: SelectionStore,
    notifier: BranchNotifier,
    state: Mutex<ControllerState>,
}

impl SelectionController {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        store: SelectionStore,
        notifier: BranchNotifier,
    ) -> Self {
        Self {
            directory,
            store,
            notifier,
            state: Mutex::new(ControllerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load companies and resolve the whole scope. Once per session.
    ///
    /// Returns after branch resolution for the resolved company (if any)
    /// has finished.
    pub async fn initialize(&self) -> Selection {
        {
            let mut state = self.state();
            state.phase = LoadPhase::LoadingCompanies;
            state.is_loading = true;
            state.companies.clear();
            state.branches.clear();
            state.selection = Selection::default();
        }
        info!("Loading companies");

        let resolved = match self.directory.list_companies().await {
            Ok(companies) => {
                // A stored id is trusted as-is, even if it is no longer
                // listed; its branch load then comes back empty.
                let resolved = match self.store.selected_company() {
                    Some(stored) => Some(stored),
                    None => companies.first().map(|first| {
                        self.persist_company(&first.id);
                        first.id.clone()
                    }),
                };

                let mut state = self.state();
                info!(
                    companies = companies.len(),
                    company = resolved.as_deref().unwrap_or("-"),
                    "Companies loaded"
                );
                state.companies = companies;
                state.selection.company_id = resolved.clone();
                resolved
            }
            Err(e) => {
                warn!(error = %e, "Failed to load companies");
                None
            }
        };

        self.state().phase = LoadPhase::CompaniesReady;

        if let Some(company_id) = resolved {
            self.load_branches(&company_id, false).await;
        }

        let mut state = self.state();
        state.is_loading = false;
        state.selection.clone()
    }

    /// Fetch the branches of `company_id` and apply the defaulting policy.
    ///
    /// `is_user_action` skips restoring the stored branch: after an explicit
    /// company switch a remembered branch must never come back.
    pub async fn load_branches(&self, company_id: &str, is_user_action: bool) -> BranchResolution {
        let request = {
            let mut state = self.state();
            state.branch_request += 1;
            state.phase = LoadPhase::LoadingBranches;
            state.branch_request
        };

        let fetched = self.directory.list_branches(company_id).await;

        let resolution = {
            let mut state = self.state();
            if state.branch_request != request
                || state.selection.company_id.as_deref() != Some(company_id)
            {
                // No newer fetch in flight: the current branches still stand
                if state.branch_request == request {
                    state.phase = LoadPhase::BranchesReady;
                }
                debug!(company_id, request, "Discarding stale branch result");
                return BranchResolution::Discarded;
            }

            let resolution = match fetched {
                Ok(branches) => {
                    let restore = if is_user_action {
                        None
                    } else {
                        self.store
                            .selected_branch()
                            .filter(|code| branches.iter().any(|b| &b.code == code))
                    };

                    let resolution = match (restore, branches.first()) {
                        (Some(code), _) => BranchResolution::Restored(code),
                        (None, Some(first)) => {
                            self.persist_branch(Some(&first.code));
                            BranchResolution::Defaulted(first.code.clone())
                        }
                        (None, None) => {
                            self.persist_branch(None);
                            BranchResolution::Cleared
                        }
                    };

                    state.selection.branch_code = match &resolution {
                        BranchResolution::Restored(code) | BranchResolution::Defaulted(code) => {
                            Some(code.clone())
                        }
                        _ => None,
                    };
                    state.branches = branches;
                    resolution
                }
                Err(e) => {
                    warn!(company_id, error = %e, "Failed to load branches");
                    state.branches.clear();
                    state.selection.branch_code = None;
                    BranchResolution::Failed
                }
            };

            state.phase = LoadPhase::BranchesReady;
            resolution
        };

        info!(company_id, ?resolution, "Branch resolved");
        if resolution.broadcast() {
            self.notifier.notify();
        }
        resolution
    }

    /// User picked a company.
    pub async fn select_company(&self, company_id: &str) -> SelectionChange {
        {
            let mut state = self.state();
            if state.selection.company_id.as_deref() == Some(company_id) {
                debug!(company_id, "Company already selected");
                return SelectionChange::Unchanged;
            }
            state.selection.company_id = Some(company_id.to_string());
            // Branches of the previous company no longer apply
            state.selection.branch_code = None;
            state.branches.clear();
            self.persist_company(company_id);
            // Codes are only unique per company; never leave the previous
            // company's code stored under the new one
            self.persist_branch(None);
        }
        info!(company_id, "Company selected");

        SelectionChange::Changed(self.load_branches(company_id, true).await)
    }

    /// User picked a branch of the selected company.
    ///
    /// Returns `Ok(false)` when it was already selected (no write, no
    /// broadcast).
    pub fn select_branch(&self, branch_code: &str) -> Result<bool, SelectionError> {
        {
            let mut state = self.state();
            if state.selection.branch_code.as_deref() == Some(branch_code) {
                debug!(branch_code, "Branch already selected");
                return Ok(false);
            }
            if state.selection.company_id.is_none() {
                return Err(SelectionError::NoCompanySelected);
            }
            if !state.branches.iter().any(|b| b.code == branch_code) {
                warn!(branch_code, "Rejecting branch outside the selected company");
                return Err(SelectionError::UnknownBranch {
                    code: branch_code.to_string(),
                });
            }
            state.selection.branch_code = Some(branch_code.to_string());
            self.persist_branch(Some(branch_code));
        }
        info!(branch_code, "Branch selected");

        self.notifier.notify();
        Ok(true)
    }

    fn persist_company(&self, company_id: &str) {
        if let Err(e) = self.store.set_selected_company(company_id) {
            warn!(company_id, error = %e, "Failed to persist selected company");
        }
    }

    fn persist_branch(&self, branch_code: Option<&str>) {
        if let Err(e) = self.store.set_selected_branch(branch_code) {
            warn!(branch_code, error = %e, "Failed to persist selected branch");
        }
    }

    pub fn selection(&self) -> Selection {
        self.state().selection.clone()
    }

    pub fn companies(&self) -> Vec<Company> {
        self.state().companies.clone()
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.state().branches.clone()
    }

    pub fn phase(&self) -> LoadPhase {
        self.state().phase
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        let state = self.state();
        ContextSnapshot {
            phase: state.phase,
            is_loading: state.is_loading,
            companies: state.companies.clone(),
            branches: state.branches.clone(),
            selection: state.selection.clone(),
        }
    }

    /// Read-only scope for views reacting to branch broadcasts
    pub fn scope_reader(&self) -> ScopeReader {
        self.store.reader()
    }

    pub fn notifier(&self) -> &BranchNotifier {
        &self.notifier
    }
}
