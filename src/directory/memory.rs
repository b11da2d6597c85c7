//! In-memory directory
//!
//! Serves a fixed company/branch table. Failures can be injected per call
//! site and a branch fetch can be held open with a [`BranchGate`] so callers
//! can reproduce slow or out-of-order responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{Branch, Company, DirectoryClient, Result};
use crate::error::DirectoryError;

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    branches: HashMap<String, Vec<Branch>>,
    company_failure: Option<DirectoryError>,
    branch_failures: HashMap<String, DirectoryError>,
    gates: HashMap<String, Arc<Notify>>,
}

/// Directory backed by in-process tables
#[derive(Default)]
pub struct InMemoryDirectory {
    tables: Mutex<Tables>,
    company_calls: AtomicU64,
    branch_calls: AtomicU64,
}

/// Holds the next branch fetch for one company until released
#[derive(Clone)]
pub struct BranchGate {
    notify: Arc<Notify>,
}

impl BranchGate {
    /// Let the held fetch complete (works before or after it started waiting)
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a company with no branches
    pub fn with_company(self, id: &str, name: &str) -> Self {
        {
            let mut tables = self.tables();
            tables.companies.push(Company::new(id, name));
            tables.branches.entry(id.to_string()).or_default();
        }
        self
    }

    /// Set the branches of a company from `(code, name)` pairs
    pub fn with_branches(self, company_id: &str, branches: &[(&str, &str)]) -> Self {
        self.set_branches(company_id, branches);
        self
    }

    /// Replace the branches of a company (e.g. a branch was deactivated)
    pub fn set_branches(&self, company_id: &str, branches: &[(&str, &str)]) {
        let branches = branches
            .iter()
            .map(|(code, name)| Branch::new(company_id, *code, *name))
            .collect();
        self.tables()
            .branches
            .insert(company_id.to_string(), branches);
    }

    /// Make every company listing fail
    pub fn fail_companies(self, error: DirectoryError) -> Self {
        self.tables().company_failure = Some(error);
        self
    }

    /// Make branch listings for one company fail
    pub fn fail_branches(self, company_id: &str, error: DirectoryError) -> Self {
        self.tables()
            .branch_failures
            .insert(company_id.to_string(), error);
        self
    }

    /// Hold the next branch fetch for `company_id` until the gate is released
    pub fn hold_branches(&self, company_id: &str) -> BranchGate {
        let notify = Arc::new(Notify::new());
        self.tables()
            .gates
            .insert(company_id.to_string(), notify.clone());
        BranchGate { notify }
    }

    pub fn company_calls(&self) -> u64 {
        self.company_calls.load(Ordering::Relaxed)
    }

    pub fn branch_calls(&self) -> u64 {
        self.branch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        self.company_calls.fetch_add(1, Ordering::Relaxed);
        let tables = self.tables();
        match &tables.company_failure {
            Some(error) => Err(error.clone()),
            None => Ok(tables.companies.clone()),
        }
    }

    async fn list_branches(&self, company_id: &str) -> Result<Vec<Branch>> {
        self.branch_calls.fetch_add(1, Ordering::Relaxed);

        let gate = self.tables().gates.remove(company_id);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let tables = self.tables();
        if let Some(error) = tables.branch_failures.get(company_id) {
            return Err(error.clone());
        }
        // Unknown companies have no branches rather than an error, the same
        // way the directory answers for a deleted company.
        Ok(tables.branches.get(company_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_tables() {
        let directory = InMemoryDirectory::new()
            .with_company("c1", "Acme")
            .with_branches("c1", &[("b1", "Downtown"), ("b2", "Harbor")]);

        let companies = directory.list_companies().await.unwrap();
        assert_eq!(companies, vec![Company::new("c1", "Acme")]);

        let branches = directory.list_branches("c1").await.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].company_id, "c1");

        assert!(directory.list_branches("missing").await.unwrap().is_empty());
        assert_eq!(directory.company_calls(), 1);
        assert_eq!(directory.branch_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let directory = InMemoryDirectory::new()
            .with_company("c1", "Acme")
            .fail_companies(DirectoryError::Auth { status: 401 })
            .fail_branches(
                "c1",
                DirectoryError::Network {
                    message: "reset".into(),
                },
            );

        assert!(directory.list_companies().await.unwrap_err().is_auth());
        assert!(matches!(
            directory.list_branches("c1").await,
            Err(DirectoryError::Network { .. })
        ));
    }

    #[tokio::test]
    async fn test_gate_released_before_fetch() {
        let directory = InMemoryDirectory::new().with_branches("c1", &[("b1", "Downtown")]);
        let gate = directory.hold_branches("c1");
        gate.release();

        let branches = directory.list_branches("c1").await.unwrap();
        assert_eq!(branches[0].code, "b1");
    }
}
