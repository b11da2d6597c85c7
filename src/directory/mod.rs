//! Organization directory
//!
//! Read-only access to the companies a user may work in and the branches of
//! each company. `DirectoryClient` is the only boundary the selection
//! controller sees; `http` talks to the directory service, `memory` serves
//! fixed data for tests and offline use.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

pub use http::HttpDirectoryClient;
pub use memory::{BranchGate, InMemoryDirectory};

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Company snapshot as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Branch snapshot; `code` is unique within its owning company only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub code: String,
    pub name: String,
    #[serde(rename = "companyId", alias = "company_id", default)]
    pub company_id: String,
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl Branch {
    pub fn new(
        company_id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            company_id: company_id.into(),
            record_id: None,
        }
    }
}

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// All companies visible to the current user
    async fn list_companies(&self) -> Result<Vec<Company>>;

    /// Branches of one company, in directory order
    async fn list_branches(&self, company_id: &str) -> Result<Vec<Branch>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_wire_format() {
        let company: Company = serde_json::from_str(r#"{"_id":"c1","name":"Acme"}"#).unwrap();
        assert_eq!(company, Company::new("c1", "Acme"));

        let aliased: Company = serde_json::from_str(r#"{"id":"c2","name":"Globex"}"#).unwrap();
        assert_eq!(aliased.id, "c2");
    }

    #[test]
    fn test_branch_wire_format_without_company() {
        let branch: Branch =
            serde_json::from_str(r#"{"_id":"x9","code":"b1","name":"Downtown"}"#).unwrap();
        assert_eq!(branch.code, "b1");
        assert_eq!(branch.company_id, "");
        assert_eq!(branch.record_id.as_deref(), Some("x9"));
    }
}
