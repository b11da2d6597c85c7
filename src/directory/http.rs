//! HTTP directory client
//!
//! `GET {base}/companies` and `GET {base}/companies/{id}/branches`, both
//! returning JSON arrays.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{Branch, Company, DirectoryClient, Result};
use crate::config::DirectoryConfig;
use crate::error::DirectoryError;

/// Directory client over HTTP
#[derive(Clone)]
pub struct HttpDirectoryClient {
    http: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpDirectoryClient {
    /// Create a client from configuration
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| DirectoryError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(DirectoryError::from)?;

        Ok(Self {
            http,
            base_url,
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Append path segments to the base URL (segments are percent-encoded)
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "Directory request");

        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        response.json::<T>().await.map_err(|e| DirectoryError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        let url = self.endpoint(&["companies"])?;
        self.get(url).await
    }

    async fn list_branches(&self, company_id: &str) -> Result<Vec<Branch>> {
        let url = self.endpoint(&["companies", company_id, "branches"])?;
        let branches: Vec<Branch> = self.get(url).await?;
        Ok(stamp_company(branches, company_id))
    }
}

/// Map a non-success status to a directory error
pub fn classify_status(status: StatusCode, body: &str) -> DirectoryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DirectoryError::Auth {
            status: status.as_u16(),
        },
        _ => DirectoryError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        },
    }
}

/// Fill in the owning company for payloads that omit it
fn stamp_company(branches: Vec<Branch>, company_id: &str) -> Vec<Branch> {
    branches
        .into_iter()
        .map(|mut branch| {
            if branch.company_id.is_empty() {
                branch.company_id = company_id.to_string();
            }
            branch
        })
        .collect()
}
