//! Read-only client for the hosted policy database.
//!
//! The store is a managed Postgres instance exposed over a PostgREST-style
//! HTTP API. This repository never writes to it; the two tables are crawled
//! and populated by a separate ingestion pipeline.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PolicyStoreConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Pending,
    Processed,
    Failed,
}

/// A discovered policy document URL and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySource {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub status: SourceStatus,
    pub discovered_at: String,
    pub processed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Structured plan facts extracted from one policy source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDetail {
    pub id: String,
    pub source_url: String,
    pub plan_name: Option<String>,
    pub insurance_company_name: Option<String>,
    pub sum_insured: Option<String>,
    pub premium: Option<String>,
    pub entry_age: Option<String>,
    pub waiting_period: Option<String>,
    pub key_features: Option<Vec<String>>,
    pub exclusions: Option<Vec<String>>,
    pub processed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct PolicyStore {
    base_url: String,
    anon_key: String,
    client: Client,
}

impl PolicyStore {
    pub fn new(config: &PolicyStoreConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            client,
        }
    }

    /// All policy sources, newest first.
    pub async fn fetch_policy_sources(&self) -> Result<Vec<PolicySource>, String> {
        self.fetch_table("policy_sources").await
    }

    /// All extracted policy details, newest first.
    pub async fn fetch_policy_details(&self) -> Result<Vec<PolicyDetail>, String> {
        self.fetch_table("policy_details").await
    }

    async fn fetch_table<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<T>, String> {
        let url = format!(
            "{}/rest/v1/{table}?select=*&order=created_at.desc",
            self.base_url
        );
        debug!("Fetching {table} from policy store");

        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .send()
            .await
            .map_err(|e| format!("policy store request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("policy store returned status {}", resp.status()));
        }

        resp.json::<Vec<T>>()
            .await
            .map_err(|e| format!("malformed {table} payload: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_source_deserializes_from_store_row() {
        let row = r#"{
            "id": "a1",
            "url": "https://insurer.example/policy.pdf",
            "title": null,
            "status": "processed",
            "discovered_at": "2025-06-01T10:00:00Z",
            "processed_at": "2025-06-01T10:05:00Z",
            "created_at": "2025-06-01T10:00:00Z",
            "updated_at": "2025-06-01T10:05:00Z"
        }"#;
        let source: PolicySource = serde_json::from_str(row).unwrap();
        assert_eq!(source.status, SourceStatus::Processed);
        assert!(source.title.is_none());
    }

    #[test]
    fn policy_detail_tolerates_sparse_rows() {
        let row = r#"{
            "id": "d1",
            "source_url": "https://insurer.example/policy.pdf",
            "plan_name": "Family Floater Gold",
            "insurance_company_name": null,
            "sum_insured": null,
            "premium": null,
            "entry_age": null,
            "waiting_period": null,
            "key_features": ["Cashless claims"],
            "exclusions": null,
            "processed_at": null,
            "created_at": "2025-06-01T10:00:00Z",
            "updated_at": "2025-06-01T10:00:00Z"
        }"#;
        let detail: PolicyDetail = serde_json::from_str(row).unwrap();
        assert_eq!(detail.plan_name.as_deref(), Some("Family Floater Gold"));
        assert_eq!(detail.key_features.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_an_error() {
        let store = PolicyStore::new(&PolicyStoreConfig {
            url: "http://127.0.0.1:9".into(),
            anon_key: String::new(),
        });
        assert!(store.fetch_policy_sources().await.is_err());
    }
}
