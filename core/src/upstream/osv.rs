use serde::Serialize;
use std::sync::Arc;

use super::upstream_status_error;
use crate::http::Transport;
use crate::normalize;
use crate::types::VulnerabilityRecord;

pub const DEFAULT_BASE_URL: &str = "https://api.osv.dev";
pub const DEFAULT_ECOSYSTEM: &str = "PyPI";

#[derive(Debug, Clone)]
pub struct OsvClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl OsvClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn query_url(&self) -> String {
        format!("{}/v1/query", self.base_url)
    }

    pub async fn query(&self, query: &OsvPackageQuery) -> crate::Result<Vec<VulnerabilityRecord>> {
        let body = serde_json::to_value(query).map_err(|e| crate::ThreatlensError::Upstream {
            source_name: "OSV".to_string(),
            message: e.to_string(),
        })?;

        let response = self.transport.post_json(&self.query_url(), &body).await?;
        if !response.is_success() {
            return Err(upstream_status_error("OSV", &response));
        }

        Ok(normalize::vulnerability_records(&response.body))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OsvPackageQuery {
    pub package: OsvPackage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl OsvPackageQuery {
    pub fn new(name: &str, ecosystem: &str) -> Self {
        Self {
            package: OsvPackage {
                name: name.to_string(),
                ecosystem: ecosystem.to_string(),
            },
            version: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OsvPackage {
    pub name: String,
    pub ecosystem: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_posts_package_and_normalizes() {
        let transport = Arc::new(MockTransport::new().reply(
            200,
            json!({ "vulns": [{ "id": "GHSA-j8r2-6x86-q33q", "published": "2023-05-22T20:30:00Z" }] }),
        ));
        let client = OsvClient::new("https://api.osv.dev/", transport.clone());

        let records = client
            .query(&OsvPackageQuery::new("requests", DEFAULT_ECOSYSTEM))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].published, "2023-05-22T20:30:00Z");

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.osv.dev/v1/query");
        assert_eq!(
            requests[0].body,
            Some(json!({ "package": { "name": "requests", "ecosystem": "PyPI" } }))
        );
    }

    #[tokio::test]
    async fn test_empty_answer_means_no_vulnerabilities() {
        let transport = Arc::new(MockTransport::new().reply(200, json!({})));
        let client = OsvClient::new(DEFAULT_BASE_URL, transport);

        let records = client
            .query(&OsvPackageQuery::new("left-pad", "npm"))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_status_error() {
        let transport = Arc::new(MockTransport::new().reply(400, json!({ "code": 3 })));
        let client = OsvClient::new(DEFAULT_BASE_URL, transport);

        let err = client
            .query(&OsvPackageQuery::new("requests", "NotAnEcosystem"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Upstream error from OSV: HTTP 400");
    }
}
