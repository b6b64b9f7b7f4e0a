//! Issues exactly one backend request per query and decodes the answer.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{Config, OsvMode};
use crate::error::{Result, ThreatlensError};
use crate::http::{HttpClient, Transport};
use crate::normalize;
use crate::types::{
    IndicatorKind, ReputationReport, ScanKind, ScanResult, Source, VulnerabilityRecord,
};

const EMPTY_QUERY: &str = "Please enter a query.";
const EMPTY_PACKAGE: &str = "Please enter both package name and ecosystem.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsvQuery {
    Package { name: String, ecosystem: String },
    Text(String),
}

impl OsvQuery {
    pub fn package(name: impl Into<String>, ecosystem: impl Into<String>) -> Self {
        OsvQuery::Package {
            name: name.into(),
            ecosystem: ecosystem.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            OsvQuery::Package { name, ecosystem } => {
                if is_blank(name) || is_blank(ecosystem) {
                    return Err(ThreatlensError::validation(EMPTY_PACKAGE));
                }
            }
            OsvQuery::Text(query) => {
                if is_blank(query) {
                    return Err(ThreatlensError::validation(EMPTY_QUERY));
                }
            }
        }
        Ok(())
    }

    /// The backend takes a flat body; OSV itself nests the package.
    fn body(&self, endpoint: &OsvEndpoint) -> Value {
        match (self, endpoint) {
            (OsvQuery::Text(query), _) => json!({ "query": query }),
            (OsvQuery::Package { name, ecosystem }, OsvEndpoint::Backend(_)) => {
                json!({ "package": name, "ecosystem": ecosystem })
            }
            (OsvQuery::Package { name, ecosystem }, _) => {
                json!({ "package": { "name": name, "ecosystem": ecosystem } })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsvEndpoint {
    /// Full URL of the backend's `/api/osv` route.
    Backend(String),
    /// Full URL of a `/v1/query` path relayed to OSV.
    Proxied(String),
    /// Full URL of OSV's own `/v1/query`.
    Direct(String),
}

impl OsvEndpoint {
    pub fn from_config(config: &Config) -> Self {
        let backend = config.backend_url.trim_end_matches('/');
        match config.osv.mode {
            OsvMode::Backend => OsvEndpoint::Backend(format!("{}/api/osv", backend)),
            OsvMode::Proxy => OsvEndpoint::Proxied(format!("{}/v1/query", backend)),
            OsvMode::Direct => OsvEndpoint::Direct(format!(
                "{}/v1/query",
                config.osv.url.trim_end_matches('/')
            )),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            OsvEndpoint::Backend(url) | OsvEndpoint::Proxied(url) | OsvEndpoint::Direct(url) => url,
        }
    }
}

/// A user-entered query paired with what it should be looked up as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Osv(OsvQuery),
    VirusTotal { query: String, kind: ScanKind },
    AlienVault { query: String, kind: IndicatorKind },
}

impl Query {
    pub fn source(&self) -> Source {
        match self {
            Query::Osv(_) => Source::Osv,
            Query::VirusTotal { .. } => Source::VirusTotal,
            Query::AlienVault { .. } => Source::AlienVault,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Vulnerabilities(Vec<VulnerabilityRecord>),
    Scan(Option<ScanResult>),
    Reputation(Option<ReputationReport>),
}

impl QueryOutcome {
    /// True when there is nothing to render and the informational
    /// "no data" state should be shown instead.
    pub fn is_empty(&self) -> bool {
        match self {
            QueryOutcome::Vulnerabilities(v) => v.is_empty(),
            QueryOutcome::Scan(r) => r.is_none(),
            QueryOutcome::Reputation(r) => r.is_none(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryDispatcher {
    transport: Arc<dyn Transport>,
    backend_url: String,
    osv_endpoint: OsvEndpoint,
}

impl QueryDispatcher {
    pub fn new(backend_url: &str, osv_endpoint: OsvEndpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            osv_endpoint,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.backend_url,
            OsvEndpoint::from_config(config),
            Arc::new(HttpClient::new()),
        )
    }

    pub fn osv_endpoint(&self) -> &OsvEndpoint {
        &self.osv_endpoint
    }

    pub async fn dispatch(&self, query: &Query) -> Result<QueryOutcome> {
        match query {
            Query::Osv(q) => self.osv(q).await.map(QueryOutcome::Vulnerabilities),
            Query::VirusTotal { query, kind } => {
                self.virustotal(query, *kind).await.map(QueryOutcome::Scan)
            }
            Query::AlienVault { query, kind } => {
                self.alienvault(query, *kind).await.map(QueryOutcome::Reputation)
            }
        }
    }

    pub async fn osv(&self, query: &OsvQuery) -> Result<Vec<VulnerabilityRecord>> {
        query.validate()?;
        let body = query.body(&self.osv_endpoint);
        let response = self
            .send(Source::Osv, self.osv_endpoint.url(), &body)
            .await?;
        Ok(normalize::vulnerability_records(&response))
    }

    pub async fn virustotal(&self, query: &str, kind: ScanKind) -> Result<Option<ScanResult>> {
        if is_blank(query) {
            return Err(ThreatlensError::validation(EMPTY_QUERY));
        }
        let url = format!("{}/api/virustotal", self.backend_url);
        let body = json!({ "query": query, "type": kind });
        let response = self.send(Source::VirusTotal, &url, &body).await?;
        Ok(result_object(&response).map(normalize::scan_result))
    }

    pub async fn alienvault(
        &self,
        query: &str,
        kind: IndicatorKind,
    ) -> Result<Option<ReputationReport>> {
        if is_blank(query) {
            return Err(ThreatlensError::validation(EMPTY_QUERY));
        }
        let url = format!("{}/api/alienvault", self.backend_url);
        let body = json!({ "query": query, "type": kind });
        let response = self.send(Source::AlienVault, &url, &body).await?;
        Ok(result_object(&response).map(normalize::reputation_report))
    }

    async fn send(&self, source: Source, url: &str, body: &Value) -> Result<Value> {
        let response = self.transport.post_json(url, body).await.map_err(|e| {
            warn!(source = source.name(), error = %e, "request failed");
            e
        })?;

        if !response.is_success() {
            warn!(source = source.name(), status = response.status, "non-success status");
            return Err(ThreatlensError::Request {
                status: response.status,
                message: source.fetch_failure_message().to_string(),
            });
        }

        if let Some(message) = remote_error(&response.body) {
            debug!(source = source.name(), %message, "backend reported an error");
            return Err(ThreatlensError::Remote { message });
        }

        Ok(response.body)
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// An `error` member counts only when it carries something: `null`, `false`
/// and `""` are ignored.
fn remote_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn result_object(body: &Value) -> Option<&Value> {
    body.get("result").filter(|r| r.is_object())
}
