use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use threatlens_core::upstream::osv::{OsvPackageQuery, DEFAULT_ECOSYSTEM};
use threatlens_core::VulnerabilityRecord;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// `package` is normally the bare name; a nested `{name, ecosystem}` object
/// and a plain `query` string are accepted as well.
#[derive(Debug, Deserialize)]
pub struct OsvRequest {
    #[serde(default)]
    pub package: Option<Value>,
    #[serde(default)]
    pub ecosystem: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl OsvRequest {
    fn package_query(&self) -> Option<OsvPackageQuery> {
        let (name, nested_ecosystem) = match &self.package {
            Some(Value::String(name)) => (Some(name.as_str()), None),
            Some(Value::Object(package)) => (
                package.get("name").and_then(Value::as_str),
                package.get("ecosystem").and_then(Value::as_str),
            ),
            _ => (None, None),
        };

        let name = name
            .or(self.query.as_deref())
            .filter(|n| !n.trim().is_empty())?;
        let ecosystem = nested_ecosystem
            .or(self.ecosystem.as_deref())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_ECOSYSTEM);

        Some(OsvPackageQuery::new(name, ecosystem))
    }
}

#[derive(Debug, Serialize)]
pub struct OsvResponse {
    pub vulnerabilities: Vec<VulnerabilityRecord>,
}

pub async fn osv_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OsvRequest>,
) -> Result<Json<OsvResponse>, ApiError> {
    let query = req
        .package_query()
        .ok_or_else(|| ApiError::BadRequest("Package name is required".into()))?;

    debug!(package = %query.package.name, ecosystem = %query.package.ecosystem, "OSV lookup");

    let vulnerabilities = match state.upstreams.osv.query(&query).await {
        Ok(vulns) => vulns,
        Err(e) => {
            warn!(error = %e, "OSV lookup failed");
            Vec::new()
        }
    };

    debug!(count = vulnerabilities.len(), "OSV vulnerabilities returned");
    Ok(Json(OsvResponse { vulnerabilities }))
}
