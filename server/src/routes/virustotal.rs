use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use threatlens_core::{ScanKind, ScanResult, ThreatlensError};
use tracing::{debug, error, warn};

use super::LookupResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VirusTotalRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
}

pub async fn virustotal_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VirusTotalRequest>,
) -> Result<Json<LookupResponse<ScanResult>>, ApiError> {
    let query = req
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query is required".into()))?;

    let kind = match req.r#type.as_deref() {
        None => ScanKind::default(),
        Some(t) => t
            .parse::<ScanKind>()
            .map_err(|_| ApiError::BadRequest("Invalid scan type".into()))?,
    };

    debug!(%query, %kind, "VirusTotal lookup");

    match state.upstreams.virustotal.report(&query, kind).await {
        Ok(Some(result)) => Ok(Json(LookupResponse::found(result))),
        Ok(None) => Ok(Json(LookupResponse::no_data())),
        Err(e @ ThreatlensError::MissingApiKey { .. }) => {
            error!(error = %e, "VirusTotal lookup not configured");
            Ok(Json(LookupResponse::no_data()))
        }
        Err(e) => {
            warn!(error = %e, %query, "VirusTotal lookup failed");
            Ok(Json(LookupResponse::no_data()))
        }
    }
}
