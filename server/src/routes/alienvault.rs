use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use threatlens_core::{IndicatorKind, ReputationReport, ThreatlensError};
use tracing::{debug, error, warn};

use super::LookupResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AlienVaultRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
}

pub async fn alienvault_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AlienVaultRequest>,
) -> Result<Json<LookupResponse<ReputationReport>>, ApiError> {
    let query = req
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query is required".into()))?;

    let kind = match req.r#type.as_deref() {
        None => IndicatorKind::default(),
        Some(t) => t
            .parse::<IndicatorKind>()
            .map_err(|_| ApiError::BadRequest("Invalid check type".into()))?,
    };

    debug!(%query, %kind, "AlienVault OTX lookup");

    match state.upstreams.alienvault.reputation(&query, kind).await {
        Ok(Some(report)) => Ok(Json(LookupResponse::found(report))),
        Ok(None) => Ok(Json(LookupResponse::no_data())),
        Err(e @ ThreatlensError::MissingApiKey { .. }) => {
            error!(error = %e, "AlienVault OTX lookup not configured");
            Ok(Json(LookupResponse::no_data()))
        }
        Err(e) => {
            warn!(error = %e, %query, "AlienVault OTX lookup failed");
            Ok(Json(LookupResponse::no_data()))
        }
    }
}
