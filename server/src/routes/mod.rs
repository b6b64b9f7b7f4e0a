mod alienvault;
mod osv;
mod proxy;
mod system;
mod virustotal;

use std::sync::Arc;

use axum::routing::{any, get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub const NO_DATA: &str = "No data found";

/// Body for the single-result lookups. `error` is set alongside a `null`
/// result when the upstream had nothing to report.
#[derive(Debug, Serialize)]
pub struct LookupResponse<T> {
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> LookupResponse<T> {
    pub fn found(result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn no_data() -> Self {
        Self {
            result: None,
            error: Some(NO_DATA.to_string()),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let proxy_prefix = state.proxy.prefix.clone();

    Router::new()
        .route("/health", get(system::health))
        .route("/api/osv", post(osv::osv_search))
        .route("/api/virustotal", post(virustotal::virustotal_search))
        .route("/api/alienvault", post(alienvault::alienvault_search))
        .route(&proxy_prefix, any(proxy::forward))
        .route(&format!("{}/*rest", proxy_prefix), any(proxy::forward))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
