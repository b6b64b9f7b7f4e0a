use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Headers that describe a single hop and must not be relayed.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_relayed(name: &str) -> bool {
    !HOP_BY_HOP.contains(&name) && name != "host" && name != "content-length"
}

/// Relays the request untouched to the proxy target. The `Host` header is
/// dropped so the upstream sees its own origin.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(parts.uri.path());
    let target = state.proxy.rewrite(path_and_query);

    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;

    debug!(%method, %target, "proxying request");

    let mut upstream = state.http.request(method, &target).body(body.to_vec());
    for (name, value) in parts.headers.iter() {
        if is_relayed(name.as_str()) {
            upstream = upstream.header(name.as_str(), value.as_bytes());
        }
    }

    let upstream = upstream
        .send()
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let headers: Vec<(String, Vec<u8>)> = upstream
        .headers()
        .iter()
        .filter(|(name, _)| is_relayed(name.as_str()))
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
        .collect();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(&value),
        ) {
            response.headers_mut().append(name, value);
        }
    }

    Ok(response)
}
