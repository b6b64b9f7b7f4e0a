use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use threatlens_core::{Config, HttpResponse, Result, Transport, Upstreams};
use threatlens_server::state::AppState;

/// Answers every upstream call with one canned response and remembers the
/// URLs it was asked for.
#[derive(Debug)]
struct CannedTransport {
    status: u16,
    body: Value,
    urls: Mutex<Vec<String>>,
}

impl CannedTransport {
    fn new(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            urls: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn post_json(&self, url: &str, _body: &Value) -> Result<HttpResponse> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(HttpResponse::new(self.status, self.body.clone()))
    }

    async fn get_json(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(HttpResponse::new(self.status, self.body.clone()))
    }
}

fn config_with_keys() -> Config {
    let mut config = Config::default();
    config.keys.virustotal = Some("vt-key".to_string());
    config.keys.alienvault = Some("otx-key".to_string());
    config
}

fn router(config: &Config, transport: Arc<CannedTransport>) -> axum::Router {
    let upstreams = Upstreams::with_transport(config, transport);
    threatlens_server::build_router(Arc::new(AppState::new(upstreams, config)))
}

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = router(&Config::default(), CannedTransport::new(200, Value::Null));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_virustotal_requires_query() {
    let app = router(&config_with_keys(), CannedTransport::new(200, Value::Null));
    let (status, body) = post(app, "/api/virustotal", json!({ "type": "file" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Query is required" }));
}

#[tokio::test]
async fn test_virustotal_rejects_unknown_type() {
    let app = router(&config_with_keys(), CannedTransport::new(200, Value::Null));
    let (status, body) = post(
        app,
        "/api/virustotal",
        json!({ "query": "abc", "type": "hash" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid scan type");
}

#[tokio::test]
async fn test_virustotal_normalizes_report() {
    let transport = CannedTransport::new(
        200,
        json!({
            "data": {
                "id": "8.8.8.8",
                "type": "ip_address",
                "attributes": {
                    "last_analysis_stats": { "malicious": 1, "suspicious": 0, "undetected": 30, "harmless": 60 },
                    "reputation": 534,
                    "last_analysis_date": 1700000000
                }
            }
        }),
    );
    let app = router(&config_with_keys(), transport.clone());
    let (status, body) = post(
        app,
        "/api/virustotal",
        json!({ "query": "8.8.8.8", "type": "ip" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], "8.8.8.8");
    assert_eq!(body["result"]["total_votes"], 91);
    assert_eq!(body["result"]["reputation"], 534);
    assert!(body.get("error").is_none());
    assert_eq!(
        transport.urls(),
        vec!["https://www.virustotal.com/api/v3/ip_addresses/8.8.8.8".to_string()]
    );
}

#[tokio::test]
async fn test_virustotal_without_key_reports_no_data() {
    let transport = CannedTransport::new(200, Value::Null);
    let app = router(&Config::default(), transport.clone());
    let (status, body) = post(app, "/api/virustotal", json!({ "query": "abc" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": null, "error": "No data found" }));
    assert!(transport.urls().is_empty());
}

#[tokio::test]
async fn test_alienvault_defaults_to_ip() {
    let transport = CannedTransport::new(
        200,
        json!({
            "indicator": "8.8.8.8",
            "type": "IPv4",
            "reputation": 0,
            "country_name": "United States of America",
            "pulse_info": { "count": 0, "pulses": [] }
        }),
    );
    let app = router(&config_with_keys(), transport.clone());
    let (status, body) = post(app, "/api/alienvault", json!({ "query": "8.8.8.8" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["country"], "United States of America");
    assert_eq!(body["result"]["asn"], "Unknown");
    assert_eq!(body["result"]["pulse_count"], 0);
    assert_eq!(
        transport.urls(),
        vec!["https://otx.alienvault.com/api/v1/indicators/IPv4/8.8.8.8/general".to_string()]
    );
}

#[tokio::test]
async fn test_alienvault_upstream_failure_reports_no_data() {
    let app = router(&config_with_keys(), CannedTransport::new(404, Value::Null));
    let (status, body) = post(
        app,
        "/api/alienvault",
        json!({ "query": "example.com", "type": "domain" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], Value::Null);
    assert_eq!(body["error"], "No data found");
}

#[tokio::test]
async fn test_alienvault_rejects_unknown_type() {
    let app = router(&config_with_keys(), CannedTransport::new(200, Value::Null));
    let (status, body) = post(
        app,
        "/api/alienvault",
        json!({ "query": "abc", "type": "file" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid check type");
}

#[tokio::test]
async fn test_osv_requires_package() {
    let app = router(&Config::default(), CannedTransport::new(200, Value::Null));
    let (status, body) = post(app, "/api/osv", json!({ "ecosystem": "npm" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Package name is required");
}

#[tokio::test]
async fn test_osv_returns_processed_vulnerabilities() {
    let transport = CannedTransport::new(
        200,
        json!({
            "vulns": [{
                "id": "GHSA-j8r2-6x86-q33q",
                "summary": "Unintended leak of Proxy-Authorization header in requests",
                "severity": [{ "type": "CVSS_V3", "score": "CVSS:3.1/AV:N/AC:H/PR:N/UI:R/S:C/C:H/I:N/A:N" }],
                "references": [{ "type": "WEB", "url": "https://github.com/psf/requests/pull/6447" }]
            }]
        }),
    );
    let app = router(&Config::default(), transport.clone());
    let (status, body) = post(app, "/api/osv", json!({ "package": "requests" })).await;

    assert_eq!(status, StatusCode::OK);
    let vuln = &body["vulnerabilities"][0];
    assert_eq!(vuln["id"], "GHSA-j8r2-6x86-q33q");
    assert_eq!(vuln["published"], "Unknown date");
    assert_eq!(vuln["severity"][0]["type"], "CVSS_V3");
    assert_eq!(vuln["references"][0], "https://github.com/psf/requests/pull/6447");
    assert_eq!(transport.urls(), vec!["https://api.osv.dev/v1/query".to_string()]);
}

#[tokio::test]
async fn test_osv_upstream_failure_is_empty_list() {
    let app = router(&Config::default(), CannedTransport::new(500, Value::Null));
    let (status, body) = post(
        app,
        "/api/osv",
        json!({ "package": "requests", "ecosystem": "PyPI" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "vulnerabilities": [] }));
}
