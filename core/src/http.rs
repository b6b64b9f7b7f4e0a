use crate::error::{Result, ThreatlensError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Status and decoded body of a single HTTP exchange. Non-success bodies
/// that are not JSON decode to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One request, one response. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse>;

    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn decode(url: &str, response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            debug!(url, status = status.as_u16(), "non-success response");
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            return Ok(HttpResponse::new(status.as_u16(), body));
        }

        let body = serde_json::from_slice(&bytes).map_err(|e| ThreatlensError::Network {
            message: format!("Invalid JSON response from {}: {}", url, e),
        })?;

        Ok(HttpResponse::new(status.as_u16(), body))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        debug!(url, %body, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(url, response).await
    }

    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        debug!(url, "GET");
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;
        Self::decode(url, response).await
    }
}

#[cfg(test)]
pub mod mock {
    //! In-memory transport for exercising callers without a network.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub body: Option<Value>,
        pub headers: Vec<(String, String)>,
    }

    #[derive(Debug, Default)]
    pub struct MockTransport {
        replies: Mutex<VecDeque<Result<HttpResponse>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, status: u16, body: Value) -> Self {
            self.push(Ok(HttpResponse::new(status, body)));
            self
        }

        pub fn fail(self, message: &str) -> Self {
            self.push(Err(ThreatlensError::Network {
                message: message.to_string(),
            }));
            self
        }

        fn push(&self, reply: Result<HttpResponse>) {
            self.replies.lock().unwrap().push_back(reply);
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn next(&self, request: RecordedRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("no reply queued for request"))
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
            self.next(RecordedRequest {
                method: "POST",
                url: url.to_string(),
                body: Some(body.clone()),
                headers: Vec::new(),
            })
        }

        async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
            self.next(RecordedRequest {
                method: "GET",
                url: url.to_string(),
                body: None,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
        }
    }
}
