use threatlens_core::{Config, Upstreams};

/// Forwards every request under `prefix` to `target`, rewriting the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: String,
}

impl ProxyRule {
    pub const OSV_QUERY_PREFIX: &'static str = "/v1/query";

    pub fn new(prefix: &str, target: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            target: target.trim_end_matches('/').to_string(),
        }
    }

    /// Upstream URL for an incoming path-and-query.
    pub fn rewrite(&self, path_and_query: &str) -> String {
        format!("{}{}", self.target, path_and_query)
    }
}

/// Shared, immutable state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub upstreams: Upstreams,
    pub proxy: ProxyRule,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self::new(Upstreams::from_config(config), config)
    }

    pub fn new(upstreams: Upstreams, config: &Config) -> Self {
        Self {
            upstreams,
            proxy: ProxyRule::new(ProxyRule::OSV_QUERY_PREFIX, &config.server.proxy_target),
            http: proxy_client(),
        }
    }
}

/// Redirects are handed back to the caller rather than followed.
fn proxy_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_default()
}
