use std::sync::Arc;

use super::{path_segment, require_key, upstream_status_error};
use crate::config::ALIENVAULT_KEY_VAR;
use crate::http::Transport;
use crate::normalize;
use crate::types::{IndicatorKind, ReputationReport};

pub const DEFAULT_BASE_URL: &str = "https://otx.alienvault.com/api/v1";

#[derive(Debug, Clone)]
pub struct AlienVaultClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: Option<String>,
}

impl AlienVaultClient {
    pub fn new(base_url: &str, api_key: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn general_url(&self, indicator: &str, kind: IndicatorKind) -> crate::Result<String> {
        Ok(format!(
            "{}/indicators/{}/{}/general",
            self.base_url,
            kind.otx_section(),
            path_segment(indicator)?
        ))
    }

    /// `Ok(None)` when OTX returns an empty document.
    pub async fn reputation(
        &self,
        indicator: &str,
        kind: IndicatorKind,
    ) -> crate::Result<Option<ReputationReport>> {
        let key = require_key(&self.api_key, ALIENVAULT_KEY_VAR)?;
        let url = self.general_url(indicator, kind)?;

        let response = self
            .transport
            .get_json(&url, &[("X-OTX-API-KEY", key)])
            .await?;
        if !response.is_success() {
            return Err(upstream_status_error("AlienVault OTX", &response));
        }

        Ok(normalize::alienvault_report(&response.body))
    }
}
