use std::sync::Arc;

use super::{path_segment, require_key, upstream_status_error};
use crate::config::VIRUSTOTAL_KEY_VAR;
use crate::http::Transport;
use crate::normalize;
use crate::types::{ScanKind, ScanResult};

pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3";

#[derive(Debug, Clone)]
pub struct VirusTotalClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: Option<String>,
}

impl VirusTotalClient {
    pub fn new(base_url: &str, api_key: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn report_url(&self, query: &str, kind: ScanKind) -> crate::Result<String> {
        let url = match kind {
            ScanKind::File => format!("{}/files/{}", self.base_url, path_segment(query)?),
            ScanKind::Url => format!("{}/urls/{}", self.base_url, url_identifier(query)),
            ScanKind::Domain => format!("{}/domains/{}", self.base_url, path_segment(query)?),
            ScanKind::Ip => format!("{}/ip_addresses/{}", self.base_url, path_segment(query)?),
        };
        Ok(url)
    }

    /// `Ok(None)` when VirusTotal answers without a `data` object.
    pub async fn report(&self, query: &str, kind: ScanKind) -> crate::Result<Option<ScanResult>> {
        let key = require_key(&self.api_key, VIRUSTOTAL_KEY_VAR)?;
        let url = self.report_url(query, kind)?;

        let response = self.transport.get_json(&url, &[("x-apikey", key)]).await?;
        if !response.is_success() {
            return Err(upstream_status_error("VirusTotal", &response));
        }

        Ok(normalize::virustotal_report(&response.body))
    }
}

/// VirusTotal addresses URLs by their unpadded URL-safe base64 encoding.
pub fn url_identifier(url: &str) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    let input = url.as_bytes();
    let mut result = String::with_capacity(input.len().div_ceil(3) * 4);

    for chunk in input.chunks(3) {
        let b0 = chunk[0] as u32;
        let b1 = chunk.get(1).copied().unwrap_or(0) as u32;
        let b2 = chunk.get(2).copied().unwrap_or(0) as u32;
        let combined = (b0 << 16) | (b1 << 8) | b2;

        result.push(ALPHABET[(combined >> 18) as usize] as char);
        result.push(ALPHABET[((combined >> 12) & 0x3F) as usize] as char);
        if chunk.len() > 1 {
            result.push(ALPHABET[((combined >> 6) & 0x3F) as usize] as char);
        }
        if chunk.len() > 2 {
            result.push(ALPHABET[(combined & 0x3F) as usize] as char);
        }
    }

    result
}
