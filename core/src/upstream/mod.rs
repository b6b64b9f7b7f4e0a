//! Clients for the public threat-intelligence APIs the backend wraps.

pub mod alienvault;
pub mod osv;
pub mod virustotal;

use std::sync::Arc;

use crate::config::Config;
use crate::error::ThreatlensError;
use crate::http::{HttpClient, HttpResponse, Transport};

pub use alienvault::AlienVaultClient;
pub use osv::OsvClient;
pub use virustotal::VirusTotalClient;

#[derive(Debug, Clone)]
pub struct Upstreams {
    pub osv: OsvClient,
    pub virustotal: VirusTotalClient,
    pub alienvault: AlienVaultClient,
}

impl Upstreams {
    pub fn from_config(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(HttpClient::new()))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            osv: OsvClient::new(&config.osv.url, transport.clone()),
            virustotal: VirusTotalClient::new(
                virustotal::DEFAULT_BASE_URL,
                config.keys.virustotal.clone(),
                transport.clone(),
            ),
            alienvault: AlienVaultClient::new(
                alienvault::DEFAULT_BASE_URL,
                config.keys.alienvault.clone(),
                transport,
            ),
        }
    }
}

pub(crate) fn upstream_status_error(source_name: &str, response: &HttpResponse) -> ThreatlensError {
    ThreatlensError::Upstream {
        source_name: source_name.to_string(),
        message: format!("HTTP {}", response.status),
    }
}

pub(crate) fn require_key<'a>(key: &'a Option<String>, var: &str) -> Result<&'a str, ThreatlensError> {
    key.as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ThreatlensError::MissingApiKey {
            var: var.to_string(),
        })
}

/// Percent-encodes user input for use as one URL path segment. Dot-only
/// input is refused since URL parsing would resolve it as `.` or `..`.
pub(crate) fn path_segment(value: &str) -> Result<String, ThreatlensError> {
    if value.chars().all(|c| c == '.') {
        return Err(ThreatlensError::validation(format!(
            "Invalid indicator '{}'",
            value
        )));
    }

    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_escapes_separators() {
        assert_eq!(path_segment("8.8.8.8").unwrap(), "8.8.8.8");
        assert_eq!(path_segment("2001:db8::1").unwrap(), "2001:db8::1");
        assert_eq!(
            path_segment("8.8.8.8/../../pulses/subscribed").unwrap(),
            "8.8.8.8%2F..%2F..%2Fpulses%2Fsubscribed"
        );
        assert_eq!(
            path_segment("http://a.example/x?y=1#z").unwrap(),
            "http:%2F%2Fa.example%2Fx%3Fy%3D1%23z"
        );
        assert_eq!(path_segment("bücher.de").unwrap(), "b%C3%BCcher.de");
    }

    #[test]
    fn test_path_segment_rejects_dot_segments() {
        assert!(matches!(
            path_segment(".."),
            Err(ThreatlensError::Validation { .. })
        ));
        assert!(path_segment(".").is_err());
    }
}
