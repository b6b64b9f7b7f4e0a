use crate::error::ThreatlensError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Osv,
    VirusTotal,
    AlienVault,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::Osv => "OSV",
            Source::VirusTotal => "VirusTotal",
            Source::AlienVault => "AlienVault OTX",
        }
    }

    /// Message shown when the backend answers with a non-success status.
    pub fn fetch_failure_message(&self) -> &'static str {
        match self {
            Source::Osv => "Failed to fetch OSV vulnerabilities.",
            Source::VirusTotal => "Failed to fetch VirusTotal report.",
            Source::AlienVault => "Failed to fetch AlienVault OTX report.",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a VirusTotal lookup is run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    #[default]
    File,
    Url,
    Domain,
    Ip,
}

impl ScanKind {
    pub const ALL: [ScanKind; 4] = [ScanKind::File, ScanKind::Url, ScanKind::Domain, ScanKind::Ip];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::File => "file",
            ScanKind::Url => "url",
            ScanKind::Domain => "domain",
            ScanKind::Ip => "ip",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ScanKind::File => "file hash (MD5, SHA-1, or SHA-256)",
            ScanKind::Url => "URL (e.g., https://example.com)",
            ScanKind::Domain => "domain (e.g., example.com)",
            ScanKind::Ip => "IP address (e.g., 8.8.8.8)",
        }
    }
}

impl std::fmt::Display for ScanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScanKind {
    type Err = ThreatlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(ScanKind::File),
            "url" => Ok(ScanKind::Url),
            "domain" => Ok(ScanKind::Domain),
            "ip" => Ok(ScanKind::Ip),
            other => Err(ThreatlensError::InvalidKind {
                kind: other.to_string(),
                expected: "scan type",
            }),
        }
    }
}

/// What an AlienVault OTX lookup is run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    #[default]
    Ip,
    Domain,
    Url,
    Hash,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::Ip,
        IndicatorKind::Domain,
        IndicatorKind::Url,
        IndicatorKind::Hash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "ip",
            IndicatorKind::Domain => "domain",
            IndicatorKind::Url => "url",
            IndicatorKind::Hash => "hash",
        }
    }

    /// Path segment OTX uses for this indicator section.
    pub fn otx_section(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "IPv4",
            IndicatorKind::Domain => "domain",
            IndicatorKind::Url => "url",
            IndicatorKind::Hash => "file",
        }
    }

    /// Maps both our own names and the type labels OTX reports
    /// (`IPv4`, `hostname`, `FileHash-SHA256`, ...).
    pub fn from_reported(label: &str) -> Option<Self> {
        match label {
            "ip" | "IPv4" | "IPv6" => Some(IndicatorKind::Ip),
            "domain" | "hostname" => Some(IndicatorKind::Domain),
            "url" | "URL" | "URI" => Some(IndicatorKind::Url),
            "hash" | "file" => Some(IndicatorKind::Hash),
            l if l.starts_with("FileHash-") => Some(IndicatorKind::Hash),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "IP address (e.g., 8.8.8.8)",
            IndicatorKind::Domain => "domain (e.g., example.com)",
            IndicatorKind::Url => "URL (e.g., https://example.com)",
            IndicatorKind::Hash => "file hash (MD5, SHA-1, or SHA-256)",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = ThreatlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ip" => Ok(IndicatorKind::Ip),
            "domain" => Ok(IndicatorKind::Domain),
            "url" => Ok(IndicatorKind::Url),
            "hash" => Ok(IndicatorKind::Hash),
            other => Err(ThreatlensError::InvalidKind {
                kind: other.to_string(),
                expected: "check type",
            }),
        }
    }
}
