use serde::{Deserialize, Serialize};

use super::kind::IndicatorKind;
use super::UNKNOWN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationReport {
    pub indicator: String,
    /// Type label as reported, e.g. `ip` or `IPv4`.
    pub r#type: String,
    pub reputation: i64,
    pub pulse_count: u64,
    pub country: String,
    pub city: String,
    pub asn: String,
    pub pulses: Vec<ThreatPulse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatPulse {
    pub name: String,
    pub description: String,
    pub author: String,
    pub created: String,
    pub threat_score: f64,
    pub tags: Vec<String>,
}

impl ReputationReport {
    pub fn indicator_kind(&self) -> Option<IndicatorKind> {
        IndicatorKind::from_reported(&self.r#type)
    }

    pub fn is_malicious(&self) -> bool {
        self.reputation < 0
    }

    pub fn has_location(&self) -> bool {
        is_known(&self.country)
    }

    pub fn has_asn(&self) -> bool {
        is_known(&self.asn)
    }
}

impl ThreatPulse {
    pub fn is_high_threat(&self) -> bool {
        self.threat_score > 5.0
    }
}

fn is_known(value: &str) -> bool {
    !value.is_empty() && value != UNKNOWN
}
