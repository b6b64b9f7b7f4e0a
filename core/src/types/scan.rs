use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: String,
    pub r#type: String,
    pub malicious: u64,
    pub suspicious: u64,
    pub harmless: u64,
    pub undetected: u64,
    pub total_votes: u64,
    pub reputation: i64,
    /// Unix seconds; absent when the object was never analysed.
    pub last_analysis_date: Option<i64>,
    pub categories: BTreeMap<String, String>,
}

impl ScanResult {
    pub fn last_analysis(&self) -> Option<DateTime<Utc>> {
        self.last_analysis_date
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn is_flagged(&self) -> bool {
        self.malicious > 0 || self.suspicious > 0
    }
}
