//! Maps source-specific JSON payloads onto the flat display records.
//!
//! Every function here is total: absent, `null` and empty-string fields fall
//! back to a placeholder instead of failing. Two families exist per source,
//! one for the raw upstream payload and one for the already flattened
//! `result` object the backend returns.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{
    ReputationReport, ScanResult, Severity, SeverityScore, ThreatPulse, VulnerabilityRecord,
    UNKNOWN,
};

const NOT_AVAILABLE: &str = "N/A";
const NO_SUMMARY: &str = "No summary available";
const UNKNOWN_DATE: &str = "Unknown date";
const NO_DESCRIPTION: &str = "No description";

static NULL: Value = Value::Null;

/// OTX can attach hundreds of pulses to popular indicators; only the first
/// few are kept.
pub const MAX_PULSES: usize = 5;

/// Accepts the backend's `{vulnerabilities: [...]}` as well as the raw OSV
/// `{vulns: [...]}` shape. Anything else yields no records.
pub fn vulnerability_records(body: &Value) -> Vec<VulnerabilityRecord> {
    body.get("vulnerabilities")
        .or_else(|| body.get("vulns"))
        .and_then(Value::as_array)
        .map(|vulns| vulns.iter().map(vulnerability_record).collect())
        .unwrap_or_default()
}

pub fn vulnerability_record(vuln: &Value) -> VulnerabilityRecord {
    let references = vuln
        .get("references")
        .and_then(Value::as_array)
        .map(|refs| refs.iter().filter_map(reference_url).collect())
        .unwrap_or_default();

    VulnerabilityRecord {
        id: text(vuln, "id", NOT_AVAILABLE),
        summary: text(vuln, "summary", NO_SUMMARY),
        severity: severity(vuln.get("severity")),
        published: text(vuln, "published", UNKNOWN_DATE),
        references,
    }
}

fn reference_url(reference: &Value) -> Option<String> {
    match reference {
        Value::String(url) => Some(url.clone()),
        Value::Object(_) => reference.get("url").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

fn severity(value: Option<&Value>) -> Severity {
    match value {
        Some(Value::String(label)) if !label.is_empty() => Severity::Scalar(label.clone()),
        Some(Value::Array(entries)) => Severity::Scored(
            entries
                .iter()
                .map(|entry| SeverityScore {
                    r#type: text(entry, "type", UNKNOWN),
                    score: text(entry, "score", UNKNOWN),
                })
                .collect(),
        ),
        _ => Severity::default(),
    }
}

/// Raw VirusTotal v3 object response. `None` when the body carries no
/// `data` object.
pub fn virustotal_report(raw: &Value) -> Option<ScanResult> {
    let data = raw.get("data").filter(|d| d.is_object())?;
    let attributes = data.get("attributes").unwrap_or(&NULL);
    let stats = attributes.get("last_analysis_stats").unwrap_or(&NULL);

    let malicious = unsigned(stats, "malicious");
    let suspicious = unsigned(stats, "suspicious");
    let undetected = unsigned(stats, "undetected");
    let harmless = unsigned(stats, "harmless");

    Some(ScanResult {
        id: text(data, "id", NOT_AVAILABLE),
        r#type: text(data, "type", NOT_AVAILABLE),
        malicious,
        suspicious,
        harmless,
        undetected,
        total_votes: vote_total(&[malicious, suspicious, undetected, harmless]),
        reputation: signed(attributes, "reputation"),
        last_analysis_date: timestamp(attributes, "last_analysis_date"),
        categories: categories(attributes.get("categories")),
    })
}

/// The flattened VirusTotal `result` object returned by the backend.
pub fn scan_result(result: &Value) -> ScanResult {
    let malicious = unsigned(result, "malicious");
    let suspicious = unsigned(result, "suspicious");
    let undetected = unsigned(result, "undetected");
    let harmless = unsigned(result, "harmless");

    let total_votes = match result.get("total_votes").and_then(Value::as_u64) {
        Some(total) => total,
        None => vote_total(&[malicious, suspicious, undetected, harmless]),
    };

    ScanResult {
        id: text(result, "id", NOT_AVAILABLE),
        r#type: text(result, "type", NOT_AVAILABLE),
        malicious,
        suspicious,
        harmless,
        undetected,
        total_votes,
        reputation: signed(result, "reputation"),
        last_analysis_date: timestamp(result, "last_analysis_date"),
        categories: categories(result.get("categories")),
    }
}

fn vote_total(counts: &[u64]) -> u64 {
    counts.iter().fold(0, |total, count| total.saturating_add(*count))
}

fn categories(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(engine, category)| {
                    let category = match category {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (engine.clone(), category)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Raw OTX `indicators/<section>/<value>/general` response. `None` for an
/// empty or non-object body.
pub fn alienvault_report(raw: &Value) -> Option<ReputationReport> {
    let fields = raw.as_object().filter(|o| !o.is_empty())?;
    let pulse_info = fields.get("pulse_info").unwrap_or(&NULL);

    let pulses = pulse_info
        .get("pulses")
        .and_then(Value::as_array)
        .map(|pulses| pulses.iter().take(MAX_PULSES).map(threat_pulse).collect())
        .unwrap_or_default();

    Some(ReputationReport {
        indicator: text(raw, "indicator", NOT_AVAILABLE),
        r#type: text(raw, "type", NOT_AVAILABLE),
        reputation: signed(raw, "reputation"),
        pulse_count: unsigned(pulse_info, "count"),
        country: text(raw, "country_name", UNKNOWN),
        city: text(raw, "city", UNKNOWN),
        asn: text(raw, "asn", UNKNOWN),
        pulses,
    })
}

/// The flattened AlienVault `result` object returned by the backend.
pub fn reputation_report(result: &Value) -> ReputationReport {
    let pulses = result
        .get("pulses")
        .and_then(Value::as_array)
        .map(|pulses| pulses.iter().map(threat_pulse).collect())
        .unwrap_or_default();

    ReputationReport {
        indicator: text(result, "indicator", NOT_AVAILABLE),
        r#type: text(result, "type", NOT_AVAILABLE),
        reputation: signed(result, "reputation"),
        pulse_count: unsigned(result, "pulse_count"),
        country: text(result, "country", UNKNOWN),
        city: text(result, "city", UNKNOWN),
        asn: text(result, "asn", UNKNOWN),
        pulses,
    }
}

fn threat_pulse(pulse: &Value) -> ThreatPulse {
    let author = match pulse.get("author").filter(|a| !is_blank(a)) {
        Some(_) => text(pulse, "author", UNKNOWN),
        None => text(pulse, "author_name", UNKNOWN),
    };

    let tags = pulse
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    ThreatPulse {
        name: text(pulse, "name", NOT_AVAILABLE),
        description: text(pulse, "description", NO_DESCRIPTION),
        author,
        created: text(pulse, "created", UNKNOWN),
        threat_score: pulse
            .get("threat_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        tags,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn text(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

fn signed(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn unsigned(value: &Value, key: &str) -> u64 {
    signed(value, key).max(0) as u64
}

fn timestamp(value: &Value, key: &str) -> Option<i64> {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_osv_defaults_for_missing_fields() {
        let body = json!({ "vulns": [{ "id": "PYSEC-2023-74" }] });
        let records = vulnerability_records(&body);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "PYSEC-2023-74");
        assert_eq!(record.summary, "No summary available");
        assert_eq!(record.severity, Severity::Scalar("Unknown".to_string()));
        assert_eq!(record.published, "Unknown date");
        assert!(record.references.is_empty());
    }

    #[test]
    fn test_osv_scored_severity_is_preserved() {
        let body = json!({
            "vulnerabilities": [{
                "id": "GHSA-j8r2-6x86-q33q",
                "summary": "Unintended leak of Proxy-Authorization header",
                "severity": [{ "type": "CVSS", "score": 7.5 }],
                "published": "2023-05-22T20:30:00Z",
                "references": [
                    { "type": "WEB", "url": "https://github.com/psf/requests/pull/6447" },
                    "https://nvd.nist.gov/vuln/detail/CVE-2023-32681"
                ]
            }]
        });
        let record = &vulnerability_records(&body)[0];

        match &record.severity {
            Severity::Scored(scores) => {
                assert_eq!(scores.len(), 1);
                assert_eq!(scores[0].r#type, "CVSS");
                assert_eq!(scores[0].score, "7.5");
            }
            other => panic!("expected scored severity, got {:?}", other),
        }
        assert_eq!(
            record.references,
            vec![
                "https://github.com/psf/requests/pull/6447".to_string(),
                "https://nvd.nist.gov/vuln/detail/CVE-2023-32681".to_string(),
            ]
        );
    }

    #[test]
    fn test_osv_scalar_severity_and_empty_body() {
        let body = json!({ "vulnerabilities": [{ "id": "X", "severity": "HIGH", "summary": "" }] });
        let record = &vulnerability_records(&body)[0];
        assert_eq!(record.severity, Severity::Scalar("HIGH".to_string()));
        assert_eq!(record.summary, "No summary available");

        assert!(vulnerability_records(&json!({})).is_empty());
    }

    #[test]
    fn test_virustotal_raw_report() {
        let raw = json!({
            "data": {
                "id": "example.com",
                "type": "domain",
                "attributes": {
                    "last_analysis_stats": {
                        "malicious": 2, "suspicious": 1, "undetected": 20, "harmless": 70, "timeout": 0
                    },
                    "reputation": -3,
                    "last_analysis_date": 1700000000,
                    "categories": { "Forcepoint ThreatSeeker": "information technology" }
                }
            }
        });
        let result = virustotal_report(&raw).unwrap();

        assert_eq!(result.id, "example.com");
        assert_eq!(result.r#type, "domain");
        assert_eq!(result.total_votes, 93);
        assert_eq!(result.reputation, -3);
        assert_eq!(result.last_analysis_date, Some(1_700_000_000));
        assert_eq!(
            result.categories.get("Forcepoint ThreatSeeker").map(String::as_str),
            Some("information technology")
        );

        assert!(virustotal_report(&json!({ "error": { "code": "NotFoundError" } })).is_none());
    }

    #[test]
    fn test_virustotal_huge_counts_saturate() {
        let raw = json!({
            "data": {
                "id": "x",
                "attributes": {
                    "last_analysis_stats": {
                        "malicious": i64::MAX, "suspicious": i64::MAX,
                        "undetected": i64::MAX, "harmless": i64::MAX
                    }
                }
            }
        });
        let result = virustotal_report(&raw).unwrap();
        assert_eq!(result.malicious, i64::MAX as u64);
        assert_eq!(result.total_votes, u64::MAX);

        let flat = scan_result(&json!({ "malicious": 1e30, "suspicious": 1e30, "undetected": 1e30 }));
        assert_eq!(flat.total_votes, u64::MAX);
    }

    #[test]
    fn test_virustotal_flat_result_keeps_reported_total() {
        let result = scan_result(&json!({
            "id": "abc", "type": "file", "malicious": 1, "total_votes": 70
        }));
        assert_eq!(result.total_votes, 70);
        assert_eq!(result.suspicious, 0);
        assert_eq!(result.last_analysis_date, None);
        assert!(result.categories.is_empty());
    }

    #[test]
    fn test_alienvault_raw_report_keeps_top_pulses() {
        let pulses: Vec<Value> = (0..8)
            .map(|i| json!({ "name": format!("pulse {}", i), "author_name": "AlienVault", "tags": ["c2", 7] }))
            .collect();
        let raw = json!({
            "indicator": "8.8.8.8",
            "type": "IPv4",
            "reputation": 0,
            "country_name": "United States of America",
            "asn": "AS15169 google",
            "pulse_info": { "count": 8, "pulses": pulses }
        });
        let report = alienvault_report(&raw).unwrap();

        assert_eq!(report.pulse_count, 8);
        assert_eq!(report.pulses.len(), MAX_PULSES);
        assert_eq!(report.country, "United States of America");
        assert_eq!(report.city, "Unknown");
        assert_eq!(report.pulses[0].author, "AlienVault");
        assert_eq!(report.pulses[0].description, "No description");
        assert_eq!(report.pulses[0].tags, vec!["c2".to_string()]);

        assert!(alienvault_report(&json!({})).is_none());
    }

    #[test]
    fn test_alienvault_flat_result() {
        let report = reputation_report(&json!({
            "indicator": "8.8.8.8",
            "type": "ip",
            "reputation": -5,
            "pulse_count": 3,
            "country": "Unknown",
            "asn": "Unknown",
            "pulses": []
        }));

        assert_eq!(report.reputation, -5);
        assert_eq!(report.pulse_count, 3);
        assert!(report.is_malicious());
        assert!(!report.has_location());
        assert!(!report.has_asn());
        assert!(report.pulses.is_empty());
    }
}
