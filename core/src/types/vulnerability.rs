use serde::{Deserialize, Serialize};

/// OSV reports severity either as a bare label or as a list of scored
/// entries. Both shapes survive normalization untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Severity {
    Scalar(String),
    Scored(Vec<SeverityScore>),
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Scalar(super::UNKNOWN.to_string())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Scalar(label) => write!(f, "{}", label),
            Severity::Scored(scores) => {
                let parts: Vec<String> = scores
                    .iter()
                    .map(|s| format!("{}: {}", s.r#type, s.score))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityScore {
    pub r#type: String,
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub summary: String,
    pub severity: Severity,
    pub published: String,
    pub references: Vec<String>,
}
