pub mod kind;
pub mod reputation;
pub mod scan;
pub mod vulnerability;

pub use kind::{IndicatorKind, ScanKind, Source};
pub use reputation::{ReputationReport, ThreatPulse};
pub use scan::ScanResult;
pub use vulnerability::{Severity, SeverityScore, VulnerabilityRecord};

/// Placeholder the normalizers use for absent location and ASN fields.
pub const UNKNOWN: &str = "Unknown";
