use chrono::{DateTime, Local, NaiveDateTime};
use colored::Colorize;
use std::fmt::Write;
use threatlens_core::{
    QueryOutcome, QuerySession, QueryState, ReputationReport, ScanResult, Severity,
    VulnerabilityRecord,
};

use crate::commands::Output;

/// Prints the session's final state. A failed query becomes an error so the
/// process exits non-zero.
pub fn show(session: &QuerySession<QueryOutcome>, output: Output) -> anyhow::Result<()> {
    match session.state() {
        QueryState::Failed(message) => anyhow::bail!("{}", message),
        QueryState::Success(outcome) if output.json => {
            println!("{}", print_json(outcome)?);
        }
        QueryState::Success(outcome) => print!("{}", render_outcome(outcome)),
        QueryState::Idle | QueryState::Loading => {}
    }
    Ok(())
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn print_json(outcome: &QueryOutcome) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Vulnerabilities(vulns) if vulns.is_empty() => {
            no_data("No vulnerabilities found for this package.")
        }
        QueryOutcome::Vulnerabilities(vulns) => render_vulnerabilities(vulns),
        QueryOutcome::Scan(Some(result)) => render_scan(result),
        QueryOutcome::Scan(None) => no_data("No data found for this query."),
        QueryOutcome::Reputation(Some(report)) => render_reputation(report),
        QueryOutcome::Reputation(None) => {
            no_data("No threat intelligence found for this indicator.")
        }
    }
}

fn no_data(message: &str) -> String {
    format!("{}\n", message.dimmed().italic())
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(60));
    let _ = writeln!(out, "{}", title.bold());
    let _ = writeln!(out, "{}", "=".repeat(60));
}

pub fn render_vulnerabilities(vulns: &[VulnerabilityRecord]) -> String {
    let mut out = String::new();
    heading(&mut out, "Vulnerability Search");

    for vuln in vulns {
        let _ = writeln!(out, "Vulnerability ID: {}", vuln.id.bold());
        let _ = writeln!(out, "  Summary: {}", vuln.summary);
        match &vuln.severity {
            Severity::Scalar(label) => {
                let _ = writeln!(out, "  Severity: {}", label);
            }
            Severity::Scored(scores) => {
                let _ = writeln!(out, "  Severity:");
                for score in scores {
                    let _ = writeln!(out, "    - {}: {}", score.r#type, score.score);
                }
            }
        }
        let _ = writeln!(out, "  Published: {}", vuln.published);
        let _ = writeln!(out, "  References: {}", vuln.references.join(", "));
        let _ = writeln!(out);
    }

    out
}

pub fn render_scan(result: &ScanResult) -> String {
    let mut out = String::new();
    heading(&mut out, "Analysis Results");

    let _ = writeln!(out, "ID: {}", result.id);
    let _ = writeln!(out, "Type: {}", result.r#type);
    let _ = writeln!(out, "Detection Stats:");
    let _ = writeln!(out, "  {}", format!("Malicious: {}", result.malicious).red());
    let _ = writeln!(out, "  {}", format!("Suspicious: {}", result.suspicious).yellow());
    let _ = writeln!(out, "  {}", format!("Harmless: {}", result.harmless).green());
    let _ = writeln!(out, "  {}", format!("Undetected: {}", result.undetected).dimmed());
    let _ = writeln!(out, "  {}", format!("Total Scans: {}", result.total_votes).bold());
    let _ = writeln!(out, "Reputation Score: {}", result.reputation);

    let last_analysis = result
        .last_analysis()
        .map(|when| {
            when.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "Unknown".to_string());
    let _ = writeln!(out, "Last Analysis: {}", last_analysis);

    if !result.categories.is_empty() {
        let _ = writeln!(out, "Categories:");
        for (engine, category) in &result.categories {
            let _ = writeln!(out, "  {}: {}", engine, category);
        }
    }

    out
}

pub fn render_reputation(report: &ReputationReport) -> String {
    let mut out = String::new();
    heading(&mut out, "Indicator Information");

    let reputation = report.reputation.to_string();
    let reputation = if report.is_malicious() {
        reputation.red()
    } else {
        reputation.green()
    };

    let _ = writeln!(out, "Indicator: {}", report.indicator);
    let _ = writeln!(out, "Type: {}", report.r#type);
    let _ = writeln!(out, "Reputation Score: {}", reputation);
    let _ = writeln!(out, "Threat Pulses: {}", report.pulse_count);
    if report.has_location() {
        let _ = writeln!(out, "Location: {}, {}", report.city, report.country);
    }
    if report.has_asn() {
        let _ = writeln!(out, "ASN: {}", report.asn);
    }

    if report.pulses.is_empty() {
        return out;
    }

    heading(&mut out, "Related Threat Pulses");
    for pulse in &report.pulses {
        let score = format!("{}/10", pulse.threat_score);
        let score = if pulse.is_high_threat() {
            score.red()
        } else {
            score.yellow()
        };

        let _ = writeln!(out, "{}", pulse.name.bold());
        let _ = writeln!(out, "  {}", pulse.description.dimmed());
        let _ = writeln!(
            out,
            "  Author: {} | Created: {}",
            pulse.author,
            created_date(&pulse.created)
        );
        let _ = writeln!(out, "  Threat Score: {}", score);
        if !pulse.tags.is_empty() {
            let tags: Vec<String> = pulse
                .tags
                .iter()
                .map(|t| format!("[{}]", t).blue().to_string())
                .collect();
            let _ = writeln!(out, "  Tags: {}", tags.join(" "));
        }
        let _ = writeln!(out);
    }

    out
}

/// OTX timestamps come with or without an offset; anything unparseable is
/// shown verbatim.
fn created_date(created: &str) -> String {
    if let Ok(when) = DateTime::parse_from_rfc3339(created) {
        return when.with_timezone(&Local).format("%Y-%m-%d").to_string();
    }
    if let Ok(when) = NaiveDateTime::parse_from_str(created, "%Y-%m-%dT%H:%M:%S%.f") {
        return when.format("%Y-%m-%d").to_string();
    }
    created.to_string()
}
