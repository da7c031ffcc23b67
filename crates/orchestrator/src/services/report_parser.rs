use std::collections::BTreeMap;

use revloop_core::{GateVerdict, IssueCategory, Report};
use tracing::warn;

#[derive(Debug, serde::Deserialize)]
struct RawReport {
    #[serde(default)]
    approved: Vec<String>,
    #[serde(default)]
    issues: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    blockers: Vec<String>,
    #[serde(default)]
    verdict: Option<String>,
}

pub struct ReportParser;

impl ReportParser {
    /// Parse a collaborator's textual response into a Report.
    ///
    /// Collaborators are expected to answer with JSON (optionally inside a
    /// markdown fence); responses that fail to parse fall back to
    /// line-marker scanning rather than erroring.
    pub fn parse_report(collaborator_id: &str, content: &str) -> Report {
        let json_str = Self::extract_json_from_response(content);

        match serde_json::from_str::<RawReport>(&json_str) {
            Ok(raw) => Self::from_raw(collaborator_id, raw),
            Err(e) => {
                warn!(
                    collaborator_id = %collaborator_id,
                    error = %e,
                    content_preview = %content.chars().take(200).collect::<String>(),
                    "Failed to parse report JSON, falling back to marker scanning"
                );
                Self::parse_report_text(collaborator_id, content)
            }
        }
    }

    fn from_raw(collaborator_id: &str, raw: RawReport) -> Report {
        let mut report = Report::new(collaborator_id);
        report.approved = raw.approved;
        for (category, details) in raw.issues {
            report
                .issues
                .entry(IssueCategory::parse_lossy(&category))
                .or_default()
                .extend(details);
        }
        report.blockers = raw.blockers;
        report.verdict = raw.verdict.as_deref().and_then(Self::parse_verdict);
        report
    }

    fn parse_verdict(s: &str) -> Option<GateVerdict> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        let verdict = GateVerdict::parse(&normalized);
        if verdict.is_none() {
            warn!(verdict = %s, "Unknown verdict value in report");
        }
        verdict
    }

    pub fn extract_json_from_response(content: &str) -> String {
        if let Some(start) = content.find("```json") {
            let json_start = start + 7;
            if let Some(end) = content[json_start..].find("```") {
                return content[json_start..json_start + end].trim().to_string();
            }
        }

        if let Some(start) = content.find('{') {
            if let Some(end) = content.rfind('}') {
                if end > start {
                    return content[start..=end].to_string();
                }
            }
        }

        content.to_string()
    }

    /// Marker fallback for collaborators that answer in prose. Recognized
    /// line heads: `APPROVED:`, `ISSUE:`, `BLOCKER:`, `VERDICT:`.
    pub fn parse_report_text(collaborator_id: &str, content: &str) -> Report {
        let mut report = Report::new(collaborator_id);

        for line in content.lines() {
            let line = line.trim().trim_start_matches(['-', '*']).trim();
            let upper = line.to_uppercase();

            if let Some(rest) = Self::marker_value(line, &upper, "APPROVED:") {
                report.approved.push(rest);
            } else if let Some(rest) = Self::marker_value(line, &upper, "ISSUE:") {
                report
                    .issues
                    .entry(IssueCategory::General)
                    .or_default()
                    .push(rest);
            } else if let Some(rest) = Self::marker_value(line, &upper, "BLOCKER:") {
                report.blockers.push(rest);
            } else if let Some(rest) = Self::marker_value(line, &upper, "VERDICT:") {
                report.verdict = Self::parse_verdict(&rest);
            }
        }

        if report.approved.is_empty()
            && report.issues.is_empty()
            && report.blockers.is_empty()
            && report.verdict.is_none()
        {
            warn!(
                collaborator_id = %collaborator_id,
                "Unstructured collaborator response, recording as general issue"
            );
            report
                .issues
                .entry(IssueCategory::General)
                .or_default()
                .push("Response unclear; manual review recommended.".to_string());
        }

        report
    }

    fn marker_value(line: &str, upper: &str, marker: &str) -> Option<String> {
        if upper.starts_with(marker) {
            Some(line[marker.len()..].trim().to_string())
        } else {
            None
        }
    }
}
