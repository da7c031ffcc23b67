use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Pass,
    ConditionalPass,
    Fail,
}

impl GateVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::ConditionalPass => "conditional_pass",
            Self::Fail => "fail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pass" => Some(Self::Pass),
            "conditional_pass" => Some(Self::ConditionalPass),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Review dimensions across both domains. Categories a collaborator invents
/// that the orchestrator does not know degrade to `General`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Design,
    Security,
    Database,
    Accessibility,
    Testing,
    General,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Security => "security",
            Self::Database => "database",
            Self::Accessibility => "accessibility",
            Self::Testing => "testing",
            Self::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "design" => Some(Self::Design),
            "security" => Some(Self::Security),
            "database" => Some(Self::Database),
            "accessibility" => Some(Self::Accessibility),
            "testing" => Some(Self::Testing),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(&s.to_lowercase()).unwrap_or(Self::General)
    }
}

/// What a collaborator returned for one invocation.
///
/// Only the gate collaborator populates `verdict`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub collaborator_id: String,
    #[serde(default)]
    pub approved: Vec<String>,
    #[serde(default)]
    pub issues: BTreeMap<IssueCategory, Vec<String>>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<GateVerdict>,
}

impl Report {
    pub fn new(collaborator_id: impl Into<String>) -> Self {
        Self {
            collaborator_id: collaborator_id.into(),
            approved: Vec::new(),
            issues: BTreeMap::new(),
            blockers: Vec::new(),
            verdict: None,
        }
    }

    /// Synthetic report recorded when a collaborator errors or times out.
    /// The failure becomes that collaborator's Blocker; siblings are
    /// unaffected.
    pub fn from_failure(collaborator_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut report = Self::new(collaborator_id);
        report.blockers.push(reason.into());
        report
    }

    pub fn with_approved(mut self, item: impl Into<String>) -> Self {
        self.approved.push(item.into());
        self
    }

    pub fn with_issue(mut self, category: IssueCategory, detail: impl Into<String>) -> Self {
        self.issues.entry(category).or_default().push(detail.into());
        self
    }

    pub fn with_blocker(mut self, detail: impl Into<String>) -> Self {
        self.blockers.push(detail.into());
        self
    }

    pub fn with_verdict(mut self, verdict: GateVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    pub fn has_blockers(&self) -> bool {
        !self.blockers.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }
}
