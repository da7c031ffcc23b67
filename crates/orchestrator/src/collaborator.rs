use std::sync::Arc;

use async_trait::async_trait;
use revloop_core::{Artifact, Domain, FocusProfile, Report};

use crate::error::Result;

/// The Phase 1 collaborator: the only writer of the artifact, invoked once
/// per cycle before any reviewer.
#[async_trait]
pub trait Implementer: Send + Sync {
    fn id(&self) -> &str;

    async fn implement(&self, artifact: &mut Artifact, focus: &FocusProfile) -> Result<Report>;
}

/// A read-only review collaborator. Opaque to the orchestrator beyond its
/// Report contract.
#[async_trait]
pub trait Reviewer: Send + Sync {
    fn id(&self) -> &str;

    async fn review(&self, artifact: &Artifact, focus: &FocusProfile) -> Result<Report>;
}

/// The injected collaborator set for one workflow run: one implementer,
/// the Phase 2 roster in dispatch order, and the gate collaborator.
pub struct CollaboratorRegistry {
    implementer: Arc<dyn Implementer>,
    reviewers: Vec<Arc<dyn Reviewer>>,
    gate: Arc<dyn Reviewer>,
}

impl CollaboratorRegistry {
    pub fn new(implementer: Arc<dyn Implementer>, gate: Arc<dyn Reviewer>) -> Self {
        Self {
            implementer,
            reviewers: Vec::new(),
            gate,
        }
    }

    pub fn with_reviewer(mut self, reviewer: Arc<dyn Reviewer>) -> Self {
        self.reviewers.push(reviewer);
        self
    }

    pub fn implementer(&self) -> &Arc<dyn Implementer> {
        &self.implementer
    }

    pub fn reviewers(&self) -> &[Arc<dyn Reviewer>] {
        &self.reviewers
    }

    pub fn gate(&self) -> &Arc<dyn Reviewer> {
        &self.gate
    }

    pub fn reviewer_count(&self) -> usize {
        self.reviewers.len()
    }
}

impl std::fmt::Debug for CollaboratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorRegistry")
            .field("implementer", &self.implementer.id())
            .field(
                "reviewers",
                &self.reviewers.iter().map(|r| r.id()).collect::<Vec<_>>(),
            )
            .field("gate", &self.gate.id())
            .finish()
    }
}

/// Named collaborator roster of a domain. The Phase 2 roster size is
/// configuration per domain, not a universal constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProfile {
    pub domain: Domain,
    pub implementer_id: &'static str,
    pub reviewer_ids: &'static [&'static str],
    pub gate_id: &'static str,
}

impl DomainProfile {
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Backend => Self {
                domain,
                implementer_id: "backend-implementer",
                reviewer_ids: &["design-review", "security-review", "database-review"],
                gate_id: "test-enforcement",
            },
            Domain::Frontend => Self {
                domain,
                implementer_id: "frontend-implementer",
                reviewer_ids: &["design-review", "accessibility-review"],
                gate_id: "test-enforcement",
            },
        }
    }

    pub fn reviewer_count(&self) -> usize {
        self.reviewer_ids.len()
    }
}
