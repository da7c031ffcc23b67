use async_trait::async_trait;
use revloop_core::{Artifact, FocusProfile, Report};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::collaborator::{Implementer, Reviewer};
use crate::error::{OrchestratorError, Result};
use crate::services::ReportParser;

pub const DEFAULT_AGENT_URL: &str = "http://localhost:7410";

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    artifact: &'a Artifact,
    focus: &'a FocusProfile,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    /// The collaborator's textual answer, parsed into a Report.
    content: String,
    /// New artifact body; only implementation endpoints return this.
    #[serde(default)]
    body: Option<String>,
}

/// A collaborator living behind an HTTP agent endpoint.
///
/// `POST {base_url}/collaborators/{id}/review` for reviewers and
/// `POST {base_url}/collaborators/{id}/implement` for the implementer,
/// both taking the artifact and focus profile as JSON.
#[derive(Clone)]
pub struct HttpCollaborator {
    client: reqwest::Client,
    base_url: String,
    id: String,
}

impl HttpCollaborator {
    pub fn new(base_url: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            id: id.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn invoke(&self, operation: &str, request: &InvokeRequest<'_>) -> Result<InvokeResponse> {
        let url = format!(
            "{}/collaborators/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.id,
            operation
        );

        info!(collaborator_id = %self.id, url = %url, "Invoking collaborator endpoint");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(collaborator_id = %self.id, error = %e, "Collaborator request failed");
                OrchestratorError::collaborator_failed(&self.id, e.to_string())
            })?;

        response.json::<InvokeResponse>().await.map_err(|e| {
            error!(collaborator_id = %self.id, error = %e, "Collaborator response unreadable");
            OrchestratorError::malformed_response(&self.id, e.to_string())
        })
    }
}

#[async_trait]
impl Reviewer for HttpCollaborator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn review(&self, artifact: &Artifact, focus: &FocusProfile) -> Result<Report> {
        let response = self.invoke("review", &InvokeRequest { artifact, focus }).await?;
        Ok(ReportParser::parse_report(&self.id, &response.content))
    }
}

#[async_trait]
impl Implementer for HttpCollaborator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn implement(&self, artifact: &mut Artifact, focus: &FocusProfile) -> Result<Report> {
        let response = self
            .invoke("implement", &InvokeRequest { artifact, focus })
            .await?;

        let body = response.body.ok_or_else(|| {
            OrchestratorError::malformed_response(&self.id, "implement response carries no body")
        })?;
        artifact.apply_revision(body);

        Ok(ReportParser::parse_report(&self.id, &response.content))
    }
}
