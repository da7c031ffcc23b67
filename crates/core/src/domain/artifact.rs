use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The work product under review. The single shared mutable resource of a
/// workflow run: only the implementation collaborator receives it mutably,
/// once per cycle; all reviewers read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: String::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_revision(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}
