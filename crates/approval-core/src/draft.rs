//! Document drafts carrying an embedded route snapshot
//!
//! The route lives under `content.__approvalRoute` as `{steps: [...]}`.
//! No other content field is read or written here.

use crate::constants::DRAFT_ROUTE_KEY;
use crate::error::{ApprovalError, Result};
use crate::route::{ApprovalRoute, ApprovalStep, StepList};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Strongly typed DraftId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(String);

impl DraftId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Draft,
    Submitted,
}

#[derive(Debug, Serialize, Deserialize)]
struct EmbeddedRoute {
    steps: Vec<ApprovalStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    pub id: DraftId,
    pub title: String,
    #[serde(default)]
    pub content: Map<String, Value>,
    pub status: DraftStatus,
    pub updated_at: DateTime<Utc>,
}

impl DocumentDraft {
    pub fn new(id: DraftId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: Map::new(),
            status: DraftStatus::Draft,
            updated_at: Utc::now(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.status == DraftStatus::Submitted
    }

    /// Store a snapshot of `route`, replacing any earlier one
    pub fn attach_route(&mut self, route: &ApprovalRoute) -> Result<()> {
        self.ensure_editable()?;

        let embedded = EmbeddedRoute {
            steps: route.steps.steps().to_vec(),
        };
        let value = serde_json::to_value(&embedded).map_err(|e| {
            ApprovalError::Serialization(format!("Failed to embed approval route: {}", e))
        })?;

        self.content.insert(DRAFT_ROUTE_KEY.to_string(), value);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Steps of the embedded route, if one is attached. Repeated approvers
    /// and numbering gaps from hand-edited content are repaired.
    pub fn attached_steps(&self) -> Result<Option<StepList>> {
        let Some(value) = self.content.get(DRAFT_ROUTE_KEY) else {
            return Ok(None);
        };

        let embedded: EmbeddedRoute = serde_json::from_value(value.clone()).map_err(|e| {
            ApprovalError::Deserialization(format!("Invalid embedded approval route: {}", e))
        })?;

        let mut steps = StepList::from_steps(embedded.steps);
        steps.dedup_approvers();
        steps.normalize();
        Ok(Some(steps))
    }

    pub fn detach_route(&mut self) -> Result<Option<Value>> {
        self.ensure_editable()?;

        let removed = self.content.remove(DRAFT_ROUTE_KEY);
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        Ok(removed)
    }

    pub fn mark_submitted(&mut self) {
        self.status = DraftStatus::Submitted;
        self.updated_at = Utc::now();
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_submitted() {
            return Err(ApprovalError::Transition(format!(
                "Draft {} is already submitted, its route can no longer change",
                self.id
            )));
        }
        Ok(())
    }
}
