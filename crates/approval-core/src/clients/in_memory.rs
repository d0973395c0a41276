//! In-process collaborators for tests and offline runs

use super::traits::{DirectoryProvider, ReviewGateway, RouteTemplateStore, SubmissionGateway};
use crate::draft::DraftId;
use crate::error::{ApprovalError, Result};
use crate::templates::{NewUserTemplate, TemplateId, UserTemplate};
use approval_types::{AdminTemplate, DirectoryUser, SubmitDraftRequest, SubmittedDraft};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub struct InMemoryDirectory {
    users: Vec<DirectoryUser>,
    failure: Option<String>,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        Self {
            users,
            failure: None,
        }
    }

    /// Directory whose every fetch fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            users: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

#[async_trait]
impl DirectoryProvider for InMemoryDirectory {
    async fn get_users(&self) -> Result<Vec<DirectoryUser>> {
        if let Some(reason) = &self.failure {
            return Err(ApprovalError::ServiceUnavailable(reason.clone()));
        }
        Ok(self.users.clone())
    }
}

pub struct InMemoryTemplateStore {
    user_templates: Mutex<Vec<UserTemplate>>,
    admin_templates: Vec<AdminTemplate>,
    failure: Option<String>,
}

impl InMemoryTemplateStore {
    pub fn new(user_templates: Vec<UserTemplate>, admin_templates: Vec<AdminTemplate>) -> Self {
        Self {
            user_templates: Mutex::new(user_templates),
            admin_templates,
            failure: None,
        }
    }

    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Snapshot of the stored personal templates
    pub async fn user_templates(&self) -> Vec<UserTemplate> {
        self.user_templates.lock().await.clone()
    }

    fn check_available(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(ApprovalError::ServiceUnavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

#[async_trait]
impl RouteTemplateStore for InMemoryTemplateStore {
    async fn get_user_approval_routes(&self) -> Result<Vec<UserTemplate>> {
        self.check_available()?;
        Ok(self.user_templates.lock().await.clone())
    }

    async fn get_admin_approval_templates(&self) -> Result<Vec<AdminTemplate>> {
        self.check_available()?;
        Ok(self.admin_templates.clone())
    }

    async fn save_user_approval_route(&self, template: &NewUserTemplate) -> Result<UserTemplate> {
        self.check_available()?;

        let saved = UserTemplate {
            id: TemplateId::new(),
            name: template.name.clone(),
            description: template.description.clone(),
            is_default: template.is_default,
            steps: template.steps.clone(),
        };
        self.user_templates.lock().await.push(saved.clone());
        Ok(saved)
    }
}

/// Reviewer action as received by `RecordingGateway`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ReviewRecord {
    Approve {
        document_id: String,
        comment: Option<String>,
    },
    Reject {
        document_id: String,
        comment: Option<String>,
    },
    Comment {
        document_id: String,
        content: String,
    },
}

/// Accepts submissions and reviewer actions and keeps them for inspection
#[derive(Default)]
pub struct RecordingGateway {
    submissions: Mutex<Vec<(DraftId, SubmitDraftRequest)>>,
    reviews: Mutex<Vec<ReviewRecord>>,
    failure: Option<String>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub async fn submissions(&self) -> Vec<(DraftId, SubmitDraftRequest)> {
        self.submissions.lock().await.clone()
    }

    pub async fn reviews(&self) -> Vec<ReviewRecord> {
        self.reviews.lock().await.clone()
    }

    async fn record_review(&self, record: ReviewRecord) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(ApprovalError::ServiceUnavailable(reason.clone()));
        }
        self.reviews.lock().await.push(record);
        Ok(())
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit_draft(
        &self,
        draft_id: &DraftId,
        request: &SubmitDraftRequest,
    ) -> Result<SubmittedDraft> {
        if let Some(reason) = &self.failure {
            return Err(ApprovalError::ServiceUnavailable(reason.clone()));
        }

        self.submissions
            .lock()
            .await
            .push((draft_id.clone(), request.clone()));

        Ok(SubmittedDraft {
            id: draft_id.to_string(),
            status: Some("PENDING".to_string()),
            submitted_at: Some(Utc::now()),
        })
    }
}

#[async_trait]
impl ReviewGateway for RecordingGateway {
    async fn approve(&self, document_id: &str, comment: Option<&str>) -> Result<()> {
        self.record_review(ReviewRecord::Approve {
            document_id: document_id.to_string(),
            comment: comment.map(str::to_string),
        })
        .await
    }

    async fn reject(&self, document_id: &str, comment: Option<&str>) -> Result<()> {
        self.record_review(ReviewRecord::Reject {
            document_id: document_id.to_string(),
            comment: comment.map(str::to_string),
        })
        .await
    }

    async fn comment(&self, document_id: &str, content: &str) -> Result<()> {
        self.record_review(ReviewRecord::Comment {
            document_id: document_id.to_string(),
            content: content.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::StepList;

    #[tokio::test]
    async fn test_saved_template_is_listed() {
        let store = InMemoryTemplateStore::default();
        let template = NewUserTemplate {
            name: "주간 보고".to_string(),
            description: None,
            steps: StepList::new().into_steps(),
            is_default: false,
        };

        let saved = store.save_user_approval_route(&template).await.unwrap();

        let listed = store.get_user_approval_routes().await.unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[tokio::test]
    async fn test_failures_surface_as_service_unavailable() {
        let store = InMemoryTemplateStore::default().with_failure("offline");
        assert!(matches!(
            store.get_admin_approval_templates().await,
            Err(ApprovalError::ServiceUnavailable(_))
        ));

        let gateway = RecordingGateway::failing("offline");
        assert!(gateway.approve("doc-1", None).await.is_err());
        assert!(gateway.reviews().await.is_empty());
    }
}
