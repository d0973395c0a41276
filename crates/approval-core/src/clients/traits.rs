//! Collaborator traits consumed by the builder and the submission service
//!
//! Each trait is one backend boundary. The HTTP client implements all of
//! them; tests and offline runs use the in-memory versions.

use crate::draft::DraftId;
use crate::error::Result;
use crate::templates::{NewUserTemplate, UserTemplate};
use approval_types::{AdminTemplate, DirectoryUser, SubmitDraftRequest, SubmittedDraft};
use async_trait::async_trait;

/// Source of organization members
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn get_users(&self) -> Result<Vec<DirectoryUser>>;
}

/// Persistence for reusable route templates
#[async_trait]
pub trait RouteTemplateStore: Send + Sync {
    /// Personal templates of the authenticated user
    async fn get_user_approval_routes(&self) -> Result<Vec<UserTemplate>>;

    async fn get_admin_approval_templates(&self) -> Result<Vec<AdminTemplate>>;

    async fn save_user_approval_route(&self, template: &NewUserTemplate) -> Result<UserTemplate>;
}

/// Hands a finished draft and its route to the backend approval engine
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit_draft(
        &self,
        draft_id: &DraftId,
        request: &SubmitDraftRequest,
    ) -> Result<SubmittedDraft>;
}

/// Reviewer actions on a submitted document
#[async_trait]
pub trait ReviewGateway: Send + Sync {
    async fn approve(&self, document_id: &str, comment: Option<&str>) -> Result<()>;

    async fn reject(&self, document_id: &str, comment: Option<&str>) -> Result<()>;

    async fn comment(&self, document_id: &str, content: &str) -> Result<()>;
}
