//! Submission of routed drafts and stage progression

pub mod payload;
pub mod progress;

pub use payload::{build_submit_request, to_submission_payload};
pub use progress::{
    ProgressState, ReviewComment, ReviewerAction, RouteProgress, StageProgress, StageStatus,
};

use crate::clients::{ReviewGateway, SubmissionGateway};
use crate::config::RoutingConfig;
use crate::draft::DocumentDraft;
use crate::error::{ApprovalError, Result};
use crate::route::{ApprovalRoute, StepList};
use approval_types::SubmittedDraft;
use std::sync::Arc;

/// Submits drafts through the backend and relays reviewer actions
pub struct SubmissionService {
    submissions: Arc<dyn SubmissionGateway>,
    reviews: Arc<dyn ReviewGateway>,
    routing: RoutingConfig,
}

impl SubmissionService {
    pub fn new(
        submissions: Arc<dyn SubmissionGateway>,
        reviews: Arc<dyn ReviewGateway>,
        routing: RoutingConfig,
    ) -> Self {
        Self {
            submissions,
            reviews,
            routing,
        }
    }

    /// Embed `route` into `draft` and submit it. The draft is only changed
    /// when the backend accepts the submission.
    pub async fn submit(
        &self,
        draft: &mut DocumentDraft,
        route: &ApprovalRoute,
        comments: Option<&str>,
    ) -> Result<SubmittedDraft> {
        let mut staged = draft.clone();
        staged.attach_route(route)?;

        let submitted = self.send(&staged, &route.steps, comments).await?;

        staged.mark_submitted();
        *draft = staged;
        Ok(submitted)
    }

    /// Submit a draft using the route already embedded in it.
    /// A draft without a route is refused like one without approvers.
    pub async fn submit_attached(
        &self,
        draft: &mut DocumentDraft,
        comments: Option<&str>,
    ) -> Result<SubmittedDraft> {
        let steps = draft
            .attached_steps()?
            .ok_or_else(|| ApprovalError::Validation("select at least one approver".to_string()))?;

        let submitted = self.send(draft, &steps, comments).await?;

        draft.mark_submitted();
        Ok(submitted)
    }

    pub async fn relay(&self, document_id: &str, action: &ReviewerAction) -> Result<()> {
        match action {
            ReviewerAction::Approve { comment } => {
                self.reviews.approve(document_id, comment.as_deref()).await
            }
            ReviewerAction::Reject { comment } => {
                self.reviews.reject(document_id, comment.as_deref()).await
            }
            ReviewerAction::Comment { content } => {
                self.reviews.comment(document_id, content).await
            }
        }
    }

    async fn send(
        &self,
        draft: &DocumentDraft,
        steps: &StepList,
        comments: Option<&str>,
    ) -> Result<SubmittedDraft> {
        if draft.is_submitted() {
            return Err(ApprovalError::Transition(format!(
                "Draft {} was already submitted",
                draft.id
            )));
        }

        let comments = comments
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(self.routing.default_comment.as_str());
        let request = build_submit_request(steps, self.routing.non_approval_mode, comments)?;

        log::info!(
            "Submitting draft {} with {} route stages",
            draft.id,
            request.custom_route.len()
        );

        let submitted = self.submissions.submit_draft(&draft.id, &request).await?;

        log::info!("Draft {} submitted as {}", draft.id, submitted.id);
        Ok(submitted)
    }
}
