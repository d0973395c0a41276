//! Stage-by-stage progression of a submitted route
//!
//! Stages follow the final order: cooperation reviewers first, then
//! approvers. Cooperation is advisory, so a cooperation reject is recorded
//! as dissent and the route moves on; an approver's reject ends the route.

use crate::error::{ApprovalError, Result};
use crate::route::{ApprovalRoute, ApprovalStep, MemberId};
use approval_types::StepType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressState {
    InProgress,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Waiting,
    Current,
    Approved,
    /// Cooperation reviewer disagreed; does not block
    Dissented,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewerAction {
    Approve { comment: Option<String> },
    Reject { comment: Option<String> },
    Comment { content: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub step: ApprovalStep,
    pub status: StageStatus,
    pub comment: Option<String>,
    pub acted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    pub author: MemberId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProgress {
    stages: Vec<StageProgress>,
    /// Reference, reception and circulation reviewers
    notified: Vec<ApprovalStep>,
    current: usize,
    state: ProgressState,
    comments: Vec<ReviewComment>,
    updated_at: DateTime<Utc>,
}

impl RouteProgress {
    /// Begin progression with the first stage current
    pub fn start(route: &ApprovalRoute) -> Result<Self> {
        if !route.is_submittable() {
            return Err(ApprovalError::Validation(
                "select at least one approver".to_string(),
            ));
        }

        let mut stages: Vec<StageProgress> = route
            .steps
            .compute_final_order()
            .into_iter()
            .map(|step| StageProgress {
                step,
                status: StageStatus::Waiting,
                comment: None,
                acted_at: None,
            })
            .collect();
        stages[0].status = StageStatus::Current;

        let notified = route
            .steps
            .iter()
            .filter(|s| !s.step_type.gates_progress())
            .cloned()
            .collect();

        Ok(Self {
            stages,
            notified,
            current: 0,
            state: ProgressState::InProgress,
            comments: Vec::new(),
            updated_at: Utc::now(),
        })
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn stages(&self) -> &[StageProgress] {
        &self.stages
    }

    pub fn notified(&self) -> &[ApprovalStep] {
        &self.notified
    }

    pub fn comments(&self) -> &[ReviewComment] {
        &self.comments
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stage waiting for a decision, `None` once the route is closed
    pub fn current_stage(&self) -> Option<&StageProgress> {
        match self.state {
            ProgressState::InProgress => self.stages.get(self.current),
            _ => None,
        }
    }

    pub fn apply(&mut self, actor: &MemberId, action: ReviewerAction) -> Result<ProgressState> {
        if self.state != ProgressState::InProgress {
            return Err(ApprovalError::Transition(format!(
                "Route is already {:?}, no further actions accepted",
                self.state
            )));
        }

        match action {
            ReviewerAction::Comment { content } => self.add_comment(actor, content)?,
            ReviewerAction::Approve { comment } => self.decide(actor, true, comment)?,
            ReviewerAction::Reject { comment } => self.decide(actor, false, comment)?,
        }

        self.updated_at = Utc::now();
        Ok(self.state)
    }

    fn add_comment(&mut self, actor: &MemberId, content: String) -> Result<()> {
        let participant = self.stages.iter().any(|s| &s.step.approver_id == actor)
            || self.notified.iter().any(|s| &s.approver_id == actor);
        if !participant {
            return Err(ApprovalError::Transition(format!(
                "{} is not part of this route and cannot comment",
                actor
            )));
        }

        if content.trim().is_empty() {
            return Err(ApprovalError::Validation("Comment must not be empty".to_string()));
        }

        self.comments.push(ReviewComment {
            author: actor.clone(),
            content,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn decide(&mut self, actor: &MemberId, approve: bool, comment: Option<String>) -> Result<()> {
        let stage = &mut self.stages[self.current];
        if &stage.step.approver_id != actor {
            return Err(ApprovalError::Transition(format!(
                "It is {}'s turn, {} cannot act on this route now",
                stage.step.approver_id, actor
            )));
        }

        let step_type = stage.step.step_type;
        stage.comment = comment;
        stage.acted_at = Some(Utc::now());
        stage.status = match (approve, step_type) {
            (true, _) => StageStatus::Approved,
            (false, StepType::Cooperation) => StageStatus::Dissented,
            (false, _) => StageStatus::Rejected,
        };

        log::info!(
            "Stage {} ({}) resolved by {} as {:?}",
            self.current + 1,
            step_type,
            actor,
            stage.status
        );

        if stage.status == StageStatus::Rejected {
            self.state = ProgressState::Rejected;
            return Ok(());
        }

        self.current += 1;
        match self.stages.get_mut(self.current) {
            Some(next) => next.status = StageStatus::Current,
            None => self.state = ProgressState::Approved,
        }
        Ok(())
    }
}
