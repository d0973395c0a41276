//! Shared wire types for the approval routing workspace
//!
//! Everything here mirrors what the HR backend sends or expects. Directory
//! users and admin templates keep the backend's snake_case field names,
//! submission bodies are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reviewer role inside a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// 협조
    Cooperation,
    /// 결재
    Approval,
    /// 참조
    Reference,
    /// 수신
    Reception,
    /// 공람
    Circulation,
}

impl StepType {
    pub const ALL: [StepType; 5] = [
        StepType::Cooperation,
        StepType::Approval,
        StepType::Reference,
        StepType::Reception,
        StepType::Circulation,
    ];

    /// Localized label used as the backend stage name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cooperation => "협조",
            Self::Approval => "결재",
            Self::Reference => "참조",
            Self::Reception => "수신",
            Self::Circulation => "공람",
        }
    }

    pub fn is_required_by_default(&self) -> bool {
        matches!(self, Self::Approval)
    }

    /// Cooperation and approval steps form the executed sequence; the rest only notify
    pub fn gates_progress(&self) -> bool {
        matches!(self, Self::Cooperation | Self::Approval)
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cooperation => "COOPERATION",
            Self::Approval => "APPROVAL",
            Self::Reference => "REFERENCE",
            Self::Reception => "RECEPTION",
            Self::Circulation => "CIRCULATION",
        };
        write!(f, "{}", name)
    }
}

/// Directory role as reported by the user endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    HrManager,
    Employee,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(default)]
    pub department: Option<String>,
}

/// One entry of `GET /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub role: UserRole,
    #[serde(default, alias = "employeeProfile")]
    pub employee_profile: Option<EmployeeProfile>,
}

impl DirectoryUser {
    pub fn department(&self) -> Option<&str> {
        self.employee_profile
            .as_ref()
            .and_then(|p| p.department.as_deref())
    }
}

/// Stage vocabulary used by admin-wide templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStageType {
    Consent,
    Approval,
    Cc,
    #[serde(other)]
    Unknown,
}

impl AdminStageType {
    /// Translate into the step vocabulary; `None` for stage types we cannot route
    pub fn to_step_type(&self) -> Option<StepType> {
        match self {
            Self::Consent => Some(StepType::Cooperation),
            Self::Approval => Some(StepType::Approval),
            Self::Cc => Some(StepType::Reference),
            Self::Unknown => None,
        }
    }
}

/// Reviewer snapshot embedded in an admin template approver, when the backend joins it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminApproverUser {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminApprover {
    pub user_id: String,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub user: Option<AdminApproverUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStage {
    #[serde(rename = "type")]
    pub stage_type: AdminStageType,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub approvers: Vec<AdminApprover>,
}

/// Admin-wide route template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
    #[serde(default)]
    pub stages: Vec<AdminStage>,
}

/// How the approvers of one backend stage are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageMode {
    Sequential,
    Parallel,
    All,
}

/// Completion rule of a backend stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalRule {
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteApprover {
    pub user_id: String,
    pub is_required: bool,
}

/// One backend stage of a submitted route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRoute {
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub mode: StageMode,
    pub rule: ApprovalRule,
    pub name: String,
    pub approvers: Vec<RouteApprover>,
}

/// Body of `POST /approval/drafts/{id}/submit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDraftRequest {
    pub custom_route: Vec<CustomRoute>,
    pub comments: String,
}

/// Backend answer to a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedDraft {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Body of the approve and reject endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecisionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of the comment endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}
