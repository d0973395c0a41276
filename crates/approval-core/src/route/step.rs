//! Strongly typed route data
//! Steps carry a denormalized snapshot of their reviewer

use super::step_list::StepList;
use crate::directory::DirectoryMember;
use approval_types::StepType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly typed StepId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed RouteId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RouteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directory member id, as issued by the user service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reviewer assignment within a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    pub id: StepId,
    /// 1-based position inside the step's type group
    pub order: u32,
    pub approver_id: MemberId,
    pub approver_name: String,
    #[serde(default)]
    pub approver_title: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub is_required: bool,
    /// Position in the cooperation-then-approval sequence, set by `StepList::compute_final_order`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_order: Option<u32>,
}

impl ApprovalStep {
    /// Snapshot a directory member into a new step
    pub fn for_member(member: &DirectoryMember, step_type: StepType, order: u32) -> Self {
        Self {
            id: StepId::new(),
            order,
            approver_id: member.id.clone(),
            approver_name: member.name.clone(),
            approver_title: member.title.clone(),
            organization_name: member.organization.clone(),
            step_type,
            is_required: step_type.is_required_by_default(),
            final_order: None,
        }
    }

    /// Copy of this step under a fresh id, used when cloning templates
    pub fn with_new_id(&self) -> Self {
        Self {
            id: StepId::new(),
            final_order: None,
            ..self.clone()
        }
    }
}

/// Route attached to one document owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRoute {
    pub id: RouteId,
    pub user_id: MemberId,
    pub steps: StepList,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApprovalRoute {
    pub fn new(user_id: MemberId, steps: StepList) -> Self {
        let now = Utc::now();

        Self {
            id: RouteId::new(),
            user_id,
            steps,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_submittable(&self) -> bool {
        self.steps.is_submittable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_types::UserRole;

    fn member() -> DirectoryMember {
        DirectoryMember {
            id: MemberId::from("u1"),
            name: "박민수".to_string(),
            title: Some("대리".to_string()),
            organization: Some("개발팀".to_string()),
            role: UserRole::Employee,
        }
    }

    #[test]
    fn test_step_snapshot_from_member() {
        let step = ApprovalStep::for_member(&member(), StepType::Approval, 1);

        assert_eq!(step.approver_id.as_str(), "u1");
        assert_eq!(step.approver_name, "박민수");
        assert_eq!(step.organization_name.as_deref(), Some("개발팀"));
        assert!(step.is_required);
        assert!(step.final_order.is_none());

        let reference = ApprovalStep::for_member(&member(), StepType::Reference, 1);
        assert!(!reference.is_required);
    }

    #[test]
    fn test_step_wire_format() {
        let step = ApprovalStep::for_member(&member(), StepType::Cooperation, 2);
        let value = serde_json::to_value(&step).unwrap();

        assert_eq!(value["type"], "COOPERATION");
        assert_eq!(value["order"], 2);
        assert_eq!(value["approverId"], "u1");
        assert_eq!(value["isRequired"], false);
        assert!(value.get("finalOrder").is_none());
    }

    #[test]
    fn test_with_new_id_keeps_assignment() {
        let step = ApprovalStep::for_member(&member(), StepType::Approval, 3);
        let copy = step.with_new_id();

        assert_ne!(copy.id, step.id);
        assert_eq!(copy.order, 3);
        assert_eq!(copy.approver_id, step.approver_id);
        assert_eq!(copy.step_type, StepType::Approval);
    }
}
