//! Route templates
//!
//! User templates store flat steps, admin templates store typed stages in
//! their own vocabulary. `RouteTemplate::to_steps` is the only place the two
//! shapes are turned into a step list.

use crate::directory::{Directory, DirectoryMember};
use crate::error::{ApprovalError, Result};
use crate::route::{ApprovalStep, MemberId, StepList};
use approval_types::{AdminTemplate, StepType, UserRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly typed TemplateId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Personal template saved by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub steps: Vec<ApprovalStep>,
}

/// Body of a "save as template" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<ApprovalStep>,
    pub is_default: bool,
}

impl NewUserTemplate {
    /// Package the current steps; never marked default
    pub fn from_steps(name: &str, description: Option<&str>, steps: &StepList) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApprovalError::Validation(
                "Template name is required".to_string(),
            ));
        }

        if steps.is_empty() {
            return Err(ApprovalError::Validation(
                "Cannot save a template without steps".to_string(),
            ));
        }

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            description,
            steps: steps.steps().to_vec(),
            is_default: false,
        })
    }
}

/// Either template shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTemplate {
    User(UserTemplate),
    Admin(AdminTemplate),
}

impl RouteTemplate {
    pub fn id(&self) -> &str {
        match self {
            Self::User(t) => t.id.as_str(),
            Self::Admin(t) => &t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::User(t) => &t.name,
            Self::Admin(t) => &t.name,
        }
    }

    pub fn is_default(&self) -> bool {
        match self {
            Self::User(t) => t.is_default,
            Self::Admin(t) => t.is_default,
        }
    }

    /// Fresh step list for a new draft. May be empty when nothing in the
    /// template can be routed.
    pub fn to_steps(&self, directory: &Directory) -> StepList {
        match self {
            Self::User(t) => user_template_steps(t),
            Self::Admin(t) => admin_template_steps(t, directory),
        }
    }
}

fn user_template_steps(template: &UserTemplate) -> StepList {
    let mut steps = StepList::from_steps(
        template.steps.iter().map(ApprovalStep::with_new_id).collect(),
    );
    let dropped = steps.dedup_approvers();
    if dropped > 0 {
        log::debug!(
            "User template {} assigns {} approver(s) twice, keeping the first step",
            template.id,
            dropped
        );
    }
    steps.normalize();
    steps
}

fn admin_template_steps(template: &AdminTemplate, directory: &Directory) -> StepList {
    let mut ranked: Vec<((u32, u32), ApprovalStep)> = Vec::new();

    for stage in &template.stages {
        let Some(step_type) = stage.stage_type.to_step_type() else {
            log::warn!(
                "Skipping stage {} of admin template {}: unsupported stage type",
                stage.order_index,
                template.id
            );
            continue;
        };

        for approver in &stage.approvers {
            let approver_id = MemberId::new(approver.user_id.clone());
            let member = match directory.find(&approver_id) {
                Some(member) => member.clone(),
                None => match &approver.user {
                    Some(user) => DirectoryMember {
                        id: approver_id,
                        name: user.name.clone(),
                        title: user.title.clone(),
                        organization: user.department.clone(),
                        role: UserRole::Unknown,
                    },
                    None => {
                        log::warn!(
                            "Skipping approver {} of admin template {}: not in directory",
                            approver.user_id,
                            template.id
                        );
                        continue;
                    }
                },
            };

            // (stage, approver) rank; a flat `stage * 100 + approver` key would
            // interleave stages once a stage holds 100 approvers
            let rank = (stage.order_index, approver.order_index);
            ranked.push((rank, ApprovalStep::for_member(&member, step_type, 0)));
        }
    }

    ranked.sort_by_key(|(rank, _)| *rank);

    let flat: Vec<ApprovalStep> = ranked
        .into_iter()
        .enumerate()
        .map(|(position, (_, step))| ApprovalStep {
            order: position as u32 + 1,
            ..step
        })
        .collect();

    // earlier stage wins for an approver listed twice
    let mut steps = StepList::from_steps(flat);
    if steps.dedup_approvers() > 0 {
        log::debug!(
            "Admin template {} lists an approver more than once",
            template.id
        );
    }
    steps.normalize();
    steps
}

/// Route used when a chosen template yields nothing: an HR manager
/// cooperating and a super admin approving, each only if present
pub fn fallback_steps(directory: &Directory) -> StepList {
    let mut steps = StepList::new();

    if let Some(manager) = directory.first_with_role(UserRole::HrManager) {
        steps.add_step(manager, StepType::Cooperation);
    }

    if let Some(admin) = directory.first_with_role(UserRole::SuperAdmin) {
        steps.add_step(admin, StepType::Approval);
    }

    steps
}

/// The template to auto-apply: only when exactly one template across both
/// scopes is marked default
pub fn select_default(
    user_templates: &[UserTemplate],
    admin_templates: &[AdminTemplate],
) -> Option<RouteTemplate> {
    let mut defaults = user_templates
        .iter()
        .filter(|t| t.is_default)
        .map(|t| RouteTemplate::User(t.clone()))
        .chain(
            admin_templates
                .iter()
                .filter(|t| t.is_default)
                .map(|t| RouteTemplate::Admin(t.clone())),
        );

    let first = defaults.next()?;
    if defaults.next().is_some() {
        log::info!("Several default templates found, none applied automatically");
        return None;
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_types::{AdminApprover, AdminApproverUser, AdminStage, AdminStageType};

    fn member(id: &str, role: UserRole) -> DirectoryMember {
        DirectoryMember {
            id: MemberId::from(id),
            name: format!("name-{}", id),
            title: Some("과장".to_string()),
            organization: Some("HR팀".to_string()),
            role,
        }
    }

    fn approver(id: &str, order_index: u32) -> AdminApprover {
        AdminApprover {
            user_id: id.to_string(),
            order_index,
            user: None,
        }
    }

    fn admin_template(stages: Vec<AdminStage>) -> AdminTemplate {
        AdminTemplate {
            id: "admin-1".to_string(),
            name: "기본 결재선".to_string(),
            description: None,
            is_default: false,
            stages,
        }
    }

    fn user_template(id: &str, is_default: bool) -> UserTemplate {
        UserTemplate {
            id: TemplateId::from(id),
            name: id.to_string(),
            description: None,
            is_default,
            steps: Vec::new(),
        }
    }

    #[test]
    fn test_user_template_clone_gets_new_ids() {
        let directory = Directory::default();
        let mut source = StepList::new();
        source.add_step(&member("u1", UserRole::HrManager), StepType::Cooperation);
        source.add_step(&member("u2", UserRole::SuperAdmin), StepType::Approval);
        let template = RouteTemplate::User(UserTemplate {
            steps: source.steps().to_vec(),
            ..user_template("t1", false)
        });

        let cloned = template.to_steps(&directory);

        assert_eq!(cloned.len(), 2);
        for (copy, original) in cloned.iter().zip(source.iter()) {
            assert_ne!(copy.id, original.id);
            assert_eq!(copy.order, original.order);
            assert_eq!(copy.step_type, original.step_type);
            assert_eq!(copy.approver_id, original.approver_id);
        }
    }

    #[test]
    fn test_user_template_keeps_first_step_of_repeated_approver() {
        let dup = member("dup", UserRole::HrManager);
        let template = RouteTemplate::User(UserTemplate {
            steps: vec![
                ApprovalStep::for_member(&dup, StepType::Cooperation, 1),
                ApprovalStep::for_member(&dup, StepType::Approval, 1),
                ApprovalStep::for_member(&member("boss", UserRole::SuperAdmin), StepType::Approval, 2),
            ],
            ..user_template("t1", false)
        });

        let steps = template.to_steps(&Directory::default());

        let approvers: Vec<(&str, StepType, u32)> = steps
            .iter()
            .map(|s| (s.approver_id.as_str(), s.step_type, s.order))
            .collect();
        assert_eq!(
            approvers,
            vec![
                ("dup", StepType::Cooperation, 1),
                ("boss", StepType::Approval, 1),
            ]
        );
    }

    #[test]
    fn test_admin_expansion_maps_vocabulary() {
        let directory = Directory::new(vec![
            member("a", UserRole::HrManager),
            member("b", UserRole::SuperAdmin),
            member("c", UserRole::Employee),
        ]);
        let template = RouteTemplate::Admin(admin_template(vec![
            AdminStage {
                stage_type: AdminStageType::Consent,
                order_index: 0,
                approvers: vec![approver("a", 0)],
            },
            AdminStage {
                stage_type: AdminStageType::Approval,
                order_index: 1,
                approvers: vec![approver("b", 0)],
            },
            AdminStage {
                stage_type: AdminStageType::Cc,
                order_index: 2,
                approvers: vec![approver("c", 0)],
            },
        ]));

        let steps = template.to_steps(&directory);

        let types: Vec<StepType> = steps.iter().map(|s| s.step_type).collect();
        assert_eq!(
            types,
            vec![StepType::Cooperation, StepType::Approval, StepType::Reference]
        );
        assert!(steps.iter().all(|s| s.order == 1));
        assert_eq!(steps.steps()[0].approver_title.as_deref(), Some("과장"));
    }

    #[test]
    fn test_admin_expansion_is_stage_order_preserving() {
        let approvers_stage0: Vec<AdminApprover> =
            (0..150).map(|i| approver(&format!("s0-{}", i), i)).collect();
        let mut members: Vec<DirectoryMember> = (0..150)
            .map(|i| member(&format!("s0-{}", i), UserRole::Employee))
            .collect();
        members.push(member("s1-0", UserRole::Employee));
        let directory = Directory::new(members);

        // stage 1 listed first on purpose
        let template = RouteTemplate::Admin(admin_template(vec![
            AdminStage {
                stage_type: AdminStageType::Approval,
                order_index: 1,
                approvers: vec![approver("s1-0", 0)],
            },
            AdminStage {
                stage_type: AdminStageType::Approval,
                order_index: 0,
                approvers: approvers_stage0,
            },
        ]));

        let steps = template.to_steps(&directory);
        let sequence = steps.of_type(StepType::Approval);

        assert_eq!(sequence.len(), 151);
        assert_eq!(sequence.last().unwrap().approver_id.as_str(), "s1-0");
        assert_eq!(sequence[0].approver_id.as_str(), "s0-0");
        let orders: Vec<u32> = sequence.iter().map(|s| s.order).collect();
        assert_eq!(orders, (1..=151).collect::<Vec<u32>>());
    }

    #[test]
    fn test_admin_expansion_uses_embedded_user_when_not_in_directory() {
        let template = RouteTemplate::Admin(admin_template(vec![AdminStage {
            stage_type: AdminStageType::Approval,
            order_index: 0,
            approvers: vec![
                AdminApprover {
                    user_id: "ghost".to_string(),
                    order_index: 0,
                    user: Some(AdminApproverUser {
                        name: "유령".to_string(),
                        title: None,
                        department: Some("총무팀".to_string()),
                    }),
                },
                approver("missing", 1),
            ],
        }]));

        let steps = template.to_steps(&Directory::default());

        assert_eq!(steps.len(), 1);
        assert_eq!(steps.steps()[0].approver_name, "유령");
        assert_eq!(steps.steps()[0].organization_name.as_deref(), Some("총무팀"));
    }

    #[test]
    fn test_admin_expansion_skips_unknown_stage_and_duplicates() {
        let directory = Directory::new(vec![member("a", UserRole::HrManager)]);
        let template = RouteTemplate::Admin(admin_template(vec![
            AdminStage {
                stage_type: AdminStageType::Unknown,
                order_index: 0,
                approvers: vec![approver("a", 0)],
            },
            AdminStage {
                stage_type: AdminStageType::Consent,
                order_index: 1,
                approvers: vec![approver("a", 0)],
            },
            AdminStage {
                stage_type: AdminStageType::Approval,
                order_index: 2,
                approvers: vec![approver("a", 0)],
            },
        ]));

        let steps = template.to_steps(&directory);

        assert_eq!(steps.len(), 1);
        assert_eq!(steps.steps()[0].step_type, StepType::Cooperation);
    }

    #[test]
    fn test_fallback_steps() {
        let directory = Directory::new(vec![
            member("e", UserRole::Employee),
            member("hr", UserRole::HrManager),
            member("boss", UserRole::SuperAdmin),
        ]);

        let steps = fallback_steps(&directory);

        assert_eq!(steps.of_type(StepType::Cooperation)[0].approver_id.as_str(), "hr");
        assert_eq!(steps.of_type(StepType::Approval)[0].approver_id.as_str(), "boss");

        let empty = fallback_steps(&Directory::new(vec![member("e", UserRole::Employee)]));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_select_default_requires_exactly_one() {
        let mut admin = admin_template(Vec::new());
        admin.is_default = true;

        let only_user = select_default(&[user_template("t1", true)], &[]);
        assert_eq!(only_user.map(|t| t.id().to_string()), Some("t1".to_string()));

        let only_admin = select_default(&[user_template("t1", false)], &[admin.clone()]);
        assert_eq!(only_admin.map(|t| t.id().to_string()), Some("admin-1".to_string()));

        assert!(select_default(&[user_template("t1", true)], &[admin]).is_none());
        assert!(select_default(&[user_template("t1", false)], &[]).is_none());
    }

    #[test]
    fn test_new_template_requires_name() {
        let mut steps = StepList::new();
        steps.add_step(&member("a", UserRole::SuperAdmin), StepType::Approval);

        let err = NewUserTemplate::from_steps("  ", None, &steps).unwrap_err();
        assert!(matches!(err, ApprovalError::Validation(_)));

        let template = NewUserTemplate::from_steps(" 내 결재선 ", Some(""), &steps).unwrap();
        assert_eq!(template.name, "내 결재선");
        assert!(template.description.is_none());
        assert!(!template.is_default);
        assert_eq!(template.steps.len(), 1);
    }
}
