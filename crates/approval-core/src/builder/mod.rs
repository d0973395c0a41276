//! Interactive route construction
//!
//! A `RouteBuilder` is one editing session over one draft's route. It owns
//! its step list exclusively; only loading and template saving touch the
//! network. Dropping the builder cancels the session.

pub mod auto;

use crate::clients::{DirectoryProvider, RouteTemplateStore};
use crate::config::RoutingConfig;
use crate::directory::{Directory, OrganizationNode};
use crate::error::{ApprovalError, Result};
use crate::route::{
    ApprovalRoute, ApprovalStep, Direction, MemberId, StepChange, StepId, StepList,
};
use crate::templates::{
    fallback_steps, select_default, NewUserTemplate, RouteTemplate, UserTemplate,
};
use approval_types::{AdminTemplate, StepType};
use auto::generate_auto_steps;
pub use auto::{AutoFailure, AutoOutcome};
use std::fmt;

/// How the step list is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderMode {
    Template,
    Auto,
    Manual,
}

/// Recoverable condition the caller should show to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderNotice {
    DirectoryUnavailable(String),
    TemplatesUnavailable(String),
    DuplicateApprover { approver_name: String },
    AutoGenerationFailed(AutoFailure),
    TemplateFallbackApplied { template_name: String },
}

impl fmt::Display for BuilderNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryUnavailable(reason) => {
                write!(f, "Could not load the organization directory: {}", reason)
            }
            Self::TemplatesUnavailable(reason) => {
                write!(f, "Could not load approval templates: {}", reason)
            }
            Self::DuplicateApprover { approver_name } => {
                write!(f, "{} is already part of this route", approver_name)
            }
            Self::AutoGenerationFailed(reason) => write!(
                f,
                "Cannot auto-generate an approval route ({}); check the organizational hierarchy or missing superiors",
                reason
            ),
            Self::TemplateFallbackApplied { template_name } => write!(
                f,
                "Template '{}' has no usable steps, the default route was applied",
                template_name
            ),
        }
    }
}

/// Outcome of picking a candidate in manual mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Added(StepId),
    Removed(ApprovalStep),
    Unchanged,
}

pub struct RouteBuilder {
    requester: MemberId,
    directory: Directory,
    user_templates: Vec<UserTemplate>,
    admin_templates: Vec<AdminTemplate>,
    routing: RoutingConfig,
    mode: BuilderMode,
    applied_template: Option<String>,
    steps: StepList,
    notices: Vec<BuilderNotice>,
}

impl RouteBuilder {
    /// Open a session in template mode; a single default template is applied right away
    pub fn new(
        requester: MemberId,
        directory: Directory,
        user_templates: Vec<UserTemplate>,
        admin_templates: Vec<AdminTemplate>,
        routing: RoutingConfig,
    ) -> Self {
        let mut builder = Self {
            requester,
            directory,
            user_templates,
            admin_templates,
            routing,
            mode: BuilderMode::Template,
            applied_template: None,
            steps: StepList::new(),
            notices: Vec::new(),
        };
        builder.enter_template_mode();
        builder
    }

    /// Fetch directory and templates, then open a session.
    /// Fetch failures are reported as notices, never as errors.
    pub async fn load(
        requester: MemberId,
        directory_provider: &dyn DirectoryProvider,
        template_store: &dyn RouteTemplateStore,
        routing: RoutingConfig,
    ) -> Self {
        let mut notices = Vec::new();

        let directory = match directory_provider.get_users().await {
            Ok(users) => Directory::from_users(users),
            Err(e) => {
                log::warn!("Failed to load directory: {}", e);
                notices.push(BuilderNotice::DirectoryUnavailable(e.to_string()));
                Directory::default()
            }
        };

        let user_templates = match template_store.get_user_approval_routes().await {
            Ok(templates) => templates,
            Err(e) => {
                log::warn!("Failed to load user approval routes: {}", e);
                notices.push(BuilderNotice::TemplatesUnavailable(e.to_string()));
                Vec::new()
            }
        };

        let admin_templates = match template_store.get_admin_approval_templates().await {
            Ok(templates) => templates,
            Err(e) => {
                log::warn!("Failed to load admin approval templates: {}", e);
                notices.push(BuilderNotice::TemplatesUnavailable(e.to_string()));
                Vec::new()
            }
        };

        log::info!(
            "Loaded {} directory members, {} user templates, {} admin templates for {}",
            directory.members().len(),
            user_templates.len(),
            admin_templates.len(),
            requester
        );

        let mut builder = Self::new(
            requester,
            directory,
            user_templates,
            admin_templates,
            routing,
        );
        notices.append(&mut builder.notices);
        builder.notices = notices;
        builder
    }

    pub fn mode(&self) -> BuilderMode {
        self.mode
    }

    pub fn requester(&self) -> &MemberId {
        &self.requester
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn applied_template(&self) -> Option<&str> {
        self.applied_template.as_deref()
    }

    /// Every selectable template, user templates first
    pub fn templates(&self) -> Vec<RouteTemplate> {
        self.user_templates
            .iter()
            .cloned()
            .map(RouteTemplate::User)
            .chain(self.admin_templates.iter().cloned().map(RouteTemplate::Admin))
            .collect()
    }

    pub fn organization_tree(&self) -> Vec<OrganizationNode> {
        self.directory.organization_tree()
    }

    /// Drain pending notices
    pub fn take_notices(&mut self) -> Vec<BuilderNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Switch modes. The previous step list is always discarded.
    pub fn enter_mode(&mut self, mode: BuilderMode) {
        log::debug!("Route builder switching from {:?} to {:?}", self.mode, mode);

        match mode {
            BuilderMode::Template => self.enter_template_mode(),
            BuilderMode::Auto => {
                self.reset(BuilderMode::Auto);
                match generate_auto_steps(&self.requester, &self.directory, &self.routing) {
                    AutoOutcome::Generated(steps) => self.steps = steps,
                    AutoOutcome::Unavailable(reason) => {
                        self.notices.push(BuilderNotice::AutoGenerationFailed(reason));
                    }
                }
            }
            BuilderMode::Manual => self.reset(BuilderMode::Manual),
        }
    }

    /// Replace the steps with those of template `template_id`; switches to template mode
    pub fn apply_template(&mut self, template_id: &str) -> Result<()> {
        let template = self
            .templates()
            .into_iter()
            .find(|t| t.id() == template_id)
            .ok_or_else(|| ApprovalError::NotFound(format!("Template {}", template_id)))?;

        self.reset(BuilderMode::Template);
        self.apply(&template);
        Ok(())
    }

    /// Add a directory member with the chosen role (manual mode)
    pub fn add_candidate(&mut self, member_id: &MemberId, step_type: StepType) -> Result<StepChange> {
        self.require_manual("add a reviewer")?;

        let member = self
            .directory
            .find(member_id)
            .ok_or_else(|| ApprovalError::NotFound(format!("Directory member {}", member_id)))?;

        let change = self.steps.add_step(member, step_type);
        if change == StepChange::DuplicateApprover {
            self.notices.push(BuilderNotice::DuplicateApprover {
                approver_name: member.name.clone(),
            });
        }
        Ok(change)
    }

    /// Picker behavior: an unselected member is added with `step_type`, a
    /// selected one is removed again
    pub fn toggle_candidate(&mut self, member_id: &MemberId, step_type: StepType) -> Result<Selection> {
        self.require_manual("select a reviewer")?;

        if let Some(removed) = self.steps.remove_approver(member_id) {
            return Ok(Selection::Removed(removed));
        }

        match self.add_candidate(member_id, step_type)? {
            StepChange::Added(step_id) => Ok(Selection::Added(step_id)),
            StepChange::DuplicateApprover => Ok(Selection::Unchanged),
        }
    }

    pub fn remove_step(&mut self, step_id: &StepId) -> Result<Option<ApprovalStep>> {
        self.require_manual("remove a reviewer")?;
        Ok(self.steps.remove_step(step_id))
    }

    /// Nudge a step inside its type partition; false at the partition edge
    pub fn move_step(&mut self, step_id: &StepId, direction: Direction) -> Result<bool> {
        self.require_manual("reorder reviewers")?;
        Ok(self.steps.reorder(step_id, direction))
    }

    pub fn change_step_type(&mut self, step_id: &StepId, step_type: StepType) -> Result<bool> {
        self.require_manual("change a reviewer's role")?;
        Ok(self.steps.change_type(step_id, step_type))
    }

    pub fn can_save_as_template(&self) -> bool {
        self.mode == BuilderMode::Manual && !self.steps.is_empty()
    }

    /// Store the manual route as a new personal template
    pub async fn save_as_template(
        &self,
        name: &str,
        description: Option<&str>,
        store: &dyn RouteTemplateStore,
    ) -> Result<UserTemplate> {
        if !self.can_save_as_template() {
            return Err(ApprovalError::Validation(
                "Only a manual route with at least one reviewer can be saved as a template"
                    .to_string(),
            ));
        }

        let template = NewUserTemplate::from_steps(name, description, &self.steps)?;
        let saved = store.save_user_approval_route(&template).await?;

        log::info!("Saved approval route template '{}' ({})", saved.name, saved.id);
        Ok(saved)
    }

    pub fn is_submittable(&self) -> bool {
        self.steps.is_submittable()
    }

    /// The cooperation-then-approval sequence of the current steps
    pub fn final_order(&self) -> Vec<ApprovalStep> {
        self.steps.compute_final_order()
    }

    /// Close the session and hand out the route
    pub fn finalize(self) -> Result<ApprovalRoute> {
        if !self.steps.is_submittable() {
            return Err(ApprovalError::Validation(
                "select at least one approver".to_string(),
            ));
        }

        Ok(ApprovalRoute::new(self.requester, self.steps))
    }

    fn enter_template_mode(&mut self) {
        self.reset(BuilderMode::Template);

        if let Some(template) = select_default(&self.user_templates, &self.admin_templates) {
            log::info!("Applying default template '{}'", template.name());
            self.apply(&template);
        }
    }

    fn apply(&mut self, template: &RouteTemplate) {
        let mut steps = template.to_steps(&self.directory);

        if steps.is_empty() {
            log::warn!(
                "Template '{}' has no usable steps, falling back to the default route",
                template.name()
            );
            steps = fallback_steps(&self.directory);
            self.notices.push(BuilderNotice::TemplateFallbackApplied {
                template_name: template.name().to_string(),
            });
        }

        self.steps = steps;
        self.applied_template = Some(template.id().to_string());
    }

    fn reset(&mut self, mode: BuilderMode) {
        self.mode = mode;
        self.steps = StepList::new();
        self.applied_template = None;
    }

    fn require_manual(&self, action: &str) -> Result<()> {
        if self.mode != BuilderMode::Manual {
            return Err(ApprovalError::Transition(format!(
                "Cannot {} in {:?} mode, switch to manual mode first",
                action, self.mode
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryMember;
    use crate::templates::TemplateId;
    use approval_types::{AdminStage, AdminStageType, UserRole};

    fn member(id: &str, organization: &str, role: UserRole) -> DirectoryMember {
        DirectoryMember {
            id: MemberId::from(id),
            name: format!("name-{}", id),
            title: None,
            organization: Some(organization.to_string()),
            role,
        }
    }

    fn directory() -> Directory {
        Directory::new(vec![
            member("u1", "개발팀", UserRole::Employee),
            member("u2", "개발팀", UserRole::HrManager),
            member("u3", "HR팀", UserRole::HrManager),
            member("u4", "경영지원", UserRole::SuperAdmin),
        ])
    }

    fn builder(user_templates: Vec<UserTemplate>, admin_templates: Vec<AdminTemplate>) -> RouteBuilder {
        RouteBuilder::new(
            MemberId::from("u1"),
            directory(),
            user_templates,
            admin_templates,
            RoutingConfig::default(),
        )
    }

    fn empty_admin_template(is_default: bool) -> AdminTemplate {
        AdminTemplate {
            id: "admin-empty".to_string(),
            name: "빈 템플릿".to_string(),
            description: None,
            is_default,
            stages: vec![AdminStage {
                stage_type: AdminStageType::Approval,
                order_index: 0,
                approvers: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_opens_in_template_mode_without_defaults() {
        let builder = builder(Vec::new(), Vec::new());

        assert_eq!(builder.mode(), BuilderMode::Template);
        assert!(builder.steps().is_empty());
        assert!(builder.applied_template().is_none());
    }

    #[test]
    fn test_default_template_applied_on_entry() {
        let mut steps = StepList::new();
        steps.add_step(&member("u4", "경영지원", UserRole::SuperAdmin), StepType::Approval);
        let template = UserTemplate {
            id: TemplateId::from("mine"),
            name: "내 결재선".to_string(),
            description: None,
            is_default: true,
            steps: steps.into_steps(),
        };

        let builder = builder(vec![template], Vec::new());

        assert_eq!(builder.applied_template(), Some("mine"));
        assert!(builder.is_submittable());
    }

    #[test]
    fn test_empty_admin_template_falls_back() {
        let mut builder = builder(Vec::new(), vec![empty_admin_template(true)]);

        let cooperation = builder.steps().of_type(StepType::Cooperation);
        let approval = builder.steps().of_type(StepType::Approval);
        assert_eq!(cooperation.len(), 1);
        assert_eq!(cooperation[0].approver_id.as_str(), "u2");
        assert_eq!(approval.len(), 1);
        assert_eq!(approval[0].approver_id.as_str(), "u4");

        let notices = builder.take_notices();
        assert!(matches!(
            notices.as_slice(),
            [BuilderNotice::TemplateFallbackApplied { .. }]
        ));
        assert!(builder.take_notices().is_empty());
    }

    #[test]
    fn test_apply_unknown_template() {
        let mut builder = builder(Vec::new(), Vec::new());

        let err = builder.apply_template("missing").unwrap_err();
        assert!(matches!(err, ApprovalError::NotFound(_)));
    }

    #[test]
    fn test_manual_mode_clears_steps() {
        let mut builder = builder(Vec::new(), vec![empty_admin_template(true)]);
        assert!(!builder.steps().is_empty());

        builder.enter_mode(BuilderMode::Manual);

        assert_eq!(builder.mode(), BuilderMode::Manual);
        assert!(builder.steps().is_empty());
    }

    #[test]
    fn test_editing_requires_manual_mode() {
        let mut builder = builder(Vec::new(), Vec::new());

        let err = builder
            .add_candidate(&MemberId::from("u2"), StepType::Approval)
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Transition(_)));
    }

    #[test]
    fn test_toggle_candidate_adds_then_removes() {
        let mut builder = builder(Vec::new(), Vec::new());
        builder.enter_mode(BuilderMode::Manual);

        let first = builder
            .toggle_candidate(&MemberId::from("u2"), StepType::Cooperation)
            .unwrap();
        assert!(matches!(first, Selection::Added(_)));

        let second = builder
            .toggle_candidate(&MemberId::from("u2"), StepType::Approval)
            .unwrap();
        assert!(matches!(second, Selection::Removed(ref step) if step.approver_id.as_str() == "u2"));
        assert!(builder.steps().is_empty());
    }

    #[test]
    fn test_duplicate_candidate_raises_notice() {
        let mut builder = builder(Vec::new(), Vec::new());
        builder.enter_mode(BuilderMode::Manual);
        builder
            .add_candidate(&MemberId::from("u3"), StepType::Approval)
            .unwrap();

        let change = builder
            .add_candidate(&MemberId::from("u3"), StepType::Reference)
            .unwrap();

        assert_eq!(change, StepChange::DuplicateApprover);
        assert_eq!(builder.steps().len(), 1);
        assert_eq!(
            builder.take_notices(),
            vec![BuilderNotice::DuplicateApprover {
                approver_name: "name-u3".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_candidate() {
        let mut builder = builder(Vec::new(), Vec::new());
        builder.enter_mode(BuilderMode::Manual);

        let err = builder
            .add_candidate(&MemberId::from("ghost"), StepType::Approval)
            .unwrap_err();
        assert!(matches!(err, ApprovalError::NotFound(_)));
    }

    #[test]
    fn test_auto_mode_failure_leaves_steps_empty() {
        let mut builder = RouteBuilder::new(
            MemberId::from("stranger"),
            directory(),
            Vec::new(),
            Vec::new(),
            RoutingConfig::default(),
        );

        builder.enter_mode(BuilderMode::Auto);

        assert!(builder.steps().is_empty());
        assert!(!builder.is_submittable());
        assert_eq!(
            builder.take_notices(),
            vec![BuilderNotice::AutoGenerationFailed(
                AutoFailure::RequesterNotInDirectory
            )]
        );
    }

    #[test]
    fn test_finalize_requires_approver() {
        let mut builder = builder(Vec::new(), Vec::new());
        builder.enter_mode(BuilderMode::Manual);
        builder
            .add_candidate(&MemberId::from("u2"), StepType::Cooperation)
            .unwrap();

        let err = builder.finalize().unwrap_err();
        assert!(err.to_string().contains("select at least one approver"));
    }

    #[test]
    fn test_finalize_returns_owned_route() {
        let mut builder = builder(Vec::new(), Vec::new());
        builder.enter_mode(BuilderMode::Auto);

        let route = builder.finalize().unwrap();

        assert_eq!(route.user_id.as_str(), "u1");
        assert!(route.is_active);
        assert!(route.is_submittable());
    }

    #[test]
    fn test_notice_messages() {
        let notice = BuilderNotice::AutoGenerationFailed(AutoFailure::NoHierarchy);
        assert!(notice.to_string().contains("check the organizational hierarchy"));
    }
}
