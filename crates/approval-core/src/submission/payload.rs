//! Route → backend stage mapping

use crate::error::{ApprovalError, Result};
use crate::route::{ApprovalStep, StepList};
use approval_types::{
    ApprovalRule, CustomRoute, RouteApprover, StageMode, StepType, SubmitDraftRequest,
};

/// One backend stage per step, never merged by type.
///
/// Stages come in execution order (cooperation then approval), followed by
/// the notify-only types. Approval stages are sequential; every other type
/// uses `non_approval_mode`.
pub fn to_submission_payload(steps: &StepList, non_approval_mode: StageMode) -> Vec<CustomRoute> {
    let notify_only = [
        StepType::Reference,
        StepType::Reception,
        StepType::Circulation,
    ];

    let sequence = steps.compute_final_order();
    let notified = notify_only
        .iter()
        .flat_map(|step_type| steps.of_type(*step_type))
        .cloned();

    sequence
        .into_iter()
        .chain(notified)
        .map(|step| custom_route(&step, non_approval_mode))
        .collect()
}

fn custom_route(step: &ApprovalStep, non_approval_mode: StageMode) -> CustomRoute {
    let mode = match step.step_type {
        StepType::Approval => StageMode::Sequential,
        _ => non_approval_mode,
    };

    CustomRoute {
        step_type: step.step_type,
        mode,
        rule: ApprovalRule::All,
        name: step.step_type.label().to_string(),
        approvers: vec![RouteApprover {
            user_id: step.approver_id.to_string(),
            is_required: step.is_required,
        }],
    }
}

/// Full submission body; refuses routes without an approval step
pub fn build_submit_request(
    steps: &StepList,
    non_approval_mode: StageMode,
    comments: &str,
) -> Result<SubmitDraftRequest> {
    if !steps.is_submittable() {
        return Err(ApprovalError::Validation(
            "select at least one approver".to_string(),
        ));
    }

    Ok(SubmitDraftRequest {
        custom_route: to_submission_payload(steps, non_approval_mode),
        comments: comments.to_string(),
    })
}
