//! Automatic route generation from the requester's place in the directory

use crate::config::RoutingConfig;
use crate::directory::{Directory, DirectoryMember};
use crate::route::{MemberId, StepList};
use approval_types::{StepType, UserRole};
use std::fmt;

/// Why no route could be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFailure {
    RequesterNotInDirectory,
    NoHierarchy,
}

impl fmt::Display for AutoFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequesterNotInDirectory => write!(f, "requester not found in directory"),
            Self::NoHierarchy => write!(f, "no superiors found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoOutcome {
    Generated(StepList),
    Unavailable(AutoFailure),
}

impl AutoOutcome {
    /// Generated steps, empty when generation failed
    pub fn into_steps(self) -> StepList {
        match self {
            Self::Generated(steps) => steps,
            Self::Unavailable(_) => StepList::new(),
        }
    }
}

/// Walk the directory around `requester` and assemble a route:
///
/// 1. first HR manager of the requester's organization cooperates
/// 2. the remaining HR managers of that organization approve, in directory order
/// 3. the HR organization's manager approves when the requester sits elsewhere
/// 4. a super admin approves last
/// 5. up to `max_auto_references` HR employees are referenced when the requester sits elsewhere
///
/// The requester never reviews their own document.
pub fn generate_auto_steps(
    requester: &MemberId,
    directory: &Directory,
    routing: &RoutingConfig,
) -> AutoOutcome {
    let Some(requester) = directory.find(requester) else {
        log::warn!("Cannot auto-generate route: {} is not in the directory", requester);
        return AutoOutcome::Unavailable(AutoFailure::RequesterNotInDirectory);
    };

    let hr_organization = routing.hr_organization.as_str();
    let outside_hr = !requester.belongs_to(hr_organization);
    let others: Vec<&DirectoryMember> = directory
        .members()
        .iter()
        .filter(|m| m.id != requester.id)
        .collect();
    let mut steps = StepList::new();

    if let Some(organization) = requester.organization.as_deref() {
        let managers: Vec<&DirectoryMember> = others
            .iter()
            .copied()
            .filter(|m| m.role == UserRole::HrManager && m.belongs_to(organization))
            .collect();

        if let Some((first, rest)) = managers.split_first() {
            steps.add_step(first, StepType::Cooperation);
            for manager in rest {
                steps.add_step(manager, StepType::Approval);
            }
        }
    }

    if outside_hr {
        let hr_manager = others.iter().copied().find(|m| {
            m.role == UserRole::HrManager
                && m.belongs_to(hr_organization)
                && !steps.contains_approver(&m.id)
        });
        if let Some(manager) = hr_manager {
            steps.add_step(manager, StepType::Approval);
        }
    }

    let admin = others
        .iter()
        .copied()
        .find(|m| m.role == UserRole::SuperAdmin && !steps.contains_approver(&m.id));
    if let Some(admin) = admin {
        steps.add_step(admin, StepType::Approval);
    }

    if outside_hr {
        let references: Vec<&DirectoryMember> = others
            .iter()
            .copied()
            .filter(|m| {
                m.role == UserRole::Employee
                    && m.belongs_to(hr_organization)
                    && !steps.contains_approver(&m.id)
            })
            .take(routing.max_auto_references)
            .collect();
        for member in references {
            steps.add_step(member, StepType::Reference);
        }
    }

    if steps.is_empty() {
        log::warn!(
            "Cannot auto-generate route for {}: no superiors found in the hierarchy",
            requester.id
        );
        return AutoOutcome::Unavailable(AutoFailure::NoHierarchy);
    }

    log::info!(
        "Auto-generated route for {} with {} steps",
        requester.id,
        steps.len()
    );
    AutoOutcome::Generated(steps)
}
