//! Approval step model

pub mod step;
pub mod step_list;

pub use step::{ApprovalRoute, ApprovalStep, MemberId, RouteId, StepId};
pub use step_list::{Direction, StepChange, StepList};
