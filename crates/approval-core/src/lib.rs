//! Approval Core Library
//!
//! Approval route construction for HR documents: picking reviewers from the
//! organization directory, applying templates or the auto-generation rules,
//! and submitting the finished route to the HR backend.

pub mod builder;
pub mod clients;
pub mod config;
pub mod constants;
pub mod directory;
pub mod draft;
pub mod error;
pub mod route;
pub mod submission;
pub mod templates;

// Re-export main types for easy access
pub use config::{ApprovalConfig, HrApiConfig, RoutingConfig};
pub use error::{ApprovalError, Result};

pub use builder::{AutoFailure, AutoOutcome, BuilderMode, BuilderNotice, RouteBuilder, Selection};
pub use clients::{
    DirectoryProvider, HrApiClient, InMemoryDirectory, InMemoryTemplateStore, RecordingGateway,
    ReviewGateway, ReviewRecord, RouteTemplateStore, SubmissionGateway,
};
pub use directory::{Directory, DirectoryMember, OrganizationNode};
pub use draft::{DocumentDraft, DraftId, DraftStatus};
pub use route::{
    ApprovalRoute, ApprovalStep, Direction, MemberId, RouteId, StepChange, StepId, StepList,
};
pub use submission::{
    build_submit_request, to_submission_payload, ProgressState, ReviewerAction, RouteProgress,
    StageStatus, SubmissionService,
};
pub use templates::{NewUserTemplate, RouteTemplate, TemplateId, UserTemplate};

// Wire types shared with the backend
pub use approval_types::{StageMode, StepType, UserRole};
