//! Routing constants shared by the builder and the HTTP client

/// Organization whose managers and staff are pulled into automatically generated routes
pub const DEFAULT_HR_ORGANIZATION: &str = "HR팀";

/// At most this many HR employees are added as references by auto generation
pub const DEFAULT_MAX_AUTO_REFERENCES: usize = 2;

/// Organization tree bucket for members without a department
pub const UNASSIGNED_ORGANIZATION: &str = "미지정";

/// Content key under which a draft stores its route snapshot
pub const DRAFT_ROUTE_KEY: &str = "__approvalRoute";

pub const DEFAULT_SUBMISSION_COMMENT: &str = "결재 요청드립니다.";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
