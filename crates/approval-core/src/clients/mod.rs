//! Backend collaborators

pub mod hr_api;
pub mod in_memory;
pub mod traits;

pub use hr_api::HrApiClient;
pub use in_memory::{InMemoryDirectory, InMemoryTemplateStore, RecordingGateway, ReviewRecord};
pub use traits::{DirectoryProvider, ReviewGateway, RouteTemplateStore, SubmissionGateway};
