//! HR backend client for directory, templates, submission and reviews

use super::traits::{DirectoryProvider, ReviewGateway, RouteTemplateStore, SubmissionGateway};
use crate::config::HrApiConfig;
use crate::draft::DraftId;
use crate::error::{ApprovalError, Result};
use crate::templates::{NewUserTemplate, UserTemplate};
use approval_types::{
    AdminTemplate, CommentRequest, DirectoryUser, ReviewDecisionRequest, SubmitDraftRequest,
    SubmittedDraft,
};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const USERS_PATH: &str = "/users";
const USER_ROUTES_PATH: &str = "/approval-routes";
const ADMIN_TEMPLATES_PATH: &str = "/admin/approval-templates";

/// Some endpoints wrap their payload in `{ "data": ... }`
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ApiResponse<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(value) => value,
        }
    }
}

pub struct HrApiClient {
    config: HrApiConfig,
    http_client: HttpClient,
}

impl HrApiClient {
    pub fn new(config: HrApiConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http_client
            .get(self.url(path))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let response = Self::check_status(response, path).await?;
        let body: ApiResponse<T> = response.json().await?;
        Ok(body.into_inner())
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.post(path, body).await?;
        let body: ApiResponse<T> = response.json().await?;
        Ok(body.into_inner())
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let response = self
            .http_client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        Self::check_status(response, path).await
    }

    async fn check_status(response: Response, path: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApprovalError::NotFound(format!("{}: {}", path, error_text)));
        }

        Err(ApprovalError::ServiceUnavailable(format!(
            "HR API error {} on {}: {}",
            status, path, error_text
        )))
    }

    fn document_path(document_id: &str, action: &str) -> String {
        format!("/approval/documents/{}/{}", document_id, action)
    }
}

#[async_trait]
impl DirectoryProvider for HrApiClient {
    async fn get_users(&self) -> Result<Vec<DirectoryUser>> {
        let users: Vec<DirectoryUser> = self.get_json(USERS_PATH).await?;
        log::debug!("Fetched {} directory users", users.len());
        Ok(users)
    }
}

#[async_trait]
impl RouteTemplateStore for HrApiClient {
    async fn get_user_approval_routes(&self) -> Result<Vec<UserTemplate>> {
        self.get_json(USER_ROUTES_PATH).await
    }

    async fn get_admin_approval_templates(&self) -> Result<Vec<AdminTemplate>> {
        self.get_json(ADMIN_TEMPLATES_PATH).await
    }

    async fn save_user_approval_route(&self, template: &NewUserTemplate) -> Result<UserTemplate> {
        self.post_json(USER_ROUTES_PATH, template).await
    }
}

#[async_trait]
impl SubmissionGateway for HrApiClient {
    async fn submit_draft(
        &self,
        draft_id: &DraftId,
        request: &SubmitDraftRequest,
    ) -> Result<SubmittedDraft> {
        let path = format!("/approval/drafts/{}/submit", draft_id);
        self.post_json(&path, request).await
    }
}

#[async_trait]
impl ReviewGateway for HrApiClient {
    async fn approve(&self, document_id: &str, comment: Option<&str>) -> Result<()> {
        let body = ReviewDecisionRequest {
            comment: comment.map(str::to_string),
        };
        self.post(&Self::document_path(document_id, "approve"), &body)
            .await?;
        log::info!("Approved document {}", document_id);
        Ok(())
    }

    async fn reject(&self, document_id: &str, comment: Option<&str>) -> Result<()> {
        let body = ReviewDecisionRequest {
            comment: comment.map(str::to_string),
        };
        self.post(&Self::document_path(document_id, "reject"), &body)
            .await?;
        log::info!("Rejected document {}", document_id);
        Ok(())
    }

    async fn comment(&self, document_id: &str, content: &str) -> Result<()> {
        let body = CommentRequest {
            content: content.to_string(),
        };
        self.post(&Self::document_path(document_id, "comments"), &body)
            .await?;
        Ok(())
    }
}
