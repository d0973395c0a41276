//! Configuration management for approval routing

use crate::constants::{
    DEFAULT_HR_ORGANIZATION, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_AUTO_REFERENCES,
    DEFAULT_SUBMISSION_COMMENT,
};
use crate::error::{ApprovalError, Result};
use approval_types::StageMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw configuration structure matching the config file exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    pub hr_api: RawHrApiConfig,

    #[serde(default)]
    pub routing: RoutingConfig,
}

#[derive(Debug, Deserialize)]
struct RawHrApiConfig {
    #[serde(alias = "url")]
    pub base_url: String,

    #[serde(alias = "token")]
    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    pub hr_api: HrApiConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrApiConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_hr_organization")]
    pub hr_organization: String,

    #[serde(default = "default_max_auto_references")]
    pub max_auto_references: usize,

    /// Stage mode for every step type other than APPROVAL
    #[serde(default = "default_non_approval_mode")]
    pub non_approval_mode: StageMode,

    #[serde(default = "default_comment")]
    pub default_comment: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            hr_organization: default_hr_organization(),
            max_auto_references: default_max_auto_references(),
            non_approval_mode: default_non_approval_mode(),
            default_comment: default_comment(),
        }
    }
}

// Default functions
fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_hr_organization() -> String {
    DEFAULT_HR_ORGANIZATION.to_string()
}

fn default_max_auto_references() -> usize {
    DEFAULT_MAX_AUTO_REFERENCES
}

fn default_non_approval_mode() -> StageMode {
    StageMode::Parallel
}

fn default_comment() -> String {
    DEFAULT_SUBMISSION_COMMENT.to_string()
}

impl ApprovalConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApprovalError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw_config: RawConfig = serde_json::from_str(json)
            .map_err(|e| ApprovalError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self::from_raw_config(raw_config);
        config.validate()?;
        Ok(config)
    }

    fn from_raw_config(raw: RawConfig) -> Self {
        let hr_api = HrApiConfig {
            base_url: raw.hr_api.base_url.trim_end_matches('/').to_string(),
            api_key: raw.hr_api.api_key,
            timeout_secs: raw.hr_api.timeout_secs,
        };

        Self {
            hr_api,
            routing: raw.routing,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hr_api.base_url.is_empty() {
            return Err(ApprovalError::Config("HR API base URL is required".to_string()));
        }

        if self.hr_api.api_key.is_empty() {
            return Err(ApprovalError::Config("HR API key is required".to_string()));
        }

        if self.hr_api.timeout_secs == 0 {
            return Err(ApprovalError::Config(
                "HR API timeout must be at least one second".to_string(),
            ));
        }

        if self.routing.hr_organization.trim().is_empty() {
            return Err(ApprovalError::Config("HR organization name is required".to_string()));
        }

        if self.routing.non_approval_mode == StageMode::Sequential {
            return Err(ApprovalError::Config(
                "non_approval_mode must be PARALLEL or ALL".to_string(),
            ));
        }

        Ok(())
    }
}
