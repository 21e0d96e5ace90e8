//! Client for the external automatic pre-tagging service.
//!
//! The service receives a description of the project (owner, uuid, format
//! and type names, data and tags locations), computes pre-tags
//! server-side, and answers with the location it wrote its output to.
//! The exchange is a single awaitable request → response: the returned
//! future resolves only after the response body has been fully read and
//! parsed, so callers reliably observe the project mutation.
//!
//! No retry is attempted here; retry policy belongs to the caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::config::PreTaggerConfig;
use crate::error::{Error, Result};
use crate::models::{Project, Status};

/// Fixed request path on the pre-tagging host.
pub const PRETAG_PATH: &str = "/PreTagger/api/v0.1/Label/";

/// Request payload; the complete contract the service needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreTagRequest {
    user_id: String,
    project_id: String,
    file_type: String,
    project_type: String,
    data_file: String,
    tags_file: String,
}

/// Expected response shape. Extra keys are ignored; a missing
/// `silver_standard` is a protocol error.
#[derive(Debug, Deserialize)]
struct PreTagResponse {
    silver_standard: String,
}

/// HTTP client for the pre-tagging service.
pub struct PreTagClient {
    endpoint: String,
    client: reqwest::Client,
}

impl PreTagClient {
    /// Build a client for the configured endpoint.
    pub fn new(config: &PreTaggerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Request pre-tags for the project and apply the response.
    ///
    /// On success the project's pre-tags location points at the service's
    /// output and the project status becomes [`Status::PreTagged`].
    /// Network failures, non-2xx responses, and malformed bodies surface
    /// as [`Error::ExternalService`]; the project is not mutated on any
    /// failure path.
    pub async fn generate(&self, project: &mut Project) -> Result<()> {
        let body = PreTagRequest {
            user_id: project.owner_id.clone(),
            project_id: project.uuid.clone(),
            file_type: project.data_format.wire_name().to_string(),
            project_type: project.project_type.wire_name().to_string(),
            data_file: project.data_location.clone(),
            tags_file: project.tags_location.clone(),
        };
        let url = format!("{}{}", self.endpoint, PRETAG_PATH);

        info!(project = %project.uuid, url = %url, "requesting pre-tags");
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(project = %project.uuid, error = %e, "pre-tagging request failed");
                Error::ExternalService(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!(project = %project.uuid, %status, "pre-tagging service returned an error");
            return Err(Error::ExternalService(format!(
                "HTTP {}: {}",
                status,
                text.chars().take(500).collect::<String>()
            )));
        }

        let parsed: PreTagResponse = resp
            .json()
            .await
            .map_err(|e| Error::ExternalService(format!("malformed response: {}", e)))?;

        project.pretags_location = parsed.silver_standard;
        project.status = Status::PreTagged;
        info!(project = %project.uuid, location = %project.pretags_location, "pre-tags generated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_uses_the_wire_field_names() {
        let body = PreTagRequest {
            user_id: "42".into(),
            project_id: "abcd".into(),
            file_type: "CSV".into(),
            project_type: "Sentiment Analysis".into(),
            data_file: "rows.csv".into(),
            tags_file: "tags.csv".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["userId"], "42");
        assert_eq!(value["projectId"], "abcd");
        assert_eq!(value["fileType"], "CSV");
        assert_eq!(value["projectType"], "Sentiment Analysis");
        assert_eq!(value["dataFile"], "rows.csv");
        assert_eq!(value["tagsFile"], "tags.csv");
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn response_parse_ignores_extra_keys() {
        let parsed: PreTagResponse = serde_json::from_str(
            r#"{ "silver_standard": "silver_standard.csv", "elapsed_ms": 1200 }"#,
        )
        .unwrap();
        assert_eq!(parsed.silver_standard, "silver_standard.csv");
    }

    #[test]
    fn response_without_silver_standard_is_rejected() {
        let parsed: std::result::Result<PreTagResponse, _> =
            serde_json::from_str(r#"{ "status": "ok" }"#);
        assert!(parsed.is_err());
    }
}
