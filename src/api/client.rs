//! HTTP implementation of the lesson-plan service boundary.
//!
//! Maps the service's status conventions onto [`ApiError`]: 401 is a dead
//! session, 429 (or a `detail` mentioning "overloaded") is the recoverable
//! overload case, anything else surfaces the server's `detail` text.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::{ApiError, ExtractionResult, GeneratedPlan, OptionCatalog, PlanRequest, PlanService};

/// Error body shape used by the service for all failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Reqwest-backed [`PlanService`].
#[derive(Debug, Clone)]
pub struct HttpPlanService {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpPlanService {
    /// Create a client for the service at `base_url` using `token` as the
    /// bearer credential. The token is attached as-is; this client never
    /// mints or validates it.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a non-2xx response into the error taxonomy.
    async fn into_api_error(response: Response) -> ApiError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail);

        if status == StatusCode::TOO_MANY_REQUESTS
            || detail.as_deref().is_some_and(|d| d.contains("overloaded"))
        {
            return ApiError::Overloaded;
        }

        match detail {
            Some(detail) => ApiError::Service(detail),
            None => ApiError::Service(format!("Request failed with status {status}")),
        }
    }
}

#[async_trait]
impl PlanService for HttpPlanService {
    async fn fetch_options(&self) -> Result<OptionCatalog, ApiError> {
        tracing::debug!(url = %self.url("/options"), "Fetching option catalog");

        let response = self.client.get(self.url("/options")).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn upload_document(&self, path: &Path) -> Result<ExtractionResult, ApiError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        tracing::debug!(file = %path.display(), "Uploading course outline");

        let bytes = tokio::fs::read(path).await?;
        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload-document"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan, ApiError> {
        tracing::debug!(
            subject = %request.subject_name,
            lecture = %request.lecture_topic,
            "Requesting plan generation"
        );

        let response = self
            .client
            .post(self.url("/generate-plan"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn download_artifact(&self, plan_id: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.url(&format!("/artifact/{plan_id}"));
        tracing::debug!(%url, "Downloading artifact");

        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let service = HttpPlanService::new("http://localhost:8000/", "token");
        assert_eq!(service.url("/options"), "http://localhost:8000/options");
    }

    #[test]
    fn test_artifact_url_includes_plan_id() {
        let service = HttpPlanService::new("http://localhost:8000", "token");
        assert_eq!(service.url("/artifact/abc"), "http://localhost:8000/artifact/abc");
    }
}
