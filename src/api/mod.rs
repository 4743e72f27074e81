//! Lesson-plan service boundary.
//!
//! The workflow controller talks to the remote service exclusively through
//! the [`PlanService`] trait, so tests can substitute a mock and the HTTP
//! client stays swappable.

mod client;
mod types;

use std::path::Path;

pub use client::HttpPlanService;
pub use types::{ExtractionResult, GeneratedPlan, OptionCatalog, PlanRequest};

use async_trait::async_trait;

/// Service error taxonomy.
///
/// Only `Unauthorized` crosses the workflow boundary (to the session
/// collaborator); everything else is converted into a stage-local message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401 - the bearer credential is invalid or expired
    #[error("Session is no longer valid")]
    Unauthorized,

    /// 429, or a failure description containing "overloaded"
    #[error("The AI service is currently overloaded")]
    Overloaded,

    /// Any other non-2xx with a server-provided description
    #[error("{0}")]
    Service(String),

    /// Transport-level failure (connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local I/O failure while reading the upload or writing the artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether this failure is the distinguished overload case.
    pub fn is_overloaded(&self) -> bool {
        matches!(self, ApiError::Overloaded)
    }
}

/// Async boundary to the remote lesson-plan service.
#[async_trait]
pub trait PlanService: Send + Sync {
    /// Fetch the standard dropdown options. No credential required.
    async fn fetch_options(&self) -> Result<OptionCatalog, ApiError>;

    /// Upload a course-outline document and extract structured data.
    async fn upload_document(&self, path: &Path) -> Result<ExtractionResult, ApiError>;

    /// Generate a lesson plan from a completed request.
    async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan, ApiError>;

    /// Download the rendered artifact for a generated plan.
    async fn download_artifact(&self, plan_id: &str) -> Result<Vec<u8>, ApiError>;
}
