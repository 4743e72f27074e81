//! Multi-stage workflow controller.
//!
//! Owns the Ingest → Configure → Result progression: file ingestion, the
//! dependent configuration form, plan generation, and artifact download.
//! Network work is split into a `start_*` call that validates local
//! preconditions and hands back a [`Ticket`], and an [`Workflow::apply`]
//! call that folds the tagged completion back into the state. A completion
//! whose epoch or operation no longer matches the current state is dropped,
//! so a response that arrives after "start over" can never mutate the new
//! workflow generation.

pub mod form;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{ApiError, ExtractionResult, GeneratedPlan, OptionCatalog, PlanService};
use crate::core::Session;

pub use form::{focus_topics_for, FormField, PlanForm};

/// File extensions accepted for ingestion, lowercase, without the dot.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf"];

/// Message for the distinguished overload failure, kept apart from the
/// generic per-operation fallbacks so users know a retry is worthwhile.
pub const OVERLOAD_MESSAGE: &str = "The AI service is currently experiencing high demand. \
     Please wait a few minutes and try again.";

/// The three wizard stages. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    /// Waiting for a course-outline document
    Ingest,
    /// Configuring the plan request from extracted data
    Configure,
    /// Displaying the generated plan
    Result,
}

/// Network-bound operations the controller can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Catalog,
    Ingest,
    Generate,
    Download,
}

impl Operation {
    /// Fallback message when the service gives no usable description.
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Catalog => "Failed to load options",
            Operation::Ingest => "Failed to upload and process the document",
            Operation::Generate => "Failed to generate lesson plan",
            Operation::Download => "Failed to download lesson plan",
        }
    }
}

/// Tag handed out when a request starts; must accompany its completion.
#[derive(Debug, Clone, Copy)]
pub struct Ticket {
    epoch: u64,
    op: Operation,
}

impl Ticket {
    /// The operation this ticket belongs to.
    pub fn operation(&self) -> Operation {
        self.op
    }
}

/// Outcome of a finished request, fed back through [`Workflow::apply`].
#[derive(Debug)]
pub enum Completion {
    Catalog(Result<OptionCatalog, ApiError>),
    Ingest(Result<ExtractionResult, ApiError>),
    Generate(Result<GeneratedPlan, ApiError>),
    Download(Result<PathBuf, ApiError>),
}

impl Completion {
    fn operation(&self) -> Operation {
        match self {
            Completion::Catalog(_) => Operation::Catalog,
            Completion::Ingest(_) => Operation::Ingest,
            Completion::Generate(_) => Operation::Generate,
            Completion::Download(_) => Operation::Download,
        }
    }
}

/// Check that a file name ends in a recognized document extension.
pub fn is_accepted_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// The workflow controller.
///
/// Exclusively owns the stage, the extraction result, and the generated
/// plan. One instance per session; nothing is shared across instances.
#[derive(Debug)]
pub struct Workflow {
    session: Arc<Session>,
    stage: WorkflowStage,
    epoch: u64,
    pending: Option<Operation>,
    catalog_pending: bool,
    catalog: OptionCatalog,
    extraction: Option<ExtractionResult>,
    form: PlanForm,
    plan: Option<GeneratedPlan>,
    error: Option<String>,
    notice: Option<String>,
    exited: bool,
}

impl Workflow {
    /// New workflow in the Ingest stage.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            stage: WorkflowStage::Ingest,
            epoch: 0,
            pending: None,
            catalog_pending: false,
            catalog: OptionCatalog::default(),
            extraction: None,
            form: PlanForm::new(),
            plan: None,
            error: None,
            notice: None,
            exited: false,
        }
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn form(&self) -> &PlanForm {
        &self.form
    }

    /// Mutable access to the form; only meaningful in Configure.
    pub fn form_mut(&mut self) -> &mut PlanForm {
        &mut self.form
    }

    pub fn plan(&self) -> Option<&GeneratedPlan> {
        self.plan.as_ref()
    }

    /// Current stage-local error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Informational notice (extraction summary, saved artifact path).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether a gated operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the session died and the workflow instance is abandoned.
    pub fn is_exited(&self) -> bool {
        self.exited
    }

    /// Whether the form currently validates for generation.
    pub fn form_complete(&self) -> bool {
        match &self.extraction {
            Some(extraction) => self.form.is_complete(&self.catalog, extraction),
            None => false,
        }
    }

    fn ticket(&self, op: Operation) -> Ticket {
        Ticket { epoch: self.epoch, op }
    }

    /// Begin the one-time option catalog fetch.
    pub fn start_catalog(&mut self) -> Option<Ticket> {
        if self.exited || self.catalog_pending {
            return None;
        }
        self.catalog_pending = true;
        Some(self.ticket(Operation::Catalog))
    }

    /// Begin ingestion of a course-outline document.
    ///
    /// Fails locally (no ticket, no request) when the file type is not
    /// recognized or another gated operation is in flight.
    pub fn start_ingest(&mut self, path: &Path) -> Option<Ticket> {
        if self.exited || self.is_busy() || self.stage != WorkflowStage::Ingest {
            return None;
        }
        if !is_accepted_document(path) {
            self.error = Some("Please select a PDF file".to_string());
            return None;
        }
        self.error = None;
        self.pending = Some(Operation::Ingest);
        Some(self.ticket(Operation::Ingest))
    }

    /// Begin plan generation from the completed form.
    ///
    /// Fails locally when the form does not validate.
    pub fn start_generation(&mut self) -> Option<Ticket> {
        if self.exited || self.is_busy() || self.stage != WorkflowStage::Configure {
            return None;
        }
        if !self.form_complete() {
            self.error = Some("Please fill in all required fields".to_string());
            return None;
        }
        self.error = None;
        self.pending = Some(Operation::Generate);
        Some(self.ticket(Operation::Generate))
    }

    /// Begin an artifact download for the generated plan.
    pub fn start_download(&mut self) -> Option<Ticket> {
        if self.exited || self.is_busy() || self.plan.is_none() {
            return None;
        }
        self.error = None;
        self.pending = Some(Operation::Download);
        Some(self.ticket(Operation::Download))
    }

    /// Discard everything and return to Ingest.
    ///
    /// Bumps the epoch, so completions from requests started before the
    /// reset are dropped when they eventually arrive. The option catalog is
    /// independent of any document and survives the reset.
    pub fn reset(&mut self) {
        tracing::debug!(from = ?self.stage, "Workflow reset");
        self.epoch += 1;
        self.pending = None;
        self.stage = WorkflowStage::Ingest;
        self.extraction = None;
        self.form.reset();
        self.plan = None;
        self.error = None;
        self.notice = None;
    }

    /// Fold a completed request back into the workflow.
    ///
    /// Stale completions (wrong epoch, or an operation that is no longer
    /// pending) are discarded without touching state. A 401 from any
    /// operation invalidates the session exactly once and abandons the
    /// instance; every other failure becomes a stage-local message and
    /// leaves the stage unchanged for a user-initiated retry.
    pub fn apply(&mut self, ticket: Ticket, completion: Completion) {
        if self.exited || ticket.op != completion.operation() {
            tracing::debug!(op = ?completion.operation(), "Dropping stale completion");
            return;
        }

        if completion.operation() == Operation::Catalog {
            // The catalog is document-independent and survives a reset, so
            // its completion is gated by `catalog_pending` rather than the
            // epoch: a fetch started before a reset still lands.
            if !self.catalog_pending {
                return;
            }
            self.catalog_pending = false;
        } else {
            if ticket.epoch != self.epoch || self.pending != Some(ticket.op) {
                tracing::debug!(op = ?ticket.op, "Dropping completion for non-pending operation");
                return;
            }
            self.pending = None;
        }

        match completion {
            Completion::Catalog(Ok(catalog)) => {
                self.catalog = catalog;
            }
            Completion::Ingest(Ok(extraction)) => {
                tracing::info!(file = %extraction.filename, "Ingestion complete");
                self.notice = Some(extraction.summary());
                self.extraction = Some(extraction);
                self.form.reset();
                self.error = None;
                self.stage = WorkflowStage::Configure;
            }
            Completion::Generate(Ok(plan)) => {
                tracing::info!(plan_id = %plan.id, "Plan generated");
                self.plan = Some(plan);
                self.error = None;
                self.stage = WorkflowStage::Result;
            }
            Completion::Download(Ok(path)) => {
                self.notice = Some(format!("Saved {}", path.display()));
            }
            Completion::Catalog(Err(err))
            | Completion::Ingest(Err(err))
            | Completion::Generate(Err(err))
            | Completion::Download(Err(err)) => self.fail(ticket.op, err),
        }
    }

    fn fail(&mut self, op: Operation, err: ApiError) {
        match err {
            ApiError::Unauthorized => {
                self.session.invalidate();
                self.exited = true;
            }
            ApiError::Overloaded => {
                tracing::warn!(?op, "Service overloaded");
                self.error = Some(OVERLOAD_MESSAGE.to_string());
            }
            ApiError::Service(detail) => {
                tracing::warn!(?op, %detail, "Request failed");
                self.error = Some(detail);
            }
            ApiError::Transport(_) | ApiError::Io(_) => {
                tracing::warn!(?op, error = %err, "Request failed");
                self.error = Some(op.fallback_message().to_string());
            }
        }
    }

    // ------------------------------------------------------------------
    // Async drivers: start + request + apply in one suspend point. Used by
    // the non-interactive CLI paths and tests; the TUI spawns the request
    // itself and feeds the completion through `apply`.
    // ------------------------------------------------------------------

    /// Load the option catalog.
    pub async fn run_catalog(&mut self, service: &dyn PlanService) {
        if let Some(ticket) = self.start_catalog() {
            let result = service.fetch_options().await;
            self.apply(ticket, Completion::Catalog(result));
        }
    }

    /// Ingest a document and, on success, move to Configure.
    pub async fn run_ingest(&mut self, service: &dyn PlanService, path: &Path) {
        if let Some(ticket) = self.start_ingest(path) {
            let result = service.upload_document(path).await;
            self.apply(ticket, Completion::Ingest(result));
        }
    }

    /// Generate a plan from the completed form and move to Result.
    pub async fn run_generation(&mut self, service: &dyn PlanService) {
        if let Some(ticket) = self.start_generation() {
            let request = self.form.request().clone();
            let result = service.generate_plan(&request).await;
            self.apply(ticket, Completion::Generate(result));
        }
    }

    /// Download the artifact for the generated plan into `dir`.
    pub async fn run_download(&mut self, service: &dyn PlanService, dir: &Path) {
        let Some(ticket) = self.start_download() else {
            return;
        };
        let plan = match &self.plan {
            Some(plan) => plan.clone(),
            None => return,
        };

        let result = match service.download_artifact(&plan.id).await {
            Ok(bytes) => {
                let path = dir.join(plan.artifact_filename());
                tokio::fs::write(&path, bytes).await.map(|()| path).map_err(ApiError::from)
            }
            Err(err) => Err(err),
        };
        self.apply(ticket, Completion::Download(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> Workflow {
        Workflow::new(Arc::new(Session::new("token")))
    }

    fn extraction(filename: &str) -> ExtractionResult {
        ExtractionResult {
            id: String::new(),
            filename: filename.to_string(),
            subject_names: vec!["S".to_string()],
            lecture_topics: vec!["T".to_string()],
            lecture_focus_mapping: Default::default(),
            extracted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_accepted_document_extensions() {
        assert!(is_accepted_document(Path::new("outline.pdf")));
        assert!(is_accepted_document(Path::new("Outline.PDF")));
        assert!(!is_accepted_document(Path::new("outline.docx")));
        assert!(!is_accepted_document(Path::new("outline")));
        assert!(!is_accepted_document(Path::new("pdf")));
    }

    #[test]
    fn test_bad_file_type_fails_locally() {
        let mut wf = workflow();
        assert!(wf.start_ingest(Path::new("notes.txt")).is_none());
        assert_eq!(wf.error(), Some("Please select a PDF file"));
        assert_eq!(wf.stage(), WorkflowStage::Ingest);
        assert!(!wf.is_busy());
    }

    #[test]
    fn test_busy_flag_gates_second_ingest() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf"));
        assert!(ticket.is_some());
        assert!(wf.is_busy());
        assert!(wf.start_ingest(Path::new("b.pdf")).is_none());
    }

    #[test]
    fn test_stale_epoch_completion_dropped() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();

        // User starts over while the request is still in flight.
        wf.reset();

        wf.apply(ticket, Completion::Ingest(Ok(extraction("a.pdf"))));

        assert_eq!(wf.stage(), WorkflowStage::Ingest);
        assert!(wf.extraction().is_none());
    }

    #[test]
    fn test_catalog_fetch_survives_reset() {
        let mut wf = workflow();
        let ticket = wf.start_catalog().unwrap();

        // Start over while the catalog fetch is still in flight.
        wf.reset();
        wf.apply(ticket, Completion::Catalog(Ok(OptionCatalog::standard())));

        assert!(!wf.catalog().is_empty());
        // The fetch settled, so another one could be started again.
        assert!(wf.start_catalog().is_some());
    }

    #[test]
    fn test_unauthorized_invalidates_session_once() {
        let session = Arc::new(Session::new("token"));
        let mut wf = Workflow::new(Arc::clone(&session));

        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(ticket, Completion::Ingest(Err(ApiError::Unauthorized)));

        assert!(wf.is_exited());
        assert_eq!(session.invalidation_count(), 1);
        // No stage transition happens inside this core
        assert_eq!(wf.stage(), WorkflowStage::Ingest);

        // Nothing further is applied once exited.
        let late = Ticket { epoch: 0, op: Operation::Ingest };
        wf.apply(late, Completion::Ingest(Err(ApiError::Unauthorized)));
        assert_eq!(session.invalidation_count(), 1);
    }

    #[test]
    fn test_overload_message_distinct_from_generic() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(ticket, Completion::Ingest(Err(ApiError::Overloaded)));

        assert_eq!(wf.stage(), WorkflowStage::Ingest);
        assert_eq!(wf.error(), Some(OVERLOAD_MESSAGE));
        assert_ne!(wf.error().unwrap(), Operation::Ingest.fallback_message());
    }

    #[test]
    fn test_server_detail_surfaced() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(
            ticket,
            Completion::Ingest(Err(ApiError::Service("No text found in PDF".to_string()))),
        );
        assert_eq!(wf.error(), Some("No text found in PDF"));
        assert_eq!(wf.stage(), WorkflowStage::Ingest);
    }

    #[test]
    fn test_successful_ingest_enters_configure() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(ticket, Completion::Ingest(Ok(extraction("a.pdf"))));

        assert_eq!(wf.stage(), WorkflowStage::Configure);
        assert!(wf.extraction().is_some());
        assert!(!wf.is_busy());
        assert!(wf.notice().unwrap().starts_with("Extracted 1 subject(s)"));
    }

    #[test]
    fn test_generation_requires_complete_form() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(ticket, Completion::Ingest(Ok(extraction("a.pdf"))));
        assert_eq!(wf.stage(), WorkflowStage::Configure);

        assert!(wf.start_generation().is_none());
        assert_eq!(wf.error(), Some("Please fill in all required fields"));
        assert_eq!(wf.stage(), WorkflowStage::Configure);
    }

    #[test]
    fn test_reset_clears_plan_and_returns_to_ingest() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(ticket, Completion::Ingest(Ok(extraction("a.pdf"))));

        wf.reset();
        assert_eq!(wf.stage(), WorkflowStage::Ingest);
        assert!(wf.extraction().is_none());
        assert!(wf.plan().is_none());
        assert!(wf.error().is_none());
        assert_eq!(wf.form().request(), &crate::api::PlanRequest::default());
    }

    #[test]
    fn test_download_never_changes_stage() {
        let mut wf = workflow();
        let ticket = wf.start_ingest(Path::new("a.pdf")).unwrap();
        wf.apply(ticket, Completion::Ingest(Ok(extraction("a.pdf"))));

        // Force a plan in via the generate path
        wf.form_mut().set(FormField::SubjectName, "S");
        // Not using start_generation here; inject the completion directly.
        wf.pending = Some(Operation::Generate);
        let gen_ticket = wf.ticket(Operation::Generate);
        wf.apply(
            gen_ticket,
            Completion::Generate(Ok(GeneratedPlan {
                id: "p1".to_string(),
                request_data: wf.form().request().clone(),
                content: "INTRO\nhello".to_string(),
                generated_at: chrono::Utc::now(),
            })),
        );
        assert_eq!(wf.stage(), WorkflowStage::Result);

        let dl = wf.start_download().unwrap();
        wf.apply(dl, Completion::Download(Err(ApiError::Service("gone".to_string()))));
        assert_eq!(wf.stage(), WorkflowStage::Result);
        assert_eq!(wf.error(), Some("gone"));
    }
}
