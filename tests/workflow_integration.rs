//! End-to-end workflow tests against a mock lesson-plan service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use lessonforge::workflow::{FormField, OVERLOAD_MESSAGE};
use lessonforge::{
    ApiError, ExtractionResult, GeneratedPlan, OptionCatalog, PlanRequest, PlanService, Session,
    Workflow, WorkflowStage,
};

const PLAN_CONTENT: &str = "LEARNING OBJECTIVES\nBy the end of this lesson students will:\n\n\
     Activity\n- Do A\n- Do B";

/// Scriptable in-memory service.
#[derive(Default)]
struct MockService {
    catalog_error: Mutex<Option<ApiError>>,
    upload_error: Mutex<Option<ApiError>>,
    generate_error: Mutex<Option<ApiError>>,
    artifact: Vec<u8>,
}

impl MockService {
    fn new() -> Self {
        Self { artifact: b"%PDF-1.4 fake".to_vec(), ..Self::default() }
    }

    fn failing_upload(error: ApiError) -> Self {
        let service = Self::new();
        *service.upload_error.lock().unwrap() = Some(error);
        service
    }

    fn failing_generate(error: ApiError) -> Self {
        let service = Self::new();
        *service.generate_error.lock().unwrap() = Some(error);
        service
    }

    fn extraction() -> ExtractionResult {
        ExtractionResult {
            id: "ext-1".to_string(),
            filename: "outline.pdf".to_string(),
            subject_names: vec!["Information Systems".to_string()],
            lecture_topics: vec!["Topic A".to_string(), "Topic B".to_string()],
            lecture_focus_mapping: HashMap::from([(
                "Topic A".to_string(),
                vec!["Sub 1".to_string()],
            )]),
            extracted_at: Utc::now(),
        }
    }
}

#[async_trait]
impl PlanService for MockService {
    async fn fetch_options(&self) -> Result<OptionCatalog, ApiError> {
        match self.catalog_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(OptionCatalog::standard()),
        }
    }

    async fn upload_document(&self, _path: &Path) -> Result<ExtractionResult, ApiError> {
        match self.upload_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(Self::extraction()),
        }
    }

    async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan, ApiError> {
        match self.generate_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(GeneratedPlan {
                id: "0123456789abcdef".to_string(),
                request_data: request.clone(),
                content: PLAN_CONTENT.to_string(),
                generated_at: Utc::now(),
            }),
        }
    }

    async fn download_artifact(&self, _plan_id: &str) -> Result<Vec<u8>, ApiError> {
        Ok(self.artifact.clone())
    }
}

fn fill_required(workflow: &mut Workflow, lecture: &str) {
    let form = workflow.form_mut();
    form.set(FormField::SubjectName, "Information Systems");
    form.set(FormField::LectureTopic, lecture);
    form.set(FormField::BloomsTaxonomy, "Apply");
    form.set(FormField::AqfLevel, "AQF Level 7 - Bachelor Degree");
    form.set(FormField::LessonDuration, "1 hour");
}

#[tokio::test]
async fn end_to_end_wizard_flow() {
    let service = MockService::new();
    let session = Arc::new(Session::new("token"));
    let mut workflow = Workflow::new(Arc::clone(&session));

    workflow.run_catalog(&service).await;
    assert!(!workflow.catalog().is_empty());

    workflow.run_ingest(&service, Path::new("outline.pdf")).await;
    assert_eq!(workflow.stage(), WorkflowStage::Configure);

    // Topic B has no focus topics: complete without a focus selection.
    fill_required(&mut workflow, "Topic B");
    assert!(workflow.form_complete());

    // Topic A has one focus topic: the switch clears focus and blocks
    // completion until one is picked.
    workflow.form_mut().set(FormField::LectureTopic, "Topic A");
    assert_eq!(workflow.form().value(FormField::FocusTopic), "");
    assert!(!workflow.form_complete());
    workflow.form_mut().set(FormField::FocusTopic, "Sub 1");
    assert!(workflow.form_complete());

    workflow.run_generation(&service).await;
    assert_eq!(workflow.stage(), WorkflowStage::Result);

    let plan = workflow.plan().expect("plan stored");
    assert_eq!(plan.request_data.lecture_topic, "Topic A");
    assert_eq!(plan.request_data.focus_topic, "Sub 1");

    // Download is a side effect only: no stage change, artifact on disk.
    let dir = tempfile::tempdir().unwrap();
    workflow.run_download(&service, dir.path()).await;
    assert_eq!(workflow.stage(), WorkflowStage::Result);
    let expected = dir.path().join("lesson_plan_Information_Systems_01234567.pdf");
    assert!(expected.exists());
    assert_eq!(std::fs::read(expected).unwrap(), b"%PDF-1.4 fake");

    // Start over discards everything.
    workflow.reset();
    assert_eq!(workflow.stage(), WorkflowStage::Ingest);
    assert!(workflow.plan().is_none());
    assert!(workflow.extraction().is_none());
}

#[tokio::test]
async fn overloaded_generation_stays_in_configure() {
    let service = MockService::failing_generate(ApiError::Overloaded);
    let mut workflow = Workflow::new(Arc::new(Session::new("token")));

    workflow.run_catalog(&service).await;
    workflow.run_ingest(&service, Path::new("outline.pdf")).await;
    fill_required(&mut workflow, "Topic B");

    workflow.run_generation(&service).await;
    assert_eq!(workflow.stage(), WorkflowStage::Configure);
    assert_eq!(workflow.error(), Some(OVERLOAD_MESSAGE));

    // Retry is a fresh user action and succeeds this time.
    workflow.run_generation(&service).await;
    assert_eq!(workflow.stage(), WorkflowStage::Result);
}

#[tokio::test]
async fn overload_detected_from_detail_text() {
    let service = MockService::failing_upload(ApiError::Overloaded);
    let mut workflow = Workflow::new(Arc::new(Session::new("token")));

    workflow.run_ingest(&service, Path::new("outline.pdf")).await;
    assert_eq!(workflow.stage(), WorkflowStage::Ingest);
    let message = workflow.error().unwrap();
    assert_eq!(message, OVERLOAD_MESSAGE);
    assert_ne!(message, "Failed to upload and process the document");
}

#[tokio::test]
async fn unauthorized_upload_invalidates_session_once() {
    let service = MockService::failing_upload(ApiError::Unauthorized);
    let session = Arc::new(Session::new("token"));
    let mut workflow = Workflow::new(Arc::clone(&session));

    workflow.run_ingest(&service, Path::new("outline.pdf")).await;

    assert!(workflow.is_exited());
    assert_eq!(session.invalidation_count(), 1);
    assert_eq!(workflow.stage(), WorkflowStage::Ingest);

    // The abandoned instance refuses further work.
    workflow.run_ingest(&service, Path::new("outline.pdf")).await;
    assert_eq!(session.invalidation_count(), 1);
}

#[tokio::test]
async fn failed_catalog_blocks_completion() {
    let service = MockService::new();
    *service.catalog_error.lock().unwrap() =
        Some(ApiError::Service("options unavailable".to_string()));
    let mut workflow = Workflow::new(Arc::new(Session::new("token")));

    workflow.run_catalog(&service).await;
    assert!(workflow.catalog().is_empty());
    assert_eq!(workflow.error(), Some("options unavailable"));

    workflow.run_ingest(&service, Path::new("outline.pdf")).await;
    fill_required(&mut workflow, "Topic B");

    // Catalog-backed selectors are unusable, so the form never validates.
    assert!(!workflow.form_complete());
    workflow.run_generation(&service).await;
    assert_eq!(workflow.stage(), WorkflowStage::Configure);
}

#[tokio::test]
async fn local_validation_failures_never_reach_the_service() {
    // A service whose every call would fail loudly if reached.
    let service = MockService::failing_upload(ApiError::Service("should not be called".into()));
    let mut workflow = Workflow::new(Arc::new(Session::new("token")));

    workflow.run_ingest(&service, Path::new("outline.docx")).await;
    assert_eq!(workflow.error(), Some("Please select a PDF file"));
    // The scripted upload error was never consumed.
    assert!(service.upload_error.lock().unwrap().is_some());
}
