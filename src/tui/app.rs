//! TUI application state and runner.
//!
//! Handles the main event loop and terminal setup/teardown. Network work is
//! spawned onto the tokio runtime; completions come back over a channel and
//! are folded into the workflow once per tick, so the UI stays responsive
//! while a request is in flight.

use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ApiError, PlanService};
use crate::core::{Config, Session};
use crate::workflow::{focus_topics_for, Completion, FormField, Ticket, Workflow, WorkflowStage};

use super::{draw, handle_key};

/// Wizard application state.
pub struct WizardApp {
    /// The workflow controller
    pub workflow: Workflow,

    /// Application configuration
    pub config: Config,

    /// File path being typed in the ingest stage
    pub path_input: String,

    /// Cursor position in the path input
    pub cursor_position: usize,

    /// Selected field in the configure stage (index into `FormField::ALL`)
    pub field_index: usize,

    /// Whether the choice popup for the selected field is open
    pub choice_open: bool,

    /// Highlighted row in the choice popup
    pub choice_index: usize,

    /// Scroll offset in the result view
    pub result_scroll: usize,

    /// Whether the application should quit
    pub should_quit: bool,

    session: Arc<Session>,
    service: Arc<dyn PlanService>,
    handle: Handle,
    tx: UnboundedSender<(Ticket, Completion)>,
    rx: UnboundedReceiver<(Ticket, Completion)>,
}

impl WizardApp {
    /// Create a new wizard.
    pub fn new(
        config: Config,
        session: Arc<Session>,
        service: Arc<dyn PlanService>,
        handle: Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            workflow: Workflow::new(Arc::clone(&session)),
            config,
            path_input: String::new(),
            cursor_position: 0,
            field_index: 0,
            choice_open: false,
            choice_index: 0,
            result_scroll: 0,
            should_quit: false,
            session,
            service,
            handle,
            tx,
            rx,
        }
    }

    /// The field currently highlighted in the configure stage.
    pub fn selected_field(&self) -> FormField {
        FormField::ALL[self.field_index.min(FormField::ALL.len() - 1)]
    }

    /// Choice list for a form field, derived per read.
    pub fn choices_for(&self, field: FormField) -> Vec<String> {
        let Some(extraction) = self.workflow.extraction() else {
            return Vec::new();
        };
        match field {
            FormField::SubjectName => extraction.subject_names.clone(),
            FormField::LectureTopic => extraction.lecture_topics.clone(),
            FormField::FocusTopic => {
                focus_topics_for(extraction, self.workflow.form().value(FormField::LectureTopic))
                    .to_vec()
            }
            FormField::BloomsTaxonomy => self.workflow.catalog().blooms_taxonomy.clone(),
            FormField::AqfLevel => self.workflow.catalog().aqf_levels.clone(),
            FormField::LessonDuration => self.workflow.catalog().lesson_durations.clone(),
        }
    }

    /// Kick off the one-time option catalog fetch.
    pub fn spawn_catalog(&mut self) {
        if let Some(ticket) = self.workflow.start_catalog() {
            let service = Arc::clone(&self.service);
            let tx = self.tx.clone();
            self.handle.spawn(async move {
                let result = service.fetch_options().await;
                let _ = tx.send((ticket, Completion::Catalog(result)));
            });
        }
    }

    /// Submit the typed file path for ingestion.
    pub fn spawn_ingest(&mut self) {
        let expanded = shellexpand::tilde(self.path_input.trim()).into_owned();
        let path = PathBuf::from(expanded);
        if let Some(ticket) = self.workflow.start_ingest(&path) {
            let service = Arc::clone(&self.service);
            let tx = self.tx.clone();
            self.handle.spawn(async move {
                let result = service.upload_document(&path).await;
                let _ = tx.send((ticket, Completion::Ingest(result)));
            });
        }
    }

    /// Submit the completed form for generation.
    pub fn spawn_generation(&mut self) {
        if let Some(ticket) = self.workflow.start_generation() {
            let request = self.workflow.form().request().clone();
            let service = Arc::clone(&self.service);
            let tx = self.tx.clone();
            self.handle.spawn(async move {
                let result = service.generate_plan(&request).await;
                let _ = tx.send((ticket, Completion::Generate(result)));
            });
        }
    }

    /// Download the artifact for the generated plan.
    pub fn spawn_download(&mut self) {
        let Some(plan) = self.workflow.plan() else {
            return;
        };
        let plan_id = plan.id.clone();
        let filename = plan.artifact_filename();
        let dir = self
            .config
            .download
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(ticket) = self.workflow.start_download() {
            let service = Arc::clone(&self.service);
            let tx = self.tx.clone();
            self.handle.spawn(async move {
                let result = match service.download_artifact(&plan_id).await {
                    Ok(bytes) => {
                        let path = dir.join(filename);
                        tokio::fs::write(&path, bytes)
                            .await
                            .map(|()| path)
                            .map_err(ApiError::from)
                    }
                    Err(err) => Err(err),
                };
                let _ = tx.send((ticket, Completion::Download(result)));
            });
        }
    }

    /// Start over: back to Ingest, everything discarded.
    pub fn reset(&mut self) {
        self.workflow.reset();
        self.path_input.clear();
        self.cursor_position = 0;
        self.field_index = 0;
        self.choice_open = false;
        self.choice_index = 0;
        self.result_scroll = 0;
    }

    /// Drain completed requests into the workflow. Called once per tick.
    pub fn tick(&mut self) {
        while let Ok((ticket, completion)) = self.rx.try_recv() {
            self.workflow.apply(ticket, completion);
        }
        if self.session.is_invalidated() {
            // Session collaborator owns re-authentication; we just leave.
            self.should_quit = true;
        }
    }

    /// Stage shown in the progress header (1-based).
    pub fn stage_number(&self) -> usize {
        match self.workflow.stage() {
            WorkflowStage::Ingest => 1,
            WorkflowStage::Configure => 2,
            WorkflowStage::Result => 3,
        }
    }
}

/// Run the wizard TUI.
pub fn run_tui(mut app: WizardApp) -> Result<()> {
    setup_terminal()?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    // Options load once at workflow start, independent of any document.
    app.spawn_catalog();

    let result = run_main_loop(&mut terminal, &mut app);

    restore_terminal()?;

    if app.workflow.is_exited() {
        anyhow::bail!("Session is no longer valid. Please sign in again.");
    }

    result
}

/// Setup the terminal for TUI mode.
fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    // Setup panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    Ok(())
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Main event loop.
fn run_main_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut WizardApp,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                handle_key(key, app);
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
