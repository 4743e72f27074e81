//! # Lessonforge
//!
//! Terminal wizard for turning a course outline into an AI-generated
//! lesson plan.
//!
//! Lessonforge uploads a unit-outline PDF to the lesson-plan service,
//! lets you configure a plan from the extracted subjects and topics, and
//! renders or downloads the generated result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install lessonforge
//!
//! # Open the wizard
//! lessonforge
//! ```
//!
//! The service URL comes from `~/.config/lessonforge/config.toml` or
//! `LESSONFORGE_URL`; the bearer credential from `LESSONFORGE_TOKEN`.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::uninlined_format_args)]

pub mod api;
pub mod core;
pub mod render;
pub mod tui;
pub mod workflow;

pub use api::{
    ApiError, ExtractionResult, GeneratedPlan, HttpPlanService, OptionCatalog, PlanRequest,
    PlanService,
};
pub use core::{Config, Session};
pub use workflow::{FormField, PlanForm, Workflow, WorkflowStage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "lessonforge";
