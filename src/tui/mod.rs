//! Terminal user interface for the lesson-plan wizard.

mod app;
mod input;
mod ui;

pub use app::{run_tui, WizardApp};
pub use input::handle_key;
pub use ui::draw;
