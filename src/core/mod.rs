//! Core types shared across the application: configuration and the
//! injected session context.

mod config;
mod session;

pub use config::{Config, DownloadConfig, ServiceConfig, UiConfig};
pub use session::Session;
