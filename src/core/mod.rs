//! Core module
//!
//! Configuration and diagnostics shared by the AI systems

mod config;
pub(crate) mod diagnostics;

pub use config::{AiConfig, ConfigError, GridConfig};
pub use diagnostics::{Diagnostic, DiagnosticHook};
