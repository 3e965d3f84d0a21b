//! Configuration
//!
//! Layered configuration (defaults → global → project → env) assembled
//! once at the process boundary.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AnalysisConfig, BackendKind, Config, LlmConfig, SourceConfig};
