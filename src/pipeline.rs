// src/pipeline.rs
pub mod config;
pub mod context;
pub mod stream;

pub use config::{ErrorStrategy, PipelineConfig};
pub use context::{IdleSeparator, ProcessResult, ProcessingStats, SEPARATOR};
pub use stream::LogPipeline;
