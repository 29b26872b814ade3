use crate::formatters::RenderConfig;
use crate::input_format::{CsvLayout, InputFormat};
use std::time::Duration;

/// Configuration for pipeline behavior
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub error_strategy: ErrorStrategy,
    pub input_format: InputFormat,
    pub layout: CsvLayout,
    pub render: RenderConfig,
    /// Idle time after which a separator line is printed; None disables it
    pub separator_gap: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            error_strategy: ErrorStrategy::FailFast,
            input_format: InputFormat::default(),
            layout: CsvLayout::default(),
            render: RenderConfig::default(),
            separator_gap: Some(Duration::from_secs(1)),
        }
    }
}

/// Simple error handling strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorStrategy {
    /// Skip problematic records and continue processing
    Skip,
    /// Stop processing on first error
    FailFast,
}
