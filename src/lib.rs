// src/lib.rs
pub mod classify;
pub mod colors;
pub mod error;
pub mod formatters;
pub mod input_format;
pub mod logging;
pub mod normalize;
pub mod params;
pub mod pipeline;

pub use error::*;

pub use classify::{classify, StatementKind};
pub use colors::Color;
pub use formatters::{quote, quote_bytes, RenderConfig, RenderedLine, Renderer};
pub use input_format::{CsvLayout, InputFormat, LogRecord, RecordReader};
pub use normalize::normalize;
pub use params::{build_args, Argument, ArgumentList, Binding};
pub use pipeline::{ErrorStrategy, LogPipeline, PipelineConfig, ProcessResult, ProcessingStats};
