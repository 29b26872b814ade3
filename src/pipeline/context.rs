use crate::formatters::RenderedLine;
use std::time::{Duration, Instant};

/// Line written between bursts of statements
pub const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Result of processing a single record
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// A statement to write
    Render(RenderedLine),
    /// Not a statement we render
    Ignored,
}

/// Runtime statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub records_read: usize,
    pub statements_rendered: usize,
    pub records_ignored: usize,
    pub errors: usize,
    pub separators: usize,
    pub processing_time: Duration,
}

/// Decides when a quiet period has passed since the last emitted line
#[derive(Debug, Clone)]
pub struct IdleSeparator {
    gap: Duration,
    last: Option<Instant>,
}

impl IdleSeparator {
    pub fn new(gap: Duration) -> Self {
        Self { gap, last: None }
    }

    /// Record a line emitted at `now`; true if a separator should precede it.
    /// The first line never gets one.
    pub fn check(&mut self, now: Instant) -> bool {
        let idle = self
            .last
            .is_some_and(|last| now.saturating_duration_since(last) > self.gap);
        self.last = Some(now);
        idle
    }
}
