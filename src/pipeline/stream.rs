// src/pipeline/stream.rs
use std::io::{BufRead, Write};
use std::time::Instant;

use crate::classify::{classify, StatementKind};
use crate::error::ProcessingError;
use crate::formatters::Renderer;
use crate::input_format::{record_reader, LogRecord};
use crate::normalize::normalize;
use crate::params::{build_args, ArgumentList};
use crate::pipeline::config::{ErrorStrategy, PipelineConfig};
use crate::pipeline::context::{IdleSeparator, ProcessResult, ProcessingStats, SEPARATOR};

/// Reads log records, renders the SQL ones and writes them out
pub struct LogPipeline {
    config: PipelineConfig,
    renderer: Renderer,
    separator: Option<IdleSeparator>,
    stats: ProcessingStats,
}

impl LogPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        LogPipeline {
            renderer: Renderer::new(config.render.clone()),
            separator: config.separator_gap.map(IdleSeparator::new),
            config,
            stats: ProcessingStats::default(),
        }
    }

    /// Classify, normalize, bind and render a single record
    pub fn process_record(&self, record: &LogRecord) -> Result<ProcessResult, ProcessingError> {
        let kind = classify(&record.operation);
        let line = match kind {
            StatementKind::Ignored => return Ok(ProcessResult::Ignored),
            StatementKind::Simple => {
                self.renderer
                    .render(kind, &record.operation, &ArgumentList::new())
            }
            StatementKind::Parsed => {
                let text = normalize(&record.statement_text);
                let args = build_args(&record.parameter_bindings)?;
                self.renderer.render(kind, &text, &args)
            }
        };
        Ok(ProcessResult::Render(line))
    }

    /// Process a whole stream, one record at a time
    pub fn process<R: BufRead, W: Write>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<ProcessingStats, ProcessingError> {
        let start_time = Instant::now();
        let mut file_stats = ProcessingStats::default();
        let mut reader = record_reader(self.config.input_format, input, self.config.layout);

        loop {
            let result = reader
                .next_record()
                .and_then(|record| match record {
                    Some(record) => self.process_record(&record).map(Some),
                    None => Ok(None),
                });

            let processed = match result {
                Ok(Some(processed)) => processed,
                Ok(None) => break,
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => {
                    file_stats.records_read += 1;
                    match self.config.error_strategy {
                        ErrorStrategy::FailFast => return Err(e),
                        ErrorStrategy::Skip => {
                            file_stats.errors += 1;
                            tracing::warn!(error = %e, "skipping record");
                            continue;
                        }
                    }
                }
            };

            file_stats.records_read += 1;
            match processed {
                ProcessResult::Render(line) => {
                    if let Err(e) = self.write_line(output, &line.text, &mut file_stats) {
                        // Reader went away (e.g. piped into head)
                        if e.is_broken_pipe() {
                            tracing::debug!("output closed, stopping");
                            break;
                        }
                        return Err(e);
                    }
                    file_stats.statements_rendered += 1;
                    tracing::trace!(color = line.color.name(), "rendered statement");
                }
                ProcessResult::Ignored => {
                    file_stats.records_ignored += 1;
                    tracing::trace!(record = file_stats.records_read, "ignored record");
                }
            }
        }

        file_stats.processing_time = start_time.elapsed();

        self.stats.records_read += file_stats.records_read;
        self.stats.statements_rendered += file_stats.statements_rendered;
        self.stats.records_ignored += file_stats.records_ignored;
        self.stats.errors += file_stats.errors;
        self.stats.separators += file_stats.separators;
        self.stats.processing_time += file_stats.processing_time;

        Ok(file_stats)
    }

    fn write_line<W: Write>(
        &mut self,
        output: &mut W,
        line: &str,
        stats: &mut ProcessingStats,
    ) -> Result<(), ProcessingError> {
        if let Some(separator) = self.separator.as_mut() {
            if separator.check(Instant::now()) {
                writeln!(output, "{}", SEPARATOR)?;
                stats.separators += 1;
            }
        }
        writeln!(output, "{}", line)?;
        // Keep a tailing terminal current
        output.flush()?;
        Ok(())
    }

    /// Get current accumulated stats
    pub fn get_stats(&self) -> &ProcessingStats {
        &self.stats
    }
}

/// Errors no strategy can skip past
fn is_fatal(error: &ProcessingError) -> bool {
    match error {
        ProcessingError::Io(_) => true,
        ProcessingError::Csv(e) => e.is_io_error(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::RenderConfig;
    use std::io::Cursor;

    fn plain_config() -> PipelineConfig {
        PipelineConfig {
            render: RenderConfig {
                use_colors: false,
                ..RenderConfig::default()
            },
            separator_gap: None,
            ..PipelineConfig::default()
        }
    }

    fn record(op: &str, text: &str, params: &str) -> LogRecord {
        LogRecord {
            operation: op.to_string(),
            statement_text: text.to_string(),
            parameter_bindings: params.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_process_record_kinds() {
        let pipeline = LogPipeline::new(plain_config());

        let simple = pipeline.process_record(&record("BEGIN", "ignored text", "")).unwrap();
        match simple {
            ProcessResult::Render(line) => assert_eq!(line.text, "BEGIN"),
            other => panic!("unexpected {:?}", other),
        }

        let ignored = pipeline
            .process_record(&record("idle", "statement: SELECT 1", ""))
            .unwrap();
        assert_eq!(ignored, ProcessResult::Ignored);
    }

    #[test]
    fn test_process_record_parsed() {
        let pipeline = LogPipeline::new(plain_config());
        let result = pipeline
            .process_record(&record(
                "SELECT",
                "duration: 1.5 ms  execute <unnamed>: SELECT \"id\" FROM \"users\" WHERE name = $1 AND age > $2",
                "parameters: $2 = '30', $1 = 'o''hara'",
            ))
            .unwrap();
        match result {
            ProcessResult::Render(line) => {
                // The embedded quote cuts the first value short
                assert_eq!(line.text, "SELECT id FROM users WHERE name = 'o' AND age > '30'");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_index_fails_fast() {
        let pipeline = LogPipeline::new(plain_config());
        let err = pipeline
            .process_record(&record("DELETE", "DELETE FROM t WHERE id = $1", "$0 = '1'"))
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MalformedParameterIndex { .. }));
    }

    #[test]
    fn test_stats_accumulate_across_streams() {
        let mut pipeline = LogPipeline::new(PipelineConfig {
            input_format: crate::input_format::InputFormat::Jsonlog,
            ..plain_config()
        });
        let input = "{\"command_tag\":\"COMMIT\"}\n{\"command_tag\":\"VACUUM\"}\n";

        let mut output = Vec::new();
        pipeline.process(Cursor::new(input), &mut output).unwrap();
        pipeline.process(Cursor::new(input), &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "COMMIT\nCOMMIT\n");
        let stats = pipeline.get_stats();
        assert_eq!(stats.records_read, 4);
        assert_eq!(stats.statements_rendered, 2);
        assert_eq!(stats.records_ignored, 2);
    }
}
