// src/input_format.rs - record framing for the server's structured log formats

use crate::error::ProcessingError;
use serde::Deserialize;
use std::io::{BufRead, Read};

#[derive(Clone, Copy, Debug, Default, PartialEq, clap::ValueEnum)]
pub enum InputFormat {
    /// csvlog: one CSV row per log entry, fields by position
    #[default]
    #[value(name = "csvlog")]
    Csvlog,
    /// jsonlog: one JSON object per line
    #[value(name = "jsonlog")]
    Jsonlog,
}

/// The three fields of a log entry the formatter cares about.
///
/// Bindings stay as raw bytes: a server running with a non-UTF-8 encoding
/// logs bound values in that encoding, and they are escaped byte by byte
/// when rendered. The command tag and message are decoded lossily.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    /// Command tag, e.g. `SELECT` or `COMMIT`
    pub operation: String,
    /// Message text, e.g. `duration: 0.1 ms  execute <unnamed>: SELECT ...`
    pub statement_text: String,
    /// Detail text, e.g. `parameters: $1 = 'a'`
    pub parameter_bindings: Vec<u8>,
}

/// Zero-based csvlog column positions for each role
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvLayout {
    pub operation: usize,
    pub statement_text: usize,
    pub parameter_bindings: usize,
}

impl CsvLayout {
    fn required_fields(&self) -> usize {
        self.operation
            .max(self.statement_text)
            .max(self.parameter_bindings)
            + 1
    }
}

impl Default for CsvLayout {
    fn default() -> Self {
        // command_tag, message, detail
        CsvLayout {
            operation: 7,
            statement_text: 13,
            parameter_bindings: 14,
        }
    }
}

pub trait RecordReader {
    /// Next record, or None at end of input
    fn next_record(&mut self) -> Result<Option<LogRecord>, ProcessingError>;
}

pub struct CsvlogReader<R: Read> {
    reader: csv::Reader<R>,
    layout: CsvLayout,
    row: csv::ByteRecord,
}

impl<R: Read> CsvlogReader<R> {
    pub fn new(input: R, layout: CsvLayout) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);
        Self {
            reader,
            layout,
            row: csv::ByteRecord::new(),
        }
    }
}

impl<R: Read> RecordReader for CsvlogReader<R> {
    fn next_record(&mut self) -> Result<Option<LogRecord>, ProcessingError> {
        if !self.reader.read_byte_record(&mut self.row)? {
            return Ok(None);
        }

        let required = self.layout.required_fields();
        if self.row.len() < required {
            return Err(ProcessingError::ShortRecord {
                line: self.row.position().map_or(0, |p| p.line()),
                fields: self.row.len(),
                required,
            });
        }

        let field = |i: usize| self.row.get(i).unwrap_or_default();
        let text = |i: usize| String::from_utf8_lossy(field(i)).into_owned();
        Ok(Some(LogRecord {
            operation: text(self.layout.operation),
            statement_text: text(self.layout.statement_text),
            parameter_bindings: field(self.layout.parameter_bindings).to_vec(),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct JsonlogEntry {
    #[serde(default)]
    command_tag: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

pub struct JsonlogReader<R: BufRead> {
    input: R,
    line: Vec<u8>,
    line_number: u64,
}

impl<R: BufRead> JsonlogReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: Vec::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> RecordReader for JsonlogReader<R> {
    fn next_record(&mut self) -> Result<Option<LogRecord>, ProcessingError> {
        loop {
            self.line.clear();
            if self.input.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            // JSON text is UTF-8 by definition; stray bytes become U+FFFD
            let decoded = String::from_utf8_lossy(&self.line);
            let content = decoded.trim();
            if content.is_empty() {
                continue;
            }

            let entry: JsonlogEntry =
                serde_json::from_str(content).map_err(|e| ProcessingError::Parse {
                    line: self.line_number,
                    format: "jsonlog",
                    message: e.to_string(),
                })?;

            return Ok(Some(LogRecord {
                operation: entry.command_tag.unwrap_or_default(),
                statement_text: entry.message.unwrap_or_default(),
                parameter_bindings: entry.detail.unwrap_or_default().into_bytes(),
            }));
        }
    }
}

/// Build the reader for `format` over `input`
pub fn record_reader<'a, R: BufRead + 'a>(
    format: InputFormat,
    input: R,
    layout: CsvLayout,
) -> Box<dyn RecordReader + 'a> {
    match format {
        InputFormat::Csvlog => Box::new(CsvlogReader::new(input, layout)),
        InputFormat::Jsonlog => Box::new(JsonlogReader::new(input)),
    }
}
