#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Malformed parameter index '{token}' in bindings")]
    MalformedParameterIndex { token: String },

    #[error("Record {line} has {fields} fields but at least {required} are required")]
    ShortRecord {
        line: u64,
        fields: usize,
        required: usize,
    },

    #[error("{format} parse error on line {line}: {message}")]
    Parse {
        line: u64,
        format: &'static str,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessingError {
    /// True when the output side went away (e.g. `pglogfmt | head`)
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, ProcessingError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
