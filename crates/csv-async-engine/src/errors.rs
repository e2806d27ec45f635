use thiserror::Error;

pub type CsvResult<T> = Result<T, CsvError>;

/// Stable identifiers for engine failures, independent of message wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Csv,
    Io,
    InvalidOption,
    InconsistentRecordLength,
    RecordDontMatchColumns,
    MaxRecordSize,
    InvalidObjname,
    UndiscoverableColumns,
    InvalidRecord,
    UnboundedGeneration,
    Handler,
    HandlerPanicked,
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("Invalid record length: expected {expected} fields, found {found} on line {line}")]
    InconsistentRecordLength {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Invalid record length: columns length is {expected}, got {found} on line {line}")]
    RecordDontMatchColumns {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Max record size exceeded: {size} bytes on line {line} (max: {max})")]
    MaxRecordSize { line: u64, size: usize, max: usize },

    #[error("Invalid objname: {0}")]
    InvalidObjname(String),

    #[error("Undiscoverable columns: header requires the columns option or object records")]
    UndiscoverableColumns,

    #[error("Invalid record: expected an array or an object, found {0}")]
    InvalidRecord(String),

    #[error("Unbounded generation: one of `length`, `duration` or `end` is required")]
    UnboundedGeneration,

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Handler panicked while transforming row {row}")]
    HandlerPanicked { row: usize },
}

impl CsvError {
    /// Error raised from inside a user transform handler
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    pub(crate) fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Csv(_) => ErrorCode::Csv,
            Self::Io(_) => ErrorCode::Io,
            Self::InvalidOption { .. } => ErrorCode::InvalidOption,
            Self::InconsistentRecordLength { .. } => ErrorCode::InconsistentRecordLength,
            Self::RecordDontMatchColumns { .. } => ErrorCode::RecordDontMatchColumns,
            Self::MaxRecordSize { .. } => ErrorCode::MaxRecordSize,
            Self::InvalidObjname(_) => ErrorCode::InvalidObjname,
            Self::UndiscoverableColumns => ErrorCode::UndiscoverableColumns,
            Self::InvalidRecord(_) => ErrorCode::InvalidRecord,
            Self::UnboundedGeneration => ErrorCode::UnboundedGeneration,
            Self::Handler(_) => ErrorCode::Handler,
            Self::HandlerPanicked { .. } => ErrorCode::HandlerPanicked,
        }
    }

    /// Record-level failures that `skip_lines_with_error` may discard
    pub(crate) fn is_record_level(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::Csv
                | ErrorCode::InconsistentRecordLength
                | ErrorCode::RecordDontMatchColumns
                | ErrorCode::MaxRecordSize
        )
    }
}
