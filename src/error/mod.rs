use std::fmt::Display;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The unified error type for bigram aggregation
#[derive(Error, Debug)]
pub enum BigramError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single record could not be tokenized. The driver skips the record.
    #[error("[E{code:04}] Tokenization error: {message}")]
    Tokenize {
        code: u16,
        message: String,
        record: Option<usize>,
    },

    #[error("[E{code:04}] Partition error: {message}")]
    Partition {
        code: u16,
        message: String,
        partition: Option<usize>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A broken accumulator state. Never caused by input data.
    #[error("[E{code:04}] Aggregation invariant violated: {message}")]
    Invariant { code: u16, message: String },

    #[error("[E{code:04}] No valid records: {skipped} record(s) skipped")]
    NoValidRecords { code: u16, skipped: u64 },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BigramError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a tokenization error with specific code
    pub fn tokenize(code: u16, message: impl Into<String>) -> Self {
        Self::Tokenize {
            code,
            message: message.into(),
            record: None,
        }
    }

    /// Create a partition error with default code
    pub fn partition(message: impl Into<String>) -> Self {
        Self::partition_with_code(ErrorCode::PARTITION_GENERIC, message, None)
    }

    /// Create a partition error with specific code and partition id
    pub fn partition_with_code(
        code: u16,
        message: impl Into<String>,
        partition: Option<usize>,
    ) -> Self {
        Self::Partition {
            code,
            message: message.into(),
            partition,
            source: None,
        }
    }

    /// Create an invariant violation with specific code
    pub fn invariant(code: u16, message: impl Into<String>) -> Self {
        Self::Invariant {
            code,
            message: message.into(),
        }
    }

    pub fn no_valid_records(skipped: u64) -> Self {
        Self::NoValidRecords {
            code: ErrorCode::AGG_NO_VALID_RECORDS,
            skipped,
        }
    }

    /// Add a source error to this error
    ///
    /// Variants without a source slot are returned unchanged.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Partition { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Tokenize { .. } | Self::Invariant { .. } | Self::NoValidRecords { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Tokenize { message, .. }
            | Self::Partition { message, .. }
            | Self::Invariant { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
            Self::NoValidRecords { .. } => {}
        }
        self
    }

    /// Attach the partition id to a partition error
    pub fn with_partition(mut self, id: usize) -> Self {
        if let Self::Partition {
            partition: ref mut p,
            ..
        } = self
        {
            *p = Some(id);
        }
        self
    }

    /// Attach the record index to a tokenization error
    pub fn with_record(mut self, index: usize) -> Self {
        if let Self::Tokenize {
            record: ref mut r, ..
        } = self
        {
            *r = Some(index);
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Tokenize { .. } => 3,
            Self::Partition { .. } => 4,
            Self::Invariant { .. } => 5,
            Self::NoValidRecords { .. } => 6,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Tokenize { code, .. }
            | Self::Partition { code, .. }
            | Self::Invariant { code, .. }
            | Self::NoValidRecords { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Tokenize {
                message, record, ..
            } => match record {
                Some(index) => format!("Record {} skipped: {}", index, message),
                None => format!("Record skipped: {}", message),
            },
            Self::Partition {
                message, partition, ..
            } => match partition {
                Some(id) => format!("Partition {} failed: {}", id, message),
                None => format!("Partition failed: {}", message),
            },
            Self::Invariant { message, .. } => {
                format!("Internal aggregation invariant violated: {}", message)
            }
            Self::NoValidRecords { skipped, .. } => {
                format!("No valid records to aggregate ({} skipped)", skipped)
            }
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Tokenization failures are recovered by skipping the record; transient
    /// partition I/O is recovered by re-running the partition.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Tokenize { .. } => true,
            Self::Partition { code, .. } => {
                *code == ErrorCode::PARTITION_IO_ERROR || *code == ErrorCode::PARTITION_TASK_FAILED
            }
            _ => false,
        }
    }
}

/// Type alias for Results using BigramError
pub type Result<T> = std::result::Result<T, BigramError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;

impl From<std::io::Error> for BigramError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let (code, message) = match err.kind() {
            ErrorKind::NotFound => (ErrorCode::PARTITION_NOT_FOUND, "Input not found"),
            _ => (ErrorCode::PARTITION_IO_ERROR, "Reading partition failed"),
        };

        BigramError::partition_with_code(code, message, None).with_source(err)
    }
}

impl From<toml::de::Error> for BigramError {
    fn from(err: toml::de::Error) -> Self {
        BigramError::config_with_code(ErrorCode::CONFIG_PARSE_ERROR, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for BigramError {
    fn from(err: serde_json::Error) -> Self {
        BigramError::Other {
            code: ErrorCode::OTHER_OUTPUT,
            message: "JSON rendering failed".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::fmt::Error> for BigramError {
    fn from(err: std::fmt::Error) -> Self {
        BigramError::Other {
            code: ErrorCode::OTHER_OUTPUT,
            message: "Formatting output failed".to_string(),
            source: Some(Box::new(err)),
        }
    }
}
