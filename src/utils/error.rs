use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Parquet decoding error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow conversion error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cannot parse '{value}' for {field} as an ISO-8601 date-time")]
    DateTimeParseError { field: String, value: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Schema error: {message}")]
    SchemaError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::HttpError(_) => ErrorCategory::Network,
            EtlError::ParquetError(_)
            | EtlError::ArrowError(_)
            | EtlError::SchemaError { .. } => ErrorCategory::Data,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::SerializationError(_)
            | EtlError::DateTimeParseError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::HttpError(_) => "Check network access to the trip data host and try again",
            EtlError::ParquetError(_) | EtlError::ArrowError(_) => {
                "The downloaded file is not a readable Parquet file; verify the source URL"
            }
            EtlError::SchemaError { .. } => {
                "Check the pickup/dropoff column mapping for this taxi type"
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Make sure the output path exists and is writable"
            }
            EtlError::SerializationError(_) => "BRUIN_VARS must be a valid JSON object",
            EtlError::DateTimeParseError { .. } => {
                "Use ISO-8601 dates such as 2023-01-01 or 2023-01-01T00:00:00"
            }
            EtlError::MissingConfigError { .. } => "Provide the missing value and rerun",
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                "Fix the configuration value and rerun"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the trip data host: {}", self),
            ErrorCategory::Data => format!("Trip data could not be read: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Storage => format!("Could not write the output table: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
