use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Schema error in {source_name}: {message}")]
    SchemaError {
        source_name: String,
        message: String,
    },

    #[error("Data quality error at row {row}: label {label:?} has no lookup entry")]
    DataQualityError { row: usize, label: String },

    #[error("IO error while {operation} '{path}': {source}")]
    IoError {
        operation: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value {value:?} for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Schema,
    DataQuality,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn schema(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn io(operation: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaError { .. } | Self::CsvError(_) => ErrorCategory::Schema,
            Self::DataQualityError { .. } => ErrorCategory::DataQuality,
            Self::IoError { .. } => ErrorCategory::Io,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::DataQuality => ErrorSeverity::Medium,
            ErrorCategory::Schema => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Schema => {
                "Check that the input and lookup files contain the configured columns and numeric values"
            }
            ErrorCategory::DataQuality => {
                "Add the missing label to the lookup table, or disable strict mode to use the unknown sentinel"
            }
            ErrorCategory::Io => "Check that the path exists and is readable/writable",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DataQualityError { row, label } => {
                format!("Row {} uses label '{}', which the lookup table does not know", row, label)
            }
            Self::IoError { operation, path, .. } => {
                format!("Could not finish {} {}", operation, path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = EtlError::schema("input.csv", "missing column 'value'");
        assert_eq!(err.category(), ErrorCategory::Schema);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = EtlError::DataQualityError {
            row: 3,
            label: "lake".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::DataQuality);
        assert!(err.user_friendly_message().contains("lake"));
    }

    #[test]
    fn test_io_error_keeps_path_and_operation() {
        let err = EtlError::io(
            "reading",
            "data/obs.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let message = err.to_string();
        assert!(message.contains("reading"));
        assert!(message.contains("data/obs.csv"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
