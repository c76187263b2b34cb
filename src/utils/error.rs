use crate::domain::model::FetchFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    Fetch(FetchFailure),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::Fetch(_) => ErrorCategory::Network,
            EtlError::Database(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::TomlError(_) => ErrorCategory::Configuration,
            EtlError::SerializationError(_) | EtlError::ValidationError { .. } => {
                ErrorCategory::Data
            }
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::Fetch(_) | EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::ValidationError { .. } | EtlError::SerializationError(_) => {
                ErrorSeverity::High
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::TomlError(_) => ErrorSeverity::High,
            EtlError::Database(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network access to the vacancies API and the configured base URL"
            }
            ErrorCategory::Storage => {
                "Check that PostgreSQL is running and the user/password/host/port settings are correct"
            }
            ErrorCategory::Configuration => {
                "Review the configuration file, environment variables and command-line flags"
            }
            ErrorCategory::Data => "The API returned data in an unexpected shape; rerun with --verbose",
            ErrorCategory::System => "Check terminal input/output and file permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::Fetch(failure) => format!("Could not fetch data: {}", failure),
            EtlError::Database(e) => format!("Database operation failed: {}", e),
            EtlError::MissingConfigError { field } => {
                format!("Required setting '{}' is not set", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}
