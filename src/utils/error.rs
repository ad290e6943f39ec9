use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {message}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Environment variable {name} is not set")]
    MissingEnv { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Check '{check}' failed: {detail}")]
    CheckFailed { check: String, detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    Network,
    Backend,
    Database,
    Configuration,
    Output,
    Assertion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 對應的程序退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SmokeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmokeError::Http(_) => ErrorCategory::Network,
            SmokeError::HttpStatus { .. } | SmokeError::UnexpectedResponse { .. } => {
                ErrorCategory::Backend
            }
            SmokeError::Database { .. } | SmokeError::MissingEnv { .. } => ErrorCategory::Database,
            SmokeError::Io(_) | SmokeError::Serialization(_) | SmokeError::Csv(_) => {
                ErrorCategory::Output
            }
            SmokeError::ConfigError { .. }
            | SmokeError::ConfigValidationError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SmokeError::CheckFailed { .. } => ErrorCategory::Assertion,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路或 5xx 錯誤通常是暫時性的，重跑即可
            SmokeError::Http(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            SmokeError::HttpStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            SmokeError::Http(_)
            | SmokeError::HttpStatus { .. }
            | SmokeError::UnexpectedResponse { .. }
            | SmokeError::CheckFailed { .. } => ErrorSeverity::High,
            SmokeError::Database { .. } => ErrorSeverity::High,
            SmokeError::MissingEnv { .. }
            | SmokeError::ConfigError { .. }
            | SmokeError::ConfigValidationError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::MissingConfigError { .. } => ErrorSeverity::High,
            SmokeError::Io(_) | SmokeError::Serialization(_) | SmokeError::Csv(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SmokeError::Http(e) if e.is_timeout() => {
                "The backend did not answer in time; raise --timeout or check server load".to_string()
            }
            SmokeError::Http(_) => {
                "Check that the backend is running and --base-url points at it".to_string()
            }
            SmokeError::HttpStatus { status: 401, .. } | SmokeError::HttpStatus { status: 403, .. } => {
                "Verify the login credentials or the session token".to_string()
            }
            SmokeError::HttpStatus { status: 400, .. } => {
                "The backend rejected the request body; check the credentials or registration fields"
                    .to_string()
            }
            SmokeError::HttpStatus { status: 404, .. } => {
                "Endpoint not found; confirm the base URL and API version".to_string()
            }
            SmokeError::HttpStatus { .. } => "Inspect the backend logs for this request".to_string(),
            SmokeError::UnexpectedResponse { .. } => {
                "The backend response shape changed; compare it with the expected contract".to_string()
            }
            SmokeError::Database { .. } => {
                "Verify the connection string, network access and database credentials".to_string()
            }
            SmokeError::MissingEnv { name } => format!("Export {} before running the check", name),
            SmokeError::Io(_) => "Check file permissions and disk space".to_string(),
            SmokeError::Serialization(_) | SmokeError::Csv(_) => {
                "The report could not be encoded; try a different report format".to_string()
            }
            SmokeError::ConfigError { .. } | SmokeError::ConfigValidationError { .. } => {
                "Fix the configuration file syntax and values".to_string()
            }
            SmokeError::InvalidConfigValueError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
            SmokeError::MissingConfigError { field } => {
                format!("Set '{}' in the config file, on the command line or via env", field)
            }
            SmokeError::CheckFailed { .. } => {
                "The backend contract is broken; compare the response with the expected fields"
                    .to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SmokeError::Http(_) => format!("Could not reach the backend: {}", self),
            SmokeError::HttpStatus {
                endpoint,
                status,
                message,
            } => format!("Backend rejected {} with status {}: {}", endpoint, status, message),
            SmokeError::Database { message } => format!("Database connection failed: {}", message),
            SmokeError::MissingEnv { name } => format!("{} is not set", name),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
