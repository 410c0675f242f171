use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to load doctor data from {origin}: {message}")]
    DataLoadError { origin: String, message: String },

    #[error("Advice generation failed: {message}")]
    GenerationError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    DataSource,
    ExternalService,
    Validation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序結束碼，Low 視為成功
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl TriageError {
    pub fn data_load(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataLoadError {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::DataLoadError { .. } => ErrorCategory::DataSource,
            Self::ApiError(_) | Self::GenerationError { .. } => ErrorCategory::ExternalService,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            // 外部服務錯誤可重試，不終止會話
            ErrorCategory::ExternalService => ErrorSeverity::Medium,
            ErrorCategory::DataSource => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingConfigError { .. } => {
                "Set the missing value in the environment or in a .env file, e.g. GEMINI_API_KEY=..."
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => "Check the command-line flags or the TOML configuration file",
            Self::DataLoadError { .. } => {
                "Make sure the doctors CSV exists and has the columns Name, Specialty, Distance, lat, lng"
            }
            Self::ApiError(_) | Self::GenerationError { .. } => {
                "Check network connectivity and API quota, then submit the symptoms again"
            }
            Self::ValidationError { .. } => "Enter a short description of your symptoms",
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingConfigError { field } => {
                format!("Required setting {} is not configured", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting {} is invalid: {}", field, reason)
            }
            Self::DataLoadError { message, .. } => {
                format!("Doctor directory could not be loaded: {}", message)
            }
            Self::ApiError(_) | Self::GenerationError { .. } => {
                "The advice service is unavailable right now".to_string()
            }
            Self::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
