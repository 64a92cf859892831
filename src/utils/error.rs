use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostmarkError {
    /// 送出前的必要欄位檢查失敗，`parameter` 為完整的錯誤描述
    #[error("{parameter}")]
    MissingValue { parameter: String },

    #[error("You tried to send email to a recipient that has been marked as inactive: {message}")]
    InactiveRecipient { message: String },

    #[error("Unprocessable Entity: {message}")]
    UnprocessableEntity { message: String },

    #[error("Internal server error at Postmark. Admins have been alerted: {message}")]
    ServerError { message: String },

    #[error("Sending Unauthorized - incorrect API key")]
    Unauthorized,

    #[error("Postmark request failed with status {status}: {message}")]
    SendError { status: u16, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Failed to reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("MIME parsing error: {0}")]
    MimeError(#[from] mailparse::MailParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PostmarkError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Delivery,
    Provider,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PostmarkError {
    pub fn missing_value(parameter: impl Into<String>) -> Self {
        PostmarkError::MissingValue {
            parameter: parameter.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PostmarkError::MissingValue { .. } | PostmarkError::ValidationError { .. } => {
                ErrorCategory::Validation
            }
            PostmarkError::InactiveRecipient { .. } | PostmarkError::UnprocessableEntity { .. } => {
                ErrorCategory::Delivery
            }
            PostmarkError::ServerError { .. }
            | PostmarkError::Unauthorized
            | PostmarkError::SendError { .. } => ErrorCategory::Provider,
            PostmarkError::Transport(_) => ErrorCategory::Network,
            PostmarkError::ConfigError { .. }
            | PostmarkError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PostmarkError::SerializationError(_)
            | PostmarkError::IoError(_)
            | PostmarkError::MimeError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Delivery => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Provider => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端自行重送是否可能成功（本函式庫不做重試）
    pub fn is_retryable(&self) -> bool {
        match self {
            PostmarkError::ServerError { .. } => true,
            PostmarkError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PostmarkError::MissingValue { .. } => {
                "Fill in the missing message field and send again".to_string()
            }
            PostmarkError::InactiveRecipient { .. } => {
                "Reactivate the recipient from the bounce API or remove it from the message"
                    .to_string()
            }
            PostmarkError::UnprocessableEntity { .. } => {
                "Check the message fields against the Postmark API documentation".to_string()
            }
            PostmarkError::ServerError { .. } => {
                "Postmark is having trouble, try again later".to_string()
            }
            PostmarkError::Unauthorized => {
                "Check the server API token (POSTMARK_API_KEY or --api-key)".to_string()
            }
            PostmarkError::Transport(_) => {
                "Check network connectivity and the configured API URL".to_string()
            }
            PostmarkError::ConfigError { .. } | PostmarkError::InvalidConfigValueError { .. } => {
                "Review the configuration file and POSTMARK_* environment variables".to_string()
            }
            PostmarkError::IoError(_) => "Check that the file exists and is readable".to_string(),
            PostmarkError::MimeError(_) => {
                "Make sure the attachment is a well-formed MIME part".to_string()
            }
            _ => "See the error message for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => format!("The message is incomplete: {}", self),
            ErrorCategory::Delivery => format!("Postmark refused the message: {}", self),
            ErrorCategory::Provider => format!("Postmark returned an error: {}", self),
            ErrorCategory::Network => format!("Could not reach Postmark: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }
}
