use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaterError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing environment variable: {name}")]
    MissingEnvVar { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Notion API returned HTTP {status}: {body}")]
    NotionApiError { status: u16, body: String },

    #[error("OpenAI API returned HTTP {status}: {body}")]
    OpenAiApiError { status: u16, body: String },

    #[error("Model returned unusable output: {message}")]
    ModelOutputError { message: String },

    #[error("Rating criteria page {page_id} is empty or contains no text blocks")]
    EmptyCriteria { page_id: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    ExternalService,
    DataProcessing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RaterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RaterError::MissingEnvVar { .. }
            | RaterError::ConfigError { .. }
            | RaterError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RaterError::ApiError(_) => ErrorCategory::Network,
            RaterError::NotionApiError { .. } | RaterError::OpenAiApiError { .. } => {
                ErrorCategory::ExternalService
            }
            RaterError::SerializationError(_)
            | RaterError::ModelOutputError { .. }
            | RaterError::EmptyCriteria { .. }
            | RaterError::ProcessingError { .. } => ErrorCategory::DataProcessing,
            RaterError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 配置錯誤需要人工修正，重跑也不會好
            RaterError::MissingEnvVar { .. }
            | RaterError::ConfigError { .. }
            | RaterError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
            RaterError::ApiError(_) => ErrorSeverity::Medium,
            // 429/5xx 下次排程重跑即可，4xx 通常是憑證或資料問題
            RaterError::NotionApiError { status, .. }
            | RaterError::OpenAiApiError { status, .. } => {
                if *status == 429 || *status >= 500 {
                    ErrorSeverity::Medium
                } else {
                    ErrorSeverity::High
                }
            }
            RaterError::EmptyCriteria { .. }
            | RaterError::SerializationError(_)
            | RaterError::ModelOutputError { .. }
            | RaterError::ProcessingError { .. } => ErrorSeverity::High,
            RaterError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RaterError::MissingEnvVar { name } => {
                format!("Set {} in the environment or in a local .env file", name)
            }
            RaterError::ConfigError { .. } | RaterError::InvalidConfigValueError { .. } => {
                "Check the TOML config file against the documented fields".to_string()
            }
            RaterError::ApiError(_) => {
                "Check network connectivity; the run can simply be retriggered".to_string()
            }
            RaterError::NotionApiError { status, .. } => match status {
                401 | 403 => "Verify NOTION_API_KEY and that the integration is shared with the page and database".to_string(),
                404 => "Verify NOTION_RESPONSES_DB_ID and NOTION_STANDARDS_PAGE_ID".to_string(),
                429 => "Notion rate limit hit; the next scheduled run will pick the batch up".to_string(),
                _ => "Inspect the response body logged above".to_string(),
            },
            RaterError::OpenAiApiError { status, .. } => match status {
                401 => "Verify OPENAI_API_KEY".to_string(),
                429 => "OpenAI rate limit hit; the next scheduled run will pick the batch up".to_string(),
                _ => "Inspect the response body logged above".to_string(),
            },
            RaterError::ModelOutputError { .. } => {
                "Affected pages were marked 'Error' in Notion for manual review".to_string()
            }
            RaterError::EmptyCriteria { page_id } => {
                format!("Add rating criteria text blocks to Notion page {}", page_id)
            }
            RaterError::SerializationError(_) | RaterError::ProcessingError { .. } => {
                "Inspect the offending payload logged above".to_string()
            }
            RaterError::IoError(_) => "Check filesystem permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RaterError::MissingEnvVar { name } => {
                format!("Required environment variable {} is not set", name)
            }
            RaterError::ConfigError { message } => format!("Configuration problem: {}", message),
            RaterError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            RaterError::ApiError(_) => "A network request failed".to_string(),
            RaterError::NotionApiError { status, .. } => {
                format!("Notion rejected a request (HTTP {})", status)
            }
            RaterError::OpenAiApiError { status, .. } => {
                format!("OpenAI rejected a request (HTTP {})", status)
            }
            RaterError::ModelOutputError { .. } => {
                "The model did not return a usable rating".to_string()
            }
            RaterError::EmptyCriteria { .. } => {
                "The rating criteria page has no text content".to_string()
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RaterError>;
