use crate::utils::error::{RaterError, Result};
use crate::utils::validation::{
    validate_non_empty, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Non-secret tunables. Everything has a default, so running without a
/// config file reproduces the stock behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaterConfig {
    #[serde(default)]
    pub rating: RatingSection,
    #[serde(default)]
    pub notion: NotionSection,
    #[serde(default)]
    pub openai: OpenAiSection,
    #[serde(default)]
    pub properties: PropertySection,
    #[serde(default)]
    pub statuses: StatusSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSection {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionSection {
    #[serde(default = "default_notion_base_url")]
    pub base_url: String,
    #[serde(default = "default_notion_version")]
    pub version: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSection {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

/// Property names in the responses database. Defaults match the original
/// database schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySection {
    #[serde(default = "default_prompt_property")]
    pub prompt: String,
    #[serde(default = "default_response_property")]
    pub response: String,
    #[serde(default = "default_status_property")]
    pub status: String,
    #[serde(default = "default_notes_property")]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSection {
    #[serde(default = "default_unrated_status")]
    pub unrated: String,
    #[serde(default = "default_rated_status")]
    pub rated: String,
    #[serde(default = "default_error_status")]
    pub error: String,
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_notion_base_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_prompt_property() -> String {
    "Prompt".to_string()
}

fn default_response_property() -> String {
    "AI Response".to_string()
}

fn default_status_property() -> String {
    "Status".to_string()
}

fn default_notes_property() -> String {
    "Evaluation Notes".to_string()
}

fn default_unrated_status() -> String {
    "To be Rated".to_string()
}

fn default_rated_status() -> String {
    "Rated".to_string()
}

fn default_error_status() -> String {
    "Error".to_string()
}

impl Default for RatingSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            base_url: default_notion_base_url(),
            version: default_notion_version(),
            page_size: default_page_size(),
        }
    }
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for PropertySection {
    fn default() -> Self {
        Self {
            prompt: default_prompt_property(),
            response: default_response_property(),
            status: default_status_property(),
            notes: default_notes_property(),
        }
    }
}

impl Default for StatusSection {
    fn default() -> Self {
        Self {
            unrated: default_unrated_status(),
            rated: default_rated_status(),
            error: default_error_status(),
        }
    }
}

impl RaterConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: RaterConfig =
            toml::from_str(&content).map_err(|e| RaterError::ConfigError {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;

        config.validate()?;
        Ok(config)
    }
}

impl Validate for RaterConfig {
    fn validate(&self) -> Result<()> {
        validate_url("notion.base_url", &self.notion.base_url)?;
        validate_url("openai.base_url", &self.openai.base_url)?;
        validate_non_empty("rating.model", &self.rating.model)?;
        validate_non_empty("notion.version", &self.notion.version)?;
        validate_positive_number("rating.timeout_seconds", self.rating.timeout_seconds, 1)?;
        validate_positive_number("notion.page_size", self.notion.page_size as u64, 1)?;

        if self.notion.page_size > 100 {
            return Err(RaterError::InvalidConfigValueError {
                field: "notion.page_size".to_string(),
                value: self.notion.page_size.to_string(),
                reason: "Notion caps page_size at 100".to_string(),
            });
        }

        validate_non_empty("properties.prompt", &self.properties.prompt)?;
        validate_non_empty("properties.response", &self.properties.response)?;
        validate_non_empty("properties.status", &self.properties.status)?;
        validate_non_empty("properties.notes", &self.properties.notes)?;
        validate_non_empty("statuses.unrated", &self.statuses.unrated)?;
        validate_non_empty("statuses.rated", &self.statuses.rated)?;
        validate_non_empty("statuses.error", &self.statuses.error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_original_schema() {
        let config = RaterConfig::default();
        assert_eq!(config.rating.model, "gpt-4-turbo");
        assert_eq!(config.properties.prompt, "Prompt");
        assert_eq!(config.properties.response, "AI Response");
        assert_eq!(config.statuses.unrated, "To be Rated");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rating]
model = "gpt-4o-mini"

[properties]
status = "Review State"
"#
        )
        .unwrap();

        let config = RaterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rating.model, "gpt-4o-mini");
        assert_eq!(config.properties.status, "Review State");
        // 未設定的欄位保持預設值
        assert_eq!(config.properties.prompt, "Prompt");
        assert_eq!(config.notion.base_url, "https://api.notion.com");
    }

    #[test]
    fn oversized_page_size_is_rejected() {
        let config = RaterConfig {
            notion: NotionSection {
                page_size: 500,
                ..NotionSection::default()
            },
            ..RaterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [[[").unwrap();
        assert!(RaterConfig::from_file(file.path()).is_err());
    }
}
