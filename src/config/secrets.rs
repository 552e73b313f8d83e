use crate::utils::error::{RaterError, Result};
use crate::utils::validation::{validate_non_empty, validate_notion_id, Validate};
use std::fmt;

pub const NOTION_API_KEY: &str = "NOTION_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const NOTION_RESPONSES_DB_ID: &str = "NOTION_RESPONSES_DB_ID";
pub const NOTION_STANDARDS_PAGE_ID: &str = "NOTION_STANDARDS_PAGE_ID";

/// Credentials and resource IDs. Env-only: these never appear in the TOML
/// config and are injected as secrets by the workflow.
#[derive(Clone)]
pub struct Secrets {
    pub notion_api_key: String,
    pub openai_api_key: String,
    pub responses_db_id: String,
    pub standards_page_id: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            notion_api_key: required_var(NOTION_API_KEY)?,
            openai_api_key: required_var(OPENAI_API_KEY)?,
            responses_db_id: required_var(NOTION_RESPONSES_DB_ID)?,
            standards_page_id: required_var(NOTION_STANDARDS_PAGE_ID)?,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| RaterError::MissingEnvVar {
        name: name.to_string(),
    })
}

impl Validate for Secrets {
    fn validate(&self) -> Result<()> {
        validate_non_empty(NOTION_API_KEY, &self.notion_api_key)?;
        validate_non_empty(OPENAI_API_KEY, &self.openai_api_key)?;
        validate_notion_id(NOTION_RESPONSES_DB_ID, &self.responses_db_id)?;
        validate_notion_id(NOTION_STANDARDS_PAGE_ID, &self.standards_page_id)?;
        Ok(())
    }
}

// 避免把金鑰寫進日誌
impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("notion_api_key", &"***")
            .field("openai_api_key", &"***")
            .field("responses_db_id", &self.responses_db_id)
            .field("standards_page_id", &self.standards_page_id)
            .finish()
    }
}
