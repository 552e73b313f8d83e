use crate::config::file::{PropertySection, StatusSection};
use crate::config::{RaterConfig, Secrets};
use crate::domain::model::{CandidateResponse, Rating, RatingCriteria, SourceRow};
use crate::domain::ports::ReviewStore;
use crate::utils::error::{RaterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// `ReviewStore` backed by the Notion REST API. Criteria come from a plain
/// page (block children), candidates from a database query, and ratings go
/// back as page property updates.
pub struct NotionStore {
    client: Client,
    base_url: String,
    version: String,
    page_size: u32,
    api_key: String,
    responses_db_id: String,
    standards_page_id: String,
    properties: PropertySection,
    statuses: StatusSection,
}

impl NotionStore {
    pub fn new(config: &RaterConfig, secrets: &Secrets) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.rating.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.notion.base_url.trim_end_matches('/').to_string(),
            version: config.notion.version.clone(),
            page_size: config.notion.page_size,
            api_key: secrets.notion_api_key.clone(),
            responses_db_id: secrets.responses_db_id.clone(),
            standards_page_id: secrets.standards_page_id.clone(),
            properties: config.properties.clone(),
            statuses: config.statuses.clone(),
        })
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
            .query(query)
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn patch(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaterError::NotionApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Maps one database row to a `SourceRow`. A row missing its title or
    /// response text is carried as `Malformed` so the load phase can mark
    /// the page 'Error' instead of dropping it.
    fn row_to_source(&self, row: &Value) -> Option<SourceRow> {
        let page_id = row.get("id").and_then(|v| v.as_str())?.to_string();

        let prompt = first_plain_text(row, &self.properties.prompt, "title");
        let response = first_plain_text(row, &self.properties.response, "rich_text");

        match (prompt, response) {
            (Some(prompt), Some(response)) => Some(SourceRow::Complete(CandidateResponse {
                page_id,
                prompt,
                response,
            })),
            (None, _) => Some(SourceRow::Malformed {
                page_id,
                reason: format!("missing or empty '{}' property", self.properties.prompt),
            }),
            (_, None) => Some(SourceRow::Malformed {
                page_id,
                reason: format!("missing or empty '{}' property", self.properties.response),
            }),
        }
    }

    fn status_update(&self, status_name: &str) -> Value {
        json!({
            "properties": {
                self.properties.status.as_str(): { "select": { "name": status_name } }
            }
        })
    }
}

#[async_trait]
impl ReviewStore for NotionStore {
    async fn fetch_criteria(&self) -> Result<RatingCriteria> {
        tracing::info!("📖 Fetching rating criteria from Notion page...");

        let url = format!(
            "{}/v1/blocks/{}/children",
            self.base_url, self.standards_page_id
        );

        let mut fragments: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;

        // 頁面內容是分頁的 block 列表
        loop {
            let mut query = vec![("page_size", self.page_size.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("start_cursor", cursor.clone()));
            }

            let body = self.get(&url, &query).await?;
            for block in body["results"].as_array().into_iter().flatten() {
                fragments.extend(plain_text_fragments(block));
            }

            cursor = next_cursor(&body);
            if cursor.is_none() {
                break;
            }
        }

        let criteria = fragments.join("\n");
        if criteria.trim().is_empty() {
            return Err(RaterError::EmptyCriteria {
                page_id: self.standards_page_id.clone(),
            });
        }

        tracing::info!("📖 Successfully fetched criteria ({} chars)", criteria.len());
        Ok(RatingCriteria(criteria))
    }

    async fn fetch_unrated(&self) -> Result<Vec<SourceRow>> {
        tracing::info!("📥 Fetching unrated responses from Notion...");

        let url = format!("{}/v1/databases/{}/query", self.base_url, self.responses_db_id);

        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({
                "filter": {
                    "property": &self.properties.status,
                    "select": { "equals": &self.statuses.unrated }
                },
                "page_size": self.page_size,
            });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response = self.post(&url, &body).await?;
            for row in response["results"].as_array().into_iter().flatten() {
                match self.row_to_source(row) {
                    Some(source_row) => rows.push(source_row),
                    None => tracing::warn!("⚠️ Skipping query result without a page id"),
                }
            }

            cursor = next_cursor(&response);
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!("📥 Found {} responses to rate", rows.len());
        Ok(rows)
    }

    async fn apply_rating(&self, page_id: &str, rating: &Rating) -> Result<()> {
        let mut properties = serde_json::Map::new();

        properties.insert(
            self.properties.notes.clone(),
            json!({ "rich_text": [{ "text": { "content": &rating.evaluation_notes } }] }),
        );
        properties.insert(
            self.properties.status.clone(),
            json!({ "select": { "name": &self.statuses.rated } }),
        );

        // snake_case 分數鍵轉成資料庫的 Title Case 欄位名
        for (key, value) in &rating.scores {
            properties.insert(title_case_property(key), json!({ "number": value }));
        }

        let url = format!("{}/v1/pages/{}", self.base_url, page_id);
        self.patch(&url, &json!({ "properties": properties })).await?;

        tracing::info!("📝 Successfully rated and updated page {}", page_id);
        Ok(())
    }

    async fn mark_error(&self, page_id: &str) -> Result<()> {
        let url = format!("{}/v1/pages/{}", self.base_url, page_id);
        self.patch(&url, &self.status_update(&self.statuses.error))
            .await?;

        tracing::warn!("⚠️ Marked page {} as '{}'", page_id, self.statuses.error);
        Ok(())
    }
}

/// Cursor for the next page of a paginated Notion listing, if there is one.
fn next_cursor(body: &Value) -> Option<String> {
    if body["has_more"].as_bool().unwrap_or(false) {
        body["next_cursor"].as_str().map(String::from)
    } else {
        None
    }
}

/// Pulls the plain text out of one block, whatever its type. Blocks without
/// a `rich_text` payload (dividers, images, ...) contribute nothing.
fn plain_text_fragments(block: &Value) -> Vec<String> {
    let Some(block_type) = block.get("type").and_then(|v| v.as_str()) else {
        return Vec::new();
    };

    block
        .get(block_type)
        .and_then(|payload| payload.get("rich_text"))
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|element| element.get("plain_text").and_then(|v| v.as_str()))
        .map(String::from)
        .collect()
}

/// Reads `properties[name][kind][0].plain_text` from a database row.
fn first_plain_text(row: &Value, name: &str, kind: &str) -> Option<String> {
    let text = row
        .get("properties")?
        .get(name)?
        .get(kind)?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()?;

    Some(text.to_string())
}

/// `clarity_score` -> `Clarity Score`, mirroring how the score columns are
/// named in the responses database.
fn title_case_property(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
