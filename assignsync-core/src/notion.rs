//! Notion API client.
//!
//! Only the two endpoints the sync needs are wrapped: database query (to list
//! existing titles) and page creation.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::config::{NotionConfig, PropertyNames};
use crate::error::{SyncError, SyncResult};
use crate::store::{NewRecord, RecordStore};

pub struct NotionClient {
    client: reqwest::Client,
    token: String,
    database_id: String,
    base_url: String,
    version: String,
    properties: PropertyNames,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.token.clone(),
            database_id: config.database_id.clone(),
            base_url: config.api_base.clone(),
            version: config.api_version.clone(),
            properties: config.properties.clone(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Titles of every page in the database, following pagination.
    #[instrument(skip(self), fields(database = %self.database_id), level = "info")]
    pub async fn query_titles(&self) -> SyncResult<Vec<String>> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, self.database_id);

        let mut titles = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            // An empty body means "no filter": every page in the database
            let body = match &cursor {
                Some(c) => json!({ "start_cursor": c }),
                None => json!({}),
            };

            let response = self
                .client
                .post(&url)
                .header("Authorization", self.auth_header())
                .header("Notion-Version", &self.version)
                .json(&body)
                .send()
                .await
                .map_err(|e| SyncError::StoreRead(e.to_string()))?;

            let response = check_status(response).await.map_err(SyncError::StoreRead)?;
            let page: QueryResponse = response
                .json()
                .await
                .map_err(|e| SyncError::StoreRead(format!("JSON parse error: {}", e)))?;

            titles.extend(
                page.results
                    .iter()
                    .filter_map(|p| p.title(&self.properties.title)),
            );

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        debug!(count = titles.len(), "Fetched existing titles");
        Ok(titles)
    }

    /// Create a page in the database.
    #[instrument(skip(self, record), fields(title = %record.title), level = "info")]
    pub async fn create_page(&self, record: &NewRecord) -> SyncResult<()> {
        let url = format!("{}/v1/pages", self.base_url);
        let body = self.page_body(record);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Notion-Version", &self.version)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::StoreWrite(e.to_string()))?;

        check_status(response).await.map_err(SyncError::StoreWrite)?;
        Ok(())
    }

    fn page_body(&self, record: &NewRecord) -> Value {
        let mut properties = Map::new();
        properties.insert(
            self.properties.title.clone(),
            json!({ "title": [{ "text": { "content": record.title } }] }),
        );
        properties.insert(
            self.properties.date.clone(),
            json!({ "date": { "start": record.start, "end": record.end } }),
        );
        properties.insert(
            self.properties.description.clone(),
            json!({ "rich_text": [{ "text": { "content": record.description } }] }),
        );

        json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        })
    }
}

impl RecordStore for NotionClient {
    async fn existing_titles(&self) -> SyncResult<Vec<String>> {
        self.query_titles().await
    }

    async fn create_record(&self, record: &NewRecord) -> SyncResult<()> {
        self.create_page(record).await
    }
}

/// Pass successful responses through; turn anything else into a readable message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&text)
        .map(|e| format!("{} ({})", e.message, e.code))
        .unwrap_or(text);

    Err(format!("{}: {}", status, message))
}

// API Response Types

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
}

impl Page {
    /// First segment of the title property, if there is one.
    fn title(&self, property: &str) -> Option<String> {
        let segment = self.properties.get(property)?.title.first()?;
        segment
            .text
            .as_ref()
            .map(|t| t.content.clone())
            .or_else(|| segment.plain_text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct PropertyValue {
    #[serde(default)]
    title: Vec<RichText>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    text: Option<TextContent>,
    plain_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    message: String,
}
