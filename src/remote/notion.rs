//! Notion REST API store.
//!
//! Uses blocking `reqwest`: the importer processes one record at a time and
//! every call waits for its response.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{QueryFilter, QueryPage, RemoteEntry, RemoteError, RemoteResult, RemoteStore};
use crate::error::{Error, Result};
use crate::model::PageProperties;

/// Default Notion API base URL.
pub const NOTION_API_URL: &str = "https://api.notion.com";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest page size the query endpoint accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Notion database client.
pub struct NotionStore {
    client: Client,
    base_url: String,
    token: String,
    identity_property: String,
    page_size: u32,
}

impl NotionStore {
    /// Create a client.
    ///
    /// `identity_property` is the column read back into
    /// [`RemoteEntry::identity_key`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        identity_property: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            identity_property: identity_property.into(),
            page_size: MAX_PAGE_SIZE,
        })
    }

    /// Set the number of results requested per page (clamped to 1..=100).
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    fn post(&self, path: &str, body: &Value) -> RemoteResult<Value> {
        let url = format!("{}{path}", self.base_url);
        tracing::trace!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .map_err(|e| {
                if e.is_decode() {
                    RemoteError::Decode(e.to_string())
                } else {
                    RemoteError::Network(e.to_string())
                }
            })?;

        read_response(response)
    }

    fn entry_from_page(&self, page: &NotionPage) -> RemoteEntry {
        let identity_key = page
            .properties
            .get(&self.identity_property)
            .and_then(plain_text);

        RemoteEntry {
            id: page.id.clone(),
            identity_key,
            url: page.url.clone(),
            last_edited: page.last_edited_time.clone(),
        }
    }
}

impl RemoteStore for NotionStore {
    fn query(
        &self,
        database_id: &str,
        filter: Option<&QueryFilter>,
        cursor: Option<&str>,
    ) -> RemoteResult<QueryPage> {
        let body = query_body(filter, cursor, self.page_size);
        let value = self.post(&format!("/v1/databases/{database_id}/query"), &body)?;
        let list: NotionList =
            serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(QueryPage {
            entries: list.results.iter().map(|p| self.entry_from_page(p)).collect(),
            next_cursor: list.next_cursor,
            has_more: list.has_more,
        })
    }

    fn create(&self, database_id: &str, properties: &PageProperties) -> RemoteResult<RemoteEntry> {
        let body = create_body(database_id, properties);
        let value = self.post("/v1/pages", &body)?;
        let page: NotionPage =
            serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(self.entry_from_page(&page))
    }
}

/// Body of a database query request.
fn query_body(filter: Option<&QueryFilter>, cursor: Option<&str>, page_size: u32) -> Value {
    let mut body = json!({ "page_size": page_size });
    if let Some(cursor) = cursor {
        body["start_cursor"] = Value::String(cursor.to_string());
    }
    if let Some(filter) = filter {
        body["filter"] = json!({
            "property": filter.property,
            "rich_text": { "equals": filter.equals },
        });
    }
    body
}

/// Body of a page create request.
fn create_body(database_id: &str, properties: &PageProperties) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
    })
}

/// Map an HTTP response to its JSON body or a categorized error.
fn read_response(response: Response) -> RemoteResult<Value> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return Err(RemoteError::RateLimited { retry_after });
    }

    let body = response
        .text()
        .map_err(|e| RemoteError::Network(format!("Failed to read response body: {e}")))?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()));
    }

    let api_error: Option<NotionError> = serde_json::from_str(&body).ok();
    let message = api_error
        .as_ref()
        .map_or_else(|| body.clone(), |e| e.message.clone());

    if status.is_server_error() {
        Err(RemoteError::Server {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(RemoteError::Client {
            status: status.as_u16(),
            code: api_error.map_or_else(|| "unknown".to_string(), |e| e.code),
            message,
        })
    }
}

/// Concatenated plain text of a title or rich text property.
fn plain_text(property: &Value) -> Option<String> {
    let parts = property
        .get("rich_text")
        .or_else(|| property.get("title"))?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| {
            part.get("plain_text")
                .or_else(|| part.get("text").and_then(|t| t.get("content")))
                .and_then(Value::as_str)
        })
        .collect();

    if text.is_empty() { None } else { Some(text) }
}

#[derive(Debug, Deserialize)]
struct NotionList {
    #[serde(default)]
    results: Vec<NotionPage>,
    next_cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct NotionPage {
    id: String,
    url: Option<String>,
    last_edited_time: Option<String>,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NotionError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;

    #[test]
    fn test_query_body_with_filter_and_cursor() {
        let filter = QueryFilter::identity("Paprika Hash", "abc123");
        let body = query_body(Some(&filter), Some("cur_2"), 50);

        assert_eq!(
            body,
            json!({
                "page_size": 50,
                "start_cursor": "cur_2",
                "filter": {
                    "property": "Paprika Hash",
                    "rich_text": { "equals": "abc123" }
                }
            })
        );
    }

    #[test]
    fn test_query_body_unfiltered() {
        let body = query_body(None, None, 100);
        assert_eq!(body, json!({ "page_size": 100 }));
    }

    #[test]
    fn test_create_body_embeds_properties() {
        let mut props = PageProperties::new();
        props.insert("Recipe".into(), PropertyValue::Title("Soup".into()));
        let body = create_body("db_1", &props);

        assert_eq!(body["parent"]["database_id"], "db_1");
        assert_eq!(
            body["properties"]["Recipe"]["title"][0]["text"]["content"],
            "Soup"
        );
    }

    #[test]
    fn test_plain_text_reads_rich_text_and_title() {
        let rich = json!({
            "type": "rich_text",
            "rich_text": [
                { "plain_text": "abc" },
                { "plain_text": "123" }
            ]
        });
        assert_eq!(plain_text(&rich).as_deref(), Some("abc123"));

        let title = json!({ "title": [{ "text": { "content": "Soup" } }] });
        assert_eq!(plain_text(&title).as_deref(), Some("Soup"));

        assert_eq!(plain_text(&json!({ "rich_text": [] })), None);
        assert_eq!(plain_text(&json!({ "number": 3 })), None);
    }

    #[test]
    fn test_entry_from_page() {
        let store = NotionStore::new(
            "https://api.notion.com/",
            "secret",
            "Paprika Hash",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.base_url, "https://api.notion.com");

        let page: NotionPage = serde_json::from_value(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "url": "https://www.notion.so/59833787",
            "last_edited_time": "2024-03-01T10:00:00.000Z",
            "properties": {
                "Paprika Hash": { "rich_text": [{ "plain_text": "h1" }] }
            }
        }))
        .unwrap();

        let entry = store.entry_from_page(&page);
        assert_eq!(entry.id, "59833787-2cf9-4fdf-8782-e53db20768a5");
        assert_eq!(entry.identity_key.as_deref(), Some("h1"));
        assert_eq!(entry.last_edited.as_deref(), Some("2024-03-01T10:00:00.000Z"));
    }

    #[test]
    fn test_page_size_is_clamped() {
        let store = NotionStore::new(NOTION_API_URL, "t", "Hash", Duration::from_secs(1))
            .unwrap()
            .with_page_size(500);
        assert_eq!(store.page_size, 100);

        let store = store.with_page_size(0);
        assert_eq!(store.page_size, 1);
    }
}
