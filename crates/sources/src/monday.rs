//! monday.com board record source.
//!
//! Runs a single GraphQL query against the configured board and maps every item
//! to a `RawRecord`: the item name becomes the display name and the text of the
//! configured phone column becomes the raw phone text. Only the first page of
//! items is read; its size is bounded by `page_limit`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use blastline_common::error::SourceError;
use blastline_common::ports::RecordSource;
use blastline_common::types::RawRecord;

const BOARD_ITEMS_QUERY: &str = r#"
query BoardItems($boardIds: [ID!], $limit: Int) {
  boards(ids: $boardIds) {
    items_page(limit: $limit) {
      items {
        name
        column_values {
          id
          text
        }
      }
    }
  }
}
"#;

/// Connection settings for a monday.com board.
#[derive(Debug, Clone)]
pub struct MondayConfig {
    pub api_url: String,
    pub api_key: String,
    pub board_id: String,
    pub phone_column_id: String,
    pub page_limit: u32,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<BoardsData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
    /// Some account-level failures come back as a bare message instead of `errors`.
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Vec<Board>,
}

#[derive(Debug, Deserialize)]
struct Board {
    items_page: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    name: String,
    #[serde(default)]
    column_values: Vec<ColumnValue>,
}

#[derive(Debug, Deserialize)]
struct ColumnValue {
    id: String,
    text: Option<String>,
}

/// Record source backed by the items of one monday.com board.
pub struct MondayBoardSource {
    client: Client,
    config: MondayConfig,
}

impl MondayBoardSource {
    pub fn new(client: Client, config: MondayConfig) -> Self {
        tracing::info!(
            board_id = %config.board_id,
            phone_column = %config.phone_column_id,
            page_limit = config.page_limit,
            "monday.com record source initialized"
        );
        Self { client, config }
    }

    /// Map the GraphQL reply to records, rejecting replies that carry errors
    /// or no board.
    fn records_from(&self, response: GraphqlResponse) -> Result<Vec<RawRecord>, SourceError> {
        if !response.errors.is_empty() {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(SourceError::Query(messages.join("; ")));
        }
        if let Some(message) = response.error_message {
            return Err(SourceError::Query(message));
        }

        let board = response
            .data
            .and_then(|data| data.boards.into_iter().next())
            .ok_or_else(|| {
                SourceError::Malformed(format!("board {} not found", self.config.board_id))
            })?;

        let records = board
            .items_page
            .items
            .into_iter()
            .map(|item| {
                let phone = item
                    .column_values
                    .into_iter()
                    .find(|c| c.id == self.config.phone_column_id)
                    .and_then(|c| c.text)
                    .filter(|text| !text.trim().is_empty());
                RawRecord {
                    display_name: item.name,
                    raw_phone_text: phone,
                }
            })
            .collect();

        Ok(records)
    }
}

#[async_trait]
impl RecordSource for MondayBoardSource {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError> {
        let body = json!({
            "query": BOARD_ITEMS_QUERY,
            "variables": {
                "boardIds": [self.config.board_id],
                "limit": self.config.page_limit,
            }
        });

        tracing::debug!(url = %self.config.api_url, board_id = %self.config.board_id, "Querying board items");

        let response = self
            .client
            .post(&self.config.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        let records = self.records_from(parsed)?;
        tracing::info!(
            board_id = %self.config.board_id,
            records = records.len(),
            "Fetched board items"
        );
        Ok(records)
    }
}
