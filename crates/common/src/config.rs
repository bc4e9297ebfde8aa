use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// monday.com API token (sent verbatim in the `Authorization` header)
    pub monday_api_key: String,

    /// Board holding the campaign recipients
    pub board_id: String,

    /// Column id whose text holds the recipient's phone number
    pub monday_phone_column_id: String,

    /// monday.com GraphQL endpoint
    pub monday_api_url: String,

    /// Maximum number of board items fetched per campaign run (default: 500)
    pub monday_page_limit: u32,

    /// Twilio account SID
    pub twilio_account_sid: String,

    /// Twilio auth token
    pub twilio_auth_token: String,

    /// Sender identity (Twilio number or messaging service) used as `From`
    pub twilio_from: String,

    /// Twilio REST API base URL
    pub twilio_api_url: String,

    /// Recipients dispatched concurrently per batch (default: 10)
    pub dispatch_batch_size: usize,

    /// Pause between consecutive batches in milliseconds (default: 1000)
    pub dispatch_batch_delay_ms: u64,

    /// Timeout applied to every outbound HTTP call in seconds (default: 30)
    pub http_timeout_secs: u64,

    /// HTTP listen port (default: 3001)
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            monday_api_key: required("MONDAY_API_KEY")?,
            board_id: required("BOARD_ID")?,
            monday_phone_column_id: std::env::var("MONDAY_PHONE_COLUMN_ID")
                .unwrap_or_else(|_| "text_mkpfez9j".to_string()),
            monday_api_url: std::env::var("MONDAY_API_URL")
                .unwrap_or_else(|_| "https://api.monday.com/v2".to_string()),
            monday_page_limit: parsed("MONDAY_PAGE_LIMIT", "500")?,
            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_from: required("TWILIO_FROM")?,
            twilio_api_url: std::env::var("TWILIO_API_URL")
                .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            dispatch_batch_size: parsed("DISPATCH_BATCH_SIZE", "10")?,
            dispatch_batch_delay_ms: parsed("DISPATCH_BATCH_DELAY_MS", "1000")?,
            http_timeout_secs: parsed("HTTP_TIMEOUT_SECS", "30")?,
            port: parsed("PORT", "3001")?,
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable is required", name))
}

fn parsed<T: std::str::FromStr>(name: &str, default: &str) -> anyhow::Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| {
            anyhow::anyhow!(
                "{} must be a valid {}",
                name,
                std::any::type_name::<T>()
            )
        })
}
