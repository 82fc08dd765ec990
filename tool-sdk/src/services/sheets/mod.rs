//! Spreadsheet webhook client
//!
//! The webhook is a script endpoint that appends (or updates) one row per
//! call. Row values travel as query parameters on a single GET, together with
//! the target sheet and a `callback` token the script's JSONP convention
//! expects.

use std::time::Duration;

use log::debug;
use reqwest::Client;
use url::Url;

use crate::config::{ConfigProvider, ServiceConfig, SheetsConfig};
use crate::core::ServiceClient;
use crate::error::{Result, ServiceError};
use crate::services::common::{build_http_client, parse_error_response, transport_error, UserAgent};

const SERVICE_NAME: &str = "sheets";

/// Callback token appended to every webhook call
pub const CALLBACK_TOKEN: &str = "noop";

/// Client for the spreadsheet logging webhook
#[derive(Debug, Clone)]
pub struct SheetsWebhookClient {
    http_client: Client,
    webhook_url: Url,
    config: SheetsConfig,
}

impl SheetsWebhookClient {
    /// Create a client from validated configuration
    pub fn new_with_config(config: SheetsConfig) -> Result<Self> {
        config.validate()?;

        let webhook_url = Url::parse(&config.webhook_url)
            .map_err(|e| ServiceError::configuration(format!("Invalid webhook URL: {}", e)))?;

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("sheets-webhook".to_string()),
                ..UserAgent::default()
            }),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self {
            http_client,
            webhook_url,
            config,
        })
    }

    /// Create a client from a configuration provider.
    ///
    /// `Ok(None)` means the webhook is not configured.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Option<Self>> {
        SheetsConfig::from_provider(provider)?
            .map(Self::new_with_config)
            .transpose()
    }

    /// Sheet (tab) the rows are written to
    pub fn sheet_name(&self) -> &str {
        &self.config.sheet_name
    }

    /// Build the full webhook URL for one row.
    ///
    /// Row fields come first, followed by `sheetId`, `sheetName` and `callback`.
    /// Parameters already present on the webhook URL keep their position
    /// unless one of these keys replaces them.
    pub fn row_url<'a, I>(&self, fields: I) -> Url
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pairs: Vec<(&str, &str)> = fields.into_iter().collect();
        pairs.extend([
            ("sheetId", self.config.sheet_id.as_str()),
            ("sheetName", self.config.sheet_name.as_str()),
            ("callback", CALLBACK_TOKEN),
        ]);

        let kept: Vec<(String, String)> = self
            .webhook_url
            .query_pairs()
            .filter(|(key, _)| !pairs.iter().any(|(name, _)| *name == key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut url = self.webhook_url.clone();
        url.set_query(None);
        url.query_pairs_mut().extend_pairs(kept).extend_pairs(pairs);
        url
    }

    /// Send one row to the webhook
    pub async fn send_row<'a, I>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let url = self.row_url(fields);
        debug!("Sending row to sheet {} ({})", self.config.sheet_id, self.config.sheet_name);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE_NAME, "webhook", e))?;

        if !response.status().is_success() {
            return Err(parse_error_response(SERVICE_NAME, "webhook", response).await);
        }

        Ok(())
    }
}

impl ServiceClient for SheetsWebhookClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn base_url(&self) -> &str {
        self.webhook_url.as_str()
    }
}
