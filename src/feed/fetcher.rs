//! HTTP client for the device sheet.

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use tracing::{debug, info};

use super::{parse_payload, SheetPayload};
use crate::config::FeedConfig;
use crate::models::DeviceRow;

/// Fetches device rows from the sheet web app
pub struct SheetFetcher {
    client: Client,
    url: String,
    sheet: String,
}

impl SheetFetcher {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Floormap/0.1 (facility locator)")
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            sheet: config.sheet.clone(),
        })
    }

    /// Feed URL with the sheet selected
    fn request_url(&self) -> Result<Url> {
        Url::parse_with_params(&self.url, &[("sheet", self.sheet.as_str())])
            .context("Invalid device feed URL")
    }

    /// Fetch and parse the current device list
    pub async fn fetch(&self) -> Result<Vec<DeviceRow>> {
        debug!("Fetching sheet '{}' from {}", self.sheet, self.url);

        let url = self.request_url()?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Device feed request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error! Status: {}", status);
        }

        let payload: SheetPayload = response
            .json()
            .await
            .context("Failed to parse device feed response")?;

        let rows = parse_payload(payload)?;
        info!("Fetched {} devices", rows.len());

        Ok(rows)
    }
}
