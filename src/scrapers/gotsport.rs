use crate::error::MonitorError;
use crate::scrapers::ScheduleSource;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fetches a team schedule page from GotSport
pub struct GotSportScraper {
    client: reqwest::Client,
    url: String,
}

impl GotSportScraper {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(MonitorError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the schedule page. Non-success statuses are errors; nothing is retried.
    pub async fn fetch_page(&self) -> Result<String, MonitorError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| MonitorError::Network {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::HttpStatus {
                url: self.url.clone(),
                status,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|source| MonitorError::Network {
                url: self.url.clone(),
                source,
            })?;

        debug!(bytes = html.len(), "fetched schedule page");
        Ok(html)
    }
}

impl ScheduleSource for GotSportScraper {
    async fn fetch_page(&self) -> Result<String, MonitorError> {
        GotSportScraper::fetch_page(self).await
    }
}
