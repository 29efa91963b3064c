//! HTTP retrieval of the LPR source page.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use crate::domain::UpdateConfig;
use crate::error::PipelineError;

/// Something that can produce the source page body.
///
/// The pipeline only sees this trait so runs can be driven from fixtures.
pub trait Fetcher {
    fn fetch(&self) -> Result<String, PipelineError>;
}

/// Single blocking GET with a bounded timeout. No retries.
pub struct HttpFetcher {
    client: Client,
    url: String,
    user_agent: String,
}

impl HttpFetcher {
    pub fn from_config(config: &UpdateConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.source_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self) -> Result<String, PipelineError> {
        info!(url = %self.url, "fetching LPR page");

        let resp = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|e| PipelineError::Fetch(format!("request failed: {e}")))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(PipelineError::Fetch(format!("request failed with status {status}")));
        }

        // The page is served as UTF-8 regardless of what the headers claim.
        let bytes = resp
            .bytes()
            .map_err(|e| PipelineError::Fetch(format!("failed to read response body: {e}")))?;
        debug!(bytes = bytes.len(), "received page");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
