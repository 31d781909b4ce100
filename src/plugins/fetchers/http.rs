use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, DNT,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::plugins::traits::{FetchedPage, PageFetcher};
use crate::utils::error::Result;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Fetches pages over HTTP while presenting as a desktop Chrome browser.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::browser_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.request_timeout_secs))
    }

    /// Fixed navigation header set sent with every request.
    pub fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("document"));
        headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("navigate"));
        headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("none"));
        headers.insert(HeaderName::from_static("sec-fetch-user"), HeaderValue::from_static("?1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        tracing::info!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        tracing::info!("Response status code: {}", status);

        // Honours the Content-Type charset; unlabelled bodies decode as UTF-8
        // with invalid sequences replaced.
        let body = response.text().await?;

        Ok(FetchedPage {
            status,
            body,
            final_url,
        })
    }
}
