use async_trait::async_trait;

use crate::utils::error::Result;

/// Raw result of a page fetch, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    pub final_url: String, // After redirects
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// One GET of `url`. Any HTTP status is returned as a page; only
    /// connection-level failures are errors.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}
