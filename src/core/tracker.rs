use chrono::{DateTime, Local};
use std::time::Duration;

use crate::config::TrackerConfig;
use crate::core::decision::{compose_notification, decide};
use crate::core::extractor::PriceExtractor;
use crate::models::{CheckFailure, CheckOutcome, CheckReport, ExtractionFailure, NotificationStatus, PriceQuote};
use crate::plugins::fetchers::HttpFetcher;
use crate::plugins::notifiers::EmailNotifier;
use crate::plugins::traits::{NotificationEvent, NotifierPlugin, PageFetcher};
use crate::utils::debug::dump_response;
use crate::utils::error::Result;

/// Runs one price check: delay, fetch, extract, decide, maybe notify.
pub struct PriceTracker {
    config: TrackerConfig,
    extractor: PriceExtractor,
    fetcher: Box<dyn PageFetcher>,
    notifier: Box<dyn NotifierPlugin>,
}

impl PriceTracker {
    pub fn new(
        config: TrackerConfig,
        fetcher: Box<dyn PageFetcher>,
        notifier: Box<dyn NotifierPlugin>,
    ) -> Result<Self> {
        let extractor = PriceExtractor::from_config(&config.scraper)?;

        Ok(Self {
            config,
            extractor,
            fetcher,
            notifier,
        })
    }

    /// Wires the HTTP fetcher and SMTP notifier described by `config`.
    pub fn from_config(config: TrackerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.scraper)?;
        let notifier = EmailNotifier::from_config(&config.email)?;
        Self::new(config, Box::new(fetcher), Box::new(notifier))
    }

    /// Never fails: fetch, extraction and notification errors are logged and
    /// recorded in the report.
    pub async fn check_price(&self) -> CheckReport {
        let product = &self.config.product;
        let checked_at = Local::now();

        tracing::info!("{}", "=".repeat(60));
        tracing::info!("Checking price for: {}", product.name);
        tracing::info!("Time: {}", checked_at.format("%Y-%m-%d %H:%M:%S"));
        tracing::info!("{}", "=".repeat(60));

        let result = self.fetch_quote(checked_at).await;
        let outcome = decide(result, product.target_price);
        self.log_outcome(&outcome);

        let notification = match compose_notification(&outcome, product, self.config.notify_on_error, checked_at) {
            Some(event) => self.dispatch(&event).await,
            None => NotificationStatus::NotRequired,
        };

        CheckReport {
            product_name: product.name.clone(),
            product_url: product.url.clone(),
            checked_at,
            outcome,
            notification,
        }
    }

    async fn fetch_quote(&self, checked_at: DateTime<Local>) -> std::result::Result<PriceQuote, CheckFailure> {
        let delay = Duration::from_millis(self.config.scraper.request_delay_ms);
        if !delay.is_zero() {
            tracing::debug!("Waiting {:?} before fetching", delay);
            tokio::time::sleep(delay).await;
        }

        let page = self.fetcher.fetch(&self.config.product.url).await.map_err(|e| {
            tracing::error!("Error fetching URL: {}", e);
            CheckFailure::Transport(e.to_string())
        })?;

        if !page.is_success() {
            tracing::error!("Error fetching URL: HTTP {} from {}", page.status, page.final_url);
            return Err(CheckFailure::HttpStatus(page.status));
        }

        self.extractor.extract(&page.body).map_err(|failure| {
            match &failure {
                ExtractionFailure::BotChallenge { marker } => {
                    tracing::warn!("Request blocked by a bot challenge page (matched {:?})", marker);
                    tracing::warn!("Wait a few hours, change network, or open the URL in a browser first");
                }
                ExtractionFailure::NoPriceElement => {
                    tracing::warn!("Could not find price on page. The page layout may have changed.");
                }
                other => tracing::warn!("Could not read price: {}", other),
            }

            if self.config.debug_mode {
                let title = PriceExtractor::page_title(&page.body);
                tracing::info!("Debug: page title: {}", title.as_deref().unwrap_or("No title"));
                dump_response(&self.config.scraper.debug_dir, &page.body, checked_at);
            }

            CheckFailure::from(failure)
        })
    }

    fn log_outcome(&self, outcome: &CheckOutcome) {
        match outcome {
            CheckOutcome::Alert { quote, target, .. } => {
                let currency = quote.currency();
                tracing::info!("Current Price: {}", quote.formatted());
                tracing::info!("Target Price: {}", currency.format(*target));
                tracing::info!(
                    "PRICE DROP ALERT! Current price ({}) is at or below target ({})",
                    quote.formatted(),
                    currency.format(*target)
                );
            }
            CheckOutcome::AboveTarget {
                quote,
                target,
                difference,
            } => {
                let currency = quote.currency();
                tracing::info!("Current Price: {}", quote.formatted());
                tracing::info!("Target Price: {}", currency.format(*target));
                tracing::info!("Price is still above target. Difference: {}", currency.format(*difference));
            }
            CheckOutcome::Unavailable { reason } => {
                tracing::warn!("Failed to retrieve price ({}). Will try again next run.", reason);
            }
        }
    }

    async fn dispatch(&self, event: &NotificationEvent) -> NotificationStatus {
        match self.notifier.notify(event).await {
            Ok(result) => {
                tracing::info!("Notification for {} sent to {}", event.product_name(), result.recipient);
                NotificationStatus::Sent
            }
            Err(e) => {
                tracing::error!("Error sending {} notification: {}", self.notifier.name(), e);
                NotificationStatus::Failed(e.to_string())
            }
        }
    }
}
