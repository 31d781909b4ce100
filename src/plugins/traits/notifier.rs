use async_trait::async_trait;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use crate::models::PriceQuote;
use crate::utils::error::Result;

/// What a notifier is asked to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// The price reached the target.
    PriceAlert {
        product_name: String,
        product_url: String,
        quote: PriceQuote,
        target: Decimal,
        savings: Decimal,
        checked_at: DateTime<Local>,
    },
    /// The price could not be read this run.
    CheckFailed {
        product_name: String,
        product_url: String,
        reason: String,
        checked_at: DateTime<Local>,
    },
}

impl NotificationEvent {
    pub fn product_name(&self) -> &str {
        match self {
            NotificationEvent::PriceAlert { product_name, .. }
            | NotificationEvent::CheckFailed { product_name, .. } => product_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResult {
    pub recipient: String,
}

/// Delivers notification events (email today).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Renders and sends one event. Transport failures come back as errors;
    /// callers decide whether they matter.
    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult>;
}
