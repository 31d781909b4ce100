use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::quote::PriceQuote;

/// Why no price could be read from a fetched page.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionFailure {
    #[error("bot challenge page detected (marker: {marker})")]
    BotChallenge { marker: String },

    #[error("no price element matched any selector")]
    NoPriceElement,

    #[error("price element matched by '{selector}' has no text")]
    EmptyPriceText { selector: String },

    #[error("could not read a number from '{text}'")]
    InvalidPrice { text: String },
}

/// Reason behind an `Unavailable` outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CheckFailure {
    #[error("fetch failed: {0}")]
    Transport(String),

    #[error("server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    Extraction(ExtractionFailure),
}

impl From<ExtractionFailure> for CheckFailure {
    fn from(failure: ExtractionFailure) -> Self {
        CheckFailure::Extraction(failure)
    }
}

/// Result of one price check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Price at or below target.
    Alert {
        quote: PriceQuote,
        target: Decimal,
        savings: Decimal,
    },
    Unavailable { reason: CheckFailure },
    /// Price still above target; informational only.
    AboveTarget {
        quote: PriceQuote,
        target: Decimal,
        difference: Decimal,
    },
}

impl CheckOutcome {
    pub fn quote(&self) -> Option<&PriceQuote> {
        match self {
            CheckOutcome::Alert { quote, .. } | CheckOutcome::AboveTarget { quote, .. } => Some(quote),
            CheckOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, CheckOutcome::Alert { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum NotificationStatus {
    NotRequired,
    Sent,
    Failed(String),
}

/// Everything a single run produced, for logging and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub product_name: String,
    pub product_url: String,
    pub checked_at: DateTime<Local>,
    pub outcome: CheckOutcome,
    pub notification: NotificationStatus,
}
