use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use crate::config::ProductConfig;
use crate::models::{CheckFailure, CheckOutcome, PriceQuote};
use crate::plugins::traits::NotificationEvent;

/// Compares an extracted quote with the target. Equality counts as a hit.
pub fn decide(result: Result<PriceQuote, CheckFailure>, target: Decimal) -> CheckOutcome {
    match result {
        Err(reason) => CheckOutcome::Unavailable { reason },
        Ok(quote) if quote.amount() <= target => {
            let savings = target - quote.amount();
            CheckOutcome::Alert { quote, target, savings }
        }
        Ok(quote) => {
            let difference = quote.amount() - target;
            CheckOutcome::AboveTarget {
                quote,
                target,
                difference,
            }
        }
    }
}

/// Builds the notification payload for an outcome, or `None` when nothing
/// should be sent: prices above target never notify, failures only when
/// `notify_on_error` is set.
pub fn compose_notification(
    outcome: &CheckOutcome,
    product: &ProductConfig,
    notify_on_error: bool,
    checked_at: DateTime<Local>,
) -> Option<NotificationEvent> {
    match outcome {
        CheckOutcome::Alert { quote, target, savings } => Some(NotificationEvent::PriceAlert {
            product_name: product.name.clone(),
            product_url: product.url.clone(),
            quote: quote.clone(),
            target: *target,
            savings: *savings,
            checked_at,
        }),
        CheckOutcome::Unavailable { reason } if notify_on_error => Some(NotificationEvent::CheckFailed {
            product_name: product.name.clone(),
            product_url: product.url.clone(),
            reason: reason.to_string(),
            checked_at,
        }),
        CheckOutcome::Unavailable { .. } | CheckOutcome::AboveTarget { .. } => None,
    }
}
