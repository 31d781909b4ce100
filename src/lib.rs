pub mod config;
pub mod core;
pub mod models;
pub mod plugins;
pub mod utils;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use crate::core::PriceTracker;
pub use models::{CheckOutcome, CheckReport, Currency, PriceQuote};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
