pub mod decision;
pub mod extractor;
pub mod normalizer;
pub mod tracker;

pub use decision::{compose_notification, decide};
pub use extractor::PriceExtractor;
pub use normalizer::{normalize, NormalizeError};
pub use tracker::PriceTracker;
