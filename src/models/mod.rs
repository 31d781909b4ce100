pub mod outcome;
pub mod quote;

// Re-exports for convenience
pub use outcome::*;
pub use quote::*;
