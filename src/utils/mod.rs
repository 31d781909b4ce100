pub mod debug;
pub mod error;

pub use error::{AppError, Result};
