pub mod fetchers;
pub mod notifiers;
pub mod traits;

pub use traits::{MailTransport, NotifierPlugin, PageFetcher};
