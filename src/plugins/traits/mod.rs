pub mod fetcher;
pub mod mailer;
pub mod notifier;

pub use fetcher::{FetchedPage, PageFetcher};
pub use mailer::{MailTransport, OutgoingEmail};
pub use notifier::{NotificationEvent, NotificationResult, NotifierPlugin};
