use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Prefix for structured overrides, e.g. `PRICE_WATCH__EMAIL__SMTP_PORT`.
pub const ENV_PREFIX: &str = "PRICE_WATCH";

/// Flat environment names and the keys they override. These win over both the
/// config file and the prefixed variables.
const FLAT_ENV_KEYS: [(&str, &str); 10] = [
    ("PRODUCT_NAME", "product.name"),
    ("PRODUCT_URL", "product.url"),
    ("TARGET_PRICE", "product.target_price"),
    ("SMTP_SERVER", "email.smtp_server"),
    ("SMTP_PORT", "email.smtp_port"),
    ("FROM_EMAIL", "email.from_email"),
    ("TO_EMAIL", "email.to_email"),
    ("EMAIL_PASSWORD", "email.password"),
    ("NOTIFY_ON_ERROR", "notify_on_error"),
    ("DEBUG_MODE", "debug_mode"),
];

const DEFAULT_PRICE_SELECTORS: [&str; 9] = [
    "#corePrice_feature_div span.a-price.aok-align-center span.a-offscreen",
    "#corePrice_feature_div span.a-offscreen",
    "span.a-price.aok-align-center span.a-offscreen",
    ".a-price span.a-offscreen",
    "span.a-price-whole",
    "span.a-offscreen",
    "span#priceblock_ourprice",
    "span#priceblock_dealprice",
    "span.a-price span.a-offscreen",
];

const DEFAULT_CHALLENGE_MARKERS: [&str; 2] = [
    "api-services-support@amazon.com",
    "Enter the characters you see below",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub product: ProductConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub notify_on_error: bool,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    pub name: String,
    pub url: String,
    pub target_price: Decimal,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub from_email: String,
    pub to_email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Courtesy pause before the single fetch.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Tried in order; the first selector matching any element wins.
    pub price_selectors: Vec<String>,
    /// Substrings that mark a bot-challenge page.
    pub challenge_markers: Vec<String>,
    /// Where raw responses are dumped when `debug_mode` is on.
    pub debug_dir: PathBuf,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name: "Amazon Product".to_string(),
            url: String::new(),
            target_price: Decimal::ZERO,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            from_email: String::new(),
            to_email: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 2000,
            request_timeout_secs: 10,
            price_selectors: DEFAULT_PRICE_SELECTORS.iter().map(|s| s.to_string()).collect(),
            challenge_markers: DEFAULT_CHALLENGE_MARKERS.iter().map(|s| s.to_string()).collect(),
            debug_dir: PathBuf::from("."),
        }
    }
}

impl TrackerConfig {
    /// Loads `.env` into the process environment, then layers the config file
    /// and environment variables on top of the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(dotenv_path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", dotenv_path.display());
        }

        // Variables that are not valid Unicode cannot name or hold a setting
        let env: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::from_sources(path, &env)
    }

    /// Builds the configuration from an explicit file path (required when
    /// given, otherwise `config.*` in the working directory if present) and a
    /// snapshot of environment variables.
    pub fn from_sources(path: Option<&Path>, env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        let mut builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(env.clone().into_iter().collect())),
        );

        for (var, key) in FLAT_ENV_KEYS {
            let value = env.get(var).filter(|v| !v.trim().is_empty()).cloned();
            builder = builder.set_override_option(key, value)?;
        }

        let config: TrackerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Required fields
        if self.product.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "PRODUCT_URL is required (set via environment variable or config file)".into(),
            ));
        }
        if self.email.from_email.trim().is_empty() {
            return Err(ConfigError::Message(
                "FROM_EMAIL is required (set via environment variable or config file)".into(),
            ));
        }
        if self.email.to_email.trim().is_empty() {
            return Err(ConfigError::Message(
                "TO_EMAIL is required (set via environment variable or config file)".into(),
            ));
        }
        if self.email.password.is_empty() {
            return Err(ConfigError::Message(
                "EMAIL_PASSWORD is required (set via environment variable or config file)".into(),
            ));
        }

        match Url::parse(&self.product.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid product URL '{}': expected an http(s) URL",
                    self.product.url
                )));
            }
        }

        if self.product.target_price.is_sign_negative() {
            return Err(ConfigError::Message("Target price cannot be negative".into()));
        }

        // Validate email configuration
        for (label, address) in [("from_email", &self.email.from_email), ("to_email", &self.email.to_email)] {
            if address.parse::<lettre::Address>().is_err() {
                return Err(ConfigError::Message(format!("Invalid {} address '{}'", label, address)));
            }
        }

        if self.email.smtp_server.trim().is_empty() {
            return Err(ConfigError::Message("SMTP server must not be empty".into()));
        }

        if self.email.smtp_port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        // Validate scraper configuration
        if self.scraper.request_timeout_secs == 0 {
            return Err(ConfigError::Message("Scraper request_timeout_secs must be greater than 0".into()));
        }

        if self.scraper.price_selectors.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Message("At least one price selector is required".into()));
        }

        Ok(())
    }
}
