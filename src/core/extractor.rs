use scraper::{Html, Selector};

use crate::config::ScraperConfig;
use crate::core::normalizer::normalize;
use crate::models::{ExtractionFailure, PriceQuote};
use crate::utils::error::{AppError, Result};

/// A compiled selector together with the text it was written as.
#[derive(Debug, Clone)]
struct PriceRule {
    source: String,
    selector: Selector,
}

/// Reads the displayed price off a product page.
///
/// Rules are tried in declared order and the first selector that matches any
/// element wins; later rules are never consulted once one matches, even if
/// the matched element turns out to hold no usable text.
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    rules: Vec<PriceRule>,
    challenge_markers: Vec<String>,
}

impl PriceExtractor {
    pub fn new<S: AsRef<str>>(selectors: &[S], challenge_markers: &[S]) -> Result<Self> {
        let rules = selectors
            .iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| {
                let source = s.as_ref().trim().to_string();
                Selector::parse(&source)
                    .map(|selector| PriceRule {
                        source: source.clone(),
                        selector,
                    })
                    .map_err(|e| AppError::Selector {
                        selector: source.clone(),
                        message: format!("{:?}", e),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if rules.is_empty() {
            return Err(AppError::Validation("at least one price selector is required".into()));
        }

        Ok(Self {
            rules,
            challenge_markers: challenge_markers
                .iter()
                .map(|m| m.as_ref().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Self::new(config.price_selectors.as_slice(), config.challenge_markers.as_slice())
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.source.as_str())
    }

    /// Returns the first challenge marker present in the raw body, if any.
    pub fn detect_challenge(&self, raw_body: &str) -> Option<&str> {
        self.challenge_markers
            .iter()
            .find(|marker| raw_body.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// Full extraction from a raw response body. Challenge detection always
    /// runs first and skips parsing entirely when it fires.
    pub fn extract(&self, raw_body: &str) -> std::result::Result<PriceQuote, ExtractionFailure> {
        if let Some(marker) = self.detect_challenge(raw_body) {
            return Err(ExtractionFailure::BotChallenge {
                marker: marker.to_string(),
            });
        }

        let document = Html::parse_document(raw_body);
        self.extract_from_document(&document)
    }

    pub fn extract_from_document(&self, document: &Html) -> std::result::Result<PriceQuote, ExtractionFailure> {
        let (rule, element) = self
            .rules
            .iter()
            .find_map(|rule| document.select(&rule.selector).next().map(|el| (rule, el)))
            .ok_or(ExtractionFailure::NoPriceElement)?;

        let text = element.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionFailure::EmptyPriceText {
                selector: rule.source.clone(),
            });
        }

        tracing::debug!("Price element matched '{}': {:?}", rule.source, text);

        let (amount, currency) = normalize(text).map_err(|_| ExtractionFailure::InvalidPrice {
            text: text.to_string(),
        })?;

        Ok(PriceQuote::new(amount, currency, text, rule.source.as_str()))
    }

    /// `<title>` of the page, for diagnosing blocked or redesigned pages.
    pub fn page_title(raw_body: &str) -> Option<String> {
        let document = Html::parse_document(raw_body);
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|title| title.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}
