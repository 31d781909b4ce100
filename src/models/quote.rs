use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Currencies the tracker recognises on a product page.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
}

/// Detection priority. The first currency with a glyph present in the text wins;
/// USD is the fallback and is never searched for.
const DETECTION_ORDER: [Currency; 2] = [Currency::Gbp, Currency::Eur];

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
        }
    }

    /// Canonical glyph first, then the forms it takes when UTF-8 bytes are
    /// decoded as Windows-1252 upstream (`Â£`, `â‚¬`).
    pub fn glyphs(&self) -> &'static [&'static str] {
        match self {
            Currency::Usd => &["$"],
            Currency::Gbp => &["£", "Â£"],
            Currency::Eur => &["€", "â‚¬"],
        }
    }

    /// Presence check over `text` in fixed order: GBP, then EUR, else USD.
    pub fn detect(text: &str) -> Currency {
        DETECTION_ORDER
            .into_iter()
            .find(|currency| currency.glyphs().iter().any(|glyph| text.contains(glyph)))
            .unwrap_or(Currency::Usd)
    }

    /// Renders an amount as `<glyph><amount to 2dp>`, e.g. `£12.50`.
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A price read off the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    amount: Decimal,
    currency: Currency,
    source_text: String,
    selector: String,
}

impl PriceQuote {
    pub fn new(
        amount: Decimal,
        currency: Currency,
        source_text: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency,
            source_text: source_text.into(),
            selector: selector.into(),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The trimmed element text the amount was parsed from.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// The extraction rule that matched.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn formatted(&self) -> String {
        self.currency.format(self.amount)
    }
}
