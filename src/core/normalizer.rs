use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::Currency;

/// Removed from price text before parsing. Mis-decoded forms go first so that
/// stripping `£` out of `Â£` cannot leave a stray `Â` behind.
const STRIP_GLYPHS: [&str; 5] = ["Â£", "â‚¬", "£", "€", "$"];

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("numeric run pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no numeric value in '{0}'")]
    Invalid(String),
}

/// Converts displayed price text such as `$1,234.56` or `Â£999` into an
/// amount and the currency it was shown in.
///
/// Commas and currency glyphs are stripped and the rest parsed directly. When
/// that fails (stray words, `49.` from a whole-part element) the first run of
/// digits, with an optional fractional part, is used instead. The currency is
/// detected on the untouched input, see [`Currency::detect`].
///
/// Amounts must fit `Decimal` (28 significant digits); longer digit runs are
/// reported as invalid.
pub fn normalize(raw: &str) -> Result<(Decimal, Currency), NormalizeError> {
    let currency = Currency::detect(raw);
    let cleaned = clean(raw);

    let amount = match Decimal::from_str(&cleaned) {
        Ok(amount) if !amount.is_sign_negative() => amount,
        _ => first_numeric_run(&cleaned).ok_or_else(|| NormalizeError::Invalid(raw.to_string()))?,
    };

    Ok((amount, currency))
}

fn clean(raw: &str) -> String {
    let without_separators = raw.replace(',', "");
    STRIP_GLYPHS
        .iter()
        .fold(without_separators, |text, glyph| text.replace(glyph, ""))
        .trim()
        .to_string()
}

fn first_numeric_run(text: &str) -> Option<Decimal> {
    NUMERIC_RUN
        .find(text)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}
