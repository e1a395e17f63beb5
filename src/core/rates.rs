//! Rate table and conversion through the base currency

use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, warn};

pub const BASE_CURRENCY: &str = "USD";

/// Fallback rates used until a refresh succeeds, relative to [`BASE_CURRENCY`].
pub const DEFAULT_RATES: [(&str, f64); 10] = [
    ("USD", 1.0),
    ("EUR", 0.85),
    ("INR", 74.0),
    ("GBP", 0.75),
    ("JPY", 110.0),
    ("AUD", 1.35),
    ("CAD", 1.25),
    ("CHF", 0.92),
    ("CNY", 6.45),
    ("SEK", 8.6),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub amount: f64,
    pub source: String,
    pub target: String,
    pub converted: f64,
}

impl Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} {} = {:.2} {}",
            self.amount, self.source, self.converted, self.target
        )
    }
}

/// Units of each currency per one unit of the base currency.
///
/// Codes keep their insertion order. The set of codes is fixed at construction;
/// [`RateTable::merge`] only overwrites rates of codes already present.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    codes: Vec<String>,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new() -> Self {
        let mut codes = Vec::with_capacity(DEFAULT_RATES.len());
        let mut rates = HashMap::with_capacity(DEFAULT_RATES.len());
        for (code, rate) in DEFAULT_RATES {
            codes.push(code.to_string());
            rates.insert(code.to_string(), rate);
        }
        Self {
            base: BASE_CURRENCY.to_string(),
            codes,
            rates,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Currency codes in insertion order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// `(code, rate)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.codes
            .iter()
            .map(|code| (code.as_str(), self.rates[code.as_str()]))
    }

    /// Overwrites tracked rates with fetched ones and returns how many were written.
    ///
    /// Untracked codes are ignored, as is the base currency, which stays at 1.0.
    pub fn merge(&mut self, fetched: &HashMap<String, f64>) -> usize {
        let mut written = 0;
        for code in &self.codes {
            if *code == self.base {
                continue;
            }
            let Some(&rate) = fetched.get(code) else {
                continue;
            };
            if !rate.is_finite() || rate <= 0.0 {
                warn!(code = %code, rate, "Ignoring invalid fetched rate");
                continue;
            }
            if let Some(slot) = self.rates.get_mut(code) {
                debug!(code = %code, old = *slot, new = rate, "Updating rate");
                *slot = rate;
                written += 1;
            }
        }
        written
    }

    pub fn convert(
        &self,
        amount: f64,
        source: &str,
        target: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let source_rate = self
            .get(source)
            .ok_or_else(|| ConversionError::InvalidCurrency(source.to_string()))?;
        let target_rate = self
            .get(target)
            .ok_or_else(|| ConversionError::InvalidCurrency(target.to_string()))?;

        let amount_in_base = amount / source_rate;
        let converted = amount_in_base * target_rate;

        Ok(ConversionResult {
            amount,
            source: source.to_string(),
            target: target.to_string(),
            converted,
        })
    }

    /// Converts an amount typed as free text.
    pub fn convert_input(
        &self,
        input: &str,
        source: &str,
        target: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let amount = parse_amount(input)?;
        self.convert(amount, source, target)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a finite amount, ignoring surrounding whitespace.
pub fn parse_amount(input: &str) -> Result<f64, ConversionError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| ConversionError::InvalidAmount(input.to_string()))
}

pub fn swap<T>(source: T, target: T) -> (T, T) {
    (target, source)
}
