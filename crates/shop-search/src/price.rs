//! Price formatting.
//!
//! Prices arrive from the index as decimal numbers. They are converted to
//! integer minor units before formatting, so display never shows binary
//! floating-point noise.

use std::fmt;

use shop_core::{Locale, PresentationConfig};

use crate::error::ListingError;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    EUR,
    USD,
    GBP,
    CHF,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "EUR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "€").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "\u{20ac}",
            Currency::USD => "$",
            Currency::GBP => "\u{00a3}",
            Currency::CHF => "CHF",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "EUR" => Some(Currency::EUR),
            "USD" => Some(Currency::USD),
            "GBP" => Some(Currency::GBP),
            "CHF" => Some(Currency::CHF),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A price in the smallest unit of its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price {
    pub amount_minor: i64,
    pub currency: Currency,
}

impl Price {
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a price from a decimal amount, rounding to the currency's
    /// precision.
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let amount_minor = (amount * multiplier as f64).round() as i64;
        Self::new(amount_minor, currency)
    }

    /// Format for a locale: `1.234,50 €` (German) or `€1,234.50` (English).
    pub fn format(&self, locale: Locale) -> String {
        let (group_sep, decimal_sep) = match locale {
            Locale::German => ('.', ','),
            Locale::English => (',', '.'),
        };

        let places = self.currency.decimal_places();
        let divisor = 10_u64.pow(places);
        let abs = self.amount_minor.unsigned_abs();
        let whole = group_digits(abs / divisor, group_sep);

        let mut number = whole;
        if places > 0 {
            number.push(decimal_sep);
            number.push_str(&format!("{:0width$}", abs % divisor, width = places as usize));
        }

        let sign = if self.amount_minor < 0 { "-" } else { "" };
        match locale {
            Locale::German => format!("{}{}\u{a0}{}", sign, number, self.currency.symbol()),
            Locale::English => format!("{}{}{}", sign, self.currency.symbol(), number),
        }
    }
}

fn group_digits(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Locale and currency used to display listing prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceFormat {
    pub locale: Locale,
    pub currency: Currency,
}

impl PriceFormat {
    pub fn new(locale: Locale, currency: Currency) -> Self {
        Self { locale, currency }
    }

    /// Build from presentation config, rejecting unknown currency codes.
    pub fn from_config(config: &PresentationConfig) -> Result<Self, ListingError> {
        let currency = Currency::from_code(&config.currency)
            .ok_or_else(|| ListingError::Config(format!("unsupported currency: {}", config.currency)))?;
        Ok(Self::new(config.locale, currency))
    }

    /// Format a decimal amount.
    pub fn format(&self, amount: f64) -> String {
        Price::from_decimal(amount, self.currency).format(self.locale)
    }
}
