//! Currency conversion.
//!
//! Rates are supplied by an external fetcher as "how many BRL one unit
//! of the currency is worth".  Every conversion pivots through BRL:
//! `from` is first brought to BRL, then BRL is taken to `to`.  No cross
//! rates are used.

use crate::models::finite_or_zero;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    BRL,
    USD,
    EUR,
    CNY,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "US$",
            Currency::EUR => "€",
            Currency::CNY => "¥",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::CNY => "CNY",
        };
        f.write_str(code)
    }
}

/// Currency → BRL rate map, e.g. `{"BRL": 1, "USD": 5.1}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates(BTreeMap<Currency, f64>);

impl ExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, currency: Currency, rate: f64) -> Self {
        self.0.insert(currency, rate);
        self
    }

    /// Rate of `currency` to BRL.  BRL is always 1; other currencies
    /// need a finite positive rate.
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        if currency == Currency::BRL {
            return Some(1.0);
        }
        self.0
            .get(&currency)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }
}

/// Converts `value` from `from` to `to` through BRL.
///
/// A currency without a usable rate makes the result 0 rather than NaN
/// or infinity.
pub fn convert(value: f64, from: Currency, to: Currency, rates: &ExchangeRates) -> f64 {
    let value = finite_or_zero(value);
    if from == to {
        return value;
    }

    let value_in_brl = match from {
        Currency::BRL => value,
        _ => match rates.rate(from) {
            Some(rate) => value * rate,
            None => {
                warn!(currency = %from, "no usable exchange rate; converting to 0");
                return 0.0;
            }
        },
    };

    match to {
        Currency::BRL => value_in_brl,
        _ => match rates.rate(to) {
            Some(rate) => value_in_brl / rate,
            None => {
                warn!(currency = %to, "no usable exchange rate; converting to 0");
                0.0
            }
        },
    }
}

/// Groups the integer digits of `n` in threes with `sep`.
fn agrupar_milhares(n: u64, sep: char) -> String {
    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    s.chars().enumerate().for_each(|(i, c)| {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    });

    result
}

/// Display form of an amount: `R$ 1.234,56` for BRL, `US$ 1,234.56`
/// style for the rest.  Non-finite values render as zero.
pub fn format_amount(value: f64, currency: Currency) -> String {
    let value = finite_or_zero(value);
    let cents = (value.abs() * 100.0).round() as u64;
    let (thousands, decimal) = match currency {
        Currency::BRL => ('.', ','),
        _ => (',', '.'),
    };
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}{} {}{decimal}{:02}",
        currency.symbol(),
        agrupar_milhares(cents / 100, thousands),
        cents % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> ExchangeRates {
        ExchangeRates::new()
            .with(Currency::BRL, 1.0)
            .with(Currency::USD, 5.0)
            .with(Currency::EUR, 5.5)
            .with(Currency::CNY, 0.7)
    }

    #[test]
    fn test_same_currency_short_circuits() {
        assert_eq!(convert(123.0, Currency::USD, Currency::USD, &ExchangeRates::new()), 123.0);
    }

    #[test]
    fn test_pivot_through_brl() {
        let r = rates();
        assert_eq!(convert(1000.0, Currency::BRL, Currency::USD, &r), 200.0);
        assert_eq!(convert(200.0, Currency::USD, Currency::BRL, &r), 1000.0);
        assert!((convert(100.0, Currency::EUR, Currency::USD, &r) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_rate_converts_to_zero() {
        let r = ExchangeRates::new().with(Currency::USD, 0.0);
        assert_eq!(convert(100.0, Currency::BRL, Currency::USD, &r), 0.0);
        assert_eq!(convert(100.0, Currency::EUR, Currency::BRL, &r), 0.0);
    }

    #[test]
    fn test_rates_deserialize_from_codes() {
        let r: ExchangeRates = serde_json::from_str(r#"{"BRL":1,"USD":5.25}"#).unwrap();
        assert_eq!(r.rate(Currency::USD), Some(5.25));
        assert_eq!(r.rate(Currency::CNY), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, Currency::BRL), "R$ 1.234,50");
        assert_eq!(format_amount(1_234_567.891, Currency::USD), "US$ 1,234,567.89");
        assert_eq!(format_amount(-9.999, Currency::BRL), "-R$ 10,00");
        assert_eq!(format_amount(f64::NAN, Currency::EUR), "€ 0.00");
    }
}
