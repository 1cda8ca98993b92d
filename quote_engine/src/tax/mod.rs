//! Tax cascade.
//!
//! The cascade applies a list of enabled/disabled tax lines to one
//! base amount.  Every tax is computed independently against the same
//! base: there is no tax-on-tax compounding here.  Output order always
//! matches input order, because breakdown tables are rendered in it.

pub mod aliquotas;
pub mod primitives;
pub mod profile;

use crate::models::{finite_or_zero, lenient_number};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The kinds of tax line a quote may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "ICMS")]
    Icms,
    #[serde(rename = "PIS")]
    Pis,
    #[serde(rename = "COFINS")]
    Cofins,
    #[serde(rename = "II")]
    Ii,
    #[serde(rename = "IPI")]
    Ipi,
    #[serde(rename = "ISS")]
    Iss,
    #[serde(rename = "IOF")]
    Iof,
    Custom,
}

impl TaxType {
    pub fn label(&self) -> &'static str {
        match self {
            TaxType::Icms => "ICMS",
            TaxType::Pis => "PIS",
            TaxType::Cofins => "COFINS",
            TaxType::Ii => "Imposto de Importação",
            TaxType::Ipi => "IPI",
            TaxType::Iss => "ISS",
            TaxType::Iof => "IOF",
            TaxType::Custom => "Outro",
        }
    }
}

/// One tax line of a quote.  Toggling `enabled` never touches `rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    #[serde(rename = "type")]
    pub tax_type: TaxType,
    /// Percent.
    #[serde(deserialize_with = "lenient_number")]
    pub rate: f64,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
}

impl TaxRate {
    pub fn new(tax_type: TaxType, rate: f64, enabled: bool) -> Self {
        Self {
            tax_type,
            rate,
            description: tax_type.label().to_string(),
            enabled,
        }
    }
}

/// A tax line with its computed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    #[serde(flatten)]
    pub tax: TaxRate,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculation {
    pub taxes: Vec<TaxLine>,
    pub subtotal: f64,
    /// Always equal to `subtotal`.
    pub total: f64,
}

/// Applies `selected` to `base`.  Disabled lines get value 0 whatever
/// their rate.  `uf` identifies the jurisdiction the rates belong to; the
/// rates themselves already encode it.
pub fn calculate_taxes(base: f64, uf: &str, selected: &[TaxRate]) -> TaxCalculation {
    let base = finite_or_zero(base);
    let mut subtotal = 0.0;

    let taxes = selected
        .iter()
        .map(|tax| {
            let value = if tax.enabled {
                base * (finite_or_zero(tax.rate) / 100.0)
            } else {
                0.0
            };
            subtotal += value;
            TaxLine {
                tax: tax.clone(),
                value,
            }
        })
        .collect();

    trace!(uf, base, subtotal, "taxes applied");

    TaxCalculation {
        taxes,
        subtotal,
        total: subtotal,
    }
}
