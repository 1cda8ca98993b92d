//! Line-item aggregation.
//!
//! Merges the priced services with ad hoc extra lines, applies the
//! global discount and then the tax cascade.  The steps run strictly in
//! this order: taxes are always computed on the post-discount amount.

use crate::models::{finite_or_zero, lenient_number, lenient_option};
use crate::tax::{calculate_taxes, TaxCalculation, TaxRate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ad hoc cost line added to a quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraLineItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// `None` when the form field is empty or unreadable.
    #[serde(default, deserialize_with = "lenient_option")]
    pub qty: Option<f64>,
    /// Unit price.
    #[serde(default, deserialize_with = "lenient_option")]
    pub unit: Option<f64>,
    /// Percent, 0 to 100.
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount: f64,
}

/// A usable quantity or price: present, finite and not negative.
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

impl ExtraLineItem {
    pub fn new(id: &str, description: &str, qty: f64, unit: f64, discount: f64) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            qty: Some(qty),
            unit: Some(unit),
            discount,
        }
    }

    /// `qty * unit * (1 - discount/100)`, or 0 when qty or unit is not
    /// a finite non-negative number.
    pub fn line_total(&self) -> f64 {
        match (usable(self.qty), usable(self.unit)) {
            (Some(qty), Some(unit)) => qty * unit * (1.0 - finite_or_zero(self.discount) / 100.0),
            _ => 0.0,
        }
    }

    /// Field → message map of everything wrong with the line.  Empty
    /// when the line is valid.
    pub fn validate(&self) -> BTreeMap<&'static str, String> {
        let mut errors = BTreeMap::new();

        if self.description.trim().chars().count() < 2 {
            errors.insert("description", "descrição deve ter ao menos 2 caracteres".to_string());
        }
        if !self.qty.is_some_and(|q| q.is_finite() && q > 0.0) {
            errors.insert("qty", "quantidade deve ser maior que zero".to_string());
        }
        if !self.unit.is_some_and(|u| u.is_finite() && u > 0.0) {
            errors.insert("unit", "valor unitário deve ser maior que zero".to_string());
        }
        if !(0.0..=100.0).contains(&self.discount) {
            errors.insert("discount", "desconto deve estar entre 0 e 100".to_string());
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// An invalid extra line and its problems.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBlocker {
    pub id: String,
    pub errors: BTreeMap<&'static str, String>,
}

/// Invalid extra lines.  Any entry blocks PDF/spreadsheet export; it
/// never blocks computation.
pub fn export_blockers(extras: &[ExtraLineItem]) -> Vec<ExportBlocker> {
    extras
        .iter()
        .filter_map(|extra| {
            let errors = extra.validate();
            (!errors.is_empty()).then(|| ExportBlocker {
                id: extra.id.clone(),
                errors,
            })
        })
        .collect()
}

/// Sum of every extra's line total.
pub fn extras_total(extras: &[ExtraLineItem]) -> f64 {
    extras.iter().map(ExtraLineItem::line_total).sum()
}

/// Every intermediate amount of the aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub service_total: f64,
    pub extras_total: f64,
    pub subtotal: f64,
    /// Percent actually applied, after clamping to [0, 100].
    pub global_discount: f64,
    pub discount_amount: f64,
    pub subtotal_after_discount: f64,
    pub taxes: TaxCalculation,
    pub taxes_total: f64,
    pub final_total: f64,
}

/// Runs the aggregation:
///
/// 1. `extrasTotal = Σ lineTotal`
/// 2. `subtotal = serviceTotal + extrasTotal`
/// 3. `discountAmount = subtotal * globalDiscount / 100`
/// 4. taxes on `subtotal - discountAmount`
/// 5. `finalTotal = subtotalAfterDiscount + taxesTotal`
///
/// A non-finite discount counts as 0; a discount outside [0, 100] is
/// clamped into that range.
pub fn aggregate(
    service_total: f64,
    extras: &[ExtraLineItem],
    global_discount: f64,
    taxes: &[TaxRate],
    uf: &str,
) -> QuoteSummary {
    let service_total = finite_or_zero(service_total);
    let extras_total = extras_total(extras);
    let subtotal = service_total + extras_total;

    let global_discount = finite_or_zero(global_discount).clamp(0.0, 100.0);
    let discount_amount = subtotal * global_discount / 100.0;
    let subtotal_after_discount = subtotal - discount_amount;

    let taxes = calculate_taxes(subtotal_after_discount, uf, taxes);
    let taxes_total = taxes.total;

    QuoteSummary {
        service_total,
        extras_total,
        subtotal,
        global_discount,
        discount_amount,
        subtotal_after_discount,
        taxes,
        taxes_total,
        final_total: subtotal_after_discount + taxes_total,
    }
}
