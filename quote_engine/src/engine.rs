//! Quote computation engine.
//!
//! The `engine` module turns a [`QuoteRequest`] into a
//! [`QuoteOutcome`].  Each selected service is resolved and priced
//! independently, so the per-service work is spread over the [`rayon`]
//! thread pool; the results are collected back in selection order.  The
//! merged service total then flows through the aggregator (extras,
//! global discount, tax cascade) and finally through the currency
//! converter for display.

use crate::aggregate::{aggregate, export_blockers, ExportBlocker, ExtraLineItem, QuoteSummary};
use crate::catalog::{find_service, FieldIssue};
use crate::currency::{convert, format_amount, Currency, ExchangeRates};
use crate::error::EngineResult;
use crate::models::{lenient_number, Breakdown, Values};
use crate::tax::profile::TaxProfiles;
use crate::tax::TaxRate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One service package picked for the quote, with its raw form values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub slug: String,
    #[serde(default)]
    pub values: Values,
}

impl ServiceSelection {
    pub fn new(slug: &str, values: Values) -> Self {
        Self {
            slug: slug.to_string(),
            values,
        }
    }
}

/// Everything needed to price a full quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteRequest {
    pub services: Vec<ServiceSelection>,
    pub extras: Vec<ExtraLineItem>,
    /// Percent, 0 to 100.
    #[serde(deserialize_with = "lenient_number")]
    pub global_discount: f64,
    /// Tax list to apply.  `None` takes the UF's profile.
    pub taxes: Option<Vec<TaxRate>>,
    pub uf: String,
    /// Display currency.
    pub currency: Currency,
    pub rates: ExchangeRates,
}

/// One priced service of a quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationItem {
    pub slug: String,
    pub name: String,
    #[serde(rename = "valueBRL")]
    pub value_brl: f64,
    pub breakdown: Breakdown,
    pub issues: Vec<FieldIssue>,
}

/// The priced services before discount and taxes.
///
/// `total_brl` is always the sum of the items' `value_brl`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub items: Vec<CalculationItem>,
    #[serde(rename = "totalBRL")]
    pub total_brl: f64,
    pub total_foreign: f64,
    pub currency: Currency,
    /// Rate of `currency` to BRL; 0 when no usable rate was supplied.
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOutcome {
    pub calculation: CalculationResult,
    pub summary: QuoteSummary,
    pub final_total_foreign: f64,
    pub final_total_display: String,
    pub export_blockers: Vec<ExportBlocker>,
    /// True when any extra line is invalid.  Export only; the numbers
    /// above are computed either way.
    pub export_blocked: bool,
}

/// Prices each selection, keeping the selection order.
///
/// Fails only when a slug is not in the catalog.
pub fn price_services(selections: &[ServiceSelection]) -> EngineResult<Vec<CalculationItem>> {
    selections
        .par_iter()
        .map(|selection| {
            let service = find_service(&selection.slug)?;
            let (quote, issues) = service.quote(&selection.values);
            Ok(CalculationItem {
                slug: service.slug.to_string(),
                name: service.name.to_string(),
                value_brl: quote.total,
                breakdown: quote.breakdown,
                issues,
            })
        })
        .collect()
}

/// Runs a full quote.
///
/// `profiles` supplies the tax list when the request carries none.
pub fn run_quote(request: &QuoteRequest, profiles: &TaxProfiles) -> EngineResult<QuoteOutcome> {
    let items = price_services(&request.services)?;
    let total_brl: f64 = items.iter().map(|item| item.value_brl).sum();

    let currency = request.currency;
    let rates = &request.rates;
    let calculation = CalculationResult {
        total_foreign: convert(total_brl, Currency::BRL, currency, rates),
        exchange_rate: rates.rate(currency).unwrap_or(0.0),
        currency,
        total_brl,
        items,
    };

    let taxes = match &request.taxes {
        Some(taxes) => taxes.clone(),
        None => profiles.taxes_for(&request.uf),
    };
    let summary = aggregate(
        total_brl,
        &request.extras,
        request.global_discount,
        &taxes,
        &request.uf,
    );

    let final_total_foreign = convert(summary.final_total, Currency::BRL, currency, rates);
    let export_blockers = export_blockers(&request.extras);
    debug!(
        services = calculation.items.len(),
        final_total = summary.final_total,
        %currency,
        "quote computed"
    );

    Ok(QuoteOutcome {
        calculation,
        final_total_display: format_amount(final_total_foreign, currency),
        final_total_foreign,
        export_blocked: !export_blockers.is_empty(),
        export_blockers,
        summary,
    })
}
