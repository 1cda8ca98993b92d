use proptest::prelude::*;
use quote_engine::aggregate::{aggregate, ExtraLineItem};
use quote_engine::catalog::CATALOG;
use quote_engine::currency::{convert, Currency, ExchangeRates};
use quote_engine::markup::{calcular_simulacao, ItemSimulacao, Simulacao};
use quote_engine::models::{FieldKind, FieldValue, Values};
use quote_engine::tax::primitives::calcular_difal;
use quote_engine::tax::{calculate_taxes, TaxRate, TaxType};

const TAX_TYPES: [TaxType; 8] = [
    TaxType::Icms,
    TaxType::Pis,
    TaxType::Cofins,
    TaxType::Ii,
    TaxType::Ipi,
    TaxType::Iss,
    TaxType::Iof,
    TaxType::Custom,
];

fn tax_rate() -> impl Strategy<Value = TaxRate> {
    (0..TAX_TYPES.len(), 0.0..30.0f64, any::<bool>())
        .prop_map(|(i, rate, enabled)| TaxRate::new(TAX_TYPES[i], rate, enabled))
}

fn extra_line() -> impl Strategy<Value = ExtraLineItem> {
    (
        prop::option::of(0.0..100.0f64),
        prop::option::of(0.0..10_000.0f64),
        0.0..=100.0f64,
    )
        .prop_map(|(qty, unit, discount)| ExtraLineItem {
            id: "x".into(),
            description: "Linha".into(),
            qty,
            unit,
            discount,
        })
}

/// Random values inside each field's declared range.
fn values_for(seed: &[f64], flags: &[bool], service: usize) -> Values {
    let mut values = Values::new();
    for (i, field) in CATALOG[service].inputs.iter().enumerate() {
        let r = seed[i % seed.len()];
        let value = match field.kind {
            FieldKind::Number { min, max, .. } => {
                let lo = min.unwrap_or(0.0);
                let hi = max.unwrap_or(lo + 1_000_000.0);
                FieldValue::Number(lo + (hi - lo) * r)
            }
            FieldKind::Select { options, .. } => {
                let idx = ((options.len() as f64) * r) as usize % options.len();
                FieldValue::from(options[idx].value)
            }
            FieldKind::Checkbox { .. } => FieldValue::Flag(flags[i % flags.len()]),
        };
        values.insert(field.key, value);
    }
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn breakdown_sums_to_total(
        service in 0..CATALOG.len(),
        seed in prop::collection::vec(0.0..1.0f64, 1..8),
        flags in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let values = values_for(&seed, &flags, service);
        let quote = CATALOG[service].calculate(&values);
        let sum: f64 = quote.breakdown.iter().map(|(_, v)| *v).sum();
        prop_assert!((quote.total - sum).abs() <= 1e-6 * quote.total.abs().max(1.0));
    }

    #[test]
    fn disabled_tax_contributes_nothing(base in 0.0..1e7f64, rate in -50.0..500.0f64) {
        let taxes = vec![TaxRate::new(TaxType::Icms, rate, false)];
        let calc = calculate_taxes(base, "SP", &taxes);
        prop_assert_eq!(calc.taxes[0].value, 0.0);
        prop_assert_eq!(calc.subtotal, 0.0);
    }

    #[test]
    fn aggregator_algebra(
        service_total in 0.0..1e6f64,
        extras in prop::collection::vec(extra_line(), 0..6),
        discount in 0.0..=100.0f64,
        taxes in prop::collection::vec(tax_rate(), 0..6),
    ) {
        let summary = aggregate(service_total, &extras, discount, &taxes, "SP");
        let subtotal = service_total + summary.extras_total;
        let after = subtotal - subtotal * discount / 100.0;
        let taxes_total = calculate_taxes(after, "SP", &taxes).total;
        let expected = service_total + summary.extras_total - subtotal * discount / 100.0 + taxes_total;
        prop_assert!((summary.final_total - expected).abs() <= 1e-6 * expected.abs().max(1.0));
    }

    #[test]
    fn nan_extras_never_leak(
        unit in 0.0..1e4f64,
        service_total in 0.0..1e6f64,
        missing_qty in any::<bool>(),
    ) {
        let extra = ExtraLineItem {
            id: "n".into(),
            description: "Linha".into(),
            qty: if missing_qty { None } else { Some(f64::NAN) },
            unit: Some(unit),
            discount: 0.0,
        };
        prop_assert_eq!(extra.line_total(), 0.0);
        let taxes = vec![TaxRate::new(TaxType::Iss, 5.0, true)];
        let summary = aggregate(service_total, &[extra], 0.0, &taxes, "SP");
        prop_assert!(summary.final_total.is_finite());
        prop_assert_eq!(summary.extras_total, 0.0);
    }

    #[test]
    fn margin_is_zero_when_sale_price_is_zero(qty in 0.0..100.0f64, cost in 0.0..1e4f64) {
        let simulacao = Simulacao {
            itens: vec![ItemSimulacao {
                descricao: "Item".into(),
                quantidade: qty,
                custo_unitario: cost,
                preco_unitario: 0.0,
            }],
            markup: -100.0,
            ..Default::default()
        };
        let r = calcular_simulacao(&simulacao, "SP");
        prop_assert_eq!(r.preco_venda, 0.0);
        prop_assert_eq!(r.margem_bruta, 0.0);
    }

    #[test]
    fn currency_round_trip(value in -1e9..1e9f64, rate in 0.01..100.0f64) {
        let rates = ExchangeRates::new().with(Currency::BRL, 1.0).with(Currency::USD, rate);
        let usd = convert(value, Currency::BRL, Currency::USD, &rates);
        let back = convert(usd, Currency::USD, Currency::BRL, &rates);
        prop_assert!((back - value).abs() <= 1e-9 * value.abs().max(1.0));
    }
}

#[test]
fn test_pme_comex_ready_scenario() {
    let service = quote_engine::find_service("pme-comex-ready").unwrap();
    let (quote, issues) = service.quote(&Values::new().with("assisted", 3.0));
    assert!(issues.is_empty());
    assert_eq!(quote.breakdown.get("setup"), Some(1900.0));
    assert_eq!(quote.breakdown.get("assisted"), Some(7500.0));
    assert_eq!(quote.breakdown.get("extras"), Some(0.0));
    assert_eq!(quote.total, 9400.0);
}

#[test]
fn test_on_demand_scenario() {
    let service = quote_engine::find_service("on-demand").unwrap();
    let (quote, _) = service.quote(&Values::new().with("sla", "pro").with("hours", 5.0));
    assert_eq!(quote.total, 2450.0);
    assert_eq!(quote.breakdown.get("base"), Some(2450.0));
}

#[test]
fn test_tax_cascade_scenario() {
    let taxes = vec![
        TaxRate::new(TaxType::Icms, 18.0, true),
        TaxRate::new(TaxType::Pis, 1.65, true),
        TaxRate::new(TaxType::Cofins, 7.6, false),
        TaxRate::new(TaxType::Iss, 5.0, false),
    ];
    let calc = calculate_taxes(1000.0, "SP", &taxes);
    assert!((calc.subtotal - 196.5).abs() < 1e-9);
}

#[test]
fn test_difal_scenario() {
    let difal = calcular_difal(1000.0, 18.0, 12.0);
    assert!((difal.valor_difal - 60.0).abs() < 1e-9);
}
