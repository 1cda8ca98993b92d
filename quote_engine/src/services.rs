//! Pricing rules of the service packages.
//!
//! Every function here has the same shape: it receives the resolved
//! form values plus the package's own input table and returns a
//! [`ServiceQuote`].  Nothing is captured from the catalog; the
//! checkbox multipliers are read from the `inputs` argument.  Discounts
//! are negative breakdown lines so the total stays the sum of the lines.

use crate::models::{checkbox_multiplier, InputField, SelectOption, ServiceQuote, Values};

/// Looks up `choice` in a rate table, falling back to the first row.
fn tier_rate(table: &[(&str, f64)], choice: Option<&str>) -> f64 {
    choice
        .and_then(|c| table.iter().find(|(key, _)| *key == c))
        .or_else(|| table.first())
        .map(|(_, rate)| *rate)
        .unwrap_or(0.0)
}

/// Multiplier of `key` when its checkbox is ticked, else 0.
fn ticked(values: &Values, inputs: &[InputField], key: &str) -> f64 {
    if values.flag(key) {
        checkbox_multiplier(inputs, key)
    } else {
        0.0
    }
}

// --- PME COMEX Ready --------------------------------------------------

pub const PME_SETUP: f64 = 1900.0;
pub const PME_POR_EMBARQUE: f64 = 2500.0;

pub const PME_COMEX_READY_INPUTS: &[InputField] = &[
    InputField::number("assisted", "Embarques assistidos", Some(0.0), Some(24.0), 3.0),
    InputField::checkbox("radar", "Habilitação RADAR", 1500.0),
    InputField::checkbox("ncm", "Classificação NCM (até 20 itens)", 1200.0),
    InputField::checkbox("fornecedor", "Homologação de fornecedor", 1800.0),
    InputField::checkbox("treinamento", "Treinamento da equipe", 900.0),
    InputField::checkbox("pme_growth", "PME Growth (acompanhamento trimestral)", 3600.0),
    InputField::checkbox("adhoc", "Pacote de 10 horas ad hoc", 2900.0),
];

const PME_EXTRAS: [&str; 4] = ["radar", "ncm", "fornecedor", "treinamento"];

pub fn pme_comex_ready(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    let assisted = values.quantity("assisted") * PME_POR_EMBARQUE;
    let extras: f64 = PME_EXTRAS
        .iter()
        .map(|key| ticked(values, inputs, key))
        .sum();

    ServiceQuote::from_lines([
        ("setup", PME_SETUP),
        ("assisted", assisted),
        ("extras", extras),
        ("growth", ticked(values, inputs, "pme_growth")),
        ("adhoc", ticked(values, inputs, "adhoc")),
    ])
}

// --- Consultoria On-Demand --------------------------------------------

pub const SLA_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "basic", label: "Essencial (R$ 350/h)" },
    SelectOption { value: "pro", label: "Pro (R$ 490/h)" },
    SelectOption { value: "enterprise", label: "Enterprise (R$ 690/h)" },
];

/// Hourly rate per SLA level.  Unknown levels fall back to `basic`.
pub const SLA_RATES: &[(&str, f64)] = &[("basic", 350.0), ("pro", 490.0), ("enterprise", 690.0)];

pub const ON_DEMAND_INPUTS: &[InputField] = &[
    InputField::select("sla", "Nível de SLA", SLA_OPTIONS, "basic"),
    InputField::number("hours", "Horas contratadas", Some(1.0), Some(200.0), 4.0),
    InputField::checkbox("urgente", "Atendimento em até 24h", 600.0),
    InputField::checkbox("relatorio", "Relatório técnico", 850.0),
];

pub fn on_demand(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    let rate = tier_rate(SLA_RATES, values.text("sla"));
    ServiceQuote::from_lines([
        ("base", rate * values.quantity("hours")),
        ("urgente", ticked(values, inputs, "urgente")),
        ("relatorio", ticked(values, inputs, "relatorio")),
    ])
}

// --- Importação Gerenciada --------------------------------------------

pub const IMPORTACAO_RETAINER: f64 = 4500.0;

pub const COMPLEXIDADE_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "padrao", label: "Padrão (0,8% do CIF)" },
    SelectOption { value: "alta", label: "Alta (1,2% do CIF)" },
];

/// Percent of the monthly CIF charged per complexity level.
pub const COMPLEXIDADE_RATES: &[(&str, f64)] = &[("padrao", 0.8), ("alta", 1.2)];

pub const IMPORTACAO_GERENCIADA_INPUTS: &[InputField] = &[
    InputField::number("cif_mensal", "CIF mensal (R$)", Some(0.0), None, 200_000.0),
    InputField::select("complexidade", "Complexidade das operações", COMPLEXIDADE_OPTIONS, "padrao"),
    InputField::checkbox("performance", "Performance pack (15% de desconto)", 0.85),
];

pub fn importacao_gerenciada(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    let rate = tier_rate(COMPLEXIDADE_RATES, values.text("complexidade"));
    let variavel = values.quantity("cif_mensal") * rate / 100.0;
    let subtotal = IMPORTACAO_RETAINER + variavel;
    let performance = if values.flag("performance") {
        subtotal * checkbox_multiplier(inputs, "performance") - subtotal
    } else {
        0.0
    };

    ServiceQuote::from_lines([
        ("retainer", IMPORTACAO_RETAINER),
        ("variavel", variavel),
        ("performance", performance),
    ])
}

// --- Nova Rota de Importação ------------------------------------------

pub const NOVA_ROTA_SETUP: f64 = 6500.0;

pub const PLANO_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "essencial", label: "Essencial (R$ 2.900/mês)" },
    SelectOption { value: "avancado", label: "Avançado (R$ 4.900/mês)" },
    SelectOption { value: "premium", label: "Premium (R$ 7.900/mês)" },
];

pub const PLANO_MENSALIDADES: &[(&str, f64)] =
    &[("essencial", 2900.0), ("avancado", 4900.0), ("premium", 7900.0)];

pub const NOVA_ROTA_INPUTS: &[InputField] = &[
    InputField::select("plano", "Plano", PLANO_OPTIONS, "essencial"),
    InputField::checkbox("auditoria", "Auditoria de fornecedor no exterior", 9800.0),
    InputField::checkbox("due_diligence", "Due diligence do país de origem", 4200.0),
    InputField::checkbox("missao", "Missão comercial acompanhada", 15_000.0),
];

pub fn nova_rota_importacao(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    let mensalidade = tier_rate(PLANO_MENSALIDADES, values.text("plano"));
    ServiceQuote::from_lines([
        ("setup", NOVA_ROTA_SETUP),
        ("mensalidades", mensalidade * 12.0),
        ("auditoria", ticked(values, inputs, "auditoria")),
        ("due_diligence", ticked(values, inputs, "due_diligence")),
        ("missao", ticked(values, inputs, "missao")),
    ])
}

// --- Habilitação RADAR ------------------------------------------------

pub const MODALIDADE_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "expressa", label: "Expressa (até US$ 50 mil/semestre)" },
    SelectOption { value: "limitada", label: "Limitada (até US$ 150 mil/semestre)" },
    SelectOption { value: "ilimitada", label: "Ilimitada" },
];

pub const MODALIDADE_FEES: &[(&str, f64)] =
    &[("expressa", 2800.0), ("limitada", 4800.0), ("ilimitada", 7500.0)];

pub const RADAR_INPUTS: &[InputField] = &[
    InputField::select("modalidade", "Modalidade", MODALIDADE_OPTIONS, "expressa"),
    InputField::checkbox("revisao", "Revisão de estimativa de capacidade financeira", 1900.0),
    InputField::checkbox("procuracao", "Cadastro de procurações no Siscomex", 450.0),
];

pub fn habilitacao_radar(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    ServiceQuote::from_lines([
        ("modalidade", tier_rate(MODALIDADE_FEES, values.text("modalidade"))),
        ("revisao", ticked(values, inputs, "revisao")),
        ("procuracao", ticked(values, inputs, "procuracao")),
    ])
}

// --- Classificação Fiscal ---------------------------------------------

pub const CLASSIFICACAO_POR_ITEM: f64 = 180.0;

/// Volume discount in percent: (minimum item count exclusive, discount).
/// The first matching row wins, so rows go from the largest threshold.
pub const CLASSIFICACAO_FAIXAS: &[(f64, f64)] = &[(100.0, 20.0), (50.0, 10.0)];

pub const CLASSIFICACAO_INPUTS: &[InputField] = &[
    InputField::number("itens", "Itens a classificar (NCM)", Some(1.0), Some(2000.0), 10.0),
    InputField::checkbox("laudo", "Laudo técnico merceológico", 3500.0),
];

pub fn classificacao_fiscal(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    let itens = values.quantity("itens");
    let classificacao = itens * CLASSIFICACAO_POR_ITEM;
    let desconto = CLASSIFICACAO_FAIXAS
        .iter()
        .find(|(acima_de, _)| itens > *acima_de)
        .map(|(_, pct)| classificacao * pct / 100.0)
        .unwrap_or(0.0);

    ServiceQuote::from_lines([
        ("classificacao", classificacao),
        ("desconto_volume", -desconto),
        ("laudo", ticked(values, inputs, "laudo")),
    ])
}

// --- Gestão de Frete Internacional ------------------------------------

pub const ROTA_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "asia", label: "Ásia" },
    SelectOption { value: "europa", label: "Europa" },
    SelectOption { value: "americas", label: "Américas" },
];

/// Agency fee per TEU by route.
pub const ROTA_FEES: &[(&str, f64)] = &[("asia", 950.0), ("europa", 780.0), ("americas", 620.0)];

pub const FRETE_INPUTS: &[InputField] = &[
    InputField::select("rota", "Rota", ROTA_OPTIONS, "asia"),
    InputField::number("teus", "Volume (TEU)", Some(0.0), Some(500.0), 2.0),
    InputField::number("valor_carga", "Valor da carga (R$)", Some(0.0), None, 0.0),
    InputField::checkbox("seguro", "Seguro internacional (0,3% da carga)", 0.3),
    InputField::checkbox("desembaraco", "Desembaraço aduaneiro", 1650.0),
];

pub fn frete_internacional(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    let agenciamento = tier_rate(ROTA_FEES, values.text("rota")) * values.quantity("teus");
    let seguro = values.quantity("valor_carga") * ticked(values, inputs, "seguro") / 100.0;

    ServiceQuote::from_lines([
        ("agenciamento", agenciamento),
        ("seguro", seguro),
        ("desembaraco", ticked(values, inputs, "desembaraco")),
    ])
}

// --- Pleito de Ex-Tarifário -------------------------------------------

pub const EX_TARIFARIO_POR_PLEITO: f64 = 3800.0;
/// Success fee in percent of the first-year estimated savings.
pub const EX_TARIFARIO_EXITO: f64 = 12.0;

pub const EX_TARIFARIO_INPUTS: &[InputField] = &[
    InputField::number("pleitos", "Número de pleitos", Some(1.0), Some(20.0), 1.0),
    InputField::number("economia_anual", "Economia anual estimada (R$)", Some(0.0), None, 100_000.0),
    InputField::checkbox("acompanhamento", "Acompanhamento na CAMEX por 12 meses", 6000.0),
];

pub fn ex_tarifario(values: &Values, inputs: &[InputField]) -> ServiceQuote {
    ServiceQuote::from_lines([
        ("retainer", values.quantity("pleitos") * EX_TARIFARIO_POR_PLEITO),
        ("exito", values.quantity("economia_anual") * EX_TARIFARIO_EXITO / 100.0),
        ("acompanhamento", ticked(values, inputs, "acompanhamento")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pme_comex_ready_base_scenario() {
        let values = Values::new()
            .with("assisted", 3.0)
            .with("radar", false)
            .with("ncm", false)
            .with("fornecedor", false)
            .with("treinamento", false)
            .with("pme_growth", false)
            .with("adhoc", false);
        let quote = pme_comex_ready(&values, PME_COMEX_READY_INPUTS);
        assert_eq!(quote.breakdown.get("setup"), Some(1900.0));
        assert_eq!(quote.breakdown.get("assisted"), Some(7500.0));
        assert_eq!(quote.breakdown.get("extras"), Some(0.0));
        assert_eq!(quote.total, 9400.0);
    }

    #[test]
    fn test_pme_comex_ready_extras_and_growth() {
        let values = Values::new()
            .with("assisted", 1.0)
            .with("radar", true)
            .with("treinamento", true)
            .with("pme_growth", true);
        let quote = pme_comex_ready(&values, PME_COMEX_READY_INPUTS);
        assert_eq!(quote.breakdown.get("extras"), Some(2400.0));
        assert_eq!(quote.breakdown.get("growth"), Some(3600.0));
        assert_eq!(quote.total, 1900.0 + 2500.0 + 2400.0 + 3600.0);
    }

    #[test]
    fn test_on_demand_pro_hours() {
        let values = Values::new().with("sla", "pro").with("hours", 5.0);
        let quote = on_demand(&values, ON_DEMAND_INPUTS);
        assert_eq!(quote.total, 2450.0);
        assert_eq!(quote.breakdown.get("base"), Some(2450.0));
    }

    #[test]
    fn test_on_demand_unknown_sla_uses_basic_rate() {
        let values = Values::new().with("sla", "platinum").with("hours", 2.0);
        assert_eq!(on_demand(&values, ON_DEMAND_INPUTS).total, 700.0);
    }

    #[test]
    fn test_importacao_gerenciada_performance_pack() {
        let values = Values::new()
            .with("cif_mensal", 100_000.0)
            .with("complexidade", "padrao")
            .with("performance", true);
        let quote = importacao_gerenciada(&values, IMPORTACAO_GERENCIADA_INPUTS);
        assert_eq!(quote.breakdown.get("variavel"), Some(800.0));
        assert!((quote.total - 5300.0 * 0.85).abs() < 1e-9);
        assert!(quote.breakdown.get("performance").unwrap() < 0.0);
    }

    #[test]
    fn test_nova_rota_annualizes_the_monthly_fee() {
        let values = Values::new().with("plano", "avancado").with("missao", true);
        let quote = nova_rota_importacao(&values, NOVA_ROTA_INPUTS);
        assert_eq!(quote.breakdown.get("mensalidades"), Some(58_800.0));
        assert_eq!(quote.total, 6500.0 + 58_800.0 + 15_000.0);
    }

    #[test]
    fn test_classificacao_volume_tiers() {
        let quote = classificacao_fiscal(&Values::new().with("itens", 50.0), CLASSIFICACAO_INPUTS);
        assert_eq!(quote.total, 9000.0);
        let quote = classificacao_fiscal(&Values::new().with("itens", 60.0), CLASSIFICACAO_INPUTS);
        assert_eq!(quote.breakdown.get("desconto_volume"), Some(-1080.0));
        let quote = classificacao_fiscal(&Values::new().with("itens", 200.0), CLASSIFICACAO_INPUTS);
        assert_eq!(quote.total, 36_000.0 - 7200.0);
    }

    #[test]
    fn test_frete_insurance_only_when_ticked() {
        let values = Values::new()
            .with("rota", "europa")
            .with("teus", 3.0)
            .with("valor_carga", 500_000.0);
        assert_eq!(frete_internacional(&values, FRETE_INPUTS).total, 2340.0);
        let quote = frete_internacional(&values.with("seguro", true), FRETE_INPUTS);
        assert_eq!(quote.breakdown.get("seguro"), Some(1500.0));
    }

    #[test]
    fn test_ex_tarifario_success_fee() {
        let values = Values::new().with("pleitos", 2.0).with("economia_anual", 50_000.0);
        let quote = ex_tarifario(&values, EX_TARIFARIO_INPUTS);
        assert_eq!(quote.total, 7600.0 + 6000.0);
    }

    #[test]
    fn test_negative_quantities_count_as_zero() {
        let values = Values::new().with("sla", "pro").with("hours", -3.0);
        assert_eq!(on_demand(&values, ON_DEMAND_INPUTS).total, 0.0);
    }
}
