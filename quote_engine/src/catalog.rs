//! The service catalog.
//!
//! A [`ServiceConfig`] is one purchasable package: identity, an ordered
//! input schema and a pure pricing function.  The catalog is a static
//! table; entries are never mutated at runtime.  Raw values coming from
//! a form are passed through [`ServiceConfig::resolve`] before pricing,
//! which fills defaults and reports anything it had to adjust.

use crate::error::{EngineResult, QuoteError};
use crate::models::{FieldKind, FieldValue, InputField, ServiceQuote, Values};
use crate::services;
use serde::Serialize;
use tracing::debug;

/// Signature every package pricing function implements.
pub type PricingFn = fn(&Values, &[InputField]) -> ServiceQuote;

/// One purchasable service package.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceConfig {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InputField],
    #[serde(skip)]
    pub pricing: PricingFn,
}

/// An adjustment made while resolving raw form values.  Advisory only:
/// resolution always yields a complete value set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub key: String,
    pub message: String,
}

impl FieldIssue {
    fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Values ready for pricing plus whatever was adjusted on the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub values: Values,
    pub issues: Vec<FieldIssue>,
}

impl ServiceConfig {
    /// A value set holding every field's default.
    pub fn default_values(&self) -> Values {
        self.inputs.iter().fold(Values::new(), |values, field| {
            values.with(field.key, field.default_value())
        })
    }

    /// Brings raw values into the shape the schema declares.
    ///
    /// Missing or `null` fields take their default.  A value of the
    /// wrong type is converted when it can be read as the field's type
    /// (`"5"` for a number, `"true"` for a checkbox), otherwise it is
    /// replaced by the default.  Constraint violations (out of range,
    /// unknown option) are reported but the value is kept.  Keys the
    /// schema does not declare are dropped.
    pub fn resolve(&self, raw: &Values) -> Resolution {
        let mut resolution = Resolution::default();

        for field in self.inputs {
            let value = match raw.get(field.key) {
                None | Some(FieldValue::Empty) => field.default_value(),
                Some(value) => match coerce(field, value) {
                    Some(coerced) => coerced,
                    None => {
                        resolution.issues.push(FieldIssue::new(
                            field.key,
                            "valor ilegível; usando o padrão do campo",
                        ));
                        field.default_value()
                    }
                },
            };
            if let Some(message) = field.violation(&value) {
                resolution.issues.push(FieldIssue::new(field.key, message));
            }
            resolution.values.insert(field.key, value);
        }

        for (key, _) in raw.iter() {
            if !self.inputs.iter().any(|field| field.key == key.as_str()) {
                resolution
                    .issues
                    .push(FieldIssue::new(key, "campo não pertence ao serviço; ignorado"));
            }
        }

        resolution
    }

    /// Prices already-resolved values.
    pub fn calculate(&self, values: &Values) -> ServiceQuote {
        let quote = (self.pricing)(values, self.inputs);
        debug!(service = self.slug, total = quote.total, "service priced");
        quote
    }

    /// Resolves raw values and prices them.
    pub fn quote(&self, raw: &Values) -> (ServiceQuote, Vec<FieldIssue>) {
        let Resolution { values, issues } = self.resolve(raw);
        (self.calculate(&values), issues)
    }
}

/// Reads `value` as the field's type, if possible.
fn coerce(field: &InputField, value: &FieldValue) -> Option<FieldValue> {
    match field.kind {
        FieldKind::Number { .. } => value.as_number().map(FieldValue::Number),
        FieldKind::Checkbox { .. } => value.as_flag().map(FieldValue::Flag),
        FieldKind::Select { .. } => match value {
            FieldValue::Text(_) => Some(value.clone()),
            FieldValue::Number(n) => Some(FieldValue::Text(n.to_string())),
            _ => None,
        },
    }
}

pub static CATALOG: &[ServiceConfig] = &[
    ServiceConfig {
        slug: "pme-comex-ready",
        name: "PME COMEX Ready",
        description: "Estruturação da área de comércio exterior para pequenas e médias empresas, com embarques assistidos.",
        inputs: services::PME_COMEX_READY_INPUTS,
        pricing: services::pme_comex_ready,
    },
    ServiceConfig {
        slug: "on-demand",
        name: "Consultoria On-Demand",
        description: "Horas de consultoria técnica em comércio exterior com nível de SLA contratado.",
        inputs: services::ON_DEMAND_INPUTS,
        pricing: services::on_demand,
    },
    ServiceConfig {
        slug: "importacao-gerenciada",
        name: "Importação Gerenciada",
        description: "Gestão mensal das importações: retainer fixo mais percentual sobre o CIF importado.",
        inputs: services::IMPORTACAO_GERENCIADA_INPUTS,
        pricing: services::importacao_gerenciada,
    },
    ServiceConfig {
        slug: "nova-rota-importacao",
        name: "Nova Rota de Importação",
        description: "Desenvolvimento de novos fornecedores e rotas de importação em contrato anual.",
        inputs: services::NOVA_ROTA_INPUTS,
        pricing: services::nova_rota_importacao,
    },
    ServiceConfig {
        slug: "habilitacao-radar",
        name: "Habilitação RADAR",
        description: "Habilitação da empresa no Siscomex na modalidade adequada ao volume de operações.",
        inputs: services::RADAR_INPUTS,
        pricing: services::habilitacao_radar,
    },
    ServiceConfig {
        slug: "classificacao-fiscal",
        name: "Classificação Fiscal",
        description: "Classificação NCM de mercadorias com desconto progressivo por volume.",
        inputs: services::CLASSIFICACAO_INPUTS,
        pricing: services::classificacao_fiscal,
    },
    ServiceConfig {
        slug: "frete-internacional",
        name: "Gestão de Frete Internacional",
        description: "Agenciamento de carga por TEU, seguro internacional e desembaraço.",
        inputs: services::FRETE_INPUTS,
        pricing: services::frete_internacional,
    },
    ServiceConfig {
        slug: "ex-tarifario",
        name: "Pleito de Ex-Tarifário",
        description: "Elaboração de pleitos de redução do Imposto de Importação, com taxa de êxito.",
        inputs: services::EX_TARIFARIO_INPUTS,
        pricing: services::ex_tarifario,
    },
];

/// Catalog entry for `slug`.
pub fn find_service(slug: &str) -> EngineResult<&'static ServiceConfig> {
    CATALOG
        .iter()
        .find(|service| service.slug == slug)
        .ok_or_else(|| QuoteError::UnknownService {
            slug: slug.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugs_and_keys_are_unique() {
        let slugs: HashSet<_> = CATALOG.iter().map(|s| s.slug).collect();
        assert_eq!(slugs.len(), CATALOG.len());
        for service in CATALOG {
            let keys: HashSet<_> = service.inputs.iter().map(|f| f.key).collect();
            assert_eq!(keys.len(), service.inputs.len(), "{}", service.slug);
        }
    }

    #[test]
    fn test_every_default_satisfies_its_constraints() {
        for service in CATALOG {
            for field in service.inputs {
                assert!(field.default_is_consistent(), "{}.{}", service.slug, field.key);
            }
        }
    }

    #[test]
    fn test_default_values_price_consistently() {
        for service in CATALOG {
            let quote = service.calculate(&service.default_values());
            assert_eq!(quote.total, quote.breakdown.sum(), "{}", service.slug);
            assert!(quote.total.is_finite());
        }
    }

    #[test]
    fn test_resolve_fills_defaults_and_reports_garbage() {
        let service = find_service("on-demand").unwrap();
        let raw = Values::new()
            .with("hours", "cinco")
            .with("urgente", "true")
            .with("bogus", 1.0);
        let resolution = service.resolve(&raw);
        assert_eq!(resolution.values.number("hours"), 4.0);
        assert_eq!(resolution.values.text("sla"), Some("basic"));
        assert!(resolution.values.flag("urgente"));
        let keys: Vec<&str> = resolution.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["hours", "bogus"]);
    }

    #[test]
    fn test_resolve_keeps_out_of_range_values() {
        let service = find_service("on-demand").unwrap();
        let (quote, issues) = service.quote(&Values::new().with("sla", "pro").with("hours", 500.0));
        assert_eq!(quote.total, 490.0 * 500.0);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "hours");
    }

    #[test]
    fn test_unknown_slug_is_an_error() {
        assert!(matches!(
            find_service("nope"),
            Err(QuoteError::UnknownService { .. })
        ));
    }

    #[test]
    fn test_catalog_serializes_schema_without_pricing() {
        let json = serde_json::to_value(find_service("on-demand").unwrap()).unwrap();
        assert_eq!(json["inputs"][0]["type"], "select");
        assert_eq!(json["inputs"][0]["options"][1]["value"], "pro");
        assert!(json.get("pricing").is_none());
    }
}
