//! Markup and margin calculator for product quotes.
//!
//! This path is independent of the service catalog: a simulation lists
//! the items being sold with their unit costs, the expenses of the
//! operation and the taxes that load the cost, and a markup turns the
//! resulting cost price into a sale price.

use crate::models::{finite_or_zero, lenient_number};
use crate::tax::{calculate_taxes, TaxCalculation, TaxRate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemSimulacao {
    pub descricao: String,
    #[serde(deserialize_with = "lenient_number")]
    pub quantidade: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub custo_unitario: f64,
    /// List price, reported for reference only.
    #[serde(deserialize_with = "lenient_number")]
    pub preco_unitario: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoDespesa {
    #[default]
    Fixa,
    Variavel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DespesaSimulacao {
    pub descricao: String,
    #[serde(deserialize_with = "lenient_number")]
    pub valor: f64,
    pub tipo: TipoDespesa,
}

/// Tax lines of a simulation share the cascade's shape.
pub type ImpostoSimulacao = TaxRate;

/// A product quote being simulated.  Built fresh from form state; the
/// engine never stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Simulacao {
    pub itens: Vec<ItemSimulacao>,
    pub despesas: Vec<DespesaSimulacao>,
    pub impostos: Vec<ImpostoSimulacao>,
    /// Percent over cost price.
    #[serde(deserialize_with = "lenient_number")]
    pub markup: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoSimulacao {
    pub custo_itens: f64,
    pub despesas_totais: f64,
    pub despesas_fixas: f64,
    pub despesas_variaveis: f64,
    pub impostos: TaxCalculation,
    pub preco_custo: f64,
    pub preco_venda: f64,
    pub markup: f64,
    pub margem_bruta: f64,
    /// Currently identical to `margem_bruta`; expenses are not netted
    /// out separately.
    pub margem_liquida: f64,
    pub receita_tabela: f64,
}

fn soma_despesas(despesas: &[DespesaSimulacao], tipo: Option<TipoDespesa>) -> f64 {
    despesas
        .iter()
        .filter(|d| tipo.map_or(true, |t| d.tipo == t))
        .map(|d| finite_or_zero(d.valor))
        .sum()
}

/// Gross margin in percent of the sale price; 0 when the sale price is 0.
pub fn margem_sobre_venda(preco_custo: f64, preco_venda: f64) -> f64 {
    if preco_venda != 0.0 && preco_venda.is_finite() {
        (preco_venda - preco_custo) / preco_venda * 100.0
    } else {
        0.0
    }
}

/// Margin over sale price produced by a markup over cost.
pub fn markup_para_margem(markup: f64) -> f64 {
    margem_sobre_venda(1.0, 1.0 + finite_or_zero(markup) / 100.0)
}

/// Markup over cost needed for a target margin over sale price; 0 for a
/// margin of 100% or more, which no markup reaches.
pub fn margem_para_markup(margem: f64) -> f64 {
    let margem = finite_or_zero(margem);
    if margem >= 100.0 {
        0.0
    } else {
        margem / (100.0 - margem) * 100.0
    }
}

/// Prices a simulation.
///
/// Items and expenses form the tax base; the enabled taxes load it into
/// the cost price, and the markup turns that into the sale price.
pub fn calcular_simulacao(simulacao: &Simulacao, uf: &str) -> ResultadoSimulacao {
    let custo_itens: f64 = simulacao
        .itens
        .iter()
        .map(|item| finite_or_zero(item.quantidade) * finite_or_zero(item.custo_unitario))
        .sum();
    let receita_tabela: f64 = simulacao
        .itens
        .iter()
        .map(|item| finite_or_zero(item.quantidade) * finite_or_zero(item.preco_unitario))
        .sum();

    let despesas_totais = soma_despesas(&simulacao.despesas, None);
    let base_impostos = custo_itens + despesas_totais;

    let impostos = calculate_taxes(base_impostos, uf, &simulacao.impostos);
    let preco_custo = base_impostos + impostos.subtotal;

    let markup = finite_or_zero(simulacao.markup);
    let preco_venda = preco_custo * (1.0 + markup / 100.0);
    let margem_bruta = margem_sobre_venda(preco_custo, preco_venda);

    ResultadoSimulacao {
        custo_itens,
        despesas_totais,
        despesas_fixas: soma_despesas(&simulacao.despesas, Some(TipoDespesa::Fixa)),
        despesas_variaveis: soma_despesas(&simulacao.despesas, Some(TipoDespesa::Variavel)),
        impostos,
        preco_custo,
        preco_venda,
        markup,
        margem_bruta,
        margem_liquida: margem_bruta,
        receita_tabela,
    }
}
