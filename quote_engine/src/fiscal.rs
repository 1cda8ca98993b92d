//! CFOP and CST/CSOSN suggestions.
//!
//! Small decision tables that pre-fill the fiscal codes of a proposal.
//! They are suggestions only: a code typed by the user always wins and
//! is not validated.  Combinations without a rule yield `""`.

use crate::tax::aliquotas::{normalizar_uf, uf_valida};
use serde::{Deserialize, Serialize};

/// Nature of the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operacao {
    Venda,
    Compra,
    Devolucao,
    Transferencia,
    Importacao,
    Exportacao,
    #[serde(other)]
    Desconhecida,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoCliente {
    Contribuinte,
    NaoContribuinte,
    ConsumidorFinal,
    #[serde(other)]
    Desconhecido,
}

/// Where the goods of the operation come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoOperacao {
    /// Goods bought or received from third parties.
    Revenda,
    /// Produced or industrialised by the establishment.
    ProducaoPropria,
    /// Goods under ICMS-ST with the tax already withheld upstream.
    SubstituicaoTributaria,
    #[serde(other)]
    Desconhecida,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeTributario {
    SimplesNacional,
    LucroPresumido,
    LucroReal,
    #[serde(other)]
    Desconhecido,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextoCfop {
    pub operacao: Operacao,
    pub uf_origem: String,
    pub uf_destino: String,
    pub tipo_cliente: TipoCliente,
    pub tipo_operacao: TipoOperacao,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextoCst {
    pub regime_tributario: RegimeTributario,
    pub produto_sujeito_st: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Abrangencia {
    Interna,
    Interestadual,
    Exterior,
}

/// UF code used for abroad on fiscal documents.
const UF_EXTERIOR: &str = "EX";

fn abrangencia(contexto: &ContextoCfop) -> Option<Abrangencia> {
    if matches!(contexto.operacao, Operacao::Importacao | Operacao::Exportacao) {
        return Some(Abrangencia::Exterior);
    }
    let origem = normalizar_uf(&contexto.uf_origem);
    let destino = normalizar_uf(&contexto.uf_destino);
    if origem == UF_EXTERIOR || destino == UF_EXTERIOR {
        return Some(Abrangencia::Exterior);
    }
    if !uf_valida(&origem) || !uf_valida(&destino) {
        return None;
    }
    if origem == destino {
        Some(Abrangencia::Interna)
    } else {
        Some(Abrangencia::Interestadual)
    }
}

/// Suggested CFOP; `""` when no rule applies.
pub fn sugerir_cfop(contexto: &ContextoCfop) -> &'static str {
    use Abrangencia::*;
    use TipoOperacao::*;

    let Some(abrangencia) = abrangencia(contexto) else {
        return "";
    };
    let nao_contribuinte = matches!(
        contexto.tipo_cliente,
        TipoCliente::NaoContribuinte | TipoCliente::ConsumidorFinal
    );

    match (contexto.operacao, contexto.tipo_operacao, abrangencia) {
        // Outgoing
        (Operacao::Venda | Operacao::Exportacao, Revenda, Interna) => "5102",
        (Operacao::Venda | Operacao::Exportacao, Revenda, Interestadual) if nao_contribuinte => "6108",
        (Operacao::Venda | Operacao::Exportacao, Revenda, Interestadual) => "6102",
        (Operacao::Venda | Operacao::Exportacao, Revenda, Exterior) => "7102",
        (Operacao::Venda | Operacao::Exportacao, ProducaoPropria, Interna) => "5101",
        (Operacao::Venda | Operacao::Exportacao, ProducaoPropria, Interestadual) if nao_contribuinte => "6107",
        (Operacao::Venda | Operacao::Exportacao, ProducaoPropria, Interestadual) => "6101",
        (Operacao::Venda | Operacao::Exportacao, ProducaoPropria, Exterior) => "7101",
        (Operacao::Venda, SubstituicaoTributaria, Interna) => "5405",
        (Operacao::Venda, SubstituicaoTributaria, Interestadual) => "6404",

        // Incoming
        (Operacao::Compra | Operacao::Importacao, Revenda, Interna) => "1102",
        (Operacao::Compra | Operacao::Importacao, Revenda, Interestadual) => "2102",
        (Operacao::Compra | Operacao::Importacao, Revenda, Exterior) => "3102",
        (Operacao::Compra | Operacao::Importacao, ProducaoPropria, Interna) => "1101",
        (Operacao::Compra | Operacao::Importacao, ProducaoPropria, Interestadual) => "2101",
        (Operacao::Compra | Operacao::Importacao, ProducaoPropria, Exterior) => "3101",
        (Operacao::Compra, SubstituicaoTributaria, Interna) => "1403",
        (Operacao::Compra, SubstituicaoTributaria, Interestadual) => "2403",

        // Purchase returns
        (Operacao::Devolucao, Revenda, Interna) => "5202",
        (Operacao::Devolucao, Revenda, Interestadual) => "6202",
        (Operacao::Devolucao, Revenda, Exterior) => "7202",
        (Operacao::Devolucao, ProducaoPropria, Interna) => "5201",
        (Operacao::Devolucao, ProducaoPropria, Interestadual) => "6201",
        (Operacao::Devolucao, ProducaoPropria, Exterior) => "7201",
        (Operacao::Devolucao, SubstituicaoTributaria, Interna) => "5411",
        (Operacao::Devolucao, SubstituicaoTributaria, Interestadual) => "6411",

        // Transfers between establishments
        (Operacao::Transferencia, Revenda, Interna) => "5152",
        (Operacao::Transferencia, Revenda, Interestadual) => "6152",
        (Operacao::Transferencia, ProducaoPropria, Interna) => "5151",
        (Operacao::Transferencia, ProducaoPropria, Interestadual) => "6151",
        (Operacao::Transferencia, SubstituicaoTributaria, Interna) => "5409",
        (Operacao::Transferencia, SubstituicaoTributaria, Interestadual) => "6409",

        _ => "",
    }
}

/// Suggested ICMS CST (normal regimes) or CSOSN (Simples Nacional).
pub fn sugerir_cst(contexto: &ContextoCst) -> &'static str {
    match (contexto.regime_tributario, contexto.produto_sujeito_st) {
        (RegimeTributario::SimplesNacional, true) => "500",
        (RegimeTributario::SimplesNacional, false) => "102",
        (RegimeTributario::LucroPresumido | RegimeTributario::LucroReal, true) => "60",
        (RegimeTributario::LucroPresumido | RegimeTributario::LucroReal, false) => "00",
        (RegimeTributario::Desconhecido, _) => "",
    }
}

/// The user's code when one was given, else the suggestion.
pub fn resolver_codigo(informado: Option<&str>, sugerido: &str) -> String {
    match informado.map(str::trim) {
        Some(codigo) if !codigo.is_empty() => codigo.to_string(),
        _ => sugerido.to_string(),
    }
}
