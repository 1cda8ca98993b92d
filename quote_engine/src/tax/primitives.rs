//! Brazilian tax primitives.
//!
//! Each function takes a base amount (plus auxiliary inputs) and a rate
//! in percent.  None of them fail: NaN or infinite inputs are read as 0,
//! and the optional parts of the ICMS-ST base default to 0 when absent.
//! Negative bases and rates also count as 0, so every tax amount is
//! non-negative; only the differences (ICMS-ST, DIFAL) carry a sign.

use crate::models::finite_or_zero;
use serde::{Deserialize, Serialize};

/// `base * rate / 100`, both operands coerced and floored at 0.
fn aplicar(base: f64, aliquota: f64) -> f64 {
    finite_or_zero(base).max(0.0) * (finite_or_zero(aliquota).max(0.0) / 100.0)
}

/// Components of the ICMS-ST taxable base (Convênio ICMS 142/2018).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseIcmsSt {
    pub valor_produto: f64,
    pub frete: f64,
    pub seguro: f64,
    pub despesas: f64,
    /// Added value margin (MVA), percent.
    pub mva: f64,
    pub ipi: f64,
}

/// `(produto + frete + seguro + despesas) * (1 + mva/100) + ipi`
pub fn calcular_base_icms_st(entrada: &BaseIcmsSt) -> f64 {
    let operacao = finite_or_zero(entrada.valor_produto)
        + finite_or_zero(entrada.frete)
        + finite_or_zero(entrada.seguro)
        + finite_or_zero(entrada.despesas);
    operacao * (1.0 + finite_or_zero(entrada.mva) / 100.0) + finite_or_zero(entrada.ipi)
}

pub fn calcular_icms(base: f64, aliquota: f64) -> f64 {
    aplicar(base, aliquota)
}

/// ICMS owed by substitution: tax on the ST base minus the seller's own
/// ICMS.  Not clamped.
pub fn calcular_icms_st(base_st: f64, aliquota_st: f64, icms_proprio: f64) -> f64 {
    aplicar(base_st, aliquota_st) - finite_or_zero(icms_proprio)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difal {
    pub base_calculo: f64,
    pub aliquota_interna: f64,
    pub aliquota_interestadual: f64,
    pub valor_interno: f64,
    pub valor_interestadual: f64,
    /// Negative when the interstate rate exceeds the internal one.
    pub valor_difal: f64,
}

pub fn calcular_difal(base: f64, aliquota_interna: f64, aliquota_interestadual: f64) -> Difal {
    let valor_interno = aplicar(base, aliquota_interna);
    let valor_interestadual = aplicar(base, aliquota_interestadual);
    Difal {
        base_calculo: finite_or_zero(base),
        aliquota_interna: finite_or_zero(aliquota_interna),
        aliquota_interestadual: finite_or_zero(aliquota_interestadual),
        valor_interno,
        valor_interestadual,
        valor_difal: valor_interno - valor_interestadual,
    }
}

pub fn calcular_ipi(base: f64, aliquota: f64) -> f64 {
    aplicar(base, aliquota)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PisCofins {
    pub pis: f64,
    pub cofins: f64,
    pub total: f64,
}

pub fn calcular_pis_cofins(base: f64, aliquota_pis: f64, aliquota_cofins: f64) -> PisCofins {
    let pis = aplicar(base, aliquota_pis);
    let cofins = aplicar(base, aliquota_cofins);
    PisCofins {
        pis,
        cofins,
        total: pis + cofins,
    }
}

pub fn calcular_iss(base: f64, aliquota: f64) -> f64 {
    aplicar(base, aliquota)
}

pub fn calcular_fcp(base: f64, aliquota: f64) -> f64 {
    aplicar(base, aliquota)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_difal_on_one_thousand() {
        let difal = calcular_difal(1000.0, 18.0, 12.0);
        assert!(approx(difal.valor_difal, 60.0));
        assert!(approx(difal.valor_interno, 180.0));
    }

    #[test]
    fn test_negative_inputs_yield_zero_tax() {
        assert_eq!(calcular_icms(-1000.0, 18.0), 0.0);
        assert_eq!(calcular_iss(1000.0, -5.0), 0.0);
        assert_eq!(calcular_pis_cofins(-10.0, 1.65, 7.6).total, 0.0);
        assert_eq!(calcular_difal(-1000.0, 18.0, 12.0).valor_difal, 0.0);
    }

    #[test]
    fn test_difal_is_not_clamped() {
        let difal = calcular_difal(1000.0, 7.0, 12.0);
        assert!(approx(difal.valor_difal, -50.0));
    }

    #[test]
    fn test_base_icms_st_with_every_component() {
        let base = calcular_base_icms_st(&BaseIcmsSt {
            valor_produto: 1000.0,
            frete: 100.0,
            seguro: 50.0,
            despesas: 50.0,
            mva: 40.0,
            ipi: 120.0,
        });
        assert!(approx(base, 1200.0 * 1.4 + 120.0));
    }

    #[test]
    fn test_base_icms_st_missing_parts_default_to_zero() {
        let entrada: BaseIcmsSt = serde_json::from_str(r#"{"valorProduto": 500, "mva": 50}"#).unwrap();
        assert!(approx(calcular_base_icms_st(&entrada), 750.0));
        assert_eq!(calcular_base_icms_st(&BaseIcmsSt::default()), 0.0);
    }

    #[test]
    fn test_icms_st_subtracts_own_icms() {
        let base_st = 1800.0;
        let proprio = calcular_icms(1200.0, 12.0);
        assert!(approx(calcular_icms_st(base_st, 18.0, proprio), 324.0 - 144.0));
    }

    #[test]
    fn test_pis_cofins_pair() {
        let pc = calcular_pis_cofins(1000.0, 1.65, 7.6);
        assert!(approx(pc.pis, 16.5));
        assert!(approx(pc.cofins, 76.0));
        assert!(approx(pc.total, 92.5));
    }

    #[test]
    fn test_nan_inputs_are_zero() {
        assert_eq!(calcular_ipi(f64::NAN, 10.0), 0.0);
        assert_eq!(calcular_iss(100.0, f64::INFINITY), 0.0);
        assert_eq!(calcular_fcp(200.0, 2.0), 4.0);
    }
}
