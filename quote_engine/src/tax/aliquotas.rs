//! ICMS rate tables.
//!
//! Internal rate per UF and the interstate rule between two UFs.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Modal internal ICMS rate per UF, in percent, without FCP.
static ALIQUOTAS_INTERNAS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    HashMap::from([
        ("AC", 19.0),
        ("AL", 19.0),
        ("AM", 20.0),
        ("AP", 18.0),
        ("BA", 20.5),
        ("CE", 20.0),
        ("DF", 20.0),
        ("ES", 17.0),
        ("GO", 19.0),
        ("MA", 22.0),
        ("MG", 18.0),
        ("MS", 17.0),
        ("MT", 17.0),
        ("PA", 19.0),
        ("PB", 20.0),
        ("PE", 20.5),
        ("PI", 21.0),
        ("PR", 19.5),
        ("RJ", 20.0),
        ("RN", 18.0),
        ("RO", 19.5),
        ("RR", 20.0),
        ("RS", 17.0),
        ("SC", 17.0),
        ("SE", 19.0),
        ("SP", 18.0),
        ("TO", 20.0),
    ])
});

/// South and Southeast states except Espírito Santo.  Shipments from
/// these to every other state (ES included) use 7% (Res. Senado 22/1989).
const SUL_SUDESTE_EXCETO_ES: [&str; 6] = ["MG", "PR", "RJ", "RS", "SC", "SP"];

/// Interstate rate for imported goods (Res. Senado 13/2012).
pub const ALIQUOTA_IMPORTADOS: f64 = 4.0;

/// Trimmed, upper-case UF code.
pub fn normalizar_uf(uf: &str) -> String {
    uf.trim().to_ascii_uppercase()
}

pub fn uf_valida(uf: &str) -> bool {
    ALIQUOTAS_INTERNAS.contains_key(normalizar_uf(uf).as_str())
}

/// Internal ICMS rate of `uf`; `None` for an unknown UF.
pub fn aliquota_interna(uf: &str) -> Option<f64> {
    ALIQUOTAS_INTERNAS.get(normalizar_uf(uf).as_str()).copied()
}

/// Interstate ICMS rate from `origem` to `destino`.
///
/// `None` for an internal operation (same UF) or an unknown UF.
pub fn aliquota_interestadual(origem: &str, destino: &str, importado: bool) -> Option<f64> {
    let origem = normalizar_uf(origem);
    let destino = normalizar_uf(destino);

    if origem == destino || !uf_valida(&origem) || !uf_valida(&destino) {
        return None;
    }
    if importado {
        return Some(ALIQUOTA_IMPORTADOS);
    }

    let sai_do_sul_sudeste = SUL_SUDESTE_EXCETO_ES.contains(&origem.as_str());
    let entra_no_sul_sudeste = SUL_SUDESTE_EXCETO_ES.contains(&destino.as_str());

    if sai_do_sul_sudeste && !entra_no_sul_sudeste {
        Some(7.0)
    } else {
        Some(12.0)
    }
}
