//! Default tax lists per jurisdiction.
//!
//! A [`TaxProfile`] is the tax list a new quote starts from in a given
//! UF.  Profiles are expected to be stored externally as versioned JSON
//! files; when no file covers a UF the built-in default is used, with
//! ICMS at the UF's internal rate.

use crate::error::{EngineResult, QuoteError};
use crate::tax::aliquotas::{aliquota_interna, normalizar_uf};
use crate::tax::{TaxRate, TaxType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// The tax list of one UF at a specific version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxProfile {
    /// UF code such as `"SP"`.
    pub uf: String,
    /// Version string, e.g. `"2025"` or `"2025-07"`.  Compared as text;
    /// the greatest wins when several files cover the same UF.
    pub version: String,
    pub taxes: Vec<TaxRate>,
}

/// Built-in tax list for `uf`, in display order: ICMS, PIS, COFINS,
/// ISS, IPI, II, IOF.  PIS/COFINS and ISS are enabled, the goods-related
/// taxes present but disabled.
pub fn default_taxes(uf: &str) -> Vec<TaxRate> {
    vec![
        TaxRate::new(TaxType::Icms, aliquota_interna(uf).unwrap_or(0.0), false),
        TaxRate::new(TaxType::Pis, 1.65, true),
        TaxRate::new(TaxType::Cofins, 7.6, true),
        TaxRate::new(TaxType::Iss, 5.0, true),
        TaxRate::new(TaxType::Ipi, 0.0, false),
        TaxRate::new(TaxType::Ii, 0.0, false),
        TaxRate::new(TaxType::Iof, 0.38, false),
    ]
}

/// Parses one profile file.
pub fn load_tax_profile(path: &Path) -> EngineResult<TaxProfile> {
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str::<TaxProfile>(&data).map_err(|source| QuoteError::TaxProfile {
        path: path.to_path_buf(),
        source,
    })
}

/// Load all tax profiles from a directory.
///
/// Every `.json` file is parsed as a [`TaxProfile`].  Files that fail to
/// parse are logged and skipped.  A missing directory yields no
/// profiles.
pub fn load_tax_profiles_from_dir(path: &Path) -> EngineResult<Vec<TaxProfile>> {
    let mut profiles = Vec::new();
    if !path.is_dir() {
        warn!(dir = %path.display(), "tax profile directory not found; using built-in defaults");
        return Ok(profiles);
    }
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let file = entry.path();
        if !entry.file_type()?.is_file() || file.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        match load_tax_profile(&file) {
            Ok(profile) => profiles.push(profile),
            Err(err) => warn!(%err, "skipping tax profile"),
        }
    }
    info!(count = profiles.len(), dir = %path.display(), "tax profiles loaded");
    Ok(profiles)
}

/// Loaded profiles indexed by UF.
#[derive(Debug, Clone, Default)]
pub struct TaxProfiles {
    by_uf: HashMap<String, TaxProfile>,
}

impl TaxProfiles {
    pub fn from_profiles(profiles: Vec<TaxProfile>) -> Self {
        let mut by_uf: HashMap<String, TaxProfile> = HashMap::new();
        for profile in profiles {
            let uf = normalizar_uf(&profile.uf);
            match by_uf.get(&uf) {
                Some(current) if current.version >= profile.version => {}
                _ => {
                    by_uf.insert(uf, profile);
                }
            }
        }
        Self { by_uf }
    }

    pub fn load(dir: &Path) -> EngineResult<Self> {
        Ok(Self::from_profiles(load_tax_profiles_from_dir(dir)?))
    }

    pub fn get(&self, uf: &str) -> Option<&TaxProfile> {
        self.by_uf.get(&normalizar_uf(uf))
    }

    /// Tax list for `uf`: the loaded profile if any, else the built-in one.
    pub fn taxes_for(&self, uf: &str) -> Vec<TaxRate> {
        self.get(uf)
            .map(|profile| profile.taxes.clone())
            .unwrap_or_else(|| default_taxes(uf))
    }

    pub fn len(&self) -> usize {
        self.by_uf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(uf: &str, version: &str, icms: f64) -> TaxProfile {
        TaxProfile {
            uf: uf.into(),
            version: version.into(),
            taxes: vec![TaxRate::new(TaxType::Icms, icms, true)],
        }
    }

    #[test]
    fn test_newest_version_wins() {
        let profiles = TaxProfiles::from_profiles(vec![
            profile("SP", "2025", 18.0),
            profile("sp", "2024", 17.0),
            profile("RJ", "2024", 20.0),
        ]);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles.get("SP").unwrap().version, "2025");
        assert_eq!(profiles.taxes_for("rj")[0].rate, 20.0);
    }

    #[test]
    fn test_fallback_uses_internal_icms_rate() {
        let taxes = TaxProfiles::default().taxes_for("BA");
        let icms = taxes.iter().find(|t| t.tax_type == TaxType::Icms).unwrap();
        assert_eq!(icms.rate, 20.5);
        assert!(!icms.enabled);
    }

    #[test]
    fn test_default_list_order() {
        let types: Vec<TaxType> = default_taxes("SP").iter().map(|t| t.tax_type).collect();
        assert_eq!(
            types,
            [
                TaxType::Icms,
                TaxType::Pis,
                TaxType::Cofins,
                TaxType::Iss,
                TaxType::Ipi,
                TaxType::Ii,
                TaxType::Iof,
            ]
        );
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let profiles = TaxProfiles::load(Path::new("/definitely/not/here")).unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_profile_json_shape() {
        let json = r#"{"uf":"SP","version":"2025","taxes":[{"type":"ICMS","rate":18,"enabled":true}]}"#;
        let parsed: TaxProfile = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.taxes[0].tax_type, TaxType::Icms);
        assert_eq!(parsed.taxes[0].description, "");
    }
}
