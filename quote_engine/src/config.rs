//! Runtime settings of the quote server.
//!
//! Read from environment variables:
//!
//! * `QUOTE_BIND_ADDR`: socket address to listen on, default
//!   `127.0.0.1:3000`.
//! * `QUOTE_TAX_PROFILE_DIR`: directory with the tax profile JSON files,
//!   default `tax_profiles` relative to the working directory.

use crate::error::{EngineResult, QuoteError};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const BIND_ADDR_VAR: &str = "QUOTE_BIND_ADDR";
pub const TAX_PROFILE_DIR_VAR: &str = "QUOTE_TAX_PROFILE_DIR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TAX_PROFILE_DIR: &str = "tax_profiles";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub tax_profile_dir: PathBuf,
}

impl Settings {
    /// Builds the settings from any variable source.  Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let addr = var(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| QuoteError::BindAddr { addr, source })?;

        let tax_profile_dir =
            PathBuf::from(var(TAX_PROFILE_DIR_VAR).unwrap_or_else(|| DEFAULT_TAX_PROFILE_DIR.to_string()));

        Ok(Self {
            bind_addr,
            tax_profile_dir,
        })
    }

    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
