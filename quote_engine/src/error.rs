//! Errors raised at the edges of the engine.

use std::{io, net::AddrParseError, path::PathBuf};
use thiserror::Error;

/// Convenience return type for the fallible boundary of the crate.
pub type EngineResult<T> = Result<T, QuoteError>;

/// Failures at the edges of the engine.  The calculation functions
/// themselves are total and never produce these.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("unknown service package: {slug}")]
    UnknownService { slug: String },

    #[error("invalid bind address {addr:?}: {source}")]
    BindAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("tax profile {path:?} could not be parsed: {source}")]
    TaxProfile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
