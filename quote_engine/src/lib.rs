//! Quote Engine library crate.
//!
//! Pricing and tax core for Brazilian foreign-trade (COMEX) consulting
//! quotes.  The core modules are pure: a quote is computed from plain
//! values with no I/O, and every calculation is total.  External
//! applications may call [`engine::run_quote`] directly or embed the
//! HTTP surface via [`api::build_router`].

pub mod models;
pub mod services;
pub mod catalog;
pub mod tax;
pub mod aggregate;
pub mod markup;
pub mod currency;
pub mod fiscal;
pub mod engine;
pub mod config;
pub mod error;
pub mod api;

pub use catalog::{find_service, ServiceConfig, CATALOG};
pub use engine::{run_quote, QuoteOutcome, QuoteRequest};
pub use error::{EngineResult, QuoteError};
