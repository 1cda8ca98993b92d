//! Entry point for the Quote Engine binary.
//!
//! Running this binary starts an HTTP server exposing the quote engine.
//! Settings come from the environment (see [`quote_engine::config`]);
//! log verbosity follows `RUST_LOG`, default `info`.

use quote_engine::config::Settings;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!(%err, "invalid settings");
            std::process::exit(2);
        }
    };
    info!(
        addr = %settings.bind_addr,
        tax_profile_dir = %settings.tax_profile_dir.display(),
        "starting quote engine"
    );

    if let Err(err) = quote_engine::api::serve(&settings).await {
        error!("error running server: {err:#}");
        std::process::exit(1);
    }
}
