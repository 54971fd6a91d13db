//! # RecipCalc CLI
//!
//! Command-line front end for the compressor performance engine.
//!
//! ```bash
//! recipcalc --param suction_pressure=1 --param discharge_pressure=8 \
//!     --param suction_temperature=300 --param speed_rpm=1200 --format pdf
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG` or pass `-v` for more detail.

mod app;
mod config;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::parse();

    // -v wins over RUST_LOG; RUST_LOG wins over the warn default
    let filter = if config.verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    app::run(&config)
}
