// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod classify;
pub mod collector;
pub mod config;
pub mod normalize;
pub mod notify;
pub mod record;
pub mod report;
pub mod source;
pub mod store;

pub use crate::config::AppConfig;
pub use crate::record::{PostRecord, Sentiment};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing to stdout; `RUST_LOG` overrides the default filter.
/// Called once per binary, before any other work.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
