//! Tracing init. Call once at process startup.
//!
//! `TOOLBELT_LOG_LEVEL` selects the filter (default `info`);
//! `TOOLBELT_QUIET=1` clamps our crates to warn and above. `RUST_LOG`
//! always wins when set.

use tracing_subscriber::{prelude::*, EnvFilter};

pub fn init_tracing() {
    let quiet = std::env::var("TOOLBELT_QUIET")
        .map(|v| {
            let v = v.trim().to_lowercase();
            v == "1" || v == "true" || v == "yes"
        })
        .unwrap_or(false);

    let level = if quiet {
        "toolbelt=warn,toolbelt_core=warn".to_string()
    } else {
        std::env::var("TOOLBELT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
