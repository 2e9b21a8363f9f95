//! rebind command-line driver.
//!
//! The binary in `main.rs` only parses arguments; everything it runs lives
//! in [`commands`] so it can be tested without spawning a process.

pub mod commands;

use std::sync::Once;

/// Environment variable holding the log filter, e.g. `REBIND_LOG=rebind_rewrite=trace`.
pub const LOG_ENV: &str = "REBIND_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the log subscriber when [`LOG_ENV`] is set. Safe to call twice.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var_os(LOG_ENV).is_some() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(EnvFilter::from_env(LOG_ENV))
                .init();
        }
    });
}
