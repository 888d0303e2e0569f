use std::{env, sync::Once};

use tracing::debug;
use tracing_subscriber::EnvFilter;

static LOG_INIT: Once = Once::new();

/// Install the global `tracing` subscriber once.
///
/// `RUST_LOG` selects the filter, `RUST_LOG_FORMAT=json` switches to JSON lines and a
/// non-empty `NO_COLOR` disables ANSI colours.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let json = env::var("RUST_LOG_FORMAT").is_ok_and(|f| f == "json");
        if json {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .json()
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_ansi(use_color())
                .init();
        }
        debug!(json, "logging initialised");
    });
}

fn use_color() -> bool {
    env::var("NO_COLOR").map(|v| v.is_empty()).unwrap_or(true)
}
