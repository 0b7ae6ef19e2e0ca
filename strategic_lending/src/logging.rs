//! Console logging for the binaries

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a `-v` count: 0 → info, 1 → debug, 2+ → trace
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("strategic_lending={level},warn")
}

/// Install a stderr subscriber. `RUST_LOG` overrides `verbosity` when set.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(verbosity: u8) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .is_ok()
}
