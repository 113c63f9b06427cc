use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
