use std::fs;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "source.log";
const DEFAULT_DIRECTIVE: &str = "adaptive_source=info";

/// Install the global subscriber: JSON lines to a daily file under `logs/`
/// plus human-readable output on stderr. `RUST_LOG` adds to the crate default.
///
/// Stdout is reserved for protocol messages and never receives log output.
pub fn init_logging() {
    let _ = fs::create_dir_all(LOG_DIR);

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE));
    let file_layer = fmt::layer().json().with_writer(file_writer);
    let stderr_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // Leaked so the background writer lives as long as the process
    std::mem::forget(guard);
}
