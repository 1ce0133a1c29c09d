use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the global tracing subscriber.
///
/// Log level comes from `MOODLENS_LOG` (same syntax as `RUST_LOG`, default
/// `info`) and applies to the stderr layer. Setting `MOODLENS_LOG_FILE` adds
/// an append-mode file layer at DEBUG. Stdout is owned by the TUI, so the
/// file is the only place to look when debugging a live session.
pub fn init_tracing() {
    let stderr_filter =
        EnvFilter::try_from_env("MOODLENS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let file_layer = std::env::var("MOODLENS_LOG_FILE").ok().and_then(|log_path| {
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(std::sync::Arc::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
            ),
            Err(e) => {
                eprintln!("failed to open log file {log_path}: {e}");
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
