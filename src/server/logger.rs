//! Tracing setup for the server binary.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `log_dir` pointing at an
/// existing directory, output goes to a daily rolling `kude-server` file
/// there instead of stdout.
pub fn init_logger(level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir.filter(|d| Path::new(d).is_dir()) {
        let appender = tracing_appender::rolling::daily(dir, "kude-server");
        let _ = subscriber.with_ansi(false).with_writer(appender).try_init();
        return;
    }

    let _ = subscriber.try_init();
}
