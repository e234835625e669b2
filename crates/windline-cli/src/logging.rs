//! Logging setup: stderr plus an optional per-run log file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the default level. The returned guard flushes the
/// log file and must live until the process exits.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> std::io::Result<(Option<WorkerGuard>, Option<PathBuf>)> {
    let default = if verbose { "windline=debug" } else { "windline=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file_layer, guard, log_file) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let name = format!("processing_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
            let appender = tracing_appender::rolling::never(dir, &name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard), Some(dir.join(name)))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok((guard, log_file))
}
