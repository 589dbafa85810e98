use std::sync::Mutex;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming an extra log file.
pub const LOG_FILE_ENV: &str = "LISTING_CMS_LOG";

/// Initialize tracing to stderr, plus an optional log file.
///
/// The level filter comes from `RUST_LOG` (default `info`). When
/// `LISTING_CMS_LOG` is set, logs are also written to
/// `{path}.{timestamp}.{pid}` so concurrent instances never share a file.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339());

    let file_layer = open_log_file().map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(UtcTime::rfc_3339())
    });

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

fn open_log_file() -> Option<std::fs::File> {
    let log_path = std::env::var(LOG_FILE_ENV).ok()?;

    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let unique_path = format!("{}.{}.{}", log_path, timestamp, pid);

    match std::fs::File::create(&unique_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to create log file {}: {}", unique_path, e);
            None
        }
    }
}
