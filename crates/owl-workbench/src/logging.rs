//! Logging and tracing setup
//!
//! Console output is pretty-printed; the optional log file is JSON, rolled
//! daily. `RUST_LOG` takes precedence over the configured filter.

use owl_settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Keeps the background log writer alive; drop it at shutdown to flush
#[must_use = "dropping the guard stops the file writer"]
pub struct LoggingGuard {
    _file_writer: Option<WorkerGuard>,
}

/// Filter used when `RUST_LOG` is not set or invalid
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.default_filter))
}

/// Install the global subscriber
///
/// Fails when the log directory cannot be created or a global subscriber
/// is already installed.
pub fn init(settings: &LoggingSettings) -> anyhow::Result<LoggingGuard> {
    let mut layers = Vec::new();

    if settings.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
            .with_ansi(true)
            .pretty()
            .with_filter(env_filter(settings))
            .boxed();
        layers.push(console_layer);
    }

    let mut file_writer = None;
    let log_dir = settings.resolved_log_dir();
    if settings.json_file {
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&log_dir, "owl.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_writer = Some(guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter(settings))
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::info!(
        log_dir = %log_dir.display(),
        json_enabled = settings.json_file,
        console_enabled = settings.console,
        "Logging system initialized"
    );

    Ok(LoggingGuard {
        _file_writer: file_writer,
    })
}
