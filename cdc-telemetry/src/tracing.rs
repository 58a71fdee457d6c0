use std::io;
use std::sync::Once;

use cdc_config::Environment;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Name of the environment variable that enables log output in tests.
const ENABLE_TRACING_ENV_NAME: &str = "ENABLE_TRACING";

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

static TEST_TRACING: Once = Once::new();

/// Errors that can occur while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to determine runtime environment: {0}")]
    Environment(#[source] io::Error),

    #[error("failed to install log bridge: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Flushes buffered log lines when dropped.
///
/// Keep it alive until the end of `main`, otherwise the last lines a binary
/// writes can be lost.
#[must_use = "dropping the flusher stops log output"]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Installs the global tracing subscriber for a binary.
///
/// Lines go to stdout through a non-blocking writer. In `prod` they are JSON
/// objects; in `dev` they are pretty printed. The filter comes from `RUST_LOG`
/// and defaults to `info`. Records emitted through the `log` facade are
/// forwarded to tracing.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    let environment = Environment::load().map_err(TracingError::Environment)?;

    tracing_log::LogTracer::init()?;

    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match environment {
        Environment::Prod => {
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        Environment::Dev => {
            let layer = fmt::layer().pretty().with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    tracing::info!(app = app_name, %environment, "tracing initialized");

    Ok(LogFlusher { _guard: guard })
}

/// Installs a subscriber writing through the test harness.
///
/// Output is only produced when `ENABLE_TRACING` is set, so test runs stay
/// quiet by default. Safe to call from every test.
pub fn init_test_tracing() {
    if std::env::var(ENABLE_TRACING_ENV_NAME).is_err() {
        return;
    }

    TEST_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
