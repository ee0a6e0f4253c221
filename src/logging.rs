//! Error-log sink and console logging.
//!
//! Error-log entries are DEBUG events under
//! [`ERROR_LOG_TARGET`](portal_api_client::ERROR_LOG_TARGET). [`init`]
//! routes them to an append-only file, one line per entry with the source
//! file and line, and sends everything else to stderr under `RUST_LOG`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use portal_api_client::ERROR_LOG_TARGET;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Default location of the error log.
pub const DEFAULT_ERROR_LOG: &str = "./logs/error.log";

/// Console filter used when `RUST_LOG` is unset.
pub const DEFAULT_CONSOLE_FILTER: &str = "warn";

/// Errors raised while installing the log sinks.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The error-log file or its directory could not be opened.
    #[error("cannot open error log {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber was installed before.
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Where logs go.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Append-only error-log file.
    pub error_log: PathBuf,
    /// Console filter directive used when `RUST_LOG` is unset.
    pub console_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
            console_filter: DEFAULT_CONSOLE_FILTER.to_string(),
        }
    }
}

impl LogConfig {
    /// Defaults, with the error-log path taken from `PORTAL_ERROR_LOG` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("PORTAL_ERROR_LOG") {
            config.error_log = PathBuf::from(path);
        }
        config
    }

    /// Set the error-log path.
    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log = path.into();
        self
    }
}

/// A layer writing error-log entries to `path`, appending.
///
/// The parent directory is created if needed.
pub fn error_log_layer<S>(path: &Path) -> Result<impl Layer<S> + Send + Sync, LogError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let open_error = |source| LogError::Open {
        path: path.display().to_string(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(open_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)?;

    Ok(fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::new(format!("{ERROR_LOG_TARGET}=debug"))))
}

/// Install the error-log file sink and the stderr console as the global
/// subscriber.
///
/// Call this before building a client so that authentication failures are
/// captured.
pub fn init(config: &LogConfig) -> Result<(), LogError> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.console_filter));

    tracing_subscriber::registry()
        .with(error_log_layer(&config.error_log)?)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()?;

    Ok(())
}
