//! Logger module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output in Full, Compact or JSON format
//! - Runtime level changes through [`LogLevelHandle`]

pub mod config;
pub mod error;

pub use config::*;
pub use error::LoggerError;

use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::Layered, layer::SubscriberExt, reload,
    util::SubscriberInitExt,
};

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handle for changing the active filter after initialization.
#[derive(Clone)]
pub struct LogLevelHandle {
    pub(crate) inner: Arc<reload::Handle<EnvFilter, Registry>>,
}

impl LogLevelHandle {
    /// Replaces the active filter. Accepts a level name or filter directives.
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = EnvFilter::try_new(level)
            .map_err(|e| LoggerError::config(format!("Invalid log filter '{}': {}", level, e)))?;
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::init(e.to_string()))
    }

    /// Current filter rendered as a directive string.
    pub fn current_level(&self) -> Option<String> {
        self.inner.with_current(|filter| filter.to_string()).ok()
    }
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, reload_handle) = reload::Layer::new(filter);

    // The file layer goes first so console ANSI settings do not leak into
    // span fields written to the file
    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layers)
        .try_init()
        .map_err(|e| LoggerError::init(e.to_string()))?;

    Ok(LogLevelHandle {
        inner: Arc::new(reload_handle),
    })
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stdout().is_terminal();
    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    if let Some(parent) = config.path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.path)?;
    let writer = Mutex::new(file);

    let layer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn with_test_handle<F, R>(initial_level: &str, f: F) -> R
    where
        F: FnOnce(&LogLevelHandle) -> R,
    {
        let filter = EnvFilter::try_new(initial_level).unwrap_or_else(|_| EnvFilter::new("info"));
        let (filter_layer, reload_handle) = reload::Layer::new(filter);
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().with_writer(std::io::sink));

        let handle = LogLevelHandle {
            inner: Arc::new(reload_handle),
        };
        tracing::subscriber::with_default(subscriber, || f(&handle))
    }

    #[test]
    fn test_set_level_updates_current_filter() {
        with_test_handle("info", |handle| {
            handle.set_level("debug").unwrap();
            assert!(handle.current_level().unwrap().contains("debug"));
        });
    }

    #[test]
    fn test_set_level_rejects_garbage() {
        with_test_handle("info", |handle| {
            assert!(handle.set_level("planet_service=notalevel").is_err());
            assert!(handle.current_level().unwrap().contains("info"));
        });
    }

    #[test]
    fn test_file_layer_creates_parent_and_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("app.log");
        let config = FileConfig {
            enabled: true,
            path: path.clone(),
            append: false,
            format: LogFormat::Json,
        };

        let layer = file_layer(&config).unwrap();
        let (filter_layer, _handle) = reload::Layer::new(EnvFilter::new("info"));
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(vec![layer]);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(player_id = "abc", "Created player with planet");
        });

        let mut contents = String::new();
        fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert!(contents.contains("Created player with planet"));
        assert!(contents.contains("\"player_id\":\"abc\""));
    }
}
