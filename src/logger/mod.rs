//! Logging setup based on `tracing-subscriber`.
//!
//! - Console output with color control
//! - File output in full, compact or JSON format with size-based rotation
//! - A reload handle so the CLI can raise or lower the level after startup

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    layer::{Layered, SubscriberExt},
    reload,
    util::SubscriberInitExt,
};
use writer::RotatingFileWriter;

type FilterLayer = reload::Layer<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Layered<FilterLayer, Registry>> + Send + Sync>;

/// Handle for changing the active log level at runtime.
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
    /// Replaces the active filter with `level`.
    pub fn set_level(&self, level: &str) -> anyhow::Result<()> {
        let parsed = parse_level(level)?;
        self.inner
            .reload(EnvFilter::new(parsed.as_str().to_lowercase()))
            .map_err(|e| anyhow::anyhow!("Failed to reload log filter: {}", e))
    }
}

/// Builds the filter for `level`.
///
/// `RUST_LOG` takes precedence when set so a single module can be traced
/// without touching configuration.
fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let parsed = parse_level(level)?;
    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parsed.as_str().to_lowercase())))
}

fn file_layer(config: &FileConfig) -> anyhow::Result<BoxedLayer> {
    let writer = RotatingFileWriter::new(config)?;
    let layer = fmt::layer().with_ansi(false).with_target(true);

    Ok(match config.format {
        LogFormat::Full => layer.with_writer(writer).boxed(),
        LogFormat::Compact => layer.compact().with_writer(writer).boxed(),
        LogFormat::Json => layer.json().with_writer(writer).boxed(),
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

/// Installs the global subscriber described by `config`.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<LogLevelHandle> {
    config.validate()?;

    let (filter, handle) = reload::Layer::new(build_filter(&config.level)?);

    // The file layer goes first so ANSI escapes from the console layer do
    // not leak into span fields written to the file.
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LogLevelHandle { inner: handle })
}
