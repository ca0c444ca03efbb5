// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Logging initialization and setup.
//!
//! Installs a global `tracing` subscriber built from a [`LogConfig`].

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize tracing with the specified format and optional filter.
///
/// # Arguments
///
/// * `format` - The output format for logs
/// * `level` - Optional filter (e.g., "info", "debug"). If None, uses `RUST_LOG`
///
/// # Example
///
/// ```no_run
/// use mediatrim_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Compact, Some("debug")).unwrap();
/// tracing::info!("Application started");
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(&config)
}

/// Initialize tracing with a detailed configuration.
///
/// Fails with [`LogError::AlreadyInitialized`] when a global subscriber
/// has already been installed in this process.
///
/// # Example
///
/// ```no_run
/// use mediatrim_observability::{init_tracing_with_config, LogConfig, LogFormat};
///
/// let config = LogConfig::new()
///     .with_format(LogFormat::Json)
///     .with_level("debug")
///     .with_timestamps(true);
///
/// init_tracing_with_config(&config).unwrap();
/// ```
pub fn init_tracing_with_config(config: &LogConfig) -> Result<(), LogError> {
    let env_filter = build_env_filter(config)?;

    Registry::default()
        .with(build_layer(config))
        .with(env_filter)
        .try_init()
        .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
}

fn build_layer(config: &LogConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(get_writer(config.output))
        .with_target(config.include_targets)
        .with_thread_ids(config.include_thread_ids);

    match (config.format, config.use_timestamps) {
        (LogFormat::Pretty, true) => base
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .boxed(),
        (LogFormat::Pretty, false) => base
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .without_time()
            .pretty()
            .boxed(),
        (LogFormat::Compact, true) => base
            .with_ansi(config.use_color)
            .compact()
            .boxed(),
        (LogFormat::Compact, false) => base
            .with_ansi(config.use_color)
            .without_time()
            .compact()
            .boxed(),
        (LogFormat::Json, true) => base
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .boxed(),
        (LogFormat::Json, false) => base
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .without_time()
            .json()
            .boxed(),
    }
}

/// Get the writer for the specified output
fn get_writer(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

/// Build an environment filter for the given configuration
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let filter = config.effective_level();

    EnvFilter::try_new(&filter).map_err(|e| LogError::InvalidFilter {
        filter: filter.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Global subscriber installation is covered in tests/integration_tests.rs

    #[test]
    fn test_env_filter_parsing() {
        assert!(build_env_filter(&LogConfig::new().with_level("debug")).is_ok());
        assert!(build_env_filter(&LogConfig::new().with_level("mediatrim_core=trace,warn")).is_ok());
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        let err = build_env_filter(&LogConfig::new().with_level("mediatrim_core=loud")).unwrap_err();
        assert!(matches!(err, LogError::InvalidFilter { .. }));
    }

    #[test]
    fn test_every_format_builds_a_layer() {
        for format in [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json] {
            for timestamps in [true, false] {
                let config = LogConfig::new().with_format(format).with_timestamps(timestamps);
                let _ = build_layer(&config);
            }
        }
    }
}
