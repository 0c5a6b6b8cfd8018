// Aora - A short-video sharing client
// Copyright (C) 2025 Aora Contributors
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

//! Logging system for Aora
//!
//! Provides structured logging with multiple output targets,
//! log rotation, and configurable verbosity levels.

use anyhow::Result;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Logger configuration
pub struct LoggerConfig {
    /// Log directory path
    pub log_dir: PathBuf,
    /// Log file prefix
    pub file_prefix: String,
    /// Maximum log level
    pub level: Level,
    /// Whether to log to console
    pub console_output: bool,
    /// Whether to log to file
    pub file_output: bool,
    /// Log rotation strategy
    pub rotation: Rotation,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            file_prefix: "aora".to_string(),
            level: Level::INFO,
            console_output: true,
            file_output: true,
            rotation: Rotation::DAILY,
        }
    }
}

impl LoggerConfig {
    /// Build from the `[logging]` section of the app config
    pub fn from_settings(settings: &LoggingConfig) -> Result<Self> {
        Ok(Self {
            log_dir: settings.log_dir.clone().unwrap_or_else(default_log_dir),
            level: settings.level()?,
            console_output: settings.console_output,
            file_output: settings.file_output,
            ..Self::default()
        })
    }

    fn filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        Ok(EnvFilter::new(format!("aora_core={}", self.level))
            .add_directive(format!("api={}", self.level).parse()?)
            .add_directive(format!("ipc={}", self.level).parse()?)
            .add_directive(format!("search={}", self.level).parse()?))
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Aora")
        .join("logs")
}

/// Main logger struct
pub struct Logger;

impl Logger {
    /// Initialize the logging system with custom configuration
    pub fn init_with_config(config: LoggerConfig) -> Result<()> {
        // Ensure log directory exists
        if config.file_output {
            std::fs::create_dir_all(&config.log_dir)?;
        }

        let subscriber = tracing_subscriber::registry().with(config.filter()?);

        let file_layer = config.file_output.then(|| {
            let file_appender =
                RollingFileAppender::new(config.rotation.clone(), &config.log_dir, &config.file_prefix);

            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .json()
        });

        let console_layer = config.console_output.then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_span_events(FmtSpan::CLOSE)
        });

        subscriber.with(file_layer).with(console_layer).try_init()?;

        Ok(())
    }
}

/// Macro for logging API calls with timing
#[macro_export]
macro_rules! log_api_call {
    ($method:expr, $url:expr) => {
        tracing::info!(
            target: "api",
            method = $method,
            url = $url,
            "API call started"
        )
    };
    ($method:expr, $url:expr, $duration:expr) => {
        tracing::info!(
            target: "api",
            method = $method,
            url = $url,
            duration_ms = $duration,
            "API call completed"
        )
    };
}

/// Macro for logging IPC messages
#[macro_export]
macro_rules! log_ipc {
    (request, $method:expr, $id:expr) => {
        tracing::debug!(
            target: "ipc",
            direction = "request",
            method = $method,
            id = $id,
            "IPC request received"
        )
    };
    (response, $method:expr, $id:expr, $success:expr) => {
        tracing::debug!(
            target: "ipc",
            direction = "response",
            method = $method,
            id = $id,
            success = $success,
            "IPC response sent"
        )
    };
    (event, $event:expr) => {
        tracing::debug!(
            target: "ipc",
            direction = "event",
            event = $event,
            "IPC event sent"
        )
    };
}

/// Macro for logging search screen requests
#[macro_export]
macro_rules! log_search {
    (issued, $query:expr, $generation:expr) => {
        tracing::debug!(
            target: "search",
            event = "issued",
            query = $query,
            generation = $generation,
            "Search issued"
        )
    };
    (applied, $query:expr, $generation:expr) => {
        tracing::debug!(
            target: "search",
            event = "applied",
            query = $query,
            generation = $generation,
            "Search results applied"
        )
    };
    (stale, $query:expr, $generation:expr, $latest:expr) => {
        tracing::debug!(
            target: "search",
            event = "stale",
            query = $query,
            generation = $generation,
            latest = $latest,
            "Stale search response dropped"
        )
    };
}
