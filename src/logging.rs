// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging configuration for the Snowflake connector.
//!
//! Initializes a `tracing-subscriber` with file or stderr output.
//!
//! ## Configuration priority
//!
//! 1. `snowflake.log_level` / `snowflake.log_file` options (highest)
//! 2. `RUST_LOG` environment variable
//! 3. Default: `warn`
//!
//! ```bash
//! RUST_LOG=snowflake_connector=debug ./my_app
//! ```

use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, time::SystemTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Logging configuration passed via connector options.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log level: "OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE".
    pub level: Option<String>,
    /// Log file path. If unset, logs go to stderr.
    pub file: Option<String>,
}

impl LogConfig {
    fn is_off(&self) -> bool {
        self.level
            .as_deref()
            .is_some_and(|level| level.eq_ignore_ascii_case("off"))
    }

    /// Log destination and whether it gets ANSI colors.
    fn writer(&self) -> Option<(BoxMakeWriter, bool)> {
        let Some(ref path) = self.file else {
            return Some((BoxMakeWriter::new(std::io::stderr), true));
        };
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some((BoxMakeWriter::new(file), false)),
            Err(e) => {
                eprintln!("snowflake-connector: failed to open log file {}: {}", path, e);
                None
            }
        }
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(ref level) => {
                EnvFilter::new(format!("snowflake_connector={}", level.to_lowercase()))
            }
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snowflake_connector=warn")),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Runs at most once per process; the first connection opened through
/// [`crate::SnowflakeDriver`] configures logging and later calls are no-ops.
/// A subscriber installed by the host application takes precedence.
pub(crate) fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if config.is_off() {
            return;
        }
        let Some((writer, ansi)) = config.writer() else {
            return;
        };

        tracing_subscriber::registry()
            .with(config.filter())
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(false)
                    .with_ansi(ansi)
                    .with_timer(SystemTime),
            )
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.level.is_none());
        assert!(config.file.is_none());
        assert!(!config.is_off());
    }

    #[test]
    fn test_log_config_off_is_case_insensitive() {
        let config = LogConfig {
            level: Some("OFF".to_string()),
            file: None,
        };
        assert!(config.is_off());
    }

    #[test]
    fn test_writer_selection() {
        let (_, ansi) = LogConfig::default().writer().unwrap();
        assert!(ansi);

        let path = std::env::temp_dir().join("snowflake-connector-logging-test.log");
        let config = LogConfig {
            level: None,
            file: Some(path.to_string_lossy().into_owned()),
        };
        let (_, ansi) = config.writer().unwrap();
        assert!(!ansi);
        let _ = std::fs::remove_file(path);

        let missing_dir = LogConfig {
            level: None,
            file: Some("/nonexistent-dir/connector.log".to_string()),
        };
        assert!(missing_dir.writer().is_none());
    }

    #[test]
    fn test_init_logging_twice_is_noop() {
        let config = LogConfig {
            level: Some("off".to_string()),
            file: None,
        };
        init_logging(&config);
        init_logging(&config);
    }
}
