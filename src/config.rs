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

//! Connection configuration.
//!
//! A [`Config`] is built either field by field or through string-keyed
//! options, the way connection properties usually arrive from outside:
//!
//! ```
//! use snowflake_connector::Config;
//!
//! let mut config = Config::default();
//! config.set_option("snowflake.account", "myorg-myaccount").unwrap();
//! config.set_option("snowflake.warehouse", "COMPUTE_WH").unwrap();
//! config.set_option("snowflake.chunks.prefetch_depth", "4").unwrap();
//! config.fill_missing_parameters().unwrap();
//! assert_eq!(config.endpoint(), "https://myorg-myaccount.snowflakecomputing.com:443");
//! ```

use crate::client::HttpClientConfig;
use crate::error::{Error, Result};
use crate::logging::LogConfig;
use crate::types::chunk::ChunkDownloadConfig;
use std::time::Duration;

pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_DOMAIN: &str = ".snowflakecomputing.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a connection.
#[derive(Debug, Clone)]
pub struct Config {
    pub account: Option<String>,
    pub host: Option<String>,
    pub protocol: Option<String>,
    pub port: Option<u16>,

    // Session context; updated from successful responses.
    pub database: Option<String>,
    pub schema: Option<String>,
    pub role: Option<String>,
    pub warehouse: Option<String>,

    /// Session token obtained at login.
    pub token: Option<String>,
    /// Timeout applied to each execution request.
    pub request_timeout: Duration,

    pub http: HttpClientConfig,
    pub chunks: ChunkDownloadConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: None,
            host: None,
            protocol: None,
            port: None,
            database: None,
            schema: None,
            role: None,
            warehouse: None,
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            http: HttpClientConfig::default(),
            chunks: ChunkDownloadConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single option by key.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "snowflake.account" => self.account = Some(value.to_string()),
            "snowflake.host" => self.host = Some(value.to_string()),
            "snowflake.protocol" => match value.to_ascii_lowercase().as_str() {
                p @ ("http" | "https") => self.protocol = Some(p.to_string()),
                _ => return Err(invalid_option(key, value)),
            },
            "snowflake.port" => {
                self.port = Some(value.parse().map_err(|_| invalid_option(key, value))?)
            }
            "snowflake.database" => self.database = Some(value.to_string()),
            "snowflake.schema" => self.schema = Some(value.to_string()),
            "snowflake.role" => self.role = Some(value.to_string()),
            "snowflake.warehouse" => self.warehouse = Some(value.to_string()),
            "snowflake.token" => self.token = Some(value.to_string()),
            "snowflake.request_timeout_ms" => {
                self.request_timeout = Duration::from_millis(parse_int_option(key, value)?)
            }
            "snowflake.chunks.prefetch_depth" => {
                let depth = parse_int_option(key, value)?;
                if depth == 0 {
                    return Err(invalid_option(key, value));
                }
                self.chunks.prefetch_depth =
                    usize::try_from(depth).map_err(|_| invalid_option(key, value))?;
            }
            "snowflake.chunks.max_retries" => {
                self.chunks.max_retries = u32::try_from(parse_int_option(key, value)?)
                    .map_err(|_| invalid_option(key, value))?
            }
            "snowflake.chunks.retry_delay_ms" => {
                self.chunks.retry_delay = Duration::from_millis(parse_int_option(key, value)?)
            }
            "snowflake.http.connect_timeout_ms" => {
                self.http.connect_timeout = Duration::from_millis(parse_int_option(key, value)?)
            }
            "snowflake.http.read_timeout_ms" => {
                let millis = parse_int_option(key, value)?;
                if millis == 0 {
                    return Err(invalid_option(key, value));
                }
                self.http.read_timeout = Duration::from_millis(millis);
            }
            "snowflake.log_level" => self.log.level = Some(value.to_string()),
            "snowflake.log_file" => self.log.file = Some(value.to_string()),
            _ => {
                return Err(Error::InvalidArgument(format!("unknown option '{}'", key)));
            }
        }
        Ok(())
    }

    /// Fill in defaults for protocol, port and host.
    ///
    /// The host defaults to `<account>.snowflakecomputing.com`, so one of
    /// `host` or `account` must be set.
    pub fn fill_missing_parameters(&mut self) -> Result<()> {
        if self.protocol.is_none() {
            self.protocol = Some(DEFAULT_PROTOCOL.to_string());
        }
        if self.port.is_none() {
            self.port = Some(DEFAULT_PORT);
        }
        if self.host.is_none() {
            let account = self
                .account
                .as_deref()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| {
                    Error::InvalidArgument("either host or account must be set".to_string())
                })?;
            self.host = Some(format!("{}{}", account, DEFAULT_DOMAIN));
        }
        Ok(())
    }

    /// Base URL of the service, e.g. `https://acme.snowflakecomputing.com:443`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}:{}",
            self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
            self.host.as_deref().unwrap_or_default(),
            self.port.unwrap_or(DEFAULT_PORT)
        )
    }
}

fn parse_int_option(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| invalid_option(key, value))
}

fn invalid_option(key: &str, value: &str) -> Error {
    Error::InvalidArgument(format!("invalid value '{}' for option '{}'", value, key))
}
