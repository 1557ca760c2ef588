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

//! Snowflake SQL connector for Rust
//!
//! This crate submits SQL statements to the Snowflake query service over
//! HTTP and streams results back through a forward-only row cursor.
//!
//! ## Overview
//!
//! - [`Connector`] / [`SnowflakeDriver`] - Entry points for opening connections
//! - [`Connection`] - Session with the service; runs statements one at a time
//! - [`Statement`] - SQL bound to a connection, executed later
//! - [`Rows`] - Cursor over a result set, downloading remote chunks ahead of
//!   consumption
//!
//! ## Example
//!
//! ```ignore
//! use snowflake_connector::{BindValue, Config, Connector, SnowflakeDriver};
//!
//! let mut config = Config::default();
//! config.set_option("snowflake.account", "myorg-myaccount")?;
//! config.set_option("snowflake.token", session_token)?;
//!
//! let connector = Connector::new(SnowflakeDriver::new(), config);
//! let mut connection = connector.connect().await?;
//!
//! let result = connection
//!     .execute("INSERT INTO t VALUES (?), (?)", &[1i64.into(), 2i64.into()])
//!     .await?;
//! assert_eq!(result.rows_affected(), 2);
//!
//! let mut rows = connection.query("SELECT * FROM t", &[]).await?;
//! while let Some(row) = rows.next_row().await? {
//!     println!("{:?}", row.values());
//! }
//! ```
//!
//! ## Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `snowflake.account` | - | Account identifier, used to derive the host |
//! | `snowflake.host` | `<account>.snowflakecomputing.com` | Service host |
//! | `snowflake.protocol` | `https` | `http` or `https` |
//! | `snowflake.port` | 443 | Service port |
//! | `snowflake.database` / `schema` / `role` / `warehouse` | - | Initial session context |
//! | `snowflake.token` | - | Session token |
//! | `snowflake.request_timeout_ms` | 60000 | Timeout per execution request |
//! | `snowflake.chunks.prefetch_depth` | 1 | Chunks downloaded ahead of the cursor |
//! | `snowflake.chunks.max_retries` | 3 | Retries per chunk download |
//! | `snowflake.chunks.retry_delay_ms` | 500 | Base retry delay (linear backoff) |
//! | `snowflake.http.connect_timeout_ms` | 30000 | TCP connect timeout |
//! | `snowflake.http.read_timeout_ms` | 60000 | Per-request timeout for chunk downloads |
//! | `snowflake.log_level` | - | Log level, falls back to `RUST_LOG` |
//! | `snowflake.log_file` | - | Log file, stderr when unset |

pub mod auth;
pub mod bindings;
pub mod client;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod logging;
pub mod reader;
pub mod request;
pub mod response;
pub mod result;
pub mod statement;
pub mod transaction;
pub mod types;

// Re-export main types
pub use bindings::BindValue;
pub use config::Config;
pub use connection::Connection;
pub use driver::{Connector, Driver, SnowflakeDriver};
pub use error::{Error, Result, SnowflakeError};
pub use reader::{Row, Rows};
pub use result::ExecResult;
pub use statement::{Statement, StatementOutcome, StatementType};
pub use transaction::Transaction;
pub use types::chunk::{ChunkDownloadConfig, DownloaderState};
pub use types::value::Value;

// Re-export client types for advanced users
pub use client::{HttpClientConfig, RestClient, SnowflakeClient, SnowflakeHttpClient};
