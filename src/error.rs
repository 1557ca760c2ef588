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

//! Error types for the Snowflake connector.
//!
//! Every operation returns [`Result`]. Failures reported by the service are
//! carried as a structured [`SnowflakeError`] inside [`Error::Service`] so
//! callers can inspect the numeric code, SQL state and query id.

use thiserror::Error;

/// Code reported when a failed response carries no status code.
pub const UNKNOWN_ERROR_CODE: i32 = -1;

/// A failure reported by the service for a statement (`success=false`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{number} ({sql_state}): {message}{}", query_suffix(.query_id))]
pub struct SnowflakeError {
    /// Service-specific error number, or [`UNKNOWN_ERROR_CODE`].
    pub number: i32,
    /// Standard SQL state, may be empty.
    pub sql_state: String,
    pub message: String,
    /// Id of the query that failed, may be empty.
    pub query_id: String,
}

fn query_suffix(query_id: &str) -> String {
    if query_id.is_empty() {
        String::new()
    } else {
        format!(" [query id: {}]", query_id)
    }
}

/// The error type for connector operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A bind parameter has no wire mapping. Nothing was sent.
    #[error("unsupported bind parameter: {0}")]
    Encoding(String),

    /// Network failure, timeout, non-success HTTP status or malformed body.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status when the server answered with a non-success code.
        status: Option<u16>,
    },

    /// The service rejected the statement.
    #[error("service error: {0}")]
    Service(#[from] SnowflakeError),

    /// A remote result chunk could not be retrieved.
    #[error("failed to fetch result chunk {chunk_index} after {attempts} attempt(s): {message}")]
    ChunkFetch {
        chunk_index: usize,
        attempts: u32,
        message: String,
    },

    /// A numeric field in a response could not be parsed.
    #[error("failed to parse {field} {value:?}: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Transport error without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    pub fn parse(field: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the service error if this is a statement failure.
    pub fn as_service_error(&self) -> Option<&SnowflakeError> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a chunk download that failed with this error may be retried.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            "request timed out"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_decode() {
            "failed to decode response body"
        } else {
            "request failed"
        };
        Self::Transport {
            message: format!("{}: {}", kind, e),
            status: e.status().map(|s| s.as_u16()),
        }
    }
}

/// A convenient alias for Results with connector errors.
pub type Result<T> = std::result::Result<T, Error>;
