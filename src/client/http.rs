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

//! HTTP client implementation.
//!
//! This module provides a low-level HTTP client with:
//! - Connection pooling
//! - Configurable connect and read timeouts
//! - Header injection from prebuilt header maps
//!
//! Execution requests are never retried here; chunk download retries live
//! in the download workers.

use crate::error::{Error, Result};
use crate::request::user_agent;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Read timeout duration.
    ///
    /// Bounds every request end to end, including reading the body. Query
    /// posts override it with the statement request timeout.
    pub read_timeout: Duration,
    /// Maximum number of idle connections per host.
    pub max_idle_connections_per_host: usize,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            max_idle_connections_per_host: 10,
            user_agent: user_agent(),
        }
    }
}

/// HTTP client for communicating with the service and chunk storage.
#[derive(Debug)]
pub struct SnowflakeHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl SnowflakeHttpClient {
    /// Creates a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .pool_max_idle_per_host(config.max_idle_connections_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| Error::transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Start a request with the given headers attached.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<RequestBuilder> {
        Ok(self.client.request(method, url).headers(to_header_map(headers)?))
    }

    /// Send a request, turning non-success statuses into transport errors.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder
            .build()
            .map_err(|e| Error::transport(format!("failed to build request: {}", e)))?;
        let method = request.method().clone();
        let url = request.url().clone();

        debug!("Executing {} {}", method, redact_query(&url));

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("{} {} returned HTTP {}", method, redact_query(&url), status.as_u16());
        Err(Error::Transport {
            message: format!("HTTP {} - {}", status.as_u16(), body),
            status: Some(status.as_u16()),
        })
    }
}

fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::InvalidArgument(format!("invalid header name '{}': {}", name, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::InvalidArgument(format!("invalid value for header '{}': {}", name, e))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

// Presigned chunk URLs carry credentials in the query string.
fn redact_query(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    if shown.query().is_some() {
        shown.set_query(Some("..."));
    }
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(60));
        assert_eq!(config.max_idle_connections_per_host, 10);
        assert!(config.user_agent.starts_with("snowflake-connector-rust/"));
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = SnowflakeHttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_header_map_conversion() {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/snowflake".to_string());
        let map = to_header_map(&headers).unwrap();
        assert_eq!(map["accept"], "application/snowflake");

        headers.insert("bad header".to_string(), "x".to_string());
        assert!(matches!(to_header_map(&headers), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_redact_query() {
        let url =
            reqwest::Url::parse("https://bucket.s3.amazonaws.com/chunk_0?X-Amz-Signature=abc")
                .unwrap();
        let shown = redact_query(&url);
        assert!(!shown.contains("abc"));
        assert!(shown.starts_with("https://bucket.s3.amazonaws.com/chunk_0"));
    }
}
