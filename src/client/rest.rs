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

//! REST client implementation.
//!
//! Implements [`SnowflakeClient`] over the `/queries/v1/query-request`
//! endpoint and plain GETs against chunk storage.

use crate::client::{SnowflakeClient, SnowflakeHttpClient};
use crate::error::{Error, Result};
use crate::types::query::{ChunkMeta, ExecResponse, QueryRequest, RawRow};
use async_trait::async_trait;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

const QUERY_REQUEST_PATH: &str = "/queries/v1/query-request";

/// REST client for statement execution and chunk downloads.
#[derive(Debug)]
pub struct RestClient {
    http_client: Arc<SnowflakeHttpClient>,
    endpoint: String,
}

impl RestClient {
    /// Create a client for the given base URL, e.g. `https://acme.snowflakecomputing.com:443`.
    pub fn new(http_client: Arc<SnowflakeHttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), QUERY_REQUEST_PATH)
    }
}

#[async_trait]
impl SnowflakeClient for RestClient {
    async fn post_query(&self, request: &QueryRequest, timeout: Duration) -> Result<ExecResponse> {
        let url = self.query_url();
        debug!(
            "Posting query request: sequence_id={}, bindings={}",
            request.body.sequence_id,
            request.body.bindings.len()
        );

        let builder = self
            .http_client
            .request(Method::POST, &url, &request.headers)?
            .json(&request.body)
            .timeout(timeout);

        let response = self.http_client.execute(builder).await?;
        let body = response.text().await?;
        trace!("Query response body: {}", body);

        serde_json::from_str::<ExecResponse>(&body)
            .map_err(|e| Error::transport(format!("failed to parse query response: {}", e)))
    }

    async fn fetch_chunk(
        &self,
        chunk: &ChunkMeta,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<RawRow>> {
        let builder = self.http_client.request(Method::GET, &chunk.url, headers)?;
        let response = self.http_client.execute(builder).await?;
        let body = response.text().await?;
        parse_chunk_body(&body)
    }
}

/// Parse a chunk body: a comma-separated sequence of JSON row arrays.
pub(crate) fn parse_chunk_body(body: &str) -> Result<Vec<RawRow>> {
    let wrapped = format!("[{}]", body.trim());
    serde_json::from_str(&wrapped).map_err(|e| {
        let preview: String = body.chars().take(64).collect();
        Error::parse("chunk body", preview, e)
    })
}
