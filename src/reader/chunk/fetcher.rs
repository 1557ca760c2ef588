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

//! Chunk fetching abstraction used by the download workers.

use crate::client::SnowflakeClient;
use crate::error::Result;
use crate::types::query::{ChunkMeta, RawRow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const HEADER_SSE_C_ALGORITHM: &str = "x-amz-server-side-encryption-customer-algorithm";
pub const HEADER_SSE_C_KEY: &str = "x-amz-server-side-encryption-customer-key";
pub const HEADER_SSE_C_AES: &str = "AES256";

/// Fetches the rows of one remote chunk.
#[async_trait]
pub trait ChunkFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, chunk_index: usize, meta: &ChunkMeta) -> Result<Vec<RawRow>>;
}

/// [`ChunkFetcher`] backed by a [`SnowflakeClient`].
#[derive(Debug)]
pub struct ClientChunkFetcher {
    client: Arc<dyn SnowflakeClient>,
    headers: HashMap<String, String>,
}

impl ClientChunkFetcher {
    pub fn new(client: Arc<dyn SnowflakeClient>, headers: HashMap<String, String>) -> Self {
        Self { client, headers }
    }
}

#[async_trait]
impl ChunkFetcher for ClientChunkFetcher {
    async fn fetch(&self, chunk_index: usize, meta: &ChunkMeta) -> Result<Vec<RawRow>> {
        debug!(
            "Fetching chunk {}: {} rows, {} bytes compressed",
            chunk_index, meta.row_count, meta.compressed_size
        );
        self.client.fetch_chunk(meta, &self.headers).await
    }
}

/// Headers to send with chunk downloads.
///
/// Headers supplied by the service win; otherwise the result master key
/// (`qrmk`) is sent as an SSE-C customer key.
pub fn chunk_headers(
    qrmk: &str,
    explicit: Option<&HashMap<String, String>>,
) -> HashMap<String, String> {
    if let Some(headers) = explicit.filter(|h| !h.is_empty()) {
        return headers.clone();
    }
    let mut headers = HashMap::new();
    if !qrmk.is_empty() {
        headers.insert(HEADER_SSE_C_ALGORITHM.to_string(), HEADER_SSE_C_AES.to_string());
        headers.insert(HEADER_SSE_C_KEY.to_string(), qrmk.to_string());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_headers_from_qrmk() {
        let headers = chunk_headers("secret-key", None);
        assert_eq!(headers[HEADER_SSE_C_ALGORITHM], "AES256");
        assert_eq!(headers[HEADER_SSE_C_KEY], "secret-key");
    }

    #[test]
    fn test_explicit_chunk_headers_win() {
        let explicit = HashMap::from([("x-custom".to_string(), "v".to_string())]);
        let headers = chunk_headers("secret-key", Some(&explicit));
        assert_eq!(headers, explicit);
    }

    #[test]
    fn test_no_headers() {
        assert!(chunk_headers("", None).is_empty());
        assert!(chunk_headers("", Some(&HashMap::new())).is_empty());
    }
}
