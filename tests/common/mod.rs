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

//! Scripted service backend shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use snowflake_connector::error::{Error, Result};
use snowflake_connector::types::query::{
    ChunkMeta, ExecResponse, ExecResponseData, QueryRequest, RawRow, RowType,
};
use snowflake_connector::{Config, Connection, SnowflakeClient};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What happens when a chunk URL is fetched.
#[derive(Debug, Clone)]
enum ChunkBehavior {
    Rows(Vec<RawRow>),
    /// Fail the given number of times, then serve the rows.
    FailThenRows(u32, Vec<RawRow>),
    Fail,
    Hang,
}

/// A recorded chunk download.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
}

/// [`SnowflakeClient`] that replays scripted responses and records every call.
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<ExecResponse>>>,
    requests: Mutex<Vec<QueryRequest>>,
    chunks: Mutex<HashMap<String, ChunkBehavior>>,
    chunk_requests: Mutex<Vec<ChunkRequest>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, response: ExecResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn respond_error(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn add_chunk(&self, url: &str, rows: Vec<RawRow>) {
        self.chunks
            .lock()
            .unwrap()
            .insert(url.to_string(), ChunkBehavior::Rows(rows));
    }

    /// Every fetch of `url` fails with a transport error.
    pub fn fail_chunk(&self, url: &str) {
        self.chunks
            .lock()
            .unwrap()
            .insert(url.to_string(), ChunkBehavior::Fail);
    }

    /// The first `failures` fetches of `url` fail with a transport error.
    pub fn flaky_chunk(&self, url: &str, failures: u32, rows: Vec<RawRow>) {
        self.chunks
            .lock()
            .unwrap()
            .insert(url.to_string(), ChunkBehavior::FailThenRows(failures, rows));
    }

    /// Fetches of `url` never complete.
    pub fn hang_chunk(&self, url: &str) {
        self.chunks
            .lock()
            .unwrap()
            .insert(url.to_string(), ChunkBehavior::Hang);
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sequence_ids(&self) -> Vec<u64> {
        self.requests().iter().map(|r| r.body.sequence_id).collect()
    }

    pub fn chunk_requests(&self) -> Vec<ChunkRequest> {
        self.chunk_requests.lock().unwrap().clone()
    }

    pub fn chunk_urls(&self) -> Vec<String> {
        self.chunk_requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl SnowflakeClient for MockClient {
    async fn post_query(&self, request: &QueryRequest, _timeout: Duration) -> Result<ExecResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::InvalidState("no scripted response".to_string())))
    }

    async fn fetch_chunk(
        &self,
        chunk: &ChunkMeta,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<RawRow>> {
        self.chunk_requests.lock().unwrap().push(ChunkRequest {
            url: chunk.url.clone(),
            headers: headers.clone(),
        });
        let unavailable = || Error::Transport {
            message: "HTTP 503 - service unavailable".to_string(),
            status: Some(503),
        };
        // resolved under the lock; the hang is awaited after it is released
        let hang = match self.chunks.lock().unwrap().get_mut(&chunk.url) {
            Some(ChunkBehavior::Rows(rows)) => return Ok(rows.clone()),
            Some(ChunkBehavior::FailThenRows(0, rows)) => return Ok(rows.clone()),
            Some(ChunkBehavior::FailThenRows(failures, _)) => {
                *failures -= 1;
                return Err(unavailable());
            }
            Some(ChunkBehavior::Fail) => return Err(unavailable()),
            Some(ChunkBehavior::Hang) => true,
            None => false,
        };
        if hang {
            return std::future::pending().await;
        }
        Err(Error::Transport {
            message: format!("HTTP 404 - {}", chunk.url),
            status: Some(404),
        })
    }
}

// =============================================================================
// Response builders
// =============================================================================

pub fn success(data: ExecResponseData) -> ExecResponse {
    ExecResponse {
        data: Some(data),
        message: None,
        code: None,
        success: true,
    }
}

pub fn failure(code: &str, message: &str, data: ExecResponseData) -> ExecResponse {
    ExecResponse {
        data: Some(data),
        message: Some(message.to_string()),
        code: Some(code.to_string()),
        success: false,
    }
}

/// Single-column result of integer rows `start..end`.
pub fn int_rows(start: u64, end: u64) -> Vec<RawRow> {
    (start..end).map(|i| vec![Some(i.to_string())]).collect()
}

pub fn select_data(
    inline: Vec<RawRow>,
    chunks: Vec<ChunkMeta>,
    total: i64,
    qrmk: &str,
) -> ExecResponseData {
    ExecResponseData {
        row_type: vec![RowType::new("ID", "fixed")],
        row_set: inline,
        total,
        query_id: "q-select".to_string(),
        statement_type_id: 0x1000,
        chunks,
        qrmk: qrmk.to_string(),
        ..Default::default()
    }
}

/// Configuration with fast chunk retries and an endpoint that is never dialled.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.host = Some("localhost".to_string());
    config.token = Some("session-token".to_string());
    config.chunks.retry_delay = Duration::from_millis(1);
    config.chunks.max_retries = 2;
    config
}

pub fn connect(client: &Arc<MockClient>) -> Connection {
    Connection::with_client(test_config(), Arc::clone(client) as Arc<dyn SnowflakeClient>)
}
