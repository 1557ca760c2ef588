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

//! Client implementations for communicating with the Snowflake service.
//!
//! This module provides:
//! - `SnowflakeClient` trait: abstract interface used by connections and result readers
//! - `SnowflakeHttpClient`: low-level pooled HTTP client
//! - `RestClient`: implementation over the REST query endpoint

pub mod http;
pub mod rest;

use crate::error::Result;
use crate::types::query::{ChunkMeta, ExecResponse, QueryRequest, RawRow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub use http::{HttpClientConfig, SnowflakeHttpClient};
pub use rest::RestClient;

/// Abstract interface for the service backend.
///
/// Connections only talk to the service through this trait, so tests can
/// substitute a scripted implementation.
#[async_trait]
pub trait SnowflakeClient: Send + Sync + std::fmt::Debug {
    /// Submit an execution request and return the decoded response envelope.
    ///
    /// `timeout` bounds the whole HTTP call. Network failures, non-success
    /// HTTP statuses and undecodable bodies are transport errors. No retry
    /// is attempted.
    async fn post_query(&self, request: &QueryRequest, timeout: Duration) -> Result<ExecResponse>;

    /// Download one remote result chunk and return its rows.
    async fn fetch_chunk(
        &self,
        chunk: &ChunkMeta,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<RawRow>>;
}
