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

//! Types for the chunked result download pipeline.

use std::time::Duration;

/// Configuration for chunk downloads.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDownloadConfig {
    /// Number of remote chunks that may be fetched ahead of consumption.
    /// Also the number of download workers.
    pub prefetch_depth: usize,
    /// Maximum number of retry attempts for a failed chunk download.
    pub max_retries: u32,
    /// Base delay between retry attempts; attempt `n` waits `retry_delay * n`.
    pub retry_delay: Duration,
}

impl Default for ChunkDownloadConfig {
    fn default() -> Self {
        Self {
            prefetch_depth: 1,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// State of a [`crate::reader::chunk::ChunkDownloader`].
///
/// ```text
///   Ready(i)    -> Ready(i)      (row delivered from chunk i)
///   Ready(i)    -> Fetching(i+1) (chunk i consumed, waiting on i+1)
///   Fetching(i) -> Ready(i)      (chunk i arrived)
///   Fetching(i) -> Failed        (chunk i could not be fetched)
///   Ready(last) -> Exhausted
/// ```
///
/// Chunk 0 is the inline batch returned with the execution response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloaderState {
    Ready(usize),
    Fetching(usize),
    Exhausted,
    Failed,
}

impl DownloaderState {
    /// Whether no more rows will ever be produced.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}
