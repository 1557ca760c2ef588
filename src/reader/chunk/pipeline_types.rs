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

//! Types that flow through the chunk download pipeline.
//!
//! - `ChunkDownloadTask` - sent through download_channel, owned by a download worker
//! - `ChunkHandle` - sent through result_channel in chunk order, awaited by the consumer
//!
//! `create_chunk_pair()` connects the two with a oneshot channel. The handle
//! also carries the prefetch permit that admitted the chunk into the pipeline;
//! the permit is released when the consumer makes the chunk current.

use crate::error::Result;
use crate::types::query::{ChunkMeta, RawRow};
use tokio::sync::{oneshot, OwnedSemaphorePermit};

/// A download task sent to download workers via download_channel.
#[derive(Debug)]
pub struct ChunkDownloadTask {
    /// 1-based index of the remote chunk.
    pub chunk_index: usize,
    pub meta: ChunkMeta,
    /// The worker sends the downloaded rows or the terminal error here.
    pub result_tx: oneshot::Sender<Result<Vec<RawRow>>>,
}

/// A handle for the consumer to await download results in order.
#[derive(Debug)]
pub struct ChunkHandle {
    pub chunk_index: usize,
    /// Row count announced by the service for this chunk.
    pub expected_rows: i64,
    pub result_rx: oneshot::Receiver<Result<Vec<RawRow>>>,
    pub permit: OwnedSemaphorePermit,
}

/// Creates a connected (ChunkDownloadTask, ChunkHandle) pair.
pub fn create_chunk_pair(
    chunk_index: usize,
    meta: ChunkMeta,
    permit: OwnedSemaphorePermit,
) -> (ChunkDownloadTask, ChunkHandle) {
    let (result_tx, result_rx) = oneshot::channel();
    let expected_rows = meta.row_count;

    let task = ChunkDownloadTask {
        chunk_index,
        meta,
        result_tx,
    };

    let handle = ChunkHandle {
        chunk_index,
        expected_rows,
        result_rx,
        permit,
    };

    (task, handle)
}
