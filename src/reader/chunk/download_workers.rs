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

//! Download workers for the chunk pipeline.
//!
//! Workers are long-lived tokio tasks that pull [`ChunkDownloadTask`]s from
//! the shared download channel, fetch the chunk with retries and complete the
//! task's oneshot channel.
//!
//! ## Retry Behavior
//!
//! | Error type | Sleep before retry | Retried |
//! |---|---|---|
//! | Transport (network, timeout, HTTP status) | `retry_delay * retry_count` | `max_retries` |
//! | Anything else (malformed body, ...) | - | no |
//!
//! A chunk that cannot be fetched is reported as [`Error::ChunkFetch`].

use crate::error::{Error, Result};
use crate::reader::chunk::fetcher::ChunkFetcher;
use crate::reader::chunk::pipeline_types::ChunkDownloadTask;
use crate::types::chunk::ChunkDownloadConfig;
use crate::types::query::{ChunkMeta, RawRow};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<ChunkDownloadTask>>>;

/// Spawns `prefetch_depth` download workers sharing the download channel.
pub fn spawn_download_workers(
    download_rx: mpsc::UnboundedReceiver<ChunkDownloadTask>,
    config: &ChunkDownloadConfig,
    fetcher: Arc<dyn ChunkFetcher>,
    cancel_token: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let num_workers = config.prefetch_depth.max(1);
    let download_rx: SharedReceiver = Arc::new(tokio::sync::Mutex::new(download_rx));

    debug!(
        "Spawning {} download workers: max_retries={}, retry_delay={:?}",
        num_workers, config.max_retries, config.retry_delay
    );

    (0..num_workers)
        .map(|worker_id| {
            let rx = Arc::clone(&download_rx);
            let fetcher = Arc::clone(&fetcher);
            let config = config.clone();
            let token = cancel_token.clone();
            tokio::spawn(async move {
                worker_task(worker_id, rx, fetcher, config, token).await;
            })
        })
        .collect()
}

async fn worker_task(
    worker_id: usize,
    download_rx: SharedReceiver,
    fetcher: Arc<dyn ChunkFetcher>,
    config: ChunkDownloadConfig,
    cancel_token: CancellationToken,
) {
    debug!("Worker {} started", worker_id);

    loop {
        let task = {
            let mut rx = download_rx.lock().await;
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("Worker {} cancelled while waiting for task", worker_id);
                    return;
                }
                task = rx.recv() => task
            }
        };

        let Some(task) = task else {
            debug!("Worker {} exiting: download channel closed", worker_id);
            return;
        };

        trace!("Worker {} received chunk {}", worker_id, task.chunk_index);

        let result = process_task(
            worker_id,
            task.chunk_index,
            &task.meta,
            fetcher.as_ref(),
            &config,
            &cancel_token,
        )
        .await;

        // The consumer may be gone already.
        if task.result_tx.send(result).is_err() {
            debug!(
                "Worker {}: result receiver dropped for chunk {}",
                worker_id, task.chunk_index
            );
        }
    }
}

/// Fetch one chunk, retrying transport failures with linear backoff.
async fn process_task(
    worker_id: usize,
    chunk_index: usize,
    meta: &ChunkMeta,
    fetcher: &dyn ChunkFetcher,
    config: &ChunkDownloadConfig,
    cancel_token: &CancellationToken,
) -> Result<Vec<RawRow>> {
    let mut retry_count: u32 = 0;

    loop {
        if cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let attempt = tokio::select! {
            _ = cancel_token.cancelled() => return Err(Error::Cancelled),
            result = fetcher.fetch(chunk_index, meta) => result,
        };

        let e = match attempt {
            Ok(rows) => {
                if i64::try_from(rows.len()).ok() != Some(meta.row_count) {
                    warn!(
                        "Worker {}: chunk {} announced {} rows but contained {}",
                        worker_id,
                        chunk_index,
                        meta.row_count,
                        rows.len()
                    );
                }
                trace!("Worker {}: chunk {} fetched ({} rows)", worker_id, chunk_index, rows.len());
                return Ok(rows);
            }
            Err(e) => e,
        };

        if !e.is_retryable() || retry_count >= config.max_retries {
            error!(
                "Worker {}: chunk {} failed after {} attempt(s): {}",
                worker_id,
                chunk_index,
                retry_count + 1,
                e
            );
            return Err(Error::ChunkFetch {
                chunk_index,
                attempts: retry_count + 1,
                message: e.to_string(),
            });
        }

        retry_count += 1;
        let sleep_duration = config.retry_delay * retry_count;
        warn!(
            "Worker {}: chunk {} transient error (retry={}), sleeping {:?}: {}",
            worker_id, chunk_index, retry_count, sleep_duration, e
        );

        tokio::select! {
            _ = cancel_token.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(sleep_duration) => {}
        }
    }
}
