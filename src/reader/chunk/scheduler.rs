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

//! Scheduler for the chunk download pipeline.
//!
//! The scheduler walks the chunk metas in service order. For each chunk it
//! acquires a prefetch permit, then sends the [`ChunkHandle`] to the result
//! channel and only then the [`ChunkDownloadTask`] to the download channel.
//!
//! ## Backpressure
//!
//! A semaphore with `prefetch_depth` permits bounds the number of chunks that
//! are dispatched but not yet current on the consumer side. The consumer
//! releases a permit when it makes the corresponding chunk current.
//!
//! ## Ordering Invariant
//!
//! Handles are always sent before tasks, so the consumer receives them in
//! chunk order no matter in which order downloads complete.

use crate::reader::chunk::pipeline_types::{create_chunk_pair, ChunkDownloadTask, ChunkHandle};
use crate::types::chunk::ChunkDownloadConfig;
use crate::types::query::ChunkMeta;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Channels returned by the scheduler for consumption by other pipeline components.
pub struct SchedulerChannels {
    /// Download workers pull tasks from here.
    pub download_rx: mpsc::UnboundedReceiver<ChunkDownloadTask>,
    /// The consumer pulls handles from here in chunk order.
    pub result_rx: mpsc::Receiver<ChunkHandle>,
    pub scheduler_handle: JoinHandle<()>,
}

/// Spawns the scheduler task and returns the pipeline channels.
///
/// The task runs until every chunk has been dispatched, the consumer goes
/// away, or the cancellation token is triggered.
pub fn spawn_scheduler(
    metas: Vec<ChunkMeta>,
    config: &ChunkDownloadConfig,
    cancel_token: CancellationToken,
) -> SchedulerChannels {
    let depth = config.prefetch_depth.max(1);

    let (download_tx, download_rx) = mpsc::unbounded_channel::<ChunkDownloadTask>();
    // Never more than `depth` handles are outstanding, so sends do not block.
    let (result_tx, result_rx) = mpsc::channel::<ChunkHandle>(depth);
    let permits = Arc::new(Semaphore::new(depth));

    debug!(
        "Spawning chunk scheduler: chunks={}, prefetch_depth={}",
        metas.len(),
        depth
    );

    let scheduler_handle = tokio::spawn(scheduler_task(
        metas,
        permits,
        download_tx,
        result_tx,
        cancel_token,
    ));

    SchedulerChannels {
        download_rx,
        result_rx,
        scheduler_handle,
    }
}

async fn scheduler_task(
    metas: Vec<ChunkMeta>,
    permits: Arc<Semaphore>,
    download_tx: mpsc::UnboundedSender<ChunkDownloadTask>,
    result_tx: mpsc::Sender<ChunkHandle>,
    cancel_token: CancellationToken,
) {
    for (offset, meta) in metas.into_iter().enumerate() {
        let chunk_index = offset + 1;

        let permit = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                debug!("Scheduler cancelled while waiting to dispatch chunk {}", chunk_index);
                return;
            }
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        // A failing consumer cancels before it releases its permit.
        if cancel_token.is_cancelled() {
            debug!("Scheduler cancelled before dispatching chunk {}", chunk_index);
            return;
        }

        let (task, handle) = create_chunk_pair(chunk_index, meta, permit);

        if result_tx.send(handle).await.is_err() {
            debug!(
                "Scheduler: result channel closed, stopping at chunk {}",
                chunk_index
            );
            return;
        }

        if download_tx.send(task).is_err() {
            debug!(
                "Scheduler: download channel closed, stopping at chunk {}",
                chunk_index
            );
            return;
        }

        trace!("Scheduler: dispatched chunk {}", chunk_index);
    }

    debug!("Scheduler: all chunks dispatched");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn metas(count: usize) -> Vec<ChunkMeta> {
        (1..=count)
            .map(|i| ChunkMeta::new(format!("https://chunks/{}", i), 10))
            .collect()
    }

    fn config(prefetch_depth: usize) -> ChunkDownloadConfig {
        ChunkDownloadConfig {
            prefetch_depth,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_handles_and_tasks_arrive_in_order() {
        let mut channels = spawn_scheduler(metas(3), &config(3), CancellationToken::new());

        for expected in 1..=3 {
            let handle = timeout(Duration::from_secs(1), channels.result_rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(handle.chunk_index, expected);
            let task = channels.download_rx.recv().await.unwrap();
            assert_eq!(task.chunk_index, expected);
        }
        channels.scheduler_handle.await.unwrap();
        assert!(channels.result_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_prefetch_depth_limits_dispatch() {
        let mut channels = spawn_scheduler(metas(3), &config(1), CancellationToken::new());

        let first = channels.result_rx.recv().await.unwrap();
        assert_eq!(first.chunk_index, 1);

        // The permit of chunk 1 is still held, chunk 2 must not be dispatched.
        let blocked = timeout(Duration::from_millis(50), channels.result_rx.recv()).await;
        assert!(blocked.is_err());

        drop(first.permit);
        let second = timeout(Duration::from_secs(1), channels.result_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.chunk_index, 2);
    }

    #[tokio::test]
    async fn test_cancel_before_permit_release_stops_dispatch() {
        let token = CancellationToken::new();
        let mut channels = spawn_scheduler(metas(3), &config(1), token.clone());

        let first = channels.result_rx.recv().await.unwrap();
        token.cancel();
        drop(first);

        timeout(Duration::from_secs(1), channels.scheduler_handle)
            .await
            .unwrap()
            .unwrap();
        assert!(channels.result_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_no_chunks() {
        let mut channels = spawn_scheduler(Vec::new(), &config(1), CancellationToken::new());
        channels.scheduler_handle.await.unwrap();
        assert!(channels.result_rx.recv().await.is_none());
        assert!(channels.download_rx.recv().await.is_none());
    }
}
