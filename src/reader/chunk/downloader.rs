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

//! Ordered consumer over the inline batch and the remote chunks.

use crate::error::{Error, Result};
use crate::reader::chunk::download_workers::spawn_download_workers;
use crate::reader::chunk::fetcher::ChunkFetcher;
use crate::reader::chunk::pipeline_types::ChunkHandle;
use crate::reader::chunk::scheduler::spawn_scheduler;
use crate::types::chunk::{ChunkDownloadConfig, DownloaderState};
use crate::types::query::{ChunkMeta, RawRow};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Delivers the rows of a result set one at a time, in service order.
///
/// Rows from the inline batch (chunk 0) are available immediately; remote
/// chunks are fetched in the background by the pipeline started in
/// [`ChunkDownloader::start`], at most `prefetch_depth` ahead of the chunk
/// being consumed.
///
/// Once a fetch fails for good the downloader moves to
/// [`DownloaderState::Failed`] and every later call returns the same error.
pub struct ChunkDownloader {
    current: std::vec::IntoIter<RawRow>,
    current_index: usize,
    chunk_count: usize,
    pending_metas: Option<Vec<ChunkMeta>>,
    total: u64,
    delivered: u64,
    state: DownloaderState,
    terminal_error: Option<Error>,

    fetcher: Arc<dyn ChunkFetcher>,
    config: ChunkDownloadConfig,
    cancel_token: CancellationToken,
    result_rx: Option<mpsc::Receiver<ChunkHandle>>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for ChunkDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkDownloader")
            .field("state", &self.state)
            .field("chunk_count", &self.chunk_count)
            .field("total", &self.total)
            .field("delivered", &self.delivered)
            .finish()
    }
}

impl ChunkDownloader {
    /// Create a downloader. Nothing is fetched until [`start`](Self::start).
    pub fn new(
        inline_rows: Vec<RawRow>,
        metas: Vec<ChunkMeta>,
        total: u64,
        fetcher: Arc<dyn ChunkFetcher>,
        config: ChunkDownloadConfig,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            current: inline_rows.into_iter(),
            current_index: 0,
            chunk_count: metas.len(),
            pending_metas: Some(metas),
            total,
            delivered: 0,
            state: DownloaderState::Ready(0),
            terminal_error: None,
            fetcher,
            config,
            cancel_token,
            result_rx: None,
            tasks: Vec::new(),
        }
    }

    /// Start the background pipeline for the remote chunks.
    ///
    /// Must be called from within a tokio runtime. Calling it again is a no-op.
    pub fn start(&mut self) {
        let Some(metas) = self.pending_metas.take() else {
            return;
        };
        if metas.is_empty() {
            return;
        }

        debug!(
            "Starting chunk download pipeline: chunks={}, total_rows={}",
            metas.len(),
            self.total
        );

        let channels = spawn_scheduler(metas, &self.config, self.cancel_token.clone());
        let workers = spawn_download_workers(
            channels.download_rx,
            &self.config,
            Arc::clone(&self.fetcher),
            self.cancel_token.clone(),
        );

        self.result_rx = Some(channels.result_rx);
        self.tasks.push(channels.scheduler_handle);
        self.tasks.extend(workers);
    }

    pub fn state(&self) -> DownloaderState {
        self.state
    }

    /// Zero-based index of the last delivered row, `None` before the first row.
    pub fn row_index(&self) -> Option<u64> {
        self.delivered.checked_sub(1)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Stop the pipeline. Later calls to [`next_row`](Self::next_row) fail
    /// with [`Error::Cancelled`] unless the downloader already finished.
    pub fn cancel(&mut self) {
        self.cancel_token.cancel();
        if !self.state.is_terminal() {
            self.state = DownloaderState::Failed;
            self.terminal_error = Some(Error::Cancelled);
        }
    }

    /// Return the next row, or `None` once all `total` rows were delivered.
    pub async fn next_row(&mut self) -> Result<Option<RawRow>> {
        loop {
            match self.state {
                DownloaderState::Exhausted => return Ok(None),
                DownloaderState::Failed => {
                    return Err(self.terminal_error.clone().unwrap_or(Error::Cancelled));
                }
                DownloaderState::Ready(_) | DownloaderState::Fetching(_) => {}
            }

            if self.cancel_token.is_cancelled() {
                return self.fail(Error::Cancelled);
            }

            if let Some(row) = self.current.next() {
                if self.delivered >= self.total {
                    return self.fail(Error::InvalidState(format!(
                        "result set returned more than the announced {} rows",
                        self.total
                    )));
                }
                self.delivered += 1;
                return Ok(Some(row));
            }

            let next_index = self.current_index + 1;
            if next_index > self.chunk_count {
                if self.delivered != self.total {
                    return self.fail(Error::InvalidState(format!(
                        "result set ended after {} of {} rows",
                        self.delivered, self.total
                    )));
                }
                debug!("Result set exhausted after {} rows", self.delivered);
                self.state = DownloaderState::Exhausted;
                self.result_rx = None;
                return Ok(None);
            }

            self.state = DownloaderState::Fetching(next_index);
            if let Err(e) = self.advance(next_index).await {
                return self.fail(e);
            }
        }
    }

    /// Wait for chunk `chunk_index` and make it the current chunk.
    async fn advance(&mut self, chunk_index: usize) -> Result<()> {
        let Some(result_rx) = self.result_rx.as_mut() else {
            return Err(Error::InvalidState(format!(
                "chunk {} requested before the download pipeline was started",
                chunk_index
            )));
        };

        let handle = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return Err(Error::Cancelled),
            handle = result_rx.recv() => handle,
        };
        let Some(ChunkHandle {
            chunk_index: handle_index,
            expected_rows,
            result_rx: rows_rx,
            permit,
        }) = handle
        else {
            return Err(Error::InvalidState(format!(
                "download pipeline ended before chunk {}",
                chunk_index
            )));
        };
        if handle_index != chunk_index {
            return Err(Error::InvalidState(format!(
                "expected chunk {} but received chunk {}",
                chunk_index, handle_index
            )));
        }

        let result = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(Error::Cancelled),
            rows = rows_rx => rows.unwrap_or(Err(Error::Cancelled)),
        };

        match result {
            Ok(rows) => {
                debug!(
                    "Chunk {} ready: {} rows (announced {})",
                    chunk_index,
                    rows.len(),
                    expected_rows
                );
                self.current = rows.into_iter();
                self.current_index = chunk_index;
                self.state = DownloaderState::Ready(chunk_index);
                // Chunk is current now, admit the next one.
                drop(permit);
                Ok(())
            }
            Err(e) => {
                // Cancel first so the released permit cannot admit another chunk.
                self.cancel_token.cancel();
                drop(permit);
                Err(e)
            }
        }
    }

    fn fail(&mut self, e: Error) -> Result<Option<RawRow>> {
        match e {
            Error::Cancelled => warn!("Result set cancelled after {} rows", self.delivered),
            ref other => error!("Result set failed after {} rows: {}", self.delivered, other),
        }
        self.cancel_token.cancel();
        self.state = DownloaderState::Failed;
        self.terminal_error = Some(e.clone());
        self.current = Vec::new().into_iter();
        self.result_rx = None;
        Err(e)
    }
}

impl Drop for ChunkDownloader {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        for task in &self.tasks {
            task.abort();
        }
    }
}
