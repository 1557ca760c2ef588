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

//! Chunked result download pipeline.
//!
//! ```text
//! [Scheduler] --> download_channel --> [Download Workers] --> ChunkFetcher
//!      |                                      |
//!      +--> result_channel --> [ChunkDownloader] (awaits handles in order)
//! ```
//!
//! The inline rows of the execution response form chunk 0; remote chunk `i`
//! is described by the `i`-th chunk meta (1-based).

pub mod download_workers;
pub mod downloader;
pub mod fetcher;
pub mod pipeline_types;
pub mod scheduler;

pub use downloader::ChunkDownloader;
pub use fetcher::{chunk_headers, ChunkFetcher, ClientChunkFetcher};
