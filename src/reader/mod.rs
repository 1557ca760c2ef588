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

//! Result readers for query results.
//!
//! This module provides:
//! - `Rows`: forward-only cursor over a result set
//! - `chunk`: the background pipeline that downloads remote result chunks
//! - `arrow`: record batch view over decoded rows

pub mod arrow;
pub mod chunk;

use crate::error::{Error, Result};
use crate::reader::chunk::ChunkDownloader;
use crate::types::chunk::DownloaderState;
use crate::types::query::{RawRow, RowType};
use crate::types::value::Value;
use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use std::sync::Arc;

/// A decoded result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<RowType>>,
    values: Vec<Value>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Look up a value by column name (case-sensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Forward-only cursor over a query result.
///
/// Rows are produced lazily; remote chunks are downloaded in the background
/// while earlier rows are consumed. There is no rewind.
#[derive(Debug)]
pub struct Rows {
    columns: Arc<Vec<RowType>>,
    schema: SchemaRef,
    downloader: ChunkDownloader,
    query_id: String,
}

impl Rows {
    pub(crate) fn new(
        columns: Vec<RowType>,
        downloader: ChunkDownloader,
        query_id: String,
    ) -> Self {
        let schema = arrow::schema_for(&columns);
        Self {
            columns: Arc::new(columns),
            schema,
            downloader,
            query_id,
        }
    }

    /// Column descriptors of the result set.
    pub fn columns(&self) -> &[RowType] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Arrow schema matching [`next_batch`](Self::next_batch).
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Total number of rows announced by the service.
    pub fn total_rows(&self) -> u64 {
        self.downloader.total()
    }

    pub fn state(&self) -> DownloaderState {
        self.downloader.state()
    }

    /// Zero-based index of the last returned row.
    pub fn row_index(&self) -> Option<u64> {
        self.downloader.row_index()
    }

    /// Next row as delivered by the service, one optional string per column.
    pub async fn next_raw_row(&mut self) -> Result<Option<RawRow>> {
        self.downloader.next_row().await
    }

    /// Next row decoded according to the column types.
    pub async fn next_row(&mut self) -> Result<Option<Row>> {
        match self.downloader.next_row().await? {
            Some(raw) => Ok(Some(self.decode(raw)?)),
            None => Ok(None),
        }
    }

    /// Up to `max_rows` rows as an Arrow record batch, `None` at the end.
    pub async fn next_batch(&mut self, max_rows: usize) -> Result<Option<RecordBatch>> {
        if max_rows == 0 {
            return Err(Error::InvalidArgument(
                "max_rows must be greater than zero".to_string(),
            ));
        }

        let mut rows = Vec::with_capacity(max_rows.min(4096));
        while rows.len() < max_rows {
            match self.next_row().await? {
                Some(row) => rows.push(row.values),
                None => break,
            }
        }
        if rows.is_empty() {
            return Ok(None);
        }
        arrow::build_batch(Arc::clone(&self.schema), &rows).map(Some)
    }

    /// Stop the download pipeline. Rows not yet read are discarded.
    pub fn close(&mut self) {
        self.downloader.cancel();
    }

    fn decode(&self, raw: RawRow) -> Result<Row> {
        if raw.len() != self.columns.len() {
            return Err(Error::InvalidState(format!(
                "row has {} cells but the result set has {} columns",
                raw.len(),
                self.columns.len()
            )));
        }
        let values = self
            .columns
            .iter()
            .zip(raw.iter())
            .map(|(column, cell)| Value::decode(column, cell.as_deref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Row {
            columns: Arc::clone(&self.columns),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::reader::chunk::ChunkFetcher;
    use crate::types::chunk::ChunkDownloadConfig;
    use crate::types::query::ChunkMeta;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug)]
    struct NoFetch;

    #[async_trait]
    impl ChunkFetcher for NoFetch {
        async fn fetch(&self, chunk_index: usize, _meta: &ChunkMeta) -> Result<Vec<RawRow>> {
            Err(Error::InvalidState(format!("unexpected fetch of chunk {}", chunk_index)))
        }
    }

    fn rows(inline: Vec<RawRow>) -> Rows {
        let total = inline.len() as u64;
        let columns = vec![RowType::new("ID", "fixed"), RowType::new("NAME", "text")];
        let downloader = ChunkDownloader::new(
            inline,
            Vec::new(),
            total,
            Arc::new(NoFetch),
            ChunkDownloadConfig::default(),
            CancellationToken::new(),
        );
        Rows::new(columns, downloader, "q-1".to_string())
    }

    fn raw(id: &str, name: Option<&str>) -> RawRow {
        vec![Some(id.to_string()), name.map(str::to_string)]
    }

    #[tokio::test]
    async fn test_next_row_decodes_values() {
        let mut rows = rows(vec![raw("1", Some("a")), raw("2", None)]);
        assert_eq!(rows.column_names(), vec!["ID", "NAME"]);
        assert_eq!(rows.query_id(), "q-1");

        let first = rows.next_row().await.unwrap().unwrap();
        assert_eq!(first.get(0), Some(&Value::Int(1)));
        assert_eq!(first.get_by_name("NAME"), Some(&Value::Text("a".to_string())));

        let second = rows.next_row().await.unwrap().unwrap();
        assert!(second.get(1).unwrap().is_null());
        assert!(rows.next_row().await.unwrap().is_none());
        assert_eq!(rows.state(), DownloaderState::Exhausted);
    }

    #[tokio::test]
    async fn test_next_raw_row() {
        let mut rows = rows(vec![raw("1", Some("a"))]);
        assert_eq!(rows.next_raw_row().await.unwrap(), Some(raw("1", Some("a"))));
        assert_eq!(rows.row_index(), Some(0));
    }

    #[tokio::test]
    async fn test_next_batch() {
        let mut rows = rows((0..5).map(|i| raw(&i.to_string(), Some("x"))).collect());

        let batch = rows.next_batch(3).await.unwrap().unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.schema(), rows.schema());
        let batch = rows.next_batch(3).await.unwrap().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(rows.next_batch(3).await.unwrap().is_none());
        assert!(rows.next_batch(0).await.is_err());
    }

    #[tokio::test]
    async fn test_row_width_mismatch() {
        let mut rows = rows(vec![vec![Some("1".to_string())]]);
        assert!(matches!(rows.next_row().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_close() {
        let mut rows = rows(vec![raw("1", None), raw("2", None)]);
        rows.next_row().await.unwrap();
        rows.close();
        assert!(matches!(rows.next_row().await, Err(Error::Cancelled)));
    }
}
