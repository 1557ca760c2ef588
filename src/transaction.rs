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

//! Explicit transactions.

use crate::connection::Connection;
use crate::error::Result;
use tracing::{debug, warn};

/// An open transaction started with [`Connection::begin`].
///
/// Statements inside the transaction run through [`connection`](Self::connection).
/// A transaction dropped without `commit` or `rollback` is left open on the
/// server until the session ends.
#[derive(Debug)]
pub struct Transaction<'a> {
    connection: &'a mut Connection,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(connection: &'a mut Connection) -> Self {
        Self {
            connection,
            finished: false,
        }
    }

    pub fn connection(&mut self) -> &mut Connection {
        self.connection
    }

    pub async fn commit(mut self) -> Result<()> {
        self.finish("COMMIT").await
    }

    pub async fn rollback(mut self) -> Result<()> {
        self.finish("ROLLBACK").await
    }

    async fn finish(&mut self, sql: &str) -> Result<()> {
        self.finished = true;
        debug!("Ending transaction with {}", sql);
        self.connection.exec(sql, false, false, &[]).await?;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Transaction dropped without commit or rollback");
        }
    }
}
