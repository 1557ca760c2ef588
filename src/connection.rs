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

//! Connection to the Snowflake service.

use crate::auth::{AuthProvider, SessionToken};
use crate::bindings::BindValue;
use crate::client::SnowflakeClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::reader::chunk::{chunk_headers, ChunkDownloader, ClientChunkFetcher};
use crate::reader::Rows;
use crate::request::build_query_request;
use crate::response::classify;
use crate::result::ExecResult;
use crate::statement::{Statement, StatementOutcome};
use crate::transaction::Transaction;
use crate::types::query::ExecResponseData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Session-scoped state of a connection.
///
/// Only [`Connection::exec`] mutates it, and only after the service confirmed
/// success.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    sequence_counter: u64,
    database: Option<String>,
    schema: Option<String>,
    role: Option<String>,
    warehouse: Option<String>,
    last_query_id: String,
    last_sql_state: String,
}

impl SessionState {
    fn from_config(config: &Config) -> Self {
        Self {
            database: config.database.clone(),
            schema: config.schema.clone(),
            role: config.role.clone(),
            warehouse: config.warehouse.clone(),
            ..Default::default()
        }
    }

    fn next_sequence_id(&mut self) -> u64 {
        self.sequence_counter += 1;
        self.sequence_counter
    }

    /// Take over the session context the service reported.
    ///
    /// `USE` statements and the like move the session; fields absent from the
    /// response leave the current value alone.
    fn adopt(&mut self, data: &ExecResponseData) {
        adopt_field(&mut self.database, &data.final_database_name);
        adopt_field(&mut self.schema, &data.final_schema_name);
        adopt_field(&mut self.role, &data.final_role_name);
        adopt_field(&mut self.warehouse, &data.final_warehouse_name);
        self.last_query_id = data.query_id.clone();
        self.last_sql_state = data.sql_state.clone();
    }
}

fn adopt_field(current: &mut Option<String>, reported: &Option<String>) {
    if let Some(value) = reported {
        *current = Some(value.clone());
    }
}

/// An open session with the service.
///
/// Statements run one at a time: every operation takes `&mut self`. Result
/// cursors returned by [`query`](Self::query) own their download pipeline and
/// outlive the borrow, but are cancelled when the connection is closed.
#[derive(Debug)]
pub struct Connection {
    config: Config,
    client: Arc<dyn SnowflakeClient>,
    auth: Option<SessionToken>,
    session: SessionState,
    cancel_token: CancellationToken,
    closed: bool,
}

impl Connection {
    /// Create a connection over an existing client.
    ///
    /// `config.token` is sent as the session token when set.
    pub fn with_client(config: Config, client: Arc<dyn SnowflakeClient>) -> Self {
        let auth = config.token.clone().map(SessionToken::new);
        let session = SessionState::from_config(&config);
        Self {
            config,
            client,
            auth,
            session,
            cancel_token: CancellationToken::new(),
            closed: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> Option<&str> {
        self.session.database.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.session.schema.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.session.role.as_deref()
    }

    pub fn warehouse(&self) -> Option<&str> {
        self.session.warehouse.as_deref()
    }

    /// Query id of the last successful statement.
    pub fn last_query_id(&self) -> &str {
        &self.session.last_query_id
    }

    pub fn last_sql_state(&self) -> &str {
        &self.session.last_sql_state
    }

    /// Last sequence id issued, 0 before the first statement.
    pub fn sequence_counter(&self) -> u64 {
        self.session.sequence_counter
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Run one statement and return the response payload.
    ///
    /// Every statement goes through here. A sequence id is consumed even when
    /// the request fails, so ids are never reused. Session state changes
    /// only on success.
    pub async fn exec(
        &mut self,
        sql: &str,
        async_exec: bool,
        internal: bool,
        params: &[BindValue],
    ) -> Result<ExecResponseData> {
        self.ensure_open()?;

        let sequence_id = self.session.next_sequence_id();
        let request = build_query_request(
            sequence_id,
            sql,
            async_exec,
            internal,
            params,
            self.auth.as_ref().map(|a| a as &dyn AuthProvider),
        )?;

        debug!(
            "Executing statement: sequence_id={}, params={}, async={}",
            sequence_id,
            params.len(),
            async_exec
        );
        trace!("SQL: {}", sql);

        let response = self
            .client
            .post_query(&request, self.config.request_timeout)
            .await?;
        let data = classify(response)?;

        self.session.adopt(&data);
        debug!(
            "Statement succeeded: query_id={}, statement_type_id=0x{:x}",
            data.query_id, data.statement_type_id
        );
        Ok(data)
    }

    /// Execute a statement that does not return rows.
    pub async fn execute(&mut self, sql: &str, params: &[BindValue]) -> Result<ExecResult> {
        let data = self.exec(sql, false, false, params).await?;
        let outcome = StatementOutcome::from_response(&data)?;
        Ok(ExecResult::new(outcome, data.query_id))
    }

    /// Execute a query and return a cursor over its rows.
    ///
    /// Remote chunks start downloading before this returns.
    pub async fn query(&mut self, sql: &str, params: &[BindValue]) -> Result<Rows> {
        let data = self.exec(sql, false, false, params).await?;

        let total = u64::try_from(data.total)
            .map_err(|e| Error::parse("total row count", data.total.to_string(), e))?;
        let headers = chunk_headers(&data.qrmk, data.chunk_headers.as_ref());
        let fetcher = Arc::new(ClientChunkFetcher::new(Arc::clone(&self.client), headers));

        debug!(
            "Query {}: {} inline rows, {} remote chunks, {} rows total",
            data.query_id,
            data.row_set.len(),
            data.chunks.len(),
            total
        );

        let mut downloader = ChunkDownloader::new(
            data.row_set,
            data.chunks,
            total,
            fetcher,
            self.config.chunks.clone(),
            self.cancel_token.child_token(),
        );
        downloader.start();

        Ok(Rows::new(data.row_type, downloader, data.query_id))
    }

    /// Bind `sql` to this connection for later execution. No I/O.
    pub fn prepare(&mut self, sql: &str) -> Result<Statement<'_>> {
        self.ensure_open()?;
        Ok(Statement::new(self, sql))
    }

    /// Start a transaction.
    pub async fn begin(&mut self) -> Result<Transaction<'_>> {
        self.exec("BEGIN", false, false, &[]).await?;
        Ok(Transaction::new(self))
    }

    /// Close the connection and cancel every cursor created from it.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!("Closing connection after {} statements", self.session.sequence_counter);
        self.closed = true;
        self.cancel_token.cancel();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidState("connection is closed".to_string()));
        }
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
