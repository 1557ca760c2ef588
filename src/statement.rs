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

//! Prepared statements and statement outcome classification.

use crate::bindings::BindValue;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::reader::Rows;
use crate::result::ExecResult;
use crate::types::query::ExecResponseData;

/// Statement kind reported by the service in `statementTypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Dml,
    Insert,
    Update,
    Delete,
    Merge,
    MultiTableInsert,
    Other(i64),
}

impl StatementType {
    pub const SELECT_ID: i64 = 0x1000;
    pub const DML_ID: i64 = 0x3000;
    pub const INSERT_ID: i64 = 0x3100;
    pub const UPDATE_ID: i64 = 0x3200;
    pub const DELETE_ID: i64 = 0x3300;
    pub const MERGE_ID: i64 = 0x3400;
    pub const MULTI_TABLE_INSERT_ID: i64 = 0x3500;

    pub fn from_id(id: i64) -> Self {
        match id {
            Self::SELECT_ID => Self::Select,
            Self::DML_ID => Self::Dml,
            Self::INSERT_ID => Self::Insert,
            Self::UPDATE_ID => Self::Update,
            Self::DELETE_ID => Self::Delete,
            Self::MERGE_ID => Self::Merge,
            Self::MULTI_TABLE_INSERT_ID => Self::MultiTableInsert,
            other => Self::Other(other),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Select => Self::SELECT_ID,
            Self::Dml => Self::DML_ID,
            Self::Insert => Self::INSERT_ID,
            Self::Update => Self::UPDATE_ID,
            Self::Delete => Self::DELETE_ID,
            Self::Merge => Self::MERGE_ID,
            Self::MultiTableInsert => Self::MULTI_TABLE_INSERT_ID,
            Self::Other(id) => *id,
        }
    }

    /// Whether the service reports affected-row counts for this statement.
    pub fn is_dml(&self) -> bool {
        matches!(
            self,
            Self::Dml
                | Self::Insert
                | Self::Update
                | Self::Delete
                | Self::Merge
                | Self::MultiTableInsert
        )
    }
}

/// What a non-query execution produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// DML with the summed per-column counts of the summary row.
    Dml {
        statement_type: StatementType,
        affected_rows: i64,
    },
    /// A statement that returned rows, executed without a cursor.
    RowProducing,
    /// DDL, session commands and anything else.
    Other(StatementType),
}

impl StatementOutcome {
    pub fn from_response(data: &ExecResponseData) -> Result<Self> {
        let statement_type = StatementType::from_id(data.statement_type_id);
        if statement_type.is_dml() {
            return Ok(Self::Dml {
                statement_type,
                affected_rows: affected_rows(data)?,
            });
        }
        if statement_type == StatementType::Select {
            return Ok(Self::RowProducing);
        }
        Ok(Self::Other(statement_type))
    }

    pub fn statement_type(&self) -> StatementType {
        match self {
            Self::Dml { statement_type, .. } => *statement_type,
            Self::RowProducing => StatementType::Select,
            Self::Other(statement_type) => *statement_type,
        }
    }

    pub fn affected_rows(&self) -> i64 {
        match self {
            Self::Dml { affected_rows, .. } => *affected_rows,
            _ => 0,
        }
    }
}

/// Sum the counts in the DML summary row.
///
/// The service answers a DML statement with one row holding one count per
/// column (for example inserted and updated rows for a MERGE).
fn affected_rows(data: &ExecResponseData) -> Result<i64> {
    let summary = data.row_set.first().ok_or_else(|| {
        Error::parse("affected row count", "", "DML response has no summary row")
    })?;

    let mut total: i64 = 0;
    for (i, column) in data.row_type.iter().enumerate() {
        let cell = summary.get(i).and_then(Option::as_deref).ok_or_else(|| {
            Error::parse(
                "affected row count",
                "",
                format!("missing value for column '{}'", column.name),
            )
        })?;
        let count = cell
            .trim()
            .parse::<i64>()
            .map_err(|e| Error::parse("affected row count", cell, e))?;
        total = total.checked_add(count).ok_or_else(|| {
            Error::parse("affected row count", cell, "sum overflows i64")
        })?;
    }
    Ok(total)
}

/// A statement bound to a connection. Nothing is sent until it is executed.
#[derive(Debug)]
pub struct Statement<'a> {
    connection: &'a mut Connection,
    sql: String,
}

impl<'a> Statement<'a> {
    pub(crate) fn new(connection: &'a mut Connection, sql: impl Into<String>) -> Self {
        Self {
            connection,
            sql: sql.into(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub async fn execute(&mut self, params: &[BindValue]) -> Result<ExecResult> {
        self.connection.execute(&self.sql, params).await
    }

    pub async fn query(&mut self, params: &[BindValue]) -> Result<Rows> {
        self.connection.query(&self.sql, params).await
    }
}
