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

//! Result of a non-query execution.

use crate::error::{Error, Result};
use crate::statement::{StatementOutcome, StatementType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    outcome: StatementOutcome,
    query_id: String,
}

impl ExecResult {
    pub(crate) fn new(outcome: StatementOutcome, query_id: String) -> Self {
        Self { outcome, query_id }
    }

    pub fn outcome(&self) -> &StatementOutcome {
        &self.outcome
    }

    pub fn statement_type(&self) -> StatementType {
        self.outcome.statement_type()
    }

    /// Rows changed by a DML statement, 0 for anything else.
    pub fn rows_affected(&self) -> i64 {
        self.outcome.affected_rows()
    }

    /// Always fails: the service has no auto-increment id to report.
    pub fn last_insert_id(&self) -> Result<i64> {
        Err(Error::NotSupported("last insert id".to_string()))
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }
}
