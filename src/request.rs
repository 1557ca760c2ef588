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

//! Execution request construction.

use crate::auth::AuthProvider;
use crate::bindings::{self, BindValue};
use crate::error::{Error, Result};
use crate::types::query::{ExecRequest, QueryRequest};
use std::collections::{BTreeMap, HashMap};

pub const CONTENT_TYPE_APPLICATION_JSON: &str = "application/json";
pub const ACCEPT_TYPE_APPLICATION_SNOWFLAKE: &str = "application/snowflake";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// User agent sent with every execution request.
pub fn user_agent() -> String {
    format!("snowflake-connector-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Build the request body for one statement attempt.
///
/// Parameters are keyed by 1-based position. Fails with [`Error::Encoding`]
/// if any parameter has no wire mapping.
pub fn build_exec_request(
    sequence_id: u64,
    sql: &str,
    async_exec: bool,
    internal: bool,
    params: &[BindValue],
) -> Result<ExecRequest> {
    let bindings = params
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let position = i + 1;
            bindings::encode(value)
                .map(|param| (position.to_string(), param))
                .map_err(|e| match e {
                    Error::Encoding(msg) => {
                        Error::Encoding(format!("parameter {}: {}", position, msg))
                    }
                    other => other,
                })
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(ExecRequest {
        sql_text: sql.to_string(),
        async_exec,
        sequence_id,
        is_internal: internal,
        bindings,
    })
}

/// Headers required on an execution request.
///
/// `Authorization` is only present when an auth provider is configured.
pub fn build_headers(auth: Option<&dyn AuthProvider>) -> Result<HashMap<String, String>> {
    let mut headers = HashMap::new();
    headers.insert(
        "Content-Type".to_string(),
        CONTENT_TYPE_APPLICATION_JSON.to_string(),
    );
    headers.insert(
        "Accept".to_string(),
        ACCEPT_TYPE_APPLICATION_SNOWFLAKE.to_string(),
    );
    headers.insert("User-Agent".to_string(), user_agent());
    if let Some(auth) = auth {
        headers.insert(HEADER_AUTHORIZATION.to_string(), auth.get_auth_header()?);
    }
    Ok(headers)
}

/// Build a complete request ready for the transport.
pub fn build_query_request(
    sequence_id: u64,
    sql: &str,
    async_exec: bool,
    internal: bool,
    params: &[BindValue],
    auth: Option<&dyn AuthProvider>,
) -> Result<QueryRequest> {
    let body = build_exec_request(sequence_id, sql, async_exec, internal, params)?;
    let headers = build_headers(auth)?;
    Ok(QueryRequest { headers, body })
}
