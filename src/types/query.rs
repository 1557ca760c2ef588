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

//! Query request/response types.
//!
//! These types map directly to the JSON structures exchanged with the
//! `/queries/v1/query-request` endpoint.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One result row as delivered by the service: one optional string per column.
pub type RawRow = Vec<Option<String>>;

/// Request body for statement execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecRequest {
    pub sql_text: String,
    pub async_exec: bool,
    pub sequence_id: u64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_internal: bool,
    /// Keyed by 1-based parameter position.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, BindParameter>,
}

/// Wire type tag of a bind parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindType {
    Fixed,
    Real,
    Text,
    Boolean,
    Binary,
    Date,
    Time,
    TimestampNtz,
    TimestampLtz,
}

/// A single bound value: type tag plus stringified value (`None` for NULL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindParameter {
    #[serde(rename = "type")]
    pub kind: BindType,
    pub value: Option<String>,
}

/// A fully built request: headers plus body, ready for the transport.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub headers: HashMap<String, String>,
    pub body: ExecRequest,
}

/// Response envelope from statement execution.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecResponse {
    #[serde(default)]
    pub data: Option<ExecResponseData>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub success: bool,
}

/// Payload of an execution response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecResponseData {
    pub row_type: Vec<RowType>,
    pub row_set: Vec<RawRow>,
    pub total: i64,
    pub returned: i64,
    pub query_id: String,
    pub sql_state: String,
    pub statement_type_id: i64,
    pub final_database_name: Option<String>,
    pub final_schema_name: Option<String>,
    pub final_role_name: Option<String>,
    pub final_warehouse_name: Option<String>,
    pub chunks: Vec<ChunkMeta>,
    /// Access key for the remote chunks.
    pub qrmk: String,
    /// Headers to send with chunk downloads, when the service provides them.
    pub chunk_headers: Option<HashMap<String, String>>,
}

/// Column descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RowType {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub nullable: bool,
}

impl RowType {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: i64) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// Metadata describing one remotely stored result chunk.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkMeta {
    pub url: String,
    pub row_count: i64,
    pub uncompressed_size: i64,
    pub compressed_size: i64,
}

impl ChunkMeta {
    pub fn new(url: impl Into<String>, row_count: i64) -> Self {
        Self {
            url: url.into(),
            row_count,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_request_serialization_omits_defaults() {
        let req = ExecRequest {
            sql_text: "SELECT 1".to_string(),
            async_exec: false,
            sequence_id: 7,
            is_internal: false,
            bindings: BTreeMap::new(),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["sqlText"], "SELECT 1");
        assert_eq!(json["asyncExec"], false);
        assert_eq!(json["sequenceId"], 7);
        assert!(json.get("isInternal").is_none());
        assert!(json.get("bindings").is_none());
    }

    #[test]
    fn test_exec_request_serialization_with_bindings() {
        let mut bindings = BTreeMap::new();
        bindings.insert(
            "1".to_string(),
            BindParameter {
                kind: BindType::Fixed,
                value: Some("42".to_string()),
            },
        );
        bindings.insert(
            "2".to_string(),
            BindParameter {
                kind: BindType::TimestampNtz,
                value: None,
            },
        );
        let req = ExecRequest {
            sql_text: "INSERT INTO t VALUES (?, ?)".to_string(),
            async_exec: true,
            sequence_id: 1,
            is_internal: true,
            bindings,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["isInternal"], true);
        assert_eq!(json["bindings"]["1"]["type"], "FIXED");
        assert_eq!(json["bindings"]["1"]["value"], "42");
        assert_eq!(json["bindings"]["2"]["type"], "TIMESTAMP_NTZ");
        assert!(json["bindings"]["2"]["value"].is_null());
    }

    #[test]
    fn test_exec_response_deserialization() {
        let json = r#"{
            "data": {
                "rowType": [
                    {"name": "C1", "type": "fixed", "scale": 0, "precision": 38, "nullable": false}
                ],
                "rowSet": [["1"], [null]],
                "total": 3,
                "returned": 2,
                "queryId": "01-abc",
                "sqlState": "00000",
                "statementTypeId": 4096,
                "finalDatabaseName": "DB",
                "finalSchemaName": "PUBLIC",
                "chunks": [
                    {
                        "url": "https://chunks/0",
                        "rowCount": 1,
                        "uncompressedSize": 10,
                        "compressedSize": 5
                    }
                ],
                "qrmk": "key=="
            },
            "message": null,
            "code": null,
            "success": true
        }"#;

        let response: ExecResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert!(response.code.is_none());
        let data = response.data.unwrap();
        assert_eq!(data.row_type[0].type_name, "fixed");
        assert_eq!(data.row_set[1], vec![None]);
        assert_eq!(data.total, 3);
        assert_eq!(data.final_database_name.as_deref(), Some("DB"));
        assert!(data.final_role_name.is_none());
        assert_eq!(data.chunks[0].row_count, 1);
        assert_eq!(data.qrmk, "key==");
    }

    #[test]
    fn test_exec_response_with_null_data() {
        let json =
            r#"{"data": null, "message": "Session expired", "code": "390112", "success": false}"#;
        let response: ExecResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.code.as_deref(), Some("390112"));
    }
}
