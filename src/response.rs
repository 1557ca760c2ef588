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

//! Classification of execution responses into success or failure.

use crate::error::{Error, Result, SnowflakeError, UNKNOWN_ERROR_CODE};
use crate::types::query::{ExecResponse, ExecResponseData};
use tracing::debug;

/// Parse the response `code` field.
///
/// An absent or empty code is [`UNKNOWN_ERROR_CODE`]. A code that is not an
/// integer is a [`Error::Parse`] carrying the raw text.
pub fn parse_status_code(code: Option<&str>) -> Result<i32> {
    match code.map(str::trim) {
        None | Some("") => Ok(UNKNOWN_ERROR_CODE),
        Some(code) => code
            .parse::<i32>()
            .map_err(|e| Error::parse("status code", code, e)),
    }
}

/// Turn a response envelope into its data payload or a service error.
pub fn classify(response: ExecResponse) -> Result<ExecResponseData> {
    let code = parse_status_code(response.code.as_deref())?;
    debug!("Response success={}, code={}", response.success, code);

    if !response.success {
        let (sql_state, query_id) = response
            .data
            .map(|d| (d.sql_state, d.query_id))
            .unwrap_or_default();
        return Err(SnowflakeError {
            number: code,
            sql_state,
            message: response.message.unwrap_or_default(),
            query_id,
        }
        .into());
    }

    Ok(response.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: Option<&str>) -> ExecResponse {
        ExecResponse {
            data: Some(ExecResponseData {
                sql_state: "42S02".to_string(),
                query_id: "q-1".to_string(),
                ..Default::default()
            }),
            message: Some("Object does not exist".to_string()),
            code: code.map(str::to_string),
            success: false,
        }
    }

    #[test]
    fn test_parse_status_code() {
        assert_eq!(parse_status_code(Some("2003")).unwrap(), 2003);
        assert_eq!(parse_status_code(Some("")).unwrap(), UNKNOWN_ERROR_CODE);
        assert_eq!(parse_status_code(None).unwrap(), UNKNOWN_ERROR_CODE);
    }

    #[test]
    fn test_parse_status_code_garbage() {
        match parse_status_code(Some("39x")) {
            Err(Error::Parse { value, .. }) => assert_eq!(value, "39x"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_failure_with_code() {
        let err = classify(failure(Some("2003"))).unwrap_err();
        let service = err.as_service_error().unwrap();
        assert_eq!(service.number, 2003);
        assert_eq!(service.sql_state, "42S02");
        assert_eq!(service.query_id, "q-1");
        assert_eq!(service.message, "Object does not exist");
    }

    #[test]
    fn test_classify_failure_without_code() {
        let err = classify(failure(None)).unwrap_err();
        assert_eq!(err.as_service_error().unwrap().number, UNKNOWN_ERROR_CODE);
    }

    #[test]
    fn test_classify_failure_with_garbage_code() {
        assert!(matches!(
            classify(failure(Some("abc"))),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_classify_failure_without_data() {
        let response = ExecResponse {
            data: None,
            message: Some("Authentication token has expired".to_string()),
            code: Some("390112".to_string()),
            success: false,
        };
        let err = classify(response).unwrap_err();
        let service = err.as_service_error().unwrap();
        assert_eq!(service.number, 390112);
        assert!(service.sql_state.is_empty());
    }

    #[test]
    fn test_classify_success() {
        let response = ExecResponse {
            data: Some(ExecResponseData {
                query_id: "q-2".to_string(),
                total: 5,
                ..Default::default()
            }),
            message: None,
            code: None,
            success: true,
        };
        let data = classify(response).unwrap();
        assert_eq!(data.query_id, "q-2");
        assert_eq!(data.total, 5);
    }
}
