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

//! Arrow view over decoded rows.

use crate::error::{Error, Result};
use crate::types::query::RowType;
use crate::types::value::{Value, UNIX_EPOCH_DAYS_FROM_CE};
use arrow_array::builder::{
    ArrayBuilder, BinaryBuilder, BooleanBuilder, Date32Builder, Decimal128Builder,
    Float64Builder, Int64Builder, StringBuilder, Time64NanosecondBuilder,
    TimestampNanosecondBuilder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};
use chrono::{Datelike, Timelike};
use std::sync::Arc;

const DEFAULT_DECIMAL_PRECISION: u8 = 38;

/// Map a column descriptor to an Arrow data type.
pub fn column_type_to_arrow(column: &RowType) -> DataType {
    match column.type_name.to_ascii_lowercase().as_str() {
        "fixed" => match column.scale.unwrap_or(0) {
            0 => DataType::Int64,
            scale => DataType::Decimal128(
                column
                    .precision
                    .and_then(|p| u8::try_from(p).ok())
                    .unwrap_or(DEFAULT_DECIMAL_PRECISION),
                i8::try_from(scale).unwrap_or(i8::MAX),
            ),
        },
        "real" => DataType::Float64,
        "boolean" => DataType::Boolean,
        "date" => DataType::Date32,
        "time" => DataType::Time64(TimeUnit::Nanosecond),
        "timestamp_ntz" => DataType::Timestamp(TimeUnit::Nanosecond, None),
        "timestamp_ltz" | "timestamp_tz" => {
            DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into()))
        }
        "binary" => DataType::Binary,
        // text, variant, object, array: JSON or plain text
        _ => DataType::Utf8,
    }
}

/// Build the Arrow schema for a result set.
pub fn schema_for(columns: &[RowType]) -> SchemaRef {
    Arc::new(Schema::new(
        columns
            .iter()
            .map(|c| Field::new(&c.name, column_type_to_arrow(c), c.nullable))
            .collect::<Vec<_>>(),
    ))
}

/// Build a record batch from decoded rows.
pub fn build_batch(schema: SchemaRef, rows: &[Vec<Value>]) -> Result<RecordBatch> {
    let arrays = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(col, field)| build_column(field, col, rows))
        .collect::<Result<Vec<ArrayRef>>>()?;

    RecordBatch::try_new(schema, arrays)
        .map_err(|e| Error::InvalidState(format!("failed to build record batch: {}", e)))
}

fn build_column(field: &Field, col: usize, rows: &[Vec<Value>]) -> Result<ArrayRef> {
    let values = rows.iter().map(|r| r.get(col).unwrap_or(&Value::Null));
    let mismatch = |v: &Value| {
        Error::InvalidState(format!(
            "column '{}' of type {} cannot hold {:?}",
            field.name(),
            field.data_type(),
            v
        ))
    };

    let array: ArrayRef = match field.data_type() {
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(rows.len());
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Int(i) => b.append_value(*i),
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
        DataType::Decimal128(precision, scale) => {
            let mut b = Decimal128Builder::with_capacity(rows.len());
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Decimal(text) => b.append_value(parse_decimal(text, *scale)?),
                    Value::Int(i) => b.append_value(parse_decimal(&i.to_string(), *scale)?),
                    other => return Err(mismatch(other)),
                }
            }
            Arc::new(
                b.finish()
                    .with_precision_and_scale(*precision, *scale)
                    .map_err(|e| Error::InvalidState(e.to_string()))?,
            )
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(rows.len());
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Float(f) => b.append_value(*f),
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
        DataType::Boolean => {
            let mut b = BooleanBuilder::with_capacity(rows.len());
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Bool(x) => b.append_value(*x),
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
        DataType::Date32 => {
            let mut b = Date32Builder::with_capacity(rows.len());
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Date(d) => {
                        b.append_value(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
                    }
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            let mut b = Time64NanosecondBuilder::with_capacity(rows.len());
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Time(t) => b.append_value(
                        i64::from(t.num_seconds_from_midnight()) * 1_000_000_000
                            + i64::from(t.nanosecond()),
                    ),
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, tz) => {
            let mut b = TimestampNanosecondBuilder::with_capacity(rows.len());
            for v in values {
                let nanos = match v {
                    Value::Null => None,
                    Value::Timestamp(ts) => ts.and_utc().timestamp_nanos_opt(),
                    Value::TimestampUtc(ts) => ts.timestamp_nanos_opt(),
                    Value::TimestampTz(ts) => ts.timestamp_nanos_opt(),
                    other => return Err(mismatch(other)),
                };
                match (v, nanos) {
                    (Value::Null, _) => b.append_null(),
                    (_, Some(n)) => b.append_value(n),
                    (other, None) => return Err(mismatch(other)),
                }
            }
            Arc::new(b.finish().with_timezone_opt(tz.clone()))
        }
        DataType::Binary => {
            let mut b = BinaryBuilder::with_capacity(rows.len(), 0);
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Binary(bytes) => b.append_value(bytes),
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
        _ => {
            let mut b = StringBuilder::with_capacity(rows.len(), 0);
            for v in values {
                match v {
                    Value::Null => b.append_null(),
                    Value::Text(s) | Value::Decimal(s) => b.append_value(s),
                    other => return Err(mismatch(other)),
                }
            }
            finish(b)
        }
    };
    Ok(array)
}

fn finish<B: ArrayBuilder>(mut builder: B) -> ArrayRef {
    builder.finish()
}

/// Parse decimal text into an unscaled `i128` with the given scale.
fn parse_decimal(text: &str, scale: i8) -> Result<i128> {
    let invalid = |reason: &str| Error::parse("decimal value", text, reason);
    let scale = usize::try_from(scale).map_err(|_| invalid("negative scale"))?;

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("empty"));
    }
    if frac.len() > scale {
        return Err(invalid("too many fractional digits"));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }

    let unscaled = format!("{}{}{}", whole, frac, "0".repeat(scale - frac.len()));
    let value = if unscaled.is_empty() {
        0
    } else {
        unscaled
            .parse::<i128>()
            .map_err(|_| invalid("out of range"))?
    };
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Array, Decimal128Array, Int64Array, StringArray, TimestampNanosecondArray};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_column_type_mapping() {
        assert_eq!(column_type_to_arrow(&RowType::new("a", "FIXED")), DataType::Int64);
        assert_eq!(
            column_type_to_arrow(&RowType::new("a", "fixed").with_scale(2)),
            DataType::Decimal128(38, 2)
        );
        assert_eq!(column_type_to_arrow(&RowType::new("a", "text")), DataType::Utf8);
        assert_eq!(column_type_to_arrow(&RowType::new("a", "variant")), DataType::Utf8);
        assert_eq!(
            column_type_to_arrow(&RowType::new("a", "timestamp_ltz")),
            DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into()))
        );
    }

    #[test]
    fn test_build_batch() {
        let columns = vec![
            RowType::new("ID", "fixed"),
            RowType::new("NAME", "text"),
            RowType::new("PRICE", "fixed").with_scale(2),
            RowType::new("AT", "timestamp_ltz"),
            RowType::new("DAY", "date"),
        ];
        let schema = schema_for(&columns);
        let ts = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        let rows = vec![
            vec![
                Value::Int(1),
                Value::Text("a".to_string()),
                Value::Decimal("-3.5".to_string()),
                Value::TimestampUtc(ts),
                Value::Date(NaiveDate::from_ymd_opt(1970, 1, 3).unwrap()),
            ],
            vec![Value::Null, Value::Null, Value::Null, Value::Null, Value::Null],
        ];

        let batch = build_batch(schema, &rows).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 5);

        let ids = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ids.value(0), 1);
        assert!(ids.is_null(1));

        let names = batch.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(names.value(0), "a");

        let prices = batch.column(2).as_any().downcast_ref::<Decimal128Array>().unwrap();
        assert_eq!(prices.value(0), -350);

        let at = batch
            .column(3)
            .as_any()
            .downcast_ref::<TimestampNanosecondArray>()
            .unwrap();
        assert_eq!(at.value(0), 1_000_000_000);
    }

    #[test]
    fn test_type_mismatch() {
        let schema = schema_for(&[RowType::new("ID", "fixed")]);
        let rows = vec![vec![Value::Text("x".to_string())]];
        assert!(matches!(build_batch(schema, &rows), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("3.14", 2).unwrap(), 314);
        assert_eq!(parse_decimal("3.1", 3).unwrap(), 3100);
        assert_eq!(parse_decimal("-0.5", 1).unwrap(), -5);
        assert_eq!(parse_decimal("12", 2).unwrap(), 1200);
        assert!(parse_decimal("1.234", 2).is_err());
        assert!(parse_decimal("1e5", 2).is_err());
    }
}
