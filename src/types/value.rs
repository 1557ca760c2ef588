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

//! Typed result values.
//!
//! The service returns every cell as an optional string; [`Value::decode`]
//! interprets it according to the column's [`RowType`]:
//!
//! | Column type | Cell text | Value |
//! |---|---|---|
//! | `fixed` (scale 0) | `"42"` | `Int`, or `Decimal` beyond `i64` |
//! | `fixed` (scale > 0) | `"3.14"` | `Decimal` |
//! | `real` | `"1.5"`, `"NaN"`, `"inf"` | `Float` |
//! | `boolean` | `"1"`, `"0"`, `"true"`, `"false"` | `Bool` |
//! | `date` | days since epoch | `Date` |
//! | `time` | `"seconds.fraction"` since midnight | `Time` |
//! | `timestamp_ntz` | `"seconds.fraction"` since epoch | `Timestamp` |
//! | `timestamp_ltz` | `"seconds.fraction"` since epoch | `TimestampUtc` |
//! | `timestamp_tz` | `"seconds.fraction offset"`, offset in minutes + 1440 | `TimestampTz` |
//! | `binary` | lowercase hex | `Binary` |
//! | anything else | verbatim | `Text` |

use crate::error::{Error, Result};
use crate::types::query::RowType;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const NANOS_PER_SEC: i128 = 1_000_000_000;
pub(crate) const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A decoded result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Exact numeric kept in its textual form.
    Decimal(String),
    Float(f64),
    Text(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampUtc(DateTime<Utc>),
    TimestampTz(DateTime<FixedOffset>),
}

impl Value {
    /// Decode a raw cell for the given column.
    pub fn decode(column: &RowType, raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw else {
            return Ok(Value::Null);
        };

        match column.type_name.to_ascii_lowercase().as_str() {
            "fixed" => decode_fixed(raw, column.scale.unwrap_or(0)),
            "real" => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| Error::parse("real value", raw, e)),
            "boolean" => match raw {
                "1" | "true" | "TRUE" => Ok(Value::Bool(true)),
                "0" | "false" | "FALSE" => Ok(Value::Bool(false)),
                _ => Err(Error::parse("boolean value", raw, "expected 0, 1, true or false")),
            },
            "date" => {
                let days = raw
                    .parse::<i64>()
                    .map_err(|e| Error::parse("date value", raw, e))?;
                i32::try_from(days)
                    .ok()
                    .and_then(|d| d.checked_add(UNIX_EPOCH_DAYS_FROM_CE))
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .map(Value::Date)
                    .ok_or_else(|| Error::parse("date value", raw, "out of range"))
            }
            "time" => {
                let nanos = parse_fractional_seconds("time value", raw)?;
                let frac = nanos.rem_euclid(NANOS_PER_SEC) as u32;
                u32::try_from(nanos.div_euclid(NANOS_PER_SEC))
                    .ok()
                    .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, frac))
                    .map(Value::Time)
                    .ok_or_else(|| Error::parse("time value", raw, "out of range"))
            }
            "timestamp_ntz" => {
                let ts = timestamp_from_nanos("timestamp value", raw)?;
                Ok(Value::Timestamp(ts.naive_utc()))
            }
            "timestamp_ltz" => Ok(Value::TimestampUtc(timestamp_from_nanos(
                "timestamp value",
                raw,
            )?)),
            "timestamp_tz" => decode_timestamp_tz(raw),
            "binary" => hex::decode(raw)
                .map(Value::Binary)
                .map_err(|e| Error::parse("binary value", raw, e)),
            _ => Ok(Value::Text(raw.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

fn decode_fixed(raw: &str, scale: i64) -> Result<Value> {
    if scale > 0 {
        if raw.parse::<f64>().is_err() {
            return Err(Error::parse("fixed value", raw, "not a number"));
        }
        return Ok(Value::Decimal(raw.to_string()));
    }
    match raw.parse::<i64>() {
        Ok(v) => Ok(Value::Int(v)),
        // NUMBER(38, 0) does not always fit in an i64.
        Err(_) if is_integer_literal(raw) => Ok(Value::Decimal(raw.to_string())),
        Err(e) => Err(Error::parse("fixed value", raw, e)),
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn decode_timestamp_tz(raw: &str) -> Result<Value> {
    let (epoch, offset) = raw
        .split_once(' ')
        .ok_or_else(|| Error::parse("timestamp value", raw, "missing time zone offset"))?;
    let offset_minutes = offset
        .parse::<i32>()
        .map_err(|e| Error::parse("timestamp value", raw, e))?
        - 1440;
    let tz = FixedOffset::east_opt(offset_minutes * 60)
        .ok_or_else(|| Error::parse("timestamp value", raw, "offset out of range"))?;
    let ts = timestamp_from_nanos("timestamp value", epoch)?;
    Ok(Value::TimestampTz(ts.with_timezone(&tz)))
}

fn timestamp_from_nanos(field: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    let nanos = parse_fractional_seconds(field, raw)?;
    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SEC))
        .map_err(|_| Error::parse(field, raw, "out of range"))?;
    let frac = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    DateTime::from_timestamp(secs, frac).ok_or_else(|| Error::parse(field, raw, "out of range"))
}

/// Parses `"[-]seconds[.fraction]"` into nanoseconds.
fn parse_fractional_seconds(field: &'static str, raw: &str) -> Result<i128> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty()
        || whole.len() > 18
        || frac.len() > 9
        || !whole.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::parse(field, raw, "expected seconds with up to 9 fractional digits"));
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::parse(field, raw, "invalid fractional seconds"));
    }

    let secs = whole
        .parse::<i128>()
        .map_err(|e| Error::parse(field, raw, e))?;
    let frac_nanos = if frac.is_empty() {
        0
    } else {
        format!("{:0<9}", frac)
            .parse::<i128>()
            .map_err(|e| Error::parse(field, raw, e))?
    };
    let nanos = secs * NANOS_PER_SEC + frac_nanos;
    Ok(if negative { -nanos } else { nanos })
}
