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

//! Bind parameter codec.
//!
//! Converts native values into the `(type, value)` pairs carried in the
//! `bindings` map of an execution request, and back.
//!
//! | Native | Type tag | Value |
//! |---|---|---|
//! | `Null` | `TEXT` | `null` |
//! | `Bool` | `BOOLEAN` | `true` / `false` |
//! | `Int`, `UInt` | `FIXED` | decimal digits |
//! | `Float` | `REAL` | shortest round-trip text, `NaN`, `inf`, `-inf` |
//! | `Text` | `TEXT` | verbatim |
//! | `Binary` | `BINARY` | lowercase hex |
//! | `Date` | `DATE` | milliseconds since epoch |
//! | `Time` | `TIME` | nanoseconds since midnight |
//! | `Timestamp` | `TIMESTAMP_NTZ` | nanoseconds since epoch |
//! | `TimestampUtc` | `TIMESTAMP_LTZ` | nanoseconds since epoch |
//!
//! Arrays have no wire mapping and fail with [`Error::Encoding`]. So do
//! times and timestamps that fall on a leap second, since the wire integer
//! cannot tell `23:59:60` apart from the following midnight.

use crate::error::{Error, Result};
use crate::types::query::{BindParameter, BindType};
use crate::types::value::UNIX_EPOCH_DAYS_FROM_CE;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A native value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampUtc(DateTime<Utc>),
    /// Array binding. Not supported by the statement endpoint.
    Array(Vec<BindValue>),
}

impl BindValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Timestamp(_) => "timestamp",
            Self::TimestampUtc(_) => "timestamp with time zone",
            Self::Array(_) => "array",
        }
    }
}

/// Encode a native value into its wire representation.
pub fn encode(value: &BindValue) -> Result<BindParameter> {
    let (kind, value) = match value {
        BindValue::Null => (BindType::Text, None),
        BindValue::Bool(b) => (BindType::Boolean, Some(b.to_string())),
        BindValue::Int(i) => (BindType::Fixed, Some(i.to_string())),
        BindValue::UInt(u) => (BindType::Fixed, Some(u.to_string())),
        BindValue::Float(f) => (BindType::Real, Some(encode_float(*f))),
        BindValue::Text(s) => (BindType::Text, Some(s.clone())),
        BindValue::Binary(bytes) => (BindType::Binary, Some(hex::encode(bytes))),
        BindValue::Date(d) => {
            let days = i64::from(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
            (BindType::Date, Some((days * MILLIS_PER_DAY).to_string()))
        }
        BindValue::Time(t) => {
            reject_leap_second(value, t)?;
            let nanos = i64::from(t.num_seconds_from_midnight()) * NANOS_PER_SEC
                + i64::from(t.nanosecond());
            (BindType::Time, Some(nanos.to_string()))
        }
        BindValue::Timestamp(ts) => {
            reject_leap_second(value, ts)?;
            (
                BindType::TimestampNtz,
                Some(timestamp_nanos(&ts.and_utc())?.to_string()),
            )
        }
        BindValue::TimestampUtc(ts) => {
            reject_leap_second(value, ts)?;
            (BindType::TimestampLtz, Some(timestamp_nanos(ts)?.to_string()))
        }
        BindValue::Array(_) => {
            return Err(Error::Encoding(format!(
                "{} values cannot be bound",
                value.kind_name()
            )))
        }
    };
    Ok(BindParameter { kind, value })
}

/// Decode a wire parameter back into a native value.
///
/// `FIXED` values that fit in an `i64` decode as [`BindValue::Int`].
pub fn decode(param: &BindParameter) -> Result<BindValue> {
    let Some(ref raw) = param.value else {
        return Ok(BindValue::Null);
    };

    let value = match param.kind {
        BindType::Text => BindValue::Text(raw.clone()),
        BindType::Boolean => BindValue::Bool(
            raw.parse::<bool>()
                .map_err(|e| Error::parse("boolean binding", raw.as_str(), e))?,
        ),
        BindType::Fixed => match raw.parse::<i64>() {
            Ok(i) => BindValue::Int(i),
            Err(_) => BindValue::UInt(
                raw.parse::<u64>()
                    .map_err(|e| Error::parse("fixed binding", raw.as_str(), e))?,
            ),
        },
        BindType::Real => BindValue::Float(
            raw.parse::<f64>()
                .map_err(|e| Error::parse("real binding", raw.as_str(), e))?,
        ),
        BindType::Binary => BindValue::Binary(
            hex::decode(raw).map_err(|e| Error::parse("binary binding", raw.as_str(), e))?,
        ),
        BindType::Date => {
            let millis = parse_i64("date binding", raw)?;
            i32::try_from(millis.div_euclid(MILLIS_PER_DAY))
                .ok()
                .and_then(|days| days.checked_add(UNIX_EPOCH_DAYS_FROM_CE))
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .map(BindValue::Date)
                .ok_or_else(|| Error::parse("date binding", raw.as_str(), "out of range"))?
        }
        BindType::Time => {
            let nanos = parse_i64("time binding", raw)?;
            u32::try_from(nanos.div_euclid(NANOS_PER_SEC))
                .ok()
                .and_then(|secs| {
                    NaiveTime::from_num_seconds_from_midnight_opt(
                        secs,
                        nanos.rem_euclid(NANOS_PER_SEC) as u32,
                    )
                })
                .map(BindValue::Time)
                .ok_or_else(|| Error::parse("time binding", raw.as_str(), "out of range"))?
        }
        BindType::TimestampNtz => BindValue::Timestamp(
            DateTime::from_timestamp_nanos(parse_i64("timestamp binding", raw)?).naive_utc(),
        ),
        BindType::TimestampLtz => BindValue::TimestampUtc(DateTime::from_timestamp_nanos(
            parse_i64("timestamp binding", raw)?,
        )),
    };
    Ok(value)
}

fn encode_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        f.to_string()
    }
}

/// chrono represents a leap second as a nanosecond field of 1e9 or more.
fn reject_leap_second(value: &BindValue, t: &impl Timelike) -> Result<()> {
    if i64::from(t.nanosecond()) >= NANOS_PER_SEC {
        return Err(Error::Encoding(format!(
            "leap second {} values cannot be bound",
            value.kind_name()
        )));
    }
    Ok(())
}

fn timestamp_nanos(ts: &DateTime<Utc>) -> Result<i64> {
    ts.timestamp_nanos_opt().ok_or_else(|| {
        Error::Encoding(format!("timestamp {} is outside the nanosecond range", ts))
    })
}

fn parse_i64(field: &'static str, raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|e| Error::parse(field, raw, e))
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for BindValue {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for BindValue {
            fn from(v: $t) -> Self {
                Self::UInt(u64::from(v))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for BindValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

impl From<&[u8]> for BindValue {
    fn from(v: &[u8]) -> Self {
        Self::Binary(v.to_vec())
    }
}

impl From<NaiveDate> for BindValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for BindValue {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for BindValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for BindValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::TimestampUtc(v)
    }
}

impl From<Vec<BindValue>> for BindValue {
    fn from(v: Vec<BindValue>) -> Self {
        Self::Array(v)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
