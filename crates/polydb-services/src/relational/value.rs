//! Parameter and row value types for the relational services

use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// A single SQL value, used both for bound parameters and decoded columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
	Timestamp(chrono::DateTime<chrono::Utc>),
	Date(chrono::NaiveDate),
	Time(chrono::NaiveTime),
	Uuid(uuid::Uuid),
}

impl QueryValue {
	pub fn is_null(&self) -> bool {
		matches!(self, QueryValue::Null)
	}

	fn type_name(&self) -> &'static str {
		match self {
			QueryValue::Null => "NULL",
			QueryValue::Bool(_) => "bool",
			QueryValue::Int(_) => "int",
			QueryValue::Float(_) => "float",
			QueryValue::String(_) => "string",
			QueryValue::Bytes(_) => "bytes",
			QueryValue::Timestamp(_) => "timestamp",
			QueryValue::Date(_) => "date",
			QueryValue::Time(_) => "time",
			QueryValue::Uuid(_) => "uuid",
		}
	}
}

impl From<&str> for QueryValue {
	fn from(s: &str) -> Self {
		QueryValue::String(s.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(s: String) -> Self {
		QueryValue::String(s)
	}
}

impl From<i64> for QueryValue {
	fn from(i: i64) -> Self {
		QueryValue::Int(i)
	}
}

impl From<i32> for QueryValue {
	fn from(i: i32) -> Self {
		QueryValue::Int(i as i64)
	}
}

impl From<f64> for QueryValue {
	fn from(f: f64) -> Self {
		QueryValue::Float(f)
	}
}

impl From<bool> for QueryValue {
	fn from(b: bool) -> Self {
		QueryValue::Bool(b)
	}
}

impl From<Vec<u8>> for QueryValue {
	fn from(b: Vec<u8>) -> Self {
		QueryValue::Bytes(b)
	}
}

impl From<chrono::DateTime<chrono::Utc>> for QueryValue {
	fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
		QueryValue::Timestamp(dt)
	}
}

impl From<chrono::NaiveDate> for QueryValue {
	fn from(d: chrono::NaiveDate) -> Self {
		QueryValue::Date(d)
	}
}

impl From<chrono::NaiveTime> for QueryValue {
	fn from(t: chrono::NaiveTime) -> Self {
		QueryValue::Time(t)
	}
}

impl From<uuid::Uuid> for QueryValue {
	fn from(id: uuid::Uuid) -> Self {
		QueryValue::Uuid(id)
	}
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(QueryValue::Null, Into::into)
	}
}

fn mismatch(value: &QueryValue, target: &str) -> DataError {
	DataError::Conversion(format!(
		"cannot convert {} value to {}",
		value.type_name(),
		target
	))
}

impl TryFrom<QueryValue> for i64 {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => Ok(i),
			other => Err(mismatch(&other, "i64")),
		}
	}
}

impl TryFrom<QueryValue> for f64 {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Float(f) => Ok(f),
			QueryValue::Int(i) => Ok(i as f64),
			other => Err(mismatch(&other, "f64")),
		}
	}
}

impl TryFrom<QueryValue> for bool {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Bool(b) => Ok(b),
			QueryValue::Int(0) => Ok(false),
			QueryValue::Int(1) => Ok(true),
			other => Err(mismatch(&other, "bool")),
		}
	}
}

impl TryFrom<QueryValue> for String {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::String(s) => Ok(s),
			other => Err(mismatch(&other, "String")),
		}
	}
}

impl TryFrom<QueryValue> for Vec<u8> {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Bytes(b) => Ok(b),
			other => Err(mismatch(&other, "bytes")),
		}
	}
}

impl TryFrom<QueryValue> for chrono::DateTime<chrono::Utc> {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Timestamp(dt) => Ok(dt),
			other => Err(mismatch(&other, "DateTime<Utc>")),
		}
	}
}

impl TryFrom<QueryValue> for chrono::NaiveDate {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Date(d) => Ok(d),
			other => Err(mismatch(&other, "NaiveDate")),
		}
	}
}

impl TryFrom<QueryValue> for chrono::NaiveTime {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Time(t) => Ok(t),
			other => Err(mismatch(&other, "NaiveTime")),
		}
	}
}

impl TryFrom<QueryValue> for uuid::Uuid {
	type Error = DataError;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Uuid(id) => Ok(id),
			QueryValue::String(s) => uuid::Uuid::parse_str(&s)
				.map_err(|e| DataError::Conversion(format!("invalid uuid '{}': {}", s, e))),
			other => Err(mismatch(&other, "Uuid")),
		}
	}
}
