//! PostgreSQL service

use super::config::PoolConfig;
use super::dialect::{Dialect, DialectQuery, run_statement};
use super::pool::ConnectionPool;
use super::row::SqlOutcome;
use super::value::QueryValue;
use crate::backend::{BackendKind, DataBackend};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use sqlx::postgres::types::PgInterval;
use sqlx::postgres::{PgQueryResult, PgRow};
use sqlx::{Postgres, Row as _, ValueRef};
use std::any::Any;
use std::sync::Arc;

/// Pooled PostgreSQL service
pub struct PostgresService {
	pool: ConnectionPool<Postgres>,
}

impl PostgresService {
	pub async fn connect(url: &str, config: PoolConfig) -> Result<Self> {
		let pool = ConnectionPool::<Postgres>::new_postgres(url, config).await?;
		Ok(Self { pool })
	}

	pub fn from_pool(pool: ConnectionPool<Postgres>) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &ConnectionPool<Postgres> {
		&self.pool
	}

	/// Execute one statement with positional parameters (`$1`, `$2`, ...)
	///
	/// Connections run in autocommit mode, so a read that writes (for example
	/// `INSERT ... RETURNING`) persists, and `VACUUM` or
	/// `CREATE INDEX CONCURRENTLY` are accepted.
	pub async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<SqlOutcome> {
		run_statement(&self.pool, sql, params).await
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}

/// Render an interval as an ISO 8601 duration (`P1M2DT3.5S`)
fn interval_to_iso8601(interval: &PgInterval) -> String {
	let seconds = interval.microseconds as f64 / 1_000_000.0;
	format!("P{}M{}DT{}S", interval.months, interval.days, seconds)
}

impl Dialect for Postgres {
	fn bind(query: DialectQuery<'_, Self>, value: QueryValue) -> DialectQuery<'_, Self> {
		match value {
			QueryValue::Null => query.bind(None::<i32>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::Float(f) => query.bind(f),
			QueryValue::String(s) => query.bind(s),
			QueryValue::Bytes(b) => query.bind(b),
			QueryValue::Timestamp(dt) => query.bind(dt),
			QueryValue::Date(d) => query.bind(d),
			QueryValue::Time(t) => query.bind(t),
			QueryValue::Uuid(id) => query.bind(id),
		}
	}

	fn decode(row: &PgRow, index: usize) -> Result<QueryValue> {
		use rust_decimal::prelude::ToPrimitive;

		let raw = row
			.try_get_raw(index)
			.map_err(|e| DataError::from_sqlx(BackendKind::Postgres, e))?;
		if raw.is_null() {
			return Ok(QueryValue::Null);
		}

		// Postgres type checks are strict, so each decode only succeeds for its own column types
		if let Ok(value) = row.try_get::<bool, _>(index) {
			Ok(QueryValue::Bool(value))
		} else if let Ok(value) = row.try_get::<i64, _>(index) {
			Ok(QueryValue::Int(value))
		} else if let Ok(value) = row.try_get::<i32, _>(index) {
			Ok(QueryValue::Int(value as i64))
		} else if let Ok(value) = row.try_get::<i16, _>(index) {
			Ok(QueryValue::Int(value as i64))
		} else if let Ok(value) = row.try_get::<f64, _>(index) {
			Ok(QueryValue::Float(value))
		} else if let Ok(value) = row.try_get::<f32, _>(index) {
			Ok(QueryValue::Float(value as f64))
		} else if let Ok(value) = row.try_get::<rust_decimal::Decimal, _>(index) {
			value
				.to_f64()
				.map(QueryValue::Float)
				.ok_or_else(|| DataError::Conversion(format!("numeric {} out of f64 range", value)))
		} else if let Ok(value) = row.try_get::<uuid::Uuid, _>(index) {
			Ok(QueryValue::Uuid(value))
		} else if let Ok(value) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(index) {
			Ok(QueryValue::Timestamp(value))
		} else if let Ok(value) = row.try_get::<chrono::NaiveDateTime, _>(index) {
			Ok(QueryValue::Timestamp(value.and_utc()))
		} else if let Ok(value) = row.try_get::<chrono::NaiveDate, _>(index) {
			Ok(QueryValue::Date(value))
		} else if let Ok(value) = row.try_get::<chrono::NaiveTime, _>(index) {
			Ok(QueryValue::Time(value))
		} else if let Ok(value) = row.try_get::<PgInterval, _>(index) {
			Ok(QueryValue::String(interval_to_iso8601(&value)))
		} else if let Ok(value) = row.try_get::<String, _>(index) {
			Ok(QueryValue::String(value))
		} else if let Ok(value) = row.try_get::<serde_json::Value, _>(index) {
			Ok(QueryValue::String(value.to_string()))
		} else {
			row.try_get::<Vec<u8>, _>(index)
				.map(QueryValue::Bytes)
				.map_err(|e| DataError::from_sqlx(BackendKind::Postgres, e))
		}
	}

	fn rows_affected(result: &PgQueryResult) -> u64 {
		result.rows_affected()
	}
}

#[async_trait]
impl DataBackend for PostgresService {
	fn kind(&self) -> BackendKind {
		BackendKind::Postgres
	}

	async fn health_check(&self) -> Result<()> {
		self.execute("SELECT 1", Vec::new()).await.map(|_| ())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(PgInterval { months: 0, days: 1, microseconds: 0 }, "P0M1DT0S")]
	#[case(PgInterval { months: 14, days: 0, microseconds: 3_500_000 }, "P14M0DT3.5S")]
	fn test_interval_renders_as_iso8601(#[case] interval: PgInterval, #[case] expected: &str) {
		// Act
		let rendered = interval_to_iso8601(&interval);

		// Assert
		assert_eq!(rendered, expected);
	}
}
