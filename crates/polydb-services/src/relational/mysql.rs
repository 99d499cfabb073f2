//! MySQL service

use super::config::PoolConfig;
use super::dialect::{Dialect, DialectQuery, run_statement};
use super::pool::ConnectionPool;
use super::row::SqlOutcome;
use super::value::QueryValue;
use crate::backend::{BackendKind, DataBackend};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlQueryResult, MySqlRow};
use sqlx::{Column, MySql, Row as _, TypeInfo, ValueRef};
use std::any::Any;
use std::sync::Arc;

/// Pooled MySQL service
///
/// Connections keep MySQL's default `autocommit=1`, so each mutation,
/// DDL included, is committed by the server as it completes.
pub struct MySqlService {
	pool: ConnectionPool<MySql>,
}

impl MySqlService {
	pub async fn connect(url: &str, config: PoolConfig) -> Result<Self> {
		let pool = ConnectionPool::<MySql>::new_mysql(url, config).await?;
		Ok(Self { pool })
	}

	pub fn from_pool(pool: ConnectionPool<MySql>) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &ConnectionPool<MySql> {
		&self.pool
	}

	/// Execute one statement with positional parameters (`?`)
	pub async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<SqlOutcome> {
		run_statement(&self.pool, sql, params).await
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}

impl Dialect for MySql {
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
			// MySQL has no native UUID type
			QueryValue::Uuid(id) => query.bind(id.to_string()),
		}
	}

	fn decode(row: &MySqlRow, index: usize) -> Result<QueryValue> {
		use rust_decimal::prelude::ToPrimitive;

		let raw = row
			.try_get_raw(index)
			.map_err(|e| DataError::from_sqlx(BackendKind::Mysql, e))?;
		if raw.is_null() {
			return Ok(QueryValue::Null);
		}

		// TINYINT(1) is reported as BOOLEAN
		if row.column(index).type_info().name() == "BOOLEAN" {
			return row
				.try_get::<bool, _>(index)
				.map(QueryValue::Bool)
				.map_err(|e| DataError::from_sqlx(BackendKind::Mysql, e));
		}

		if let Ok(value) = row.try_get::<i64, _>(index) {
			Ok(QueryValue::Int(value))
		} else if let Ok(value) = row.try_get::<u64, _>(index) {
			i64::try_from(value)
				.map(QueryValue::Int)
				.map_err(|_| DataError::Conversion(format!("unsigned {} out of i64 range", value)))
		} else if let Ok(value) = row.try_get::<f64, _>(index) {
			Ok(QueryValue::Float(value))
		} else if let Ok(value) = row.try_get::<f32, _>(index) {
			Ok(QueryValue::Float(value as f64))
		} else if let Ok(value) = row.try_get::<rust_decimal::Decimal, _>(index) {
			value
				.to_f64()
				.map(QueryValue::Float)
				.ok_or_else(|| DataError::Conversion(format!("decimal {} out of f64 range", value)))
		} else if let Ok(value) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(index) {
			Ok(QueryValue::Timestamp(value))
		} else if let Ok(value) = row.try_get::<chrono::NaiveDateTime, _>(index) {
			Ok(QueryValue::Timestamp(value.and_utc()))
		} else if let Ok(value) = row.try_get::<chrono::NaiveDate, _>(index) {
			Ok(QueryValue::Date(value))
		} else if let Ok(value) = row.try_get::<chrono::NaiveTime, _>(index) {
			Ok(QueryValue::Time(value))
		} else if let Ok(value) = row.try_get::<String, _>(index) {
			Ok(QueryValue::String(value))
		} else {
			row.try_get::<Vec<u8>, _>(index)
				.map(QueryValue::Bytes)
				.map_err(|e| DataError::from_sqlx(BackendKind::Mysql, e))
		}
	}

	fn rows_affected(result: &MySqlQueryResult) -> u64 {
		result.rows_affected()
	}
}

#[async_trait]
impl DataBackend for MySqlService {
	fn kind(&self) -> BackendKind {
		BackendKind::Mysql
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
