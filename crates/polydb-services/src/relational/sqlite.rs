//! SQLite service

use super::config::PoolConfig;
use super::dialect::{Dialect, DialectQuery, run_statement};
use super::pool::ConnectionPool;
use super::row::SqlOutcome;
use super::value::QueryValue;
use crate::backend::{BackendKind, DataBackend};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};
use std::any::Any;
use std::sync::Arc;

/// Pooled SQLite service
///
/// Use a file-backed URL (`sqlite://path/app.db?mode=rwc`): with
/// `sqlite::memory:` every pooled connection opens its own private database.
pub struct SqliteService {
	pool: ConnectionPool<Sqlite>,
}

impl SqliteService {
	pub async fn connect(url: &str, config: PoolConfig) -> Result<Self> {
		let pool = ConnectionPool::<Sqlite>::new_sqlite(url, config).await?;
		Ok(Self { pool })
	}

	pub fn from_pool(pool: ConnectionPool<Sqlite>) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &ConnectionPool<Sqlite> {
		&self.pool
	}

	/// Execute one statement with positional parameters (`?`)
	///
	/// Statements that produce a result set return their rows without a
	/// commit. Anything else is committed by SQLite's autocommit mode and
	/// returns [`SqlOutcome::NoResult`], including `VACUUM` and `PRAGMA`
	/// statements that SQLite refuses or ignores inside a transaction.
	pub async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<SqlOutcome> {
		run_statement(&self.pool, sql, params).await
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}

impl Dialect for Sqlite {
	fn bind(query: DialectQuery<'_, Self>, value: QueryValue) -> DialectQuery<'_, Self> {
		match value {
			QueryValue::Null => query.bind(None::<i64>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::Float(f) => query.bind(f),
			QueryValue::String(s) => query.bind(s),
			QueryValue::Bytes(b) => query.bind(b),
			QueryValue::Timestamp(dt) => query.bind(dt),
			QueryValue::Date(d) => query.bind(d),
			QueryValue::Time(t) => query.bind(t),
			QueryValue::Uuid(id) => query.bind(id.to_string()),
		}
	}

	fn decode(row: &SqliteRow, index: usize) -> Result<QueryValue> {
		let raw = row
			.try_get_raw(index)
			.map_err(|e| DataError::from_sqlx(BackendKind::Sqlite, e))?;
		if raw.is_null() {
			return Ok(QueryValue::Null);
		}
		// Declared BOOLEAN columns are stored as 0/1 integers
		let declared = row.column(index).type_info().name().to_uppercase();

		let value = if declared.contains("BOOL") {
			row.try_get::<bool, _>(index).map(QueryValue::Bool)
		} else if let Ok(value) = row.try_get::<i64, _>(index) {
			Ok(QueryValue::Int(value))
		} else if let Ok(value) = row.try_get::<f64, _>(index) {
			Ok(QueryValue::Float(value))
		} else if let Ok(value) = row.try_get::<String, _>(index) {
			Ok(QueryValue::String(value))
		} else {
			row.try_get::<Vec<u8>, _>(index).map(QueryValue::Bytes)
		};
		value.map_err(|e| DataError::from_sqlx(BackendKind::Sqlite, e))
	}

	fn rows_affected(result: &SqliteQueryResult) -> u64 {
		result.rows_affected()
	}
}

#[async_trait]
impl DataBackend for SqliteService {
	fn kind(&self) -> BackendKind {
		BackendKind::Sqlite
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
	use rstest::{fixture, rstest};
	use tempfile::TempDir;

	struct Fixture {
		service: SqliteService,
		_dir: TempDir,
	}

	#[fixture]
	async fn sqlite() -> Fixture {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite://{}?mode=rwc", dir.path().join("unit.db").display());
		let service = SqliteService::connect(&url, PoolConfig::new().with_max_connections(2))
			.await
			.unwrap();
		Fixture { service, _dir: dir }
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_insert_select(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		let service = &fx.service;

		// Act
		let created = service
			.execute("CREATE TABLE t(id INTEGER)", Vec::new())
			.await
			.unwrap();
		let inserted = service
			.execute("INSERT INTO t VALUES (?)", vec![QueryValue::Int(1)])
			.await
			.unwrap();
		let selected = service.execute("SELECT id FROM t", Vec::new()).await.unwrap();

		// Assert
		assert!(created.is_no_result());
		assert_eq!(inserted, SqlOutcome::NoResult { rows_affected: 1 });
		assert_eq!(
			selected.into_value_rows(),
			Some(vec![vec![QueryValue::Int(1)]])
		);
		assert_eq!(service.pool().commit_count(), 2);
		assert_eq!(service.pool().checked_out(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_read_with_zero_rows_is_not_no_result(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		fx.service
			.execute("CREATE TABLE t(id INTEGER)", Vec::new())
			.await
			.unwrap();
		let commits_before = fx.service.pool().commit_count();

		// Act
		let outcome = fx
			.service
			.execute("SELECT id FROM t WHERE id = ?", vec![QueryValue::Int(42)])
			.await
			.unwrap();

		// Assert
		assert_eq!(outcome, SqlOutcome::Rows(Vec::new()));
		assert_eq!(fx.service.pool().commit_count(), commits_before);
	}

	#[rstest]
	#[tokio::test]
	async fn test_column_types_decode(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		fx.service
			.execute(
				"CREATE TABLE items(id INTEGER, name TEXT, price REAL, active BOOLEAN, note TEXT)",
				Vec::new(),
			)
			.await
			.unwrap();
		fx.service
			.execute(
				"INSERT INTO items VALUES (?, ?, ?, ?, ?)",
				vec![
					1.into(),
					"widget".into(),
					2.5.into(),
					true.into(),
					QueryValue::Null,
				],
			)
			.await
			.unwrap();

		// Act
		let rows = fx
			.service
			.execute("SELECT id, name, price, active, note FROM items", Vec::new())
			.await
			.unwrap()
			.into_rows()
			.unwrap();

		// Assert
		let row = &rows[0];
		assert_eq!(row.columns(), ["id", "name", "price", "active", "note"]);
		assert_eq!(
			row.values(),
			[
				QueryValue::Int(1),
				QueryValue::String("widget".to_string()),
				QueryValue::Float(2.5),
				QueryValue::Bool(true),
				QueryValue::Null,
			]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_parameters_are_never_interpolated(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		fx.service
			.execute("CREATE TABLE users(name TEXT)", Vec::new())
			.await
			.unwrap();
		let hostile = "x'); DROP TABLE users; --";

		// Act
		fx.service
			.execute("INSERT INTO users VALUES (?)", vec![hostile.into()])
			.await
			.unwrap();
		let rows = fx
			.service
			.execute("SELECT name FROM users", Vec::new())
			.await
			.unwrap()
			.into_rows()
			.unwrap();

		// Assert
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].get::<String>("name").unwrap(), hostile);
	}

	#[rstest]
	#[tokio::test]
	async fn test_failed_statement_returns_connection(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;

		// Act
		let result = fx.service.execute("SELEC nonsense", Vec::new()).await;

		// Assert
		match result {
			Err(DataError::Execution { backend, message }) => {
				assert_eq!(backend, BackendKind::Sqlite);
				assert!(message.contains("syntax error"), "got: {}", message);
			}
			other => panic!("expected execution error, got {:?}", other),
		}
		assert_eq!(fx.service.pool().checked_out(), 0);
		assert_eq!(fx.service.pool().commit_count(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_returning_yields_rows(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		fx.service
			.execute(
				"CREATE TABLE t(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
				Vec::new(),
			)
			.await
			.unwrap();

		// Act
		let outcome = fx
			.service
			.execute(
				"INSERT INTO t(name) VALUES (?) RETURNING id",
				vec!["first".into()],
			)
			.await
			.unwrap();
		let persisted = fx
			.service
			.execute("SELECT COUNT(*) AS n FROM t", Vec::new())
			.await
			.unwrap();

		// Assert
		assert_eq!(outcome.into_value_rows(), Some(vec![vec![QueryValue::Int(1)]]));
		assert_eq!(
			persisted.into_value_rows(),
			Some(vec![vec![QueryValue::Int(1)]])
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_vacuum_runs_outside_a_transaction(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		fx.service
			.execute("CREATE TABLE t(id INTEGER)", Vec::new())
			.await
			.unwrap();

		// Act
		let outcome = fx.service.execute("VACUUM", Vec::new()).await.unwrap();

		// Assert
		assert!(outcome.is_no_result());
		assert_eq!(fx.service.pool().commit_count(), 2);
		assert_eq!(fx.service.pool().checked_out(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_connection_pragma_takes_effect() {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite://{}?mode=rwc", dir.path().join("pragma.db").display());
		let config = PoolConfig::new()
			.with_min_connections(0)
			.with_max_connections(1);
		let service = SqliteService::connect(&url, config).await.unwrap();

		// Act
		let set = service
			.execute("PRAGMA foreign_keys = OFF", Vec::new())
			.await
			.unwrap();
		let current = service
			.execute("PRAGMA foreign_keys", Vec::new())
			.await
			.unwrap();

		// Assert
		assert!(set.is_no_result());
		assert_eq!(current.into_value_rows(), Some(vec![vec![QueryValue::Int(0)]]));
	}

	#[rstest]
	#[tokio::test]
	async fn test_date_and_time_parameters_bind(#[future] sqlite: Fixture) {
		// Arrange
		let fx = sqlite.await;
		fx.service
			.execute("CREATE TABLE events(day DATE, at TIME)", Vec::new())
			.await
			.unwrap();
		let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
		let at = chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap();

		// Act
		fx.service
			.execute(
				"INSERT INTO events VALUES (?, ?)",
				vec![day.into(), at.into()],
			)
			.await
			.unwrap();
		let rows = fx
			.service
			.execute("SELECT day, at FROM events", Vec::new())
			.await
			.unwrap()
			.into_rows()
			.unwrap();

		// Assert
		assert_eq!(rows[0].get::<String>("day").unwrap(), "2024-01-02");
		assert_eq!(rows[0].get::<String>("at").unwrap(), "09:30:00");
	}

	#[rstest]
	#[tokio::test]
	async fn test_health_check(#[future] sqlite: Fixture) {
		// Act
		let fx = sqlite.await;

		// Assert
		assert!(fx.service.health_check().await.is_ok());
		assert_eq!(fx.service.kind(), BackendKind::Sqlite);
	}
}
