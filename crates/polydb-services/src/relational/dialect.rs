//! Engine-independent statement execution
//!
//! Every relational service runs statements through [`run_statement`]. An
//! engine contributes only a [`Dialect`]: how a [`QueryValue`] is bound and
//! how a column is decoded back into one.

use super::classify::{StatementKind, classify};
use super::pool::ConnectionPool;
use super::row::{Row, SqlOutcome};
use super::value::QueryValue;
use crate::error::{DataError, Result};
use sqlx::query::Query;
use sqlx::{Column, Database, Executor, IntoArguments, Row as _, Statement};
use std::sync::Arc;

/// A query with the engine's own argument buffer
pub(crate) type DialectQuery<'q, DB> = Query<'q, DB, <DB as Database>::Arguments<'q>>;

/// Value binding and decoding for one relational engine
pub(crate) trait Dialect: Database {
	fn bind(query: DialectQuery<'_, Self>, value: QueryValue) -> DialectQuery<'_, Self>;

	fn decode(row: &Self::Row, index: usize) -> Result<QueryValue>;

	fn rows_affected(result: &Self::QueryResult) -> u64;
}

/// Run one statement on a pooled connection
///
/// The connection stays in the engine's autocommit mode, so statements that
/// refuse to run inside a transaction (`VACUUM`, `ATTACH`,
/// `CREATE INDEX CONCURRENTLY`) behave as they would in a console. A
/// statement without a result set is a mutation and counts as exactly one
/// commit once the engine has accepted it. Statements with a result set
/// return their rows and never count as a commit.
pub(crate) async fn run_statement<DB>(
	pool: &ConnectionPool<DB>,
	sql: &str,
	params: Vec<QueryValue>,
) -> Result<SqlOutcome>
where
	DB: Dialect,
	for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
	for<'q> <DB as Database>::Arguments<'q>: IntoArguments<'q, DB>,
{
	let backend = pool.backend();
	let mut conn = pool.acquire().await?;

	let column_count = match (&mut *conn).prepare(sql).await {
		Ok(statement) => Some(statement.columns().len()),
		Err(e) => {
			tracing::debug!(
				backend = %backend,
				error = %e,
				"could not describe statement, using keyword classification"
			);
			None
		}
	};
	let (kind, source) = classify(column_count, sql);
	tracing::debug!(backend = %backend, ?kind, ?source, "executing statement");

	let query = params
		.into_iter()
		.fold(sqlx::query::<DB>(sql), |query, value| DB::bind(query, value));

	match kind {
		StatementKind::ResultSet => {
			let rows = query
				.fetch_all(&mut *conn)
				.await
				.map_err(|e| DataError::from_sqlx(backend, e))?;
			convert_rows::<DB>(&rows).map(SqlOutcome::Rows)
		}
		StatementKind::Mutation => {
			let done = query
				.execute(&mut *conn)
				.await
				.map_err(|e| DataError::from_sqlx(backend, e))?;
			pool.record_commit(&conn);
			Ok(SqlOutcome::NoResult {
				rows_affected: DB::rows_affected(&done),
			})
		}
	}
}

/// Decode driver rows, sharing one column-name list across all of them
pub(crate) fn convert_rows<DB: Dialect>(rows: &[DB::Row]) -> Result<Vec<Row>> {
	let Some(first) = rows.first() else {
		return Ok(Vec::new());
	};
	let columns: Arc<[String]> = first
		.columns()
		.iter()
		.map(|column| column.name().to_string())
		.collect();

	rows.iter()
		.map(|row| {
			let values = (0..row.len())
				.map(|index| DB::decode(row, index))
				.collect::<Result<Vec<_>>>()?;
			Ok(Row::new(columns.clone(), values))
		})
		.collect()
}
