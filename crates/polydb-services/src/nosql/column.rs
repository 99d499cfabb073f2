//! Cassandra column-family service
//!
//! Built on the Scylla driver, which speaks the same CQL native protocol.
//! One session is opened at construction and shared by every call.

use crate::backend::{BackendKind, DataBackend};
use crate::config::CassandraSettings;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::value::{CqlValue, Row};
use secrecy::ExposeSecret;
use std::any::Any;
use std::sync::Arc;

/// Result of one CQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnResult {
	/// Rows in server order; `None` marks a null cell
	Rows {
		columns: Vec<String>,
		rows: Vec<Vec<Option<CqlValue>>>,
	},
	/// The statement produced no result set
	Void,
}

impl ColumnResult {
	pub fn is_void(&self) -> bool {
		matches!(self, ColumnResult::Void)
	}

	pub fn columns(&self) -> &[String] {
		match self {
			ColumnResult::Rows { columns, .. } => columns,
			ColumnResult::Void => &[],
		}
	}

	pub fn rows(&self) -> &[Vec<Option<CqlValue>>] {
		match self {
			ColumnResult::Rows { rows, .. } => rows,
			ColumnResult::Void => &[],
		}
	}
}

fn cql_error(err: impl ToString) -> DataError {
	DataError::execution(BackendKind::Cassandra, err)
}

/// Column-family service over one shared driver session
pub struct CassandraService {
	session: Arc<Session>,
}

impl CassandraService {
	/// Open a session against `settings.contact_point()`
	///
	/// Consistency is left at the cluster default.
	pub async fn connect(settings: &CassandraSettings) -> Result<Self> {
		let mut builder = SessionBuilder::new().known_node(settings.contact_point());
		if let Some(user) = &settings.user {
			let password = settings
				.password
				.as_ref()
				.map(|p| p.expose_secret().to_string())
				.unwrap_or_default();
			builder = builder.user(user.as_str(), password);
		}
		if let Some(keyspace) = &settings.keyspace {
			builder = builder.use_keyspace(keyspace.as_str(), false);
		}

		let session = builder
			.build()
			.await
			.map_err(|e| DataError::connection(BackendKind::Cassandra, e))?;
		tracing::debug!(
			backend = "cassandra",
			contact_point = %settings.contact_point(),
			"session established"
		);
		Ok(Self::from_session(Arc::new(session)))
	}

	/// Wrap an already established session
	pub fn from_session(session: Arc<Session>) -> Self {
		Self { session }
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Run `cql` with positionally bound `params`
	pub async fn execute(&self, cql: &str, params: Vec<CqlValue>) -> Result<ColumnResult> {
		tracing::debug!(backend = "cassandra", params = params.len(), "execute");

		let result = self
			.session
			.query_unpaged(cql, params)
			.await
			.map_err(cql_error)?;
		if !result.is_rows() {
			return Ok(ColumnResult::Void);
		}

		let rows_result = result.into_rows_result().map_err(cql_error)?;
		let columns = rows_result
			.column_specs()
			.iter()
			.map(|spec| spec.name().to_string())
			.collect();
		let rows = rows_result
			.rows::<Row>()
			.map_err(|e| DataError::Conversion(e.to_string()))?
			.map(|row| {
				row.map(|r| r.columns)
					.map_err(|e| DataError::Conversion(e.to_string()))
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(ColumnResult::Rows { columns, rows })
	}
}

#[async_trait]
impl DataBackend for CassandraService {
	fn kind(&self) -> BackendKind {
		BackendKind::Cassandra
	}

	async fn health_check(&self) -> Result<()> {
		self.session
			.query_unpaged("SELECT release_version FROM system.local", ())
			.await
			.map(|_| ())
			.map_err(cql_error)
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
	fn test_void_result_has_no_rows() {
		// Act
		let result = ColumnResult::Void;

		// Assert
		assert!(result.is_void());
		assert!(result.columns().is_empty());
		assert!(result.rows().is_empty());
	}

	#[rstest]
	fn test_rows_result_keeps_nulls() {
		// Arrange
		let result = ColumnResult::Rows {
			columns: vec!["id".to_string(), "name".to_string()],
			rows: vec![vec![Some(CqlValue::Int(1)), None]],
		};

		// Assert
		assert!(!result.is_void());
		assert_eq!(result.columns(), ["id", "name"]);
		assert_eq!(result.rows()[0][0], Some(CqlValue::Int(1)));
		assert_eq!(result.rows()[0][1], None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_unreachable_contact_point_is_connection_error() {
		// Arrange
		let settings = CassandraSettings::new("127.0.0.1", 1);

		// Act
		let result = CassandraService::connect(&settings).await;

		// Assert
		assert!(matches!(
			result,
			Err(DataError::Connection {
				backend: BackendKind::Cassandra,
				..
			})
		));
	}
}
