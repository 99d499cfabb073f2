//! Backend identification and the trait every service implements

use crate::error::{DataError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Storage engine behind a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
	Postgres,
	Mysql,
	Sqlite,
	Mongodb,
	Redis,
	Neo4j,
	Elasticsearch,
	Cassandra,
}

impl BackendKind {
	/// Every supported engine, relational engines first
	pub const ALL: [BackendKind; 8] = [
		BackendKind::Postgres,
		BackendKind::Mysql,
		BackendKind::Sqlite,
		BackendKind::Mongodb,
		BackendKind::Redis,
		BackendKind::Neo4j,
		BackendKind::Elasticsearch,
		BackendKind::Cassandra,
	];

	/// Canonical lowercase name, also the conventional registry key
	pub fn as_str(&self) -> &'static str {
		match self {
			BackendKind::Postgres => "postgres",
			BackendKind::Mysql => "mysql",
			BackendKind::Sqlite => "sqlite",
			BackendKind::Mongodb => "mongodb",
			BackendKind::Redis => "redis",
			BackendKind::Neo4j => "neo4j",
			BackendKind::Elasticsearch => "elasticsearch",
			BackendKind::Cassandra => "cassandra",
		}
	}

	/// Whether the engine is served through a pooled SQL connection
	pub fn is_relational(&self) -> bool {
		matches!(
			self,
			BackendKind::Postgres | BackendKind::Mysql | BackendKind::Sqlite
		)
	}
}

impl fmt::Display for BackendKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for BackendKind {
	type Err = DataError;

	/// Exact, case-sensitive match against [`BackendKind::as_str`]
	fn from_str(s: &str) -> Result<Self> {
		BackendKind::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| DataError::UnsupportedBackend(s.to_string()))
	}
}

/// Common surface of every backend service
///
/// Each service owns exactly one long-lived engine handle (a pool or a
/// client) and exposes its own engine-specific operations as inherent
/// methods. This trait only carries what the registry needs to hold
/// services of different engines side by side.
#[async_trait]
pub trait DataBackend: Send + Sync + 'static {
	/// Engine behind this service
	fn kind(&self) -> BackendKind;

	/// Round-trip to the engine to confirm the handle is usable
	async fn health_check(&self) -> Result<()>;

	/// Borrow as `Any` for downcasting to the concrete service
	fn as_any(&self) -> &dyn Any;

	/// Convert into `Any` for downcasting an owned `Arc`
	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
