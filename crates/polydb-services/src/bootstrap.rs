//! Startup wiring from settings to a populated registry
//!
//! Services are constructed once, here, and handed to the registry. Callers
//! that build services by hand can skip this module entirely.

use crate::backend::{BackendKind, DataBackend};
use crate::config::{BackendSettings, DataSettings};
use crate::error::{DataError, Result};
use crate::registry::ServiceRegistry;
use std::sync::Arc;

fn disabled(kind: BackendKind) -> DataError {
	DataError::Config(format!(
		"backend '{}' is not enabled in this build (enable the `{}` feature)",
		kind, kind
	))
}

/// Construct the service described by `settings`
///
/// Fails with [`DataError::Config`] if the engine's cargo feature is off.
pub async fn connect(settings: &BackendSettings) -> Result<Arc<dyn DataBackend>> {
	let kind = settings.kind();
	tracing::info!(backend = %kind, "connecting backend service");

	let service: Arc<dyn DataBackend> = match settings {
		#[cfg(feature = "postgres")]
		BackendSettings::Postgres(server) => {
			let url = server.to_url(kind)?;
			Arc::new(
				crate::relational::PostgresService::connect(&url, server.pool.clone()).await?,
			)
		}
		#[cfg(feature = "mysql")]
		BackendSettings::Mysql(server) => {
			let url = server.to_url(kind)?;
			Arc::new(crate::relational::MySqlService::connect(&url, server.pool.clone()).await?)
		}
		#[cfg(feature = "sqlite")]
		BackendSettings::Sqlite(sqlite) => Arc::new(
			crate::relational::SqliteService::connect(&sqlite.to_url(), sqlite.pool.clone())
				.await?,
		),
		#[cfg(feature = "mongodb")]
		BackendSettings::Mongodb(mongo) => {
			Arc::new(crate::nosql::MongoService::from_settings(mongo).await?)
		}
		#[cfg(feature = "redis")]
		BackendSettings::Redis(redis) => {
			Arc::new(crate::nosql::RedisService::from_settings(redis).await?)
		}
		#[cfg(feature = "neo4j")]
		BackendSettings::Neo4j(neo4j) => {
			Arc::new(crate::nosql::Neo4jService::from_settings(neo4j).await?)
		}
		#[cfg(feature = "elasticsearch")]
		BackendSettings::Elasticsearch(es) => {
			Arc::new(crate::nosql::ElasticsearchService::from_settings(es)?)
		}
		#[cfg(feature = "cassandra")]
		BackendSettings::Cassandra(cassandra) => {
			Arc::new(crate::nosql::CassandraService::connect(cassandra).await?)
		}
		#[allow(unreachable_patterns)]
		_ => return Err(disabled(kind)),
	};
	Ok(service)
}

/// Connect every configured backend and bind it under its settings key
///
/// Construction stops at the first failure. Backends are connected in key
/// order so failures are reproducible.
pub async fn build_registry(settings: &DataSettings) -> Result<ServiceRegistry> {
	let mut keys: Vec<&String> = settings.backends.keys().collect();
	keys.sort_unstable();

	let mut builder = ServiceRegistry::builder();
	for key in keys {
		let service = connect(&settings.backends[key]).await?;
		builder = builder.register(key.as_str(), service);
	}
	let registry = builder.build()?;
	tracing::info!(backends = registry.len(), "service registry ready");
	Ok(registry)
}
