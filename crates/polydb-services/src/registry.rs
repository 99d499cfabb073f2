//! Service registry
//!
//! Maps a backend key to the service instance bound to it at startup. The
//! mapping is immutable once built; resolution is a pure lookup that never
//! touches the network.
//!
//! # Example
//!
//! ```rust,no_run
//! use polydb_services::registry::ServiceRegistry;
//! use polydb_services::relational::{PoolConfig, SqliteService};
//! use std::sync::Arc;
//!
//! # async fn example() -> polydb_services::Result<()> {
//! let sqlite = SqliteService::connect("sqlite://app.db?mode=rwc", PoolConfig::default()).await?;
//!
//! let registry = ServiceRegistry::builder()
//!     .register("sqlite", Arc::new(sqlite))
//!     .build()?;
//!
//! let service = registry.resolve_as::<SqliteService>("sqlite")?;
//! service.execute("SELECT 1", Vec::new()).await?;
//! # Ok(())
//! # }
//! ```

use crate::backend::{BackendKind, DataBackend};
use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder collecting `(key, service)` bindings
#[derive(Default)]
pub struct ServiceRegistryBuilder {
	entries: Vec<(String, Arc<dyn DataBackend>)>,
}

impl ServiceRegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind `service` to `key`
	pub fn register(mut self, key: impl Into<String>, service: Arc<dyn DataBackend>) -> Self {
		self.entries.push((key.into(), service));
		self
	}

	/// Bind `service` under its engine's canonical name
	pub fn register_default(self, service: Arc<dyn DataBackend>) -> Self {
		let key = service.kind().as_str();
		self.register(key, service)
	}

	/// Freeze the bindings. Fails if any key was bound twice.
	pub fn build(self) -> Result<ServiceRegistry> {
		let mut services = HashMap::with_capacity(self.entries.len());
		for (key, service) in self.entries {
			if services.contains_key(&key) {
				return Err(DataError::DuplicateBackend(key));
			}
			tracing::debug!(key = %key, kind = %service.kind(), "registered backend service");
			services.insert(key, service);
		}
		Ok(ServiceRegistry { services })
	}
}

/// Immutable mapping from backend key to service instance
#[derive(Clone)]
pub struct ServiceRegistry {
	services: HashMap<String, Arc<dyn DataBackend>>,
}

impl ServiceRegistry {
	pub fn builder() -> ServiceRegistryBuilder {
		ServiceRegistryBuilder::new()
	}

	/// Resolve `key` to its service
	///
	/// Keys are matched exactly. Every call for the same key returns the
	/// same instance.
	pub fn resolve(&self, key: &str) -> Result<Arc<dyn DataBackend>> {
		self.services
			.get(key)
			.cloned()
			.ok_or_else(|| DataError::UnsupportedBackend(key.to_string()))
	}

	/// Resolve `key` and downcast to the concrete service type
	pub fn resolve_as<T: DataBackend>(&self, key: &str) -> Result<Arc<T>> {
		let service = self.resolve(key)?;
		let actual = service.kind();
		service
			.into_any()
			.downcast::<T>()
			.map_err(|_| DataError::BackendMismatch {
				key: key.to_string(),
				expected: std::any::type_name::<T>(),
				actual,
			})
	}

	pub fn contains(&self, key: &str) -> bool {
		self.services.contains_key(key)
	}

	/// Engine bound to `key`
	pub fn kind_of(&self, key: &str) -> Result<BackendKind> {
		self.resolve(key).map(|service| service.kind())
	}

	/// Registered keys in sorted order
	pub fn keys(&self) -> Vec<&str> {
		let mut keys: Vec<&str> = self.services.keys().map(String::as_str).collect();
		keys.sort_unstable();
		keys
	}

	pub fn len(&self) -> usize {
		self.services.len()
	}

	pub fn is_empty(&self) -> bool {
		self.services.is_empty()
	}

	/// Run every service's health check, sorted by key
	pub async fn health_check_all(&self) -> Vec<(String, Result<()>)> {
		let mut keys: Vec<&String> = self.services.keys().collect();
		keys.sort_unstable();

		let checks = keys.into_iter().map(|key| {
			let service = self.services[key].clone();
			async move { (key.clone(), service.health_check().await) }
		});
		futures::future::join_all(checks).await
	}
}

impl std::fmt::Debug for ServiceRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut map = f.debug_map();
		for key in self.keys() {
			map.entry(&key, &self.services[key].kind());
		}
		map.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use rstest::rstest;
	use std::any::Any;

	struct StubService {
		kind: BackendKind,
		healthy: bool,
	}

	#[async_trait]
	impl DataBackend for StubService {
		fn kind(&self) -> BackendKind {
			self.kind
		}

		async fn health_check(&self) -> Result<()> {
			if self.healthy {
				Ok(())
			} else {
				Err(DataError::execution(self.kind, "unreachable"))
			}
		}

		fn as_any(&self) -> &dyn Any {
			self
		}

		fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
			self
		}
	}

	struct OtherStub;

	#[async_trait]
	impl DataBackend for OtherStub {
		fn kind(&self) -> BackendKind {
			BackendKind::Redis
		}

		async fn health_check(&self) -> Result<()> {
			Ok(())
		}

		fn as_any(&self) -> &dyn Any {
			self
		}

		fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
			self
		}
	}

	fn stub(kind: BackendKind) -> Arc<dyn DataBackend> {
		Arc::new(StubService {
			kind,
			healthy: true,
		})
	}

	#[rstest]
	fn test_resolve_returns_same_instance() {
		// Arrange
		let service = stub(BackendKind::Sqlite);
		let registry = ServiceRegistry::builder()
			.register("sqlite", service.clone())
			.build()
			.unwrap();

		// Act
		let first = registry.resolve("sqlite").unwrap();
		let second = registry.resolve("sqlite").unwrap();

		// Assert
		assert!(Arc::ptr_eq(&first, &second));
		assert!(Arc::ptr_eq(&first, &service));
	}

	#[rstest]
	#[case(0)]
	#[case(1)]
	#[case(7)]
	fn test_unregistered_key_fails_regardless_of_size(#[case] registered: usize) {
		// Arrange
		let mut builder = ServiceRegistry::builder();
		for i in 0..registered {
			builder = builder.register(format!("backend-{}", i), stub(BackendKind::Redis));
		}
		let registry = builder.build().unwrap();

		// Act
		let result = registry.resolve("postgres");

		// Assert
		match result {
			Err(DataError::UnsupportedBackend(key)) => assert_eq!(key, "postgres"),
			Err(other) => panic!("unexpected error: {}", other),
			Ok(_) => panic!("resolution of an unregistered key must fail"),
		}
		assert_eq!(registry.len(), registered);
	}

	#[rstest]
	fn test_resolve_is_case_sensitive() {
		// Arrange
		let registry = ServiceRegistry::builder()
			.register("sqlite", stub(BackendKind::Sqlite))
			.build()
			.unwrap();

		// Act & Assert
		assert!(registry.resolve("SQLite").is_err());
		assert!(registry.resolve("sqlite ").is_err());
		assert!(registry.resolve("sqlite").is_ok());
	}

	#[rstest]
	fn test_duplicate_key_rejected() {
		// Arrange
		let builder = ServiceRegistry::builder()
			.register("cache", stub(BackendKind::Redis))
			.register("cache", stub(BackendKind::Redis));

		// Act
		let result = builder.build();

		// Assert
		assert!(matches!(result, Err(DataError::DuplicateBackend(key)) if key == "cache"));
	}

	#[rstest]
	fn test_resolve_as_downcasts_to_concrete_type() {
		// Arrange
		let service = stub(BackendKind::Neo4j);
		let registry = ServiceRegistry::builder()
			.register_default(service.clone())
			.build()
			.unwrap();

		// Act
		let typed = registry.resolve_as::<StubService>("neo4j").unwrap();
		let mismatched = registry.resolve_as::<OtherStub>("neo4j");

		// Assert
		assert_eq!(typed.kind, BackendKind::Neo4j);
		assert_eq!(
			Arc::as_ptr(&typed) as *const (),
			Arc::as_ptr(&service) as *const ()
		);
		assert!(matches!(
			mismatched,
			Err(DataError::BackendMismatch {
				actual: BackendKind::Neo4j,
				..
			})
		));
	}

	#[rstest]
	fn test_keys_are_sorted() {
		// Arrange
		let registry = ServiceRegistry::builder()
			.register("redis", stub(BackendKind::Redis))
			.register("analytics", stub(BackendKind::Postgres))
			.register("mongodb", stub(BackendKind::Mongodb))
			.build()
			.unwrap();

		// Act
		let keys = registry.keys();

		// Assert
		assert_eq!(keys, vec!["analytics", "mongodb", "redis"]);
		assert_eq!(registry.kind_of("analytics").unwrap(), BackendKind::Postgres);
	}

	#[tokio::test]
	async fn test_health_check_all_reports_each_key() {
		// Arrange
		let registry = ServiceRegistry::builder()
			.register(
				"search",
				Arc::new(StubService {
					kind: BackendKind::Elasticsearch,
					healthy: false,
				}),
			)
			.register("cache", stub(BackendKind::Redis))
			.build()
			.unwrap();

		// Act
		let report = registry.health_check_all().await;

		// Assert
		assert_eq!(report.len(), 2);
		assert_eq!(report[0].0, "cache");
		assert!(report[0].1.is_ok());
		assert_eq!(report[1].0, "search");
		assert!(report[1].1.is_err());
	}
}
