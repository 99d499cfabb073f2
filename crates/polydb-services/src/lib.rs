//! # polydb-services
//!
//! Backend services behind one registry.
//!
//! Every storage engine is wrapped in a service that owns exactly one
//! long-lived handle to it: a bounded connection pool for the relational
//! engines, a driver client for the rest. Services are built once at
//! startup and bound to string keys in a [`ServiceRegistry`]; callers
//! resolve a key and invoke the service directly.
//!
//! ## Backends
//!
//! | Feature         | Service                                  | Operation                 |
//! |-----------------|------------------------------------------|---------------------------|
//! | `postgres`      | [`relational::PostgresService`]          | `execute(sql, params)`    |
//! | `mysql`         | [`relational::MySqlService`]             | `execute(sql, params)`    |
//! | `sqlite`        | [`relational::SqliteService`]            | `execute(sql, params)`    |
//! | `mongodb`       | [`nosql::MongoService`]                  | `find(db, coll, filter)`  |
//! | `redis`         | [`nosql::RedisService`]                  | `get` / `set` / `delete`  |
//! | `neo4j`         | [`nosql::Neo4jService`]                  | `execute(cypher, params)` |
//! | `elasticsearch` | [`nosql::ElasticsearchService`]          | `search(index, body)`     |
//! | `cassandra`     | [`nosql::CassandraService`]              | `execute(cql, params)`    |
//!
//! ## Example
//!
//! ```rust,no_run
//! use polydb_services::bootstrap;
//! use polydb_services::config::DataSettings;
//! use polydb_services::relational::SqliteService;
//!
//! # async fn example() -> polydb_services::Result<()> {
//! let settings = DataSettings::from_toml_str(
//!     r#"
//!     [backends.sqlite]
//!     engine = "sqlite"
//!     path = "app.db"
//!     "#,
//! )?;
//! let registry = bootstrap::build_registry(&settings).await?;
//!
//! let sqlite = registry.resolve_as::<SqliteService>("sqlite")?;
//! let outcome = sqlite.execute("SELECT 1", Vec::new()).await?;
//! assert!(!outcome.is_no_result());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod registry;

#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub mod relational;

#[cfg(any(
	feature = "mongodb",
	feature = "redis",
	feature = "neo4j",
	feature = "elasticsearch",
	feature = "cassandra"
))]
pub mod nosql;

pub use backend::{BackendKind, DataBackend};
pub use error::{DataError, Result};
pub use registry::{ServiceRegistry, ServiceRegistryBuilder};
