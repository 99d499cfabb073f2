//! Non-relational services
//!
//! Each service wraps the single long-lived client of its driver. None of
//! them pool connections themselves; the drivers already do.

#[cfg(feature = "cassandra")]
pub mod column;
#[cfg(feature = "mongodb")]
pub mod document;
#[cfg(feature = "neo4j")]
pub mod graph;
#[cfg(feature = "redis")]
pub mod key_value;
#[cfg(feature = "elasticsearch")]
pub mod search;

#[cfg(feature = "cassandra")]
pub use column::{CassandraService, ColumnResult};
#[cfg(feature = "mongodb")]
pub use document::{MongoService, MongoServiceBuilder};
#[cfg(feature = "neo4j")]
pub use graph::{GraphParams, GraphRecord, Neo4jService};
#[cfg(feature = "redis")]
pub use key_value::RedisService;
#[cfg(feature = "elasticsearch")]
pub use search::{ElasticsearchService, ElasticsearchServiceBuilder};
