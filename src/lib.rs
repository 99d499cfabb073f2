//! # polydb
//!
//! One data-access contract over relational, document, key-value, graph,
//! search and column-family stores.
//!
//! This crate re-exports [`polydb_services`]; enable only the backends you
//! need through cargo features:
//!
//! - `relational` - `postgres`, `mysql` and `sqlite`
//! - `nosql-all` - `mongodb`, `redis`, `neo4j`, `elasticsearch` and `cassandra`
//! - `full` (default) - everything
//!
//! ```rust,no_run
//! use polydb::{DataError, ServiceRegistry};
//!
//! let registry = ServiceRegistry::builder().build().unwrap();
//! assert!(matches!(
//!     registry.resolve("postgres"),
//!     Err(DataError::UnsupportedBackend(_))
//! ));
//! ```

pub use polydb_services::*;
