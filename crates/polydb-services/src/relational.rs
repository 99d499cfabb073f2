//! Pooled relational services
//!
//! PostgreSQL, MySQL and SQLite share one execution pattern:
//!
//! 1. check a connection out of the bounded pool;
//! 2. classify the statement from the driver's column metadata
//!    (see [`classify`]);
//! 3. fetch rows for result-set statements, or run mutations in the
//!    engine's autocommit mode and count one commit;
//! 4. return the connection when the [`PooledConnection`] guard drops.
//!
//! Parameters are always bound by the driver, never interpolated.

pub mod classify;
pub mod config;
mod dialect;
pub mod events;
pub mod pool;
pub mod row;
pub mod value;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use classify::{MUTATING_KEYWORDS, StatementKind};
pub use config::PoolConfig;
pub use events::{PoolEvent, PoolEventListener, RecordingListener};
pub use pool::{ConnectionPool, PoolSnapshot, PooledConnection};
pub use row::{Row, SqlOutcome};
pub use value::QueryValue;

#[cfg(feature = "mysql")]
pub use mysql::MySqlService;
#[cfg(feature = "postgres")]
pub use postgres::PostgresService;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteService;
