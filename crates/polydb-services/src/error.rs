//! Error types shared by every backend service
//!
//! All services report failures through [`DataError`]. Driver errors are
//! translated at the service boundary so callers only ever match on this enum.

use crate::backend::BackendKind;

/// Result type for data-access operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Unified error type for data-access operations
#[derive(Debug, thiserror::Error)]
pub enum DataError {
	/// No service is registered under the requested key
	#[error("Unsupported database type: {0}")]
	UnsupportedBackend(String),

	/// A key was registered twice while building a registry
	#[error("Backend already registered: {0}")]
	DuplicateBackend(String),

	/// The service registered under `key` is not of the requested type
	#[error("Backend '{key}' is a {actual} service, not {expected}")]
	BackendMismatch {
		key: String,
		expected: &'static str,
		actual: BackendKind,
	},

	/// No pooled connection became available within the pool's wait policy
	#[error("{backend} pool exhausted: {message}")]
	PoolExhausted {
		backend: BackendKind,
		message: String,
	},

	/// Engine-level failure while executing an operation
	#[error("{backend} execution error: {message}")]
	Execution {
		backend: BackendKind,
		message: String,
	},

	/// Failure while establishing the long-lived handle of a service
	#[error("{backend} connection error: {message}")]
	Connection {
		backend: BackendKind,
		message: String,
	},

	/// Invalid configuration
	#[error("Configuration error: {0}")]
	Config(String),

	/// Invalid argument supplied by the caller
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// A value could not be converted between engine and crate types
	#[error("Conversion error: {0}")]
	Conversion(String),
}

impl DataError {
	pub(crate) fn execution(backend: BackendKind, message: impl ToString) -> Self {
		Self::Execution {
			backend,
			message: message.to_string(),
		}
	}

	pub(crate) fn connection(backend: BackendKind, message: impl ToString) -> Self {
		Self::Connection {
			backend,
			message: message.to_string(),
		}
	}

	/// Backend that produced this error, if any
	pub fn backend(&self) -> Option<BackendKind> {
		match self {
			Self::PoolExhausted { backend, .. }
			| Self::Execution { backend, .. }
			| Self::Connection { backend, .. } => Some(*backend),
			Self::BackendMismatch { actual, .. } => Some(*actual),
			_ => None,
		}
	}

	/// Whether a caller may reasonably retry the failed operation
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::PoolExhausted { .. })
	}

	/// Translate an sqlx error raised while an operation was running
	#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
	pub(crate) fn from_sqlx(backend: BackendKind, err: sqlx::Error) -> Self {
		match err {
			sqlx::Error::PoolTimedOut => Self::PoolExhausted {
				backend,
				message: "timed out waiting for a pooled connection".to_string(),
			},
			sqlx::Error::PoolClosed => Self::PoolExhausted {
				backend,
				message: "pool has been closed".to_string(),
			},
			sqlx::Error::ColumnDecode { index, source } => {
				Self::Conversion(format!("column {}: {}", index, source))
			}
			other => Self::execution(backend, other),
		}
	}
}

impl From<toml::de::Error> for DataError {
	fn from(err: toml::de::Error) -> Self {
		DataError::Config(err.to_string())
	}
}
