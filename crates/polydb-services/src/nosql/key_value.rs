//! Redis key-value service
//!
//! Values are raw bytes. A missing key reads as `None`, which is distinct
//! from a stored empty value (`Some(vec![])`).

use crate::backend::{BackendKind, DataBackend};
use crate::config::RedisSettings;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

fn redis_error(err: redis::RedisError) -> DataError {
	DataError::execution(BackendKind::Redis, err)
}

/// Expiry in milliseconds for `ttl`, rejecting zero
fn expiry_millis(ttl: Duration) -> Result<u64> {
	if ttl.is_zero() {
		return Err(DataError::InvalidArgument(
			"ttl must be greater than zero".to_string(),
		));
	}
	// Round sub-millisecond remainders up so a tiny TTL never becomes zero
	let millis = ttl.as_millis() + u128::from(ttl.subsec_nanos() % 1_000_000 != 0);
	u64::try_from(millis)
		.map_err(|_| DataError::InvalidArgument(format!("ttl {:?} is too large", ttl)))
}

/// Key-value service over one multiplexed Redis connection
///
/// The [`ConnectionManager`] reconnects on its own and is cheap to clone,
/// so concurrent callers each work on a clone without locking.
#[derive(Clone)]
pub struct RedisService {
	manager: ConnectionManager,
}

impl RedisService {
	/// Connect to `url` (`redis://host:port/db`)
	pub async fn connect(url: &str) -> Result<Self> {
		let client =
			redis::Client::open(url).map_err(|e| DataError::connection(BackendKind::Redis, e))?;
		let manager = ConnectionManager::new(client)
			.await
			.map_err(|e| DataError::connection(BackendKind::Redis, e))?;
		tracing::debug!(backend = "redis", "connection manager ready");
		Ok(Self { manager })
	}

	pub async fn from_settings(settings: &RedisSettings) -> Result<Self> {
		Self::connect(&settings.to_url()).await
	}

	/// Value stored at `key`, or `None` if the key does not exist
	pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		tracing::debug!(backend = "redis", key, "get");
		let mut conn = self.manager.clone();
		conn.get::<_, Option<Vec<u8>>>(key)
			.await
			.map_err(redis_error)
	}

	/// Store `value` at `key`, expiring after `ttl` when given
	pub async fn set(&self, key: &str, value: impl AsRef<[u8]>, ttl: Option<Duration>) -> Result<()> {
		let expiry = ttl.map(expiry_millis).transpose()?;
		tracing::debug!(backend = "redis", key, expiry_ms = ?expiry, "set");

		let mut conn = self.manager.clone();
		let value = value.as_ref();
		let stored = match expiry {
			Some(millis) => conn.pset_ex::<_, _, ()>(key, value, millis).await,
			None => conn.set::<_, _, ()>(key, value).await,
		};
		stored.map_err(redis_error)
	}

	/// Remove `key`; returns whether it existed
	pub async fn delete(&self, key: &str) -> Result<bool> {
		tracing::debug!(backend = "redis", key, "delete");
		let mut conn = self.manager.clone();
		let removed: usize = conn.del(key).await.map_err(redis_error)?;
		Ok(removed > 0)
	}
}

#[async_trait]
impl DataBackend for RedisService {
	fn kind(&self) -> BackendKind {
		BackendKind::Redis
	}

	async fn health_check(&self) -> Result<()> {
		let mut conn = self.manager.clone();
		redis::cmd("PING")
			.query_async::<String>(&mut conn)
			.await
			.map(|_| ())
			.map_err(redis_error)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}
