//! Pool configuration

use crate::error::{DataError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Sizing and timing of a relational connection pool
///
/// Deserializes from settings with durations given in whole seconds:
///
/// ```toml
/// min_connections = 1
/// max_connections = 5
/// acquire_timeout = 10
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
	pub min_connections: u32,
	pub max_connections: u32,
	#[serde(with = "secs")]
	pub acquire_timeout: Duration,
	#[serde(with = "opt_secs")]
	pub idle_timeout: Option<Duration>,
	#[serde(with = "opt_secs")]
	pub max_lifetime: Option<Duration>,
	pub test_before_acquire: bool,
}

impl Default for PoolConfig {
	fn default() -> Self {
		Self {
			min_connections: 1,
			max_connections: 10,
			acquire_timeout: Duration::from_secs(30),
			idle_timeout: Some(Duration::from_secs(600)),
			max_lifetime: Some(Duration::from_secs(1800)),
			test_before_acquire: false,
		}
	}
}

impl PoolConfig {
	/// Create a new pool configuration with default values
	///
	/// # Examples
	///
	/// ```rust
	/// use polydb_services::relational::PoolConfig;
	///
	/// let config = PoolConfig::new();
	/// assert_eq!(config.max_connections, 10);
	/// assert_eq!(config.min_connections, 1);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_max_connections(mut self, max: u32) -> Self {
		self.max_connections = max;
		self
	}

	pub fn with_min_connections(mut self, min: u32) -> Self {
		self.min_connections = min;
		self
	}

	pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
		self.acquire_timeout = timeout;
		self
	}

	pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.idle_timeout = timeout;
		self
	}

	pub fn with_max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
		self.max_lifetime = lifetime;
		self
	}

	pub fn with_test_before_acquire(mut self, test: bool) -> Self {
		self.test_before_acquire = test;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.max_connections == 0 {
			return Err(DataError::Config(
				"max_connections must be at least 1".to_string(),
			));
		}
		if self.max_connections < self.min_connections {
			return Err(DataError::Config(
				"max_connections must be >= min_connections".to_string(),
			));
		}
		Ok(())
	}
}

mod secs {
	use serde::{Deserialize, Deserializer};
	use std::time::Duration;

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_secs)
	}
}

mod opt_secs {
	use serde::{Deserialize, Deserializer};
	use std::time::Duration;

	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<Duration>, D::Error> {
		Option::<u64>::deserialize(deserializer).map(|secs| secs.map(Duration::from_secs))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_default_is_valid() {
		// Act & Assert
		assert!(PoolConfig::default().validate().is_ok());
	}

	#[rstest]
	#[case(0, 0)]
	#[case(2, 1)]
	fn test_invalid_bounds_rejected(#[case] min: u32, #[case] max: u32) {
		// Arrange
		let config = PoolConfig::new()
			.with_min_connections(min)
			.with_max_connections(max);

		// Act
		let result = config.validate();

		// Assert
		assert!(matches!(result, Err(DataError::Config(_))));
	}

	#[rstest]
	fn test_deserialize_seconds() {
		// Arrange
		let source = r#"
			min_connections = 2
			max_connections = 5
			acquire_timeout = 3
			idle_timeout = 60
		"#;

		// Act
		let config: PoolConfig = toml::from_str(source).unwrap();

		// Assert
		assert_eq!(config.min_connections, 2);
		assert_eq!(config.max_connections, 5);
		assert_eq!(config.acquire_timeout, Duration::from_secs(3));
		assert_eq!(config.idle_timeout, Some(Duration::from_secs(60)));
		assert_eq!(config.max_lifetime, Some(Duration::from_secs(1800)));
	}
}
