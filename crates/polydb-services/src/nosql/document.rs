//! MongoDB document service
//!
//! # Example
//!
//! ```rust,no_run
//! use polydb_services::nosql::MongoService;
//! use bson::doc;
//!
//! # async fn example() -> polydb_services::Result<()> {
//! let mongo = MongoService::builder()
//!     .url("mongodb://localhost:27017")
//!     .max_pool_size(20)
//!     .build()
//!     .await?;
//!
//! let active = mongo.find("app", "users", doc! { "active": true }).await?;
//! # Ok(())
//! # }
//! ```

use crate::backend::{BackendKind, DataBackend};
use crate::config::MongoSettings;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use bson::{Document, doc};
use mongodb::Client;
use secrecy::ExposeSecret;
use std::any::Any;
use std::sync::Arc;

/// Builder for configuring a [`MongoService`]
pub struct MongoServiceBuilder {
	url: String,
	max_pool_size: Option<u32>,
	min_pool_size: Option<u32>,
	max_idle_time_secs: Option<u64>,
	app_name: Option<String>,
}

impl Default for MongoServiceBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl MongoServiceBuilder {
	pub fn new() -> Self {
		Self {
			url: "mongodb://localhost:27017".to_string(),
			max_pool_size: None,
			min_pool_size: None,
			max_idle_time_secs: None,
			app_name: None,
		}
	}

	/// Set the MongoDB connection URL
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	/// Set the maximum connection pool size
	pub fn max_pool_size(mut self, size: u32) -> Self {
		self.max_pool_size = Some(size);
		self
	}

	/// Set the minimum connection pool size
	pub fn min_pool_size(mut self, size: u32) -> Self {
		self.min_pool_size = Some(size);
		self
	}

	/// Set the maximum idle time for connections in seconds
	pub fn max_idle_time_secs(mut self, secs: u64) -> Self {
		self.max_idle_time_secs = Some(secs);
		self
	}

	pub fn app_name(mut self, name: impl Into<String>) -> Self {
		self.app_name = Some(name.into());
		self
	}

	/// Build the service
	///
	/// Only the connection string is validated here; the driver connects
	/// lazily on first use.
	pub async fn build(self) -> Result<MongoService> {
		use mongodb::options::ClientOptions;
		use std::time::Duration;

		let mut options = ClientOptions::parse(&self.url)
			.await
			.map_err(|e| DataError::connection(BackendKind::Mongodb, e))?;

		if let Some(max_size) = self.max_pool_size {
			options.max_pool_size = Some(max_size);
		}
		if let Some(min_size) = self.min_pool_size {
			options.min_pool_size = Some(min_size);
		}
		if let Some(idle_time) = self.max_idle_time_secs {
			options.max_idle_time = Some(Duration::from_secs(idle_time));
		}
		if self.app_name.is_some() {
			options.app_name = self.app_name;
		}

		let client = Client::with_options(options)
			.map_err(|e| DataError::connection(BackendKind::Mongodb, e))?;

		Ok(MongoService {
			client: Arc::new(client),
		})
	}
}

/// Thin dispatcher over one long-lived MongoDB client
///
/// The client pools its own connections; this service adds no pooling.
#[derive(Clone)]
pub struct MongoService {
	client: Arc<Client>,
}

impl MongoService {
	pub fn builder() -> MongoServiceBuilder {
		MongoServiceBuilder::new()
	}

	/// Connect with default options
	pub async fn connect(url: &str) -> Result<Self> {
		Self::builder().url(url).build().await
	}

	pub async fn from_settings(settings: &MongoSettings) -> Result<Self> {
		let mut builder = Self::builder().url(settings.uri.expose_secret());
		if let Some(size) = settings.max_pool_size {
			builder = builder.max_pool_size(size);
		}
		if let Some(size) = settings.min_pool_size {
			builder = builder.min_pool_size(size);
		}
		if let Some(secs) = settings.max_idle_time_secs {
			builder = builder.max_idle_time_secs(secs);
		}
		if let Some(name) = &settings.app_name {
			builder = builder.app_name(name);
		}
		builder.build().await
	}

	/// Every document in `database.collection` matching `filter`
	///
	/// The filter is passed to the server untouched.
	pub async fn find(
		&self,
		database: &str,
		collection: &str,
		filter: Document,
	) -> Result<Vec<Document>> {
		use futures::stream::TryStreamExt;

		tracing::debug!(backend = "mongodb", database, collection, "find");

		let coll = self
			.client
			.database(database)
			.collection::<Document>(collection);

		let cursor = coll
			.find(filter)
			.await
			.map_err(|e| DataError::execution(BackendKind::Mongodb, e))?;

		cursor
			.try_collect()
			.await
			.map_err(|e| DataError::execution(BackendKind::Mongodb, e))
	}
}

#[async_trait]
impl DataBackend for MongoService {
	fn kind(&self) -> BackendKind {
		BackendKind::Mongodb
	}

	async fn health_check(&self) -> Result<()> {
		self.client
			.database("admin")
			.run_command(doc! { "ping": 1 })
			.await
			.map(|_| ())
			.map_err(|e| DataError::execution(BackendKind::Mongodb, e))
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}
