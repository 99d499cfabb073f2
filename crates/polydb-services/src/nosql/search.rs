//! Elasticsearch search service
//!
//! Wraps the official `elasticsearch` client. Query bodies are sent verbatim
//! and responses are returned as parsed JSON.

use crate::backend::{BackendKind, DataBackend};
use crate::config::ElasticsearchSettings;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cluster::ClusterHealthParts;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::{Elasticsearch, SearchParts};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

fn client_error(err: elasticsearch::Error) -> DataError {
	DataError::execution(BackendKind::Elasticsearch, err)
}

/// Builder for configuring an [`ElasticsearchService`]
pub struct ElasticsearchServiceBuilder {
	base_url: String,
	user: Option<String>,
	password: Option<SecretString>,
	timeout: Option<Duration>,
}

impl ElasticsearchServiceBuilder {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			user: None,
			password: None,
			timeout: None,
		}
	}

	/// Send HTTP basic credentials with every request
	pub fn basic_auth(mut self, user: impl Into<String>, password: Option<SecretString>) -> Self {
		self.user = Some(user.into());
		self.password = password;
		self
	}

	/// Per-request timeout applied by the transport
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn build(self) -> Result<ElasticsearchService> {
		let base_url = Url::parse(&self.base_url).map_err(|e| {
			DataError::Config(format!("invalid elasticsearch url '{}': {}", self.base_url, e))
		})?;
		if base_url.cannot_be_a_base() {
			return Err(DataError::Config(format!(
				"elasticsearch url '{}' cannot be used as a base",
				self.base_url
			)));
		}

		let mut transport =
			TransportBuilder::new(SingleNodeConnectionPool::new(base_url.clone())).disable_proxy();
		if let Some(user) = self.user {
			let password = self
				.password
				.map(|p| p.expose_secret().to_string())
				.unwrap_or_default();
			transport = transport.auth(Credentials::Basic(user, password));
		}
		if let Some(timeout) = self.timeout {
			transport = transport.timeout(timeout);
		}
		let transport = transport
			.build()
			.map_err(|e| DataError::connection(BackendKind::Elasticsearch, e))?;

		Ok(ElasticsearchService {
			client: Elasticsearch::new(transport),
			base_url,
		})
	}
}

/// Search service over one long-lived [`Elasticsearch`] client
pub struct ElasticsearchService {
	client: Elasticsearch,
	base_url: Url,
}

impl ElasticsearchService {
	pub fn builder(base_url: impl Into<String>) -> ElasticsearchServiceBuilder {
		ElasticsearchServiceBuilder::new(base_url)
	}

	/// Service for `http://host:port` without authentication
	pub fn new(host: &str, port: u16) -> Result<Self> {
		Self::builder(format!("http://{}:{}", host, port)).build()
	}

	pub fn from_settings(settings: &ElasticsearchSettings) -> Result<Self> {
		let mut builder = Self::builder(settings.base_url());
		if let Some(user) = &settings.user {
			builder = builder.basic_auth(
				user,
				settings
					.password
					.as_ref()
					.map(|p| SecretString::from(p.expose_secret().to_string())),
			);
		}
		if let Some(secs) = settings.timeout_secs {
			builder = builder.timeout(Duration::from_secs(secs));
		}
		builder.build()
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Run `query_body` against `index` and return the engine's response
	///
	/// Non-success responses become [`DataError::Execution`] with the status
	/// code and the response body as the message.
	pub async fn search(&self, index: &str, query_body: &Value) -> Result<Value> {
		tracing::debug!(backend = "elasticsearch", index, "search");
		let response = self
			.client
			.search(SearchParts::Index(&[index]))
			.body(query_body.clone())
			.send()
			.await
			.map_err(client_error)?;
		read_json(response).await
	}
}

async fn read_json(response: Response) -> Result<Value> {
	let status = response.status_code();
	let body = response.text().await.map_err(client_error)?;

	if !status.is_success() {
		return Err(engine_error(status.as_u16(), body));
	}
	serde_json::from_str(&body)
		.map_err(|e| DataError::Conversion(format!("elasticsearch returned invalid JSON: {}", e)))
}

fn engine_error(status: u16, body: String) -> DataError {
	tracing::debug!(backend = "elasticsearch", status, "request rejected");
	DataError::Execution {
		backend: BackendKind::Elasticsearch,
		message: format!("HTTP {}: {}", status, body),
	}
}

#[async_trait]
impl DataBackend for ElasticsearchService {
	fn kind(&self) -> BackendKind {
		BackendKind::Elasticsearch
	}

	async fn health_check(&self) -> Result<()> {
		let response = self
			.client
			.cluster()
			.health(ClusterHealthParts::None)
			.send()
			.await
			.map_err(client_error)?;
		read_json(response).await.map(|_| ())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}
