//! Neo4j graph service

use crate::backend::{BackendKind, DataBackend};
use crate::config::Neo4jSettings;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use neo4rs::{
	BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
	ConfigBuilder, Graph, query,
};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// One materialized record, keyed by the names in the `RETURN` clause
pub type GraphRecord = serde_json::Map<String, Value>;

/// Cypher parameters
pub type GraphParams = serde_json::Map<String, Value>;

fn neo4j_error(err: neo4rs::Error) -> DataError {
	DataError::execution(BackendKind::Neo4j, err)
}

/// Convert a JSON parameter into its Bolt counterpart
fn to_bolt(value: Value) -> Result<BoltType> {
	Ok(match value {
		Value::Null => BoltType::Null(BoltNull),
		Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(b)),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				BoltType::Integer(BoltInteger::new(i))
			} else if let Some(f) = n.as_f64() {
				BoltType::Float(BoltFloat::new(f))
			} else {
				return Err(DataError::InvalidArgument(format!(
					"number {} is not representable in Bolt",
					n
				)));
			}
		}
		Value::String(s) => BoltType::String(BoltString::new(&s)),
		Value::Array(items) => {
			let mut list = BoltList::with_capacity(items.len());
			for item in items {
				list.push(to_bolt(item)?);
			}
			BoltType::List(list)
		}
		Value::Object(fields) => {
			let mut map = BoltMap::with_capacity(fields.len());
			for (key, item) in fields {
				map.put(BoltString::new(&key), to_bolt(item)?);
			}
			BoltType::Map(map)
		}
	})
}

/// Graph service over one Neo4j driver handle
///
/// Each [`execute`](Neo4jService::execute) borrows a connection from the
/// driver's pool for the duration of the call. Records are copied into
/// plain maps before that connection is released.
#[derive(Clone)]
pub struct Neo4jService {
	graph: Graph,
}

impl Neo4jService {
	pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
		let graph = Graph::new(uri, user, password)
			.await
			.map_err(|e| DataError::connection(BackendKind::Neo4j, e))?;
		Ok(Self { graph })
	}

	pub async fn from_settings(settings: &Neo4jSettings) -> Result<Self> {
		let mut builder = ConfigBuilder::default()
			.uri(settings.uri.as_str())
			.user(settings.user.as_str())
			.password(settings.password.expose_secret());
		if let Some(database) = &settings.database {
			builder = builder.db(database.as_str());
		}
		if let Some(max) = settings.max_connections {
			builder = builder.max_connections(max);
		}
		let config = builder
			.build()
			.map_err(|e| DataError::Config(e.to_string()))?;
		let graph = Graph::connect(config)
			.await
			.map_err(|e| DataError::connection(BackendKind::Neo4j, e))?;
		Ok(Self { graph })
	}

	/// Run `cypher` and collect every record
	///
	/// `params` defaults to an empty parameter set.
	pub async fn execute(&self, cypher: &str, params: Option<GraphParams>) -> Result<Vec<GraphRecord>> {
		let params = params.unwrap_or_default();
		tracing::debug!(backend = "neo4j", params = params.len(), "execute");

		let mut statement = query(cypher);
		for (key, value) in params {
			statement = statement.param(&key, to_bolt(value)?);
		}

		let mut stream = self.graph.execute(statement).await.map_err(neo4j_error)?;
		let mut records = Vec::new();
		while let Some(row) = stream.next().await.map_err(neo4j_error)? {
			let record = row
				.to::<GraphRecord>()
				.map_err(|e| DataError::Conversion(e.to_string()))?;
			records.push(record);
		}
		Ok(records)
	}
}

#[async_trait]
impl DataBackend for Neo4jService {
	fn kind(&self) -> BackendKind {
		BackendKind::Neo4j
	}

	async fn health_check(&self) -> Result<()> {
		self.graph.run(query("RETURN 1")).await.map_err(neo4j_error)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(null), BoltType::Null(BoltNull))]
	#[case(json!(true), BoltType::Boolean(BoltBoolean::new(true)))]
	#[case(json!(42), BoltType::Integer(BoltInteger::new(42)))]
	#[case(json!(1.5), BoltType::Float(BoltFloat::new(1.5)))]
	#[case(json!("alice"), BoltType::String(BoltString::new("alice")))]
	fn test_scalar_params(#[case] input: Value, #[case] expected: BoltType) {
		// Act
		let bolt = to_bolt(input).unwrap();

		// Assert
		assert_eq!(bolt, expected);
	}

	#[rstest]
	fn test_nested_params() {
		// Arrange
		let input = json!({ "tags": ["a", "b"], "meta": { "n": 1 } });

		// Act
		let bolt = to_bolt(input).unwrap();

		// Assert
		match bolt {
			BoltType::Map(map) => {
				assert_eq!(map.value.len(), 2);
				assert!(matches!(
					map.value.get(&BoltString::new("tags")),
					Some(BoltType::List(list)) if list.len() == 2
				));
				assert!(matches!(
					map.value.get(&BoltString::new("meta")),
					Some(BoltType::Map(_))
				));
			}
			other => panic!("expected map, got {:?}", other),
		}
	}

	#[rstest]
	fn test_u64_beyond_i64_becomes_float() {
		// Act
		let bolt = to_bolt(json!(u64::MAX)).unwrap();

		// Assert
		assert!(matches!(bolt, BoltType::Float(_)));
	}
}
