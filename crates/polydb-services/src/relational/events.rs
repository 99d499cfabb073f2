//! Pool lifecycle events
//!
//! Listeners are invoked synchronously on the task that triggered the event,
//! so an event is always observed before the operation that caused it returns.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Something that happened to a pooled connection
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEvent {
	/// A connection was checked out of the pool
	ConnectionAcquired {
		connection_id: Uuid,
		timestamp: DateTime<Utc>,
	},
	/// A connection was checked back in
	ConnectionReturned {
		connection_id: Uuid,
		timestamp: DateTime<Utc>,
	},
	/// A mutation was committed on a connection
	TransactionCommitted {
		connection_id: Uuid,
		timestamp: DateTime<Utc>,
	},
}

impl PoolEvent {
	pub fn connection_acquired(connection_id: Uuid) -> Self {
		Self::ConnectionAcquired {
			connection_id,
			timestamp: Utc::now(),
		}
	}

	pub fn connection_returned(connection_id: Uuid) -> Self {
		Self::ConnectionReturned {
			connection_id,
			timestamp: Utc::now(),
		}
	}

	pub fn transaction_committed(connection_id: Uuid) -> Self {
		Self::TransactionCommitted {
			connection_id,
			timestamp: Utc::now(),
		}
	}

	pub fn connection_id(&self) -> Uuid {
		match self {
			Self::ConnectionAcquired { connection_id, .. }
			| Self::ConnectionReturned { connection_id, .. }
			| Self::TransactionCommitted { connection_id, .. } => *connection_id,
		}
	}
}

/// Receives pool events
///
/// Implementations must be cheap and must not block; they run inline with
/// checkout, checkin and commit.
pub trait PoolEventListener: Send + Sync {
	fn on_event(&self, event: &PoolEvent);
}

/// Listener that records every event, useful for assertions
#[derive(Debug, Default)]
pub struct RecordingListener {
	events: parking_lot::Mutex<Vec<PoolEvent>>,
}

impl RecordingListener {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of events received so far
	pub fn events(&self) -> Vec<PoolEvent> {
		self.events.lock().clone()
	}

	pub fn count_where(&self, predicate: impl Fn(&PoolEvent) -> bool) -> usize {
		self.events.lock().iter().filter(|event| predicate(event)).count()
	}
}

impl PoolEventListener for RecordingListener {
	fn on_event(&self, event: &PoolEvent) {
		self.events.lock().push(event.clone());
	}
}
