//! Decoded rows and statement outcomes

use super::value::QueryValue;
use crate::error::{DataError, Result};
use std::sync::Arc;

/// One result row, in the column order reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	columns: Arc<[String]>,
	values: Vec<QueryValue>,
}

impl Row {
	pub(crate) fn new(columns: Arc<[String]>, values: Vec<QueryValue>) -> Self {
		debug_assert_eq!(columns.len(), values.len());
		Self { columns, values }
	}

	/// Column names, shared by every row of one result set
	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn values(&self) -> &[QueryValue] {
		&self.values
	}

	pub fn into_values(self) -> Vec<QueryValue> {
		self.values
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Raw value at position `index`
	pub fn get_index(&self, index: usize) -> Option<&QueryValue> {
		self.values.get(index)
	}

	/// Value of the first column named `name`, converted to `T`
	pub fn get<T>(&self, name: &str) -> Result<T>
	where
		T: TryFrom<QueryValue, Error = DataError>,
	{
		let index = self
			.columns
			.iter()
			.position(|column| column == name)
			.ok_or_else(|| DataError::InvalidArgument(format!("no column named '{}'", name)))?;
		T::try_from(self.values[index].clone())
	}
}

/// Outcome of one relational `execute`
///
/// `NoResult` is distinct from `Rows(vec![])`: the former means the
/// statement was a committed mutation, the latter a read that matched nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlOutcome {
	Rows(Vec<Row>),
	NoResult { rows_affected: u64 },
}

impl SqlOutcome {
	pub fn is_no_result(&self) -> bool {
		matches!(self, SqlOutcome::NoResult { .. })
	}

	pub fn rows(&self) -> Option<&[Row]> {
		match self {
			SqlOutcome::Rows(rows) => Some(rows),
			SqlOutcome::NoResult { .. } => None,
		}
	}

	pub fn into_rows(self) -> Option<Vec<Row>> {
		match self {
			SqlOutcome::Rows(rows) => Some(rows),
			SqlOutcome::NoResult { .. } => None,
		}
	}

	pub fn rows_affected(&self) -> Option<u64> {
		match self {
			SqlOutcome::NoResult { rows_affected } => Some(*rows_affected),
			SqlOutcome::Rows(_) => None,
		}
	}

	/// Row values only, dropping column names
	pub fn into_value_rows(self) -> Option<Vec<Vec<QueryValue>>> {
		self.into_rows()
			.map(|rows| rows.into_iter().map(Row::into_values).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn sample_row() -> Row {
		Row::new(
			Arc::from(vec!["id".to_string(), "name".to_string()]),
			vec![QueryValue::Int(7), QueryValue::String("ada".to_string())],
		)
	}

	#[rstest]
	fn test_get_by_name() {
		// Arrange
		let row = sample_row();

		// Act
		let id: i64 = row.get("id").unwrap();
		let name: String = row.get("name").unwrap();

		// Assert
		assert_eq!(id, 7);
		assert_eq!(name, "ada");
		assert_eq!(row.get_index(1), Some(&QueryValue::String("ada".to_string())));
	}

	#[rstest]
	fn test_get_unknown_column_fails() {
		// Arrange
		let row = sample_row();

		// Act
		let result = row.get::<i64>("email");

		// Assert
		assert!(matches!(result, Err(DataError::InvalidArgument(_))));
	}

	#[rstest]
	fn test_no_result_differs_from_empty_rows() {
		// Arrange
		let written = SqlOutcome::NoResult { rows_affected: 0 };
		let read_nothing = SqlOutcome::Rows(Vec::new());

		// Assert
		assert_ne!(written, read_nothing);
		assert!(written.is_no_result());
		assert!(written.rows().is_none());
		assert_eq!(read_nothing.rows().map(<[Row]>::len), Some(0));
		assert_eq!(read_nothing.rows_affected(), None);
	}
}
