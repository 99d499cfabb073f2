//! Read/write classification shared by every relational service
//!
//! A statement is a read when the driver describes at least one result
//! column for it, and a mutation otherwise. Mutations are committed exactly
//! once by the engine's autocommit mode; reads are never committed.
//!
//! When the driver cannot describe a statement, the leading keyword is
//! checked against [`MUTATING_KEYWORDS`] instead.

/// Leading keywords treated as mutations when no column metadata is available
pub const MUTATING_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER"];

/// How a statement is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
	/// Produces a result set; rows are fetched and nothing is committed
	ResultSet,
	/// Produces no result set; executed in autocommit mode and counted as one commit
	Mutation,
}

/// Source of a classification decision, reported in debug logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
	Metadata,
	Keyword,
}

/// Classify `sql` from the driver's column count, falling back to the keyword list
///
/// `column_count` is `None` when the driver could not describe the statement.
pub fn classify(column_count: Option<usize>, sql: &str) -> (StatementKind, ClassificationSource) {
	match column_count {
		Some(0) => (StatementKind::Mutation, ClassificationSource::Metadata),
		Some(_) => (StatementKind::ResultSet, ClassificationSource::Metadata),
		None => (classify_by_keyword(sql), ClassificationSource::Keyword),
	}
}

/// Classify `sql` by its first keyword alone
pub fn classify_by_keyword(sql: &str) -> StatementKind {
	let keyword = leading_keyword(sql);
	if MUTATING_KEYWORDS
		.iter()
		.any(|candidate| keyword.eq_ignore_ascii_case(candidate))
	{
		StatementKind::Mutation
	} else {
		StatementKind::ResultSet
	}
}

/// First keyword of `sql`, skipping whitespace, `--` line comments and `/* */` block comments
fn leading_keyword(sql: &str) -> &str {
	let mut rest = sql;
	loop {
		rest = rest.trim_start();
		if let Some(after) = rest.strip_prefix("--") {
			rest = after.find('\n').map_or("", |end| &after[end + 1..]);
		} else if let Some(after) = rest.strip_prefix("/*") {
			rest = after.find("*/").map_or("", |end| &after[end + 2..]);
		} else {
			break;
		}
	}
	let end = rest
		.find(|c: char| !c.is_ascii_alphabetic())
		.unwrap_or(rest.len());
	&rest[..end]
}
