//! Structured-parameter ingestion: turns a flat map of UI form fields into
//! the same raw leaves the grammar parser produces, then validates them.
//!
//! Key convention: a bare column name implies `eq`; otherwise the key is
//! `<column>_<comparator-alias>` (e.g. `created_at_after`), resolved against
//! the schema's column set longest-column-first so underscored column names
//! never mis-split. The reserved key `connective` (`"and"`/`"or"`) selects
//! the top-level connective; it defaults to `and`. The reserved key shadows
//! a schema column literally named `connective`: such a column is only
//! reachable through its suffixed forms (e.g. `connective_eq`).

use serde_json::{Map, Value as JsonValue};

use crate::ast::{Comparator, Expression, Filter, RawCondition, RawValue};
use crate::builder::build;
use crate::error::ConditionError;
use crate::schema::Schema;

const CONNECTIVE_KEY: &str = "connective";

enum Connective {
	And,
	Or,
}

/// Builds a validated filter from a flat parameter map. Conditions are
/// ordered by key, so the fail-fast error for a given map is deterministic.
pub fn parse_params(
	schema: &Schema,
	params: &Map<String, JsonValue>,
) -> Result<Filter, ConditionError> {
	let connective = parse_connective(params)?;

	let mut leaves = Vec::new();
	for (key, value) in params {
		if key == CONNECTIVE_KEY {
			continue;
		}
		let (column, comparator) =
			split_key(schema, key).ok_or_else(|| ConditionError::UnknownColumn {
				column: key.clone(),
			})?;
		let raw_value = to_raw_value(&column, comparator, value)?;
		leaves.push(Expression::Condition(RawCondition {
			column,
			comparator,
			value: raw_value,
		}));
	}

	if leaves.is_empty() {
		return Err(ConditionError::MalformedExpression {
			reason: "no conditions supplied".to_string(),
		});
	}

	let raw_tree = if leaves.len() == 1 {
		leaves.remove(0)
	} else {
		match connective {
			Connective::And => Expression::And(leaves),
			Connective::Or => Expression::Or(leaves),
		}
	};

	build(&raw_tree, schema)
}

fn parse_connective(params: &Map<String, JsonValue>) -> Result<Connective, ConditionError> {
	match params.get(CONNECTIVE_KEY) {
		None => Ok(Connective::And),
		Some(JsonValue::String(s)) if s == "and" => Ok(Connective::And),
		Some(JsonValue::String(s)) if s == "or" => Ok(Connective::Or),
		Some(other) => Err(ConditionError::MalformedExpression {
			reason: format!("invalid connective '{}', expected \"and\" or \"or\"", other),
		}),
	}
}

/// Splits a parameter key into (column, comparator). Tries the bare column
/// first, then `<column>_<alias>` suffixes, preferring the longest matching
/// column.
fn split_key(schema: &Schema, key: &str) -> Option<(String, Comparator)> {
	if schema.kind(key).is_some() {
		return Some((key.to_string(), Comparator::Eq));
	}

	let mut candidates: Vec<&str> = schema
		.columns()
		.filter(|column| {
			key.len() > column.len() + 1
				&& key.starts_with(column)
				&& key.as_bytes()[column.len()] == b'_'
		})
		.collect();
	candidates.sort_by_key(|column| std::cmp::Reverse(column.len()));

	for column in candidates {
		let alias = &key[column.len() + 1..];
		if let Some(comparator) = Comparator::from_alias(alias) {
			return Some((column.to_string(), comparator));
		}
	}
	None
}

fn to_raw_value(
	column: &str,
	comparator: Comparator,
	value: &JsonValue,
) -> Result<RawValue, ConditionError> {
	match value {
		JsonValue::Bool(b) => Ok(RawValue::Bool(*b)),
		JsonValue::Number(n) => Ok(RawValue::Number(n.to_string())),
		JsonValue::String(s) => Ok(RawValue::Str(s.clone())),
		other => Err(ConditionError::ValueType {
			column: column.to_string(),
			comparator,
			value: other.to_string(),
			reason: "unsupported parameter value type".to_string(),
		}),
	}
}
