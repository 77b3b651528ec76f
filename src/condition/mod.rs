//! The typed condition system: a capability trait implemented by each
//! condition kind, the built-in kinds, and the validator that checks raw
//! leaves against a schema.

mod boolean;
mod date;
mod number;
mod text;

pub use boolean::BooleanKind;
pub use date::DateKind;
pub use number::NumberKind;
pub use text::TextKind;

use crate::ast::{Comparator, Condition, RawCondition, RawValue, Value};
use crate::error::{ConditionError, ValueError};
use crate::schema::Schema;

/// A named family of conditions sharing a comparator set and a value-parsing
/// rule. Third-party kinds implement this trait and are attached to columns
/// through [`crate::schema::SchemaBuilder::column`]; the validator dispatches
/// purely through it and never special-cases the built-ins.
pub trait ConditionKind: Send + Sync {
	/// Name tag for the kind (e.g. `"text"`), also used by schema configs.
	fn kind_name(&self) -> &'static str;

	/// The comparators this kind accepts. Anything outside the set is an
	/// [`ConditionError::UnsupportedComparator`], never a value error.
	fn allowed_comparators(&self) -> &[Comparator];

	/// Parses and normalizes a raw value for this kind. The comparator is
	/// already known to be allowed when this is called.
	fn parse_value(
		&self,
		column: &str,
		comparator: Comparator,
		value: &RawValue,
	) -> Result<Value, ValueError>;
}

/// Validates a raw leaf against the schema: resolves the column's kind,
/// checks the comparator is legal for it, and parses the value.
///
/// Pure and side-effect-free; all failures are returned as values.
pub fn validate(raw: &RawCondition, schema: &Schema) -> Result<Condition, ConditionError> {
	let kind = schema
		.kind(&raw.column)
		.ok_or_else(|| ConditionError::UnknownColumn {
			column: raw.column.clone(),
		})?;

	if !kind.allowed_comparators().contains(&raw.comparator) {
		return Err(ConditionError::UnsupportedComparator {
			column: raw.column.clone(),
			comparator: raw.comparator,
			allowed: kind.allowed_comparators().to_vec(),
		});
	}

	let value = kind
		.parse_value(&raw.column, raw.comparator, &raw.value)
		.map_err(|error| ConditionError::ValueType {
			column: raw.column.clone(),
			comparator: raw.comparator,
			value: raw.value.to_string(),
			reason: error.to_string(),
		})?;

	Ok(Condition {
		column: raw.column.clone(),
		kind: kind.kind_name(),
		comparator: raw.comparator,
		value,
	})
}
