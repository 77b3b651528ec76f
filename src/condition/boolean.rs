//! The boolean condition kind.

use crate::ast::{Comparator, RawValue, Value};
use crate::condition::ConditionKind;
use crate::error::ValueError;

const BOOLEAN_COMPARATORS: &[Comparator] = &[Comparator::Eq, Comparator::Ne];

/// Two-valued columns. Accepts the literals `true`/`false` and their string
/// forms; anything else is a value error.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanKind;

impl ConditionKind for BooleanKind {
	fn kind_name(&self) -> &'static str {
		"boolean"
	}

	fn allowed_comparators(&self) -> &[Comparator] {
		BOOLEAN_COMPARATORS
	}

	fn parse_value(
		&self,
		_column: &str,
		_comparator: Comparator,
		value: &RawValue,
	) -> Result<Value, ValueError> {
		match value {
			RawValue::Bool(b) => Ok(Value::Bool(*b)),
			RawValue::Str(s) if s == "true" => Ok(Value::Bool(true)),
			RawValue::Str(s) if s == "false" => Ok(Value::Bool(false)),
			other => Err(ValueError::new(format!(
				"expected a boolean, got '{}'",
				other
			))),
		}
	}
}
