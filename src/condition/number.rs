//! The numeric condition kind.

use crate::ast::{Comparator, RawValue, Value};
use crate::condition::ConditionKind;
use crate::error::ValueError;

const NUMBER_COMPARATORS: &[Comparator] = &[
	Comparator::Eq,
	Comparator::Ne,
	Comparator::Gt,
	Comparator::Gte,
	Comparator::Lt,
	Comparator::Lte,
];

/// Numeric columns. Accepts numeric literals and numeric strings; an optional
/// allow-list restricts the accepted values for `eq`/`neq`.
#[derive(Debug, Clone, Default)]
pub struct NumberKind {
	allowed_values: Option<Vec<f64>>,
}

impl NumberKind {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts `eq`/`neq` values to an enumerated set.
	pub fn with_allowed_values(values: impl IntoIterator<Item = f64>) -> Self {
		Self {
			allowed_values: Some(values.into_iter().collect()),
		}
	}
}

impl ConditionKind for NumberKind {
	fn kind_name(&self) -> &'static str {
		"number"
	}

	fn allowed_comparators(&self) -> &[Comparator] {
		NUMBER_COMPARATORS
	}

	fn parse_value(
		&self,
		_column: &str,
		comparator: Comparator,
		value: &RawValue,
	) -> Result<Value, ValueError> {
		let text = match value {
			RawValue::Number(n) => n,
			RawValue::Str(s) => s,
			RawValue::Bool(_) => {
				return Err(ValueError::new(format!("expected a number, got '{}'", value)));
			}
		};

		let number: f64 = text
			.parse()
			.map_err(|_| ValueError::new(format!("'{}' is not a valid number", text)))?;

		// `f64::from_str` accepts "inf" and "NaN"; neither has a literal form
		// in the grammar, so admitting them would break rendering.
		if !number.is_finite() {
			return Err(ValueError::new(format!("'{}' is not a finite number", text)));
		}

		if matches!(comparator, Comparator::Eq | Comparator::Ne) {
			if let Some(allowed) = &self.allowed_values {
				if !allowed.contains(&number) {
					return Err(ValueError::new(format!(
						"{} is not one of the allowed values",
						number
					)));
				}
			}
		}

		Ok(Value::Number(number))
	}
}
