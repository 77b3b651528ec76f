//! The text condition kind.

use std::collections::BTreeSet;

use regex::RegexBuilder;

use crate::ast::{Comparator, RawValue, Value};
use crate::condition::ConditionKind;
use crate::error::ValueError;

const TEXT_COMPARATORS: &[Comparator] = &[
	Comparator::Eq,
	Comparator::Ne,
	Comparator::Contains,
	Comparator::StartsWith,
	Comparator::EndsWith,
	Comparator::Matches,
];

/// `matches` patterns are validated, never executed here; these bounds keep a
/// hostile pattern from being expensive even to compile.
const MAX_PATTERN_LEN: usize = 512;
const PATTERN_SIZE_LIMIT: usize = 1 << 16;

/// String-valued columns. The raw value must already be a string; `matches`
/// values must additionally be valid, bounded regex patterns. An optional
/// allow-list restricts the values accepted for `eq`/`neq`.
#[derive(Debug, Clone, Default)]
pub struct TextKind {
	allowed_values: Option<BTreeSet<String>>,
}

impl TextKind {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts `eq`/`neq` values to an enumerated set.
	pub fn with_allowed_values<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			allowed_values: Some(values.into_iter().map(Into::into).collect()),
		}
	}

	fn check_pattern(&self, pattern: &str) -> Result<(), ValueError> {
		if pattern.len() > MAX_PATTERN_LEN {
			return Err(ValueError::new(format!(
				"pattern exceeds {} characters",
				MAX_PATTERN_LEN
			)));
		}
		RegexBuilder::new(pattern)
			.size_limit(PATTERN_SIZE_LIMIT)
			.build()
			.map_err(|error| ValueError::new(format!("invalid pattern: {}", error)))?;
		Ok(())
	}
}

impl ConditionKind for TextKind {
	fn kind_name(&self) -> &'static str {
		"text"
	}

	fn allowed_comparators(&self) -> &[Comparator] {
		TEXT_COMPARATORS
	}

	fn parse_value(
		&self,
		_column: &str,
		comparator: Comparator,
		value: &RawValue,
	) -> Result<Value, ValueError> {
		let text = match value {
			RawValue::Str(s) => s,
			other => {
				return Err(ValueError::new(format!("expected text, got '{}'", other)));
			}
		};

		if comparator == Comparator::Matches {
			self.check_pattern(text)?;
		} else if matches!(comparator, Comparator::Eq | Comparator::Ne) {
			if let Some(allowed) = &self.allowed_values {
				if !allowed.contains(text) {
					return Err(ValueError::new(format!(
						"'{}' is not one of the allowed values",
						text
					)));
				}
			}
		}

		Ok(Value::Text(text.clone()))
	}
}
