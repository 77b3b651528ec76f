//! Error types for the parse → validate → build pipeline.
//!
//! Every error is returned as a value; the pipeline is fail-fast and the
//! first error encountered is the sole result.

use thiserror::Error;

use crate::ast::Comparator;

/// Malformed expression text. Carries the byte offset of the failure within
/// the source string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
	pub offset: usize,
	pub message: String,
}

/// A schema-validation failure for a single condition or for the shape of the
/// expression tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
	#[error("unknown column '{column}'")]
	UnknownColumn { column: String },

	#[error(
		"comparator '{comparator}' is not valid for column '{column}' (allowed: {})",
		join_comparators(.allowed)
	)]
	UnsupportedComparator {
		column: String,
		comparator: Comparator,
		allowed: Vec<Comparator>,
	},

	#[error("invalid value '{value}' for column '{column}' ({comparator}): {reason}")]
	ValueType {
		column: String,
		comparator: Comparator,
		value: String,
		reason: String,
	},

	#[error("malformed filter expression: {reason}")]
	MalformedExpression { reason: String },
}

/// Umbrella error for the text entry point, which can fail either lexically
/// or semantically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error(transparent)]
	Condition(#[from] ConditionError),
}

/// A kind-internal value-parsing failure. The validator wraps it into
/// [`ConditionError::ValueType`] together with the offending column,
/// comparator, and raw value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValueError(String);

impl ValueError {
	pub fn new(reason: impl Into<String>) -> Self {
		Self(reason.into())
	}
}

fn join_comparators(allowed: &[Comparator]) -> String {
	allowed
		.iter()
		.map(|comparator| comparator.as_str())
		.collect::<Vec<_>>()
		.join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unsupported_comparator_message_lists_allowed_set() {
		let error = ConditionError::UnsupportedComparator {
			column: "active".to_string(),
			comparator: Comparator::Gt,
			allowed: vec![Comparator::Eq, Comparator::Ne],
		};
		assert_eq!(
			error.to_string(),
			"comparator 'gt' is not valid for column 'active' (allowed: eq, neq)"
		);
	}

	#[test]
	fn test_parse_error_message() {
		let error = ParseError {
			offset: 7,
			message: "expected literal".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"parse error at offset 7: expected literal"
		);
	}

	#[test]
	fn test_filter_error_is_transparent() {
		let error = FilterError::from(ConditionError::UnknownColumn {
			column: "ghost".to_string(),
		});
		assert_eq!(error.to_string(), "unknown column 'ghost'");
	}
}
