//! Turns a raw expression tree into a validated filter.

use crate::ast::{Expression, Filter, RawCondition};
use crate::condition::validate;
use crate::error::ConditionError;
use crate::schema::Schema;

/// Validates every leaf of the raw tree against the schema, preserving
/// structure and child order. Depth-first and fail-fast: the leftmost error
/// short-circuits the rest of the tree and no partial filter is ever
/// returned.
///
/// The grammar parser only produces well-shaped trees, but the params path
/// can hand this function arbitrary ones, so the ≥2-children invariant on
/// `And`/`Or` is re-checked here.
pub fn build(raw: &Expression<RawCondition>, schema: &Schema) -> Result<Filter, ConditionError> {
	match raw {
		Expression::Condition(leaf) => validate(leaf, schema).map(Expression::Condition),
		Expression::Not(child) => build(child, schema).map(|inner| Expression::Not(Box::new(inner))),
		Expression::And(children) => {
			check_connective_arity("and", children.len())?;
			build_children(children, schema).map(Expression::And)
		}
		Expression::Or(children) => {
			check_connective_arity("or", children.len())?;
			build_children(children, schema).map(Expression::Or)
		}
	}
}

fn build_children(
	children: &[Expression<RawCondition>],
	schema: &Schema,
) -> Result<Vec<Filter>, ConditionError> {
	children.iter().map(|child| build(child, schema)).collect()
}

fn check_connective_arity(connective: &str, arity: usize) -> Result<(), ConditionError> {
	if arity < 2 {
		return Err(ConditionError::MalformedExpression {
			reason: format!(
				"'{}' requires at least two children, got {}",
				connective, arity
			),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::{Comparator, RawValue, Value};

	fn schema() -> Schema {
		Schema::builder()
			.boolean("active")
			.number("age")
			.text("title")
			.build()
	}

	fn leaf(column: &str, comparator: Comparator, value: RawValue) -> Expression<RawCondition> {
		Expression::Condition(RawCondition {
			column: column.to_string(),
			comparator,
			value,
		})
	}

	#[test]
	fn test_build_preserves_structure_and_order() {
		let raw = Expression::Or(vec![
			leaf("active", Comparator::Eq, RawValue::Bool(true)),
			Expression::And(vec![
				leaf("age", Comparator::Gt, RawValue::Number("21".to_string())),
				Expression::Not(Box::new(leaf(
					"title",
					Comparator::Eq,
					RawValue::Str("x".to_string()),
				))),
			]),
		]);

		let filter = build(&raw, &schema()).unwrap();
		match filter {
			Expression::Or(children) => {
				assert_eq!(children.len(), 2);
				assert!(matches!(
					&children[0],
					Expression::Condition(condition)
						if condition.column == "active" && condition.value == Value::Bool(true)
				));
				assert!(matches!(&children[1], Expression::And(inner) if inner.len() == 2));
			}
			other => panic!("expected Or at the root, got {:?}", other),
		}
	}

	#[test]
	fn test_fail_fast_returns_the_leftmost_error() {
		// The second of three leaves is invalid; its error must be the sole
		// result, not an aggregate.
		let raw = Expression::And(vec![
			leaf("active", Comparator::Eq, RawValue::Bool(true)),
			leaf("ghost", Comparator::Eq, RawValue::Bool(true)),
			leaf("oops", Comparator::Eq, RawValue::Bool(true)),
		]);

		assert_eq!(
			build(&raw, &schema()),
			Err(ConditionError::UnknownColumn {
				column: "ghost".to_string()
			})
		);
	}

	#[test]
	fn test_undersized_connectives_are_malformed() {
		let single = Expression::And(vec![leaf("active", Comparator::Eq, RawValue::Bool(true))]);
		assert!(matches!(
			build(&single, &schema()),
			Err(ConditionError::MalformedExpression { .. })
		));

		let empty: Expression<RawCondition> = Expression::Or(vec![]);
		assert!(matches!(
			build(&empty, &schema()),
			Err(ConditionError::MalformedExpression { .. })
		));
	}

	#[test]
	fn test_arity_check_applies_to_nested_connectives() {
		let raw = Expression::And(vec![
			leaf("active", Comparator::Eq, RawValue::Bool(true)),
			Expression::Or(vec![leaf(
				"age",
				Comparator::Gt,
				RawValue::Number("1".to_string()),
			)]),
		]);
		assert!(matches!(
			build(&raw, &schema()),
			Err(ConditionError::MalformedExpression { .. })
		));
	}
}
