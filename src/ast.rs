//! This module defines the abstract syntax tree for filter expressions,
//! both before and after schema validation.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The closed lexical set of comparison operators the grammar accepts.
///
/// The lexer accepts every member; whether a comparator is legal for a given
/// column is decided later by the column's condition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
	Contains,
	StartsWith,
	EndsWith,
	Matches,
}

impl Comparator {
	/// Resolves a lexical token (symbolic or textual alias) into a comparator.
	pub fn from_alias(token: &str) -> Option<Self> {
		match token {
			"eq" | "==" => Some(Self::Eq),
			"neq" | "ne" | "!=" => Some(Self::Ne),
			"gt" | ">" | "after" => Some(Self::Gt),
			"gte" | ">=" | "on_or_after" => Some(Self::Gte),
			"lt" | "<" | "before" => Some(Self::Lt),
			"lte" | "<=" | "on_or_before" => Some(Self::Lte),
			"contains" => Some(Self::Contains),
			"starts_with" => Some(Self::StartsWith),
			"ends_with" => Some(Self::EndsWith),
			"matches" => Some(Self::Matches),
			_ => None,
		}
	}

	/// Canonical textual alias, used when rendering a filter back to text.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Eq => "eq",
			Self::Ne => "neq",
			Self::Gt => "gt",
			Self::Gte => "gte",
			Self::Lt => "lt",
			Self::Lte => "lte",
			Self::Contains => "contains",
			Self::StartsWith => "starts_with",
			Self::EndsWith => "ends_with",
			Self::Matches => "matches",
		}
	}
}

impl fmt::Display for Comparator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An untyped literal as produced by the lexer or the params path.
///
/// Numbers stay in lexical form; conversion to a concrete numeric type is
/// done by the condition kind that owns the column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
	Bool(bool),
	Number(String),
	Str(String),
}

impl fmt::Display for RawValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{}", b),
			Self::Number(n) => f.write_str(n),
			Self::Str(s) => f.write_str(s),
		}
	}
}

/// An unvalidated (column, comparator, value) triple.
///
/// Produced by the grammar parser or the params ingestor; never handed to an
/// encoder directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCondition {
	pub column: String,
	pub comparator: Comparator,
	pub value: RawValue,
}

/// A typed value as normalized by a condition kind.
///
/// `Json` is the escape hatch for third-party kinds that normalize to their
/// own representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
	Bool(bool),
	Text(String),
	Date(NaiveDateTime),
	Number(f64),
	Json(serde_json::Value),
}

impl fmt::Display for Value {
	/// Renders the value as a source literal that re-parses to the same value.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{}", b),
			Self::Number(n) => write!(f, "{}", n),
			Self::Text(s) => write_quoted(f, s),
			// `%.f` prints the sub-second fraction only when it is nonzero
			Self::Date(dt) => write_quoted(f, &dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
			Self::Json(v) => write_quoted(f, &v.to_string()),
		}
	}
}

/// A single validated comparison. The comparator is guaranteed to be a member
/// of the kind's allowed set and the value is well-typed for the kind; this
/// pairing is the type-safety boundary the crate exists to enforce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
	pub column: String,
	pub kind: &'static str,
	pub comparator: Comparator,
	pub value: Value,
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {}", self.column, self.comparator, self.value)
	}
}

/// A boolean-connective tree over condition leaves.
///
/// Generic over the leaf type: the parser produces `Expression<RawCondition>`,
/// the builder turns it into `Expression<Condition>`. And/Or carry at least
/// two children after parsing; the builder re-checks that invariant for trees
/// arriving from outside the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression<C> {
	And(Vec<Expression<C>>),
	Or(Vec<Expression<C>>),
	Not(Box<Expression<C>>),
	Condition(C),
}

/// A fully validated filter, the only artifact ever handed to an encoder.
pub type Filter = Expression<Condition>;

impl<C> Expression<C> {
	/// Number of condition leaves in the tree.
	pub fn condition_count(&self) -> usize {
		match self {
			Self::Condition(_) => 1,
			Self::Not(child) => child.condition_count(),
			Self::And(children) | Self::Or(children) => {
				children.iter().map(Self::condition_count).sum()
			}
		}
	}
}

impl<C: fmt::Display> Expression<C> {
	/// Writes a child operand, parenthesizing anything that is not a leaf so
	/// the rendered text re-parses to the same tree shape.
	fn write_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Condition(_) => write!(f, "{}", self),
			_ => write!(f, "({})", self),
		}
	}
}

impl<C: fmt::Display> fmt::Display for Expression<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Condition(condition) => write!(f, "{}", condition),
			Self::Not(child) => {
				f.write_str("not ")?;
				child.write_operand(f)
			}
			Self::And(children) => write_connective(f, children, " and "),
			Self::Or(children) => write_connective(f, children, " or "),
		}
	}
}

fn write_connective<C: fmt::Display>(
	f: &mut fmt::Formatter<'_>,
	children: &[Expression<C>],
	separator: &str,
) -> fmt::Result {
	for (index, child) in children.iter().enumerate() {
		if index > 0 {
			f.write_str(separator)?;
		}
		child.write_operand(f)?;
	}
	Ok(())
}

/// Quotes a string literal with single quotes, escaping the quote character
/// and the backslash.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
	use fmt::Write;

	f.write_char('\'')?;
	for c in s.chars() {
		if c == '\'' || c == '\\' {
			f.write_char('\\')?;
		}
		f.write_char(c)?;
	}
	f.write_char('\'')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_comparator_aliases() {
		assert_eq!(Comparator::from_alias("eq"), Some(Comparator::Eq));
		assert_eq!(Comparator::from_alias("=="), Some(Comparator::Eq));
		assert_eq!(Comparator::from_alias("neq"), Some(Comparator::Ne));
		assert_eq!(Comparator::from_alias("before"), Some(Comparator::Lt));
		assert_eq!(Comparator::from_alias("after"), Some(Comparator::Gt));
		assert_eq!(Comparator::from_alias("on_or_before"), Some(Comparator::Lte));
		assert_eq!(Comparator::from_alias("on_or_after"), Some(Comparator::Gte));
		assert_eq!(Comparator::from_alias("bogus"), None);
	}

	#[test]
	fn test_canonical_alias_round_trips() {
		for comparator in [
			Comparator::Eq,
			Comparator::Ne,
			Comparator::Gt,
			Comparator::Gte,
			Comparator::Lt,
			Comparator::Lte,
			Comparator::Contains,
			Comparator::StartsWith,
			Comparator::EndsWith,
			Comparator::Matches,
		] {
			assert_eq!(Comparator::from_alias(comparator.as_str()), Some(comparator));
		}
	}

	#[test]
	fn test_condition_count() {
		let leaf = |column: &str| {
			Expression::Condition(RawCondition {
				column: column.to_string(),
				comparator: Comparator::Eq,
				value: RawValue::Bool(true),
			})
		};
		let tree = Expression::Or(vec![
			leaf("a"),
			Expression::And(vec![leaf("b"), Expression::Not(Box::new(leaf("c")))]),
		]);
		assert_eq!(tree.condition_count(), 3);
	}

	#[test]
	fn test_display_quotes_and_escapes_text() {
		let condition = Condition {
			column: "title".to_string(),
			kind: "text",
			comparator: Comparator::Contains,
			value: Value::Text("it's a \\ test".to_string()),
		};
		assert_eq!(condition.to_string(), r"title contains 'it\'s a \\ test'");
	}

	#[test]
	fn test_display_date_keeps_fraction_only_when_nonzero() {
		let render = |s: &str| {
			let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap();
			Value::Date(dt).to_string()
		};
		assert_eq!(render("2020-01-01T00:00:00"), "'2020-01-01T00:00:00'");
		assert_eq!(render("2020-01-01T00:00:00.500"), "'2020-01-01T00:00:00.500'");
	}

	#[test]
	fn test_display_parenthesizes_groups() {
		let leaf = |column: &str| {
			Expression::Condition(Condition {
				column: column.to_string(),
				kind: "boolean",
				comparator: Comparator::Eq,
				value: Value::Bool(true),
			})
		};
		let tree = Expression::Or(vec![
			leaf("a"),
			Expression::And(vec![leaf("b"), leaf("c")]),
		]);
		assert_eq!(tree.to_string(), "a eq true or (b eq true and c eq true)");

		let negated = Expression::Not(Box::new(leaf("a")));
		assert_eq!(negated.to_string(), "not a eq true");
	}
}
