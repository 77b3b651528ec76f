//! Grammar parser for the filter expression language.
//!
//! Turns source text into a tree of raw (column, comparator, value) leaves
//! joined by `and`/`or`/`not`, with parentheses overriding precedence.
//! No schema knowledge lives here: which comparators are legal for a column
//! and what shape its values take is the validator's job.

use winnow::{
	ascii::{digit1, space0, Caseless},
	combinator::{alt, delimited, eof, not, opt, preceded, separated},
	error::{ContextError, StrContext},
	prelude::*,
	token::{any, literal, one_of, take_while},
};

use crate::ast::{Comparator, Expression, RawCondition, RawValue};
use crate::error::ParseError;

/// --- Helper aliases ---
type Input<'a> = &'a str;
type ParserResult<T> = winnow::Result<T>;

/// Words that can never be used as column identifiers.
const RESERVED_WORDS: &[&str] = &["and", "or", "not", "true", "false"];

fn is_identifier_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Matches `word` case-insensitively, refusing to match inside a longer
/// identifier (so `not` never eats the head of a column named `notes`).
fn keyword<'a>(word: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
	(literal(Caseless(word)), not(one_of(is_identifier_char))).map(|(matched, ())| matched)
}

/// --- Parser functions ---
/// Parses boolean literals into `RawValue::Bool`
fn parse_boolean(input: &mut Input<'_>) -> ParserResult<RawValue> {
	alt((
		keyword("true").map(|_| RawValue::Bool(true)),
		keyword("false").map(|_| RawValue::Bool(false)),
	))
	.parse_next(input)
}

/// Parses decimal literals into `RawValue::Number`, keeping the lexical form.
/// Typing the number is deferred to the column's condition kind.
fn parse_number(input: &mut Input<'_>) -> ParserResult<RawValue> {
	let start_input = *input;
	let _ = (opt(one_of(['+', '-'])), digit1, opt(('.', digit1))).parse_next(input)?;
	let consumed_len = start_input.len() - input.len();
	let number_str = &start_input[..consumed_len];
	Ok(RawValue::Number(number_str.to_string()))
}

/// Parses string literals quoted with `'` or `"`; the quote character and the
/// backslash are escaped with a backslash.
fn parse_string(input: &mut Input<'_>) -> ParserResult<RawValue> {
	let quote: char = one_of(['\'', '"']).parse_next(input)?;
	let mut content = String::new();
	loop {
		let c: char = any.parse_next(input)?;
		if c == quote {
			return Ok(RawValue::Str(content));
		}
		if c == '\\' {
			let escaped: char = one_of([quote, '\\']).parse_next(input)?;
			content.push(escaped);
		} else {
			content.push(c);
		}
	}
}

/// Parses a column identifier into a string slice
fn parse_identifier<'a>(input: &mut Input<'a>) -> ParserResult<&'a str> {
	let start_input = *input;
	let first_char = one_of(|c: char| c.is_alphabetic() || c == '_').parse_next(input)?;
	let rest_chars: &str = take_while(0.., is_identifier_char).parse_next(input)?;
	let consumed_len = first_char.len_utf8() + rest_chars.len();
	let ident = &start_input[..consumed_len];

	// Check if the identifier is a reserved keyword
	if RESERVED_WORDS.iter().any(|word| ident.eq_ignore_ascii_case(word)) {
		let mut context = ContextError::new();
		context.push(StrContext::Label("keyword used as identifier"));
		return Err(context);
	}
	Ok(ident)
}

/// Parses any literal value (boolean, number, or quoted string)
/// Handles optional whitespace around the value
fn parse_literal(input: &mut Input<'_>) -> ParserResult<RawValue> {
	delimited(
		space0,
		alt((parse_boolean, parse_number, parse_string))
			.context(StrContext::Label("literal value")),
		space0,
	)
	.parse_next(input)
}

/// Parses a symbolic comparator token.
/// `>=` and `<=` must come before `>` and `<` or they are never reached.
fn symbolic_comparator(input: &mut Input<'_>) -> ParserResult<Comparator> {
	alt((
		literal("==").map(|_| Comparator::Eq),
		literal("!=").map(|_| Comparator::Ne),
		literal(">=").map(|_| Comparator::Gte),
		literal("<=").map(|_| Comparator::Lte),
		literal(">").map(|_| Comparator::Gt),
		literal("<").map(|_| Comparator::Lt),
	))
	.parse_next(input)
}

/// Parses a textual comparator alias (`eq`, `contains`, `before`, ...)
fn worded_comparator<'a>(input: &mut Input<'a>) -> ParserResult<Comparator> {
	let start_input = *input;
	let first_char = one_of(|c: char| c.is_alphabetic()).parse_next(input)?;
	let rest_chars: &str = take_while(0.., is_identifier_char).parse_next(input)?;
	let consumed_len = first_char.len_utf8() + rest_chars.len();
	let word = &start_input[..consumed_len];

	match Comparator::from_alias(word) {
		Some(comparator) => Ok(comparator),
		None => {
			let mut context = ContextError::new();
			context.push(StrContext::Label("comparator"));
			Err(context)
		}
	}
}

/// Parses a comparison operator, symbolic or textual
/// Handles optional whitespace around the operator
fn parse_comparator(input: &mut Input<'_>) -> ParserResult<Comparator> {
	delimited(
		space0,
		alt((symbolic_comparator, worded_comparator)).context(StrContext::Label("comparator")),
		space0,
	)
	.parse_next(input)
}

/// Parses a comparison leaf (e.g., `status eq 'active'`) into an
/// `Expression::Condition`
fn parse_condition(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	let (column, comparator, value) =
		(parse_identifier, parse_comparator, parse_literal).parse_next(input)?;

	Ok(Expression::Condition(RawCondition {
		column: column.to_string(),
		comparator,
		value,
	}))
}

/// Parses a parenthesized sub-expression
fn parse_group(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	delimited(
		(literal("("), space0),
		parse_expression,
		(space0, literal(")")),
	)
	.parse_next(input)
}

/// Parses a `not`-negated term
fn parse_not(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	preceded(keyword("not"), parse_term)
		.map(|child| Expression::Not(Box::new(child)))
		.parse_next(input)
}

/// Parses the highest precedence components: negations, parenthesized
/// expressions, and comparison leaves
fn parse_term(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	delimited(space0, alt((parse_not, parse_group, parse_condition)), space0).parse_next(input)
}

/// Parses a run of `and`-joined terms into a single n-ary `And` node
fn parse_and_expression(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	let mut children: Vec<Expression<RawCondition>> =
		separated(1.., parse_term, keyword("and")).parse_next(input)?;

	if children.len() == 1 {
		Ok(children.remove(0))
	} else {
		Ok(Expression::And(children))
	}
}

/// Parses a run of `or`-joined groups into a single n-ary `Or` node
fn parse_or_expression(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	let mut children: Vec<Expression<RawCondition>> =
		separated(1.., parse_and_expression, keyword("or")).parse_next(input)?;

	if children.len() == 1 {
		Ok(children.remove(0))
	} else {
		Ok(Expression::Or(children))
	}
}

/// Parses the entire expression, starting from the lowest precedence
fn parse_expression(input: &mut Input<'_>) -> ParserResult<Expression<RawCondition>> {
	delimited(space0, parse_or_expression, space0).parse_next(input)
}

/// Parses filter source text into a raw expression tree, anchored at EOF.
/// Empty input and trailing garbage both fail with the byte offset of the
/// failure.
pub fn parse(source: &str) -> Result<Expression<RawCondition>, ParseError> {
	let mut full_expression_parser = delimited(space0, parse_or_expression, (space0, eof));

	match full_expression_parser.parse(source) {
		Ok(expression) => Ok(expression),
		Err(err) => Err(ParseError {
			offset: err.offset(),
			message: err.inner().to_string(),
		}),
	}
}
