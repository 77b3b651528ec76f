//! `sift` is a safe filter-expression compiler: it parses a small boolean
//! filter language (or an equivalent flat parameter map) into a validated,
//! typed AST, then lowers that AST through a pluggable [`Encoder`] into a
//! backend-specific query fragment.
//!
//! Every column, comparator, and value is checked against a caller-supplied
//! [`Schema`] before any fragment is produced, so end-user filter input can
//! never name an undeclared column, use an off-kind comparator, or smuggle an
//! ill-typed value into a query.
//!
//! ```
//! use sift::{parse, Schema};
//!
//! let schema = Schema::builder()
//!     .boolean("active")
//!     .date("created_at")
//!     .build();
//!
//! let filter = parse(&schema, "active eq true and created_at after '2020-01-01'").unwrap();
//! assert_eq!(filter.condition_count(), 2);
//! ```
//!
//! The pipeline is pure and synchronous: a [`Schema`] built once can be
//! shared read-only across any number of concurrent parse calls.

pub mod ast;
pub mod builder;
pub mod condition;
pub mod encoder;
pub mod error;
pub mod params;
pub mod parsing;
pub mod schema;

pub use ast::{Comparator, Condition, Expression, Filter, RawCondition, RawValue, Value};
pub use builder::build;
pub use condition::{validate, BooleanKind, ConditionKind, DateKind, NumberKind, TextKind};
pub use encoder::{encode, Encoder};
pub use error::{ConditionError, FilterError, ParseError, ValueError};
pub use schema::{ColumnConfig, Schema, SchemaBuilder, SchemaConfig, SchemaConfigError};

/// Compiles filter source text into a validated [`Filter`].
///
/// Fails with [`FilterError::Parse`] on malformed text and
/// [`FilterError::Condition`] on the first schema violation, in source
/// order. No partial filter is ever returned.
pub fn parse(schema: &Schema, source: &str) -> Result<Filter, FilterError> {
	tracing::debug!("Parsing filter expression: '{}'", source);
	let raw = parsing::parse(source)?;
	let filter = builder::build(&raw, schema)?;
	Ok(filter)
}

/// Compiles a flat parameter map into a validated [`Filter`].
///
/// See [`params`] for the key convention; leaves are joined with `and`
/// unless the map's `connective` key says otherwise.
pub fn parse_params(
	schema: &Schema,
	params: &serde_json::Map<String, serde_json::Value>,
) -> Result<Filter, ConditionError> {
	tracing::debug!("Parsing filter params ({} entries)", params.len());
	params::parse_params(schema, params)
}
