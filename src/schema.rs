//! The caller-supplied schema: which columns are filterable and what kind of
//! condition each one takes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::condition::{BooleanKind, ConditionKind, DateKind, NumberKind, TextKind};

/// Immutable mapping from column name to condition kind. Constructed once via
/// [`SchemaBuilder`] or [`Schema::from_config`], then shared read-only across
/// any number of concurrent parse calls.
#[derive(Clone, Default)]
pub struct Schema {
	columns: HashMap<String, Arc<dyn ConditionKind>>,
}

impl Schema {
	pub fn builder() -> SchemaBuilder {
		SchemaBuilder::default()
	}

	/// Resolves the condition kind declared for a column, if any.
	pub fn kind(&self, column: &str) -> Option<&dyn ConditionKind> {
		self.columns.get(column).map(Arc::as_ref)
	}

	/// Iterates over the declared column names, in no particular order.
	pub fn columns(&self) -> impl Iterator<Item = &str> {
		self.columns.keys().map(String::as_str)
	}

	/// Builds a schema from a deserialized [`SchemaConfig`] mapping. Only the
	/// built-in kinds can be named in a config; third-party kinds go through
	/// [`SchemaBuilder::column`].
	pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaConfigError> {
		let mut builder = Self::builder();
		for (column, column_config) in config {
			let kind = build_kind(column, column_config)?;
			builder.columns.insert(column.clone(), kind);
		}
		Ok(builder.build())
	}
}

impl fmt::Debug for Schema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (column, kind) in &self.columns {
			map.entry(column, &kind.kind_name());
		}
		map.finish()
	}
}

/// Builder for [`Schema`], with one convenience method per built-in kind.
#[derive(Default)]
pub struct SchemaBuilder {
	columns: HashMap<String, Arc<dyn ConditionKind>>,
}

impl SchemaBuilder {
	/// Declares a column with an arbitrary condition kind. This is the seam
	/// for third-party kinds.
	pub fn column(mut self, name: impl Into<String>, kind: impl ConditionKind + 'static) -> Self {
		self.columns.insert(name.into(), Arc::new(kind));
		self
	}

	pub fn boolean(self, name: impl Into<String>) -> Self {
		self.column(name, BooleanKind)
	}

	pub fn text(self, name: impl Into<String>) -> Self {
		self.column(name, TextKind::new())
	}

	pub fn text_enum<I, S>(self, name: impl Into<String>, allowed_values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.column(name, TextKind::with_allowed_values(allowed_values))
	}

	pub fn date(self, name: impl Into<String>) -> Self {
		self.column(name, DateKind::new())
	}

	pub fn date_format(self, name: impl Into<String>, format: impl Into<String>) -> Self {
		self.column(name, DateKind::with_format(format))
	}

	pub fn number(self, name: impl Into<String>) -> Self {
		self.column(name, NumberKind::new())
	}

	pub fn build(self) -> Schema {
		Schema {
			columns: self.columns,
		}
	}
}

/// Declarative schema description: column name to kind name plus
/// kind-specific options. Deserializable from JSON-ish sources, e.g.:
///
/// ```json
/// {
///   "state": { "kind": "text", "options": { "allowed_values": ["draft", "published"] } },
///   "due":   { "kind": "date", "options": { "format": "%d/%m/%Y" } },
///   "active": { "kind": "boolean" }
/// }
/// ```
pub type SchemaConfig = std::collections::BTreeMap<String, ColumnConfig>;

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
	pub kind: String,
	#[serde(default)]
	pub options: serde_json::Map<String, serde_json::Value>,
}

/// A schema config that names an unknown kind or carries a malformed option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaConfigError {
	#[error("unknown condition kind '{kind}' for column '{column}'")]
	UnknownKind { column: String, kind: String },
	#[error("invalid option for column '{column}': {reason}")]
	InvalidOption { column: String, reason: String },
}

fn build_kind(
	column: &str,
	config: &ColumnConfig,
) -> Result<Arc<dyn ConditionKind>, SchemaConfigError> {
	let invalid_option = |reason: String| SchemaConfigError::InvalidOption {
		column: column.to_string(),
		reason,
	};

	for key in config.options.keys() {
		let known = match config.kind.as_str() {
			"text" | "number" => key == "allowed_values",
			"date" => key == "format",
			_ => false,
		};
		if !known {
			return Err(invalid_option(format!("unknown option '{}'", key)));
		}
	}

	match config.kind.as_str() {
		"boolean" => Ok(Arc::new(BooleanKind)),
		"text" => match config.options.get("allowed_values") {
			None => Ok(Arc::new(TextKind::new())),
			Some(value) => {
				let values: Vec<String> = serde_json::from_value(value.clone()).map_err(|_| {
					invalid_option("'allowed_values' must be an array of strings".to_string())
				})?;
				Ok(Arc::new(TextKind::with_allowed_values(values)))
			}
		},
		"date" => match config.options.get("format") {
			None => Ok(Arc::new(DateKind::new())),
			Some(value) => {
				let format = value.as_str().ok_or_else(|| {
					invalid_option("'format' must be a string".to_string())
				})?;
				Ok(Arc::new(DateKind::with_format(format)))
			}
		},
		"number" => match config.options.get("allowed_values") {
			None => Ok(Arc::new(NumberKind::new())),
			Some(value) => {
				let values: Vec<f64> = serde_json::from_value(value.clone()).map_err(|_| {
					invalid_option("'allowed_values' must be an array of numbers".to_string())
				})?;
				Ok(Arc::new(NumberKind::with_allowed_values(values)))
			}
		},
		other => Err(SchemaConfigError::UnknownKind {
			column: column.to_string(),
			kind: other.to_string(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_builder_declares_columns() {
		let schema = Schema::builder()
			.boolean("active")
			.text("title")
			.date("created_at")
			.number("age")
			.build();
		assert_eq!(schema.kind("active").unwrap().kind_name(), "boolean");
		assert_eq!(schema.kind("title").unwrap().kind_name(), "text");
		assert_eq!(schema.kind("created_at").unwrap().kind_name(), "date");
		assert_eq!(schema.kind("age").unwrap().kind_name(), "number");
		assert!(schema.kind("ghost").is_none());
	}

	#[test]
	fn test_from_config() {
		let config: SchemaConfig = serde_json::from_value(json!({
			"state": { "kind": "text", "options": { "allowed_values": ["draft", "published"] } },
			"due": { "kind": "date", "options": { "format": "%d/%m/%Y" } },
			"active": { "kind": "boolean" }
		}))
		.unwrap();

		let schema = Schema::from_config(&config).unwrap();
		assert_eq!(schema.kind("state").unwrap().kind_name(), "text");
		assert_eq!(schema.kind("due").unwrap().kind_name(), "date");
		assert_eq!(schema.kind("active").unwrap().kind_name(), "boolean");
	}

	#[test]
	fn test_from_config_rejects_unknown_kind() {
		let config: SchemaConfig = serde_json::from_value(json!({
			"mystery": { "kind": "uuid" }
		}))
		.unwrap();
		assert!(matches!(
			Schema::from_config(&config),
			Err(SchemaConfigError::UnknownKind { column, kind })
				if column == "mystery" && kind == "uuid"
		));
	}

	#[test]
	fn test_from_config_rejects_malformed_options() {
		let config: SchemaConfig = serde_json::from_value(json!({
			"state": { "kind": "text", "options": { "allowed_values": "draft" } }
		}))
		.unwrap();
		assert!(matches!(
			Schema::from_config(&config),
			Err(SchemaConfigError::InvalidOption { column, .. }) if column == "state"
		));

		let config: SchemaConfig = serde_json::from_value(json!({
			"active": { "kind": "boolean", "options": { "format": "x" } }
		}))
		.unwrap();
		assert!(matches!(
			Schema::from_config(&config),
			Err(SchemaConfigError::InvalidOption { .. })
		));
	}
}
