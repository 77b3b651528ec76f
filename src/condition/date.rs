//! The date condition kind.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::ast::{Comparator, RawValue, Value};
use crate::condition::ConditionKind;
use crate::error::ValueError;

const DATE_COMPARATORS: &[Comparator] = &[
	Comparator::Eq,
	Comparator::Ne,
	Comparator::Lt,
	Comparator::Gt,
	Comparator::Lte,
	Comparator::Gte,
];

/// Date and date-time columns, normalized to a timestamp. By default accepts
/// RFC 3339 (offset normalized to UTC), `YYYY-MM-DDTHH:MM:SS` with an
/// optional sub-second fraction, and `YYYY-MM-DD` (midnight); a custom
/// chrono format string replaces the
/// default set. The grammar's `before`/`after`/`on_or_before`/`on_or_after`
/// aliases map onto the ordering comparators.
#[derive(Debug, Clone, Default)]
pub struct DateKind {
	format: Option<String>,
}

impl DateKind {
	pub fn new() -> Self {
		Self::default()
	}

	/// Accepts only the given chrono format, tried first as a date-time and
	/// then as a date.
	pub fn with_format(format: impl Into<String>) -> Self {
		Self {
			format: Some(format.into()),
		}
	}

	fn parse_timestamp(&self, text: &str) -> Result<NaiveDateTime, ValueError> {
		if let Some(format) = &self.format {
			return NaiveDateTime::parse_from_str(text, format)
				.or_else(|_| {
					NaiveDate::parse_from_str(text, format).map(|date| date.and_time(NaiveTime::MIN))
				})
				.map_err(|_| {
					ValueError::new(format!("does not match the expected format '{}'", format))
				});
		}

		if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
			return Ok(date_time.naive_utc());
		}
		if let Ok(date_time) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
			return Ok(date_time);
		}
		if let Ok(date_time) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
			return Ok(date_time);
		}
		if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
			return Ok(date.and_time(NaiveTime::MIN));
		}
		Err(ValueError::new("not a valid ISO-8601 date or date-time"))
	}
}

impl ConditionKind for DateKind {
	fn kind_name(&self) -> &'static str {
		"date"
	}

	fn allowed_comparators(&self) -> &[Comparator] {
		DATE_COMPARATORS
	}

	fn parse_value(
		&self,
		_column: &str,
		_comparator: Comparator,
		value: &RawValue,
	) -> Result<Value, ValueError> {
		match value {
			RawValue::Str(s) => self.parse_timestamp(s).map(Value::Date),
			other => Err(ValueError::new(format!(
				"expected a quoted date, got '{}'",
				other
			))),
		}
	}
}
