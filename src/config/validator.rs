//! Field-level validation of parsed ConfigMaps.
//!
//! The configuration provider already rejects values that do not fit the typed map. A
//! [`Validator`] is the pluggable second pass that checks field semantics; services without
//! one accept every parsed map.

// crates.io
use jsonschema::{Draft, paths::{Location, LocationSegment}};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	config::{ConfigSection, ConfigValues},
	model::AuthorityId,
};

/// Message used when a failure carries no field detail.
const GENERIC_MESSAGE: &str = "Provider configuration is invalid.";

/// One failed field check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
	/// Dotted path of the offending field; empty for the whole map.
	pub field: String,
	/// Human-readable reason.
	pub message: String,
}
impl FieldViolation {
	/// Creates a violation for the provided field.
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self { field: field.into(), message: message.into() }
	}

	/// Prefixes the field path with the section label.
	pub fn within(mut self, section: ConfigSection) -> Self {
		self.field = if self.field.is_empty() {
			section.as_str().into()
		} else if self.field.starts_with('[') {
			format!("{section}{}", self.field)
		} else {
			format!("{section}.{}", self.field)
		};

		self
	}
}
impl Display for FieldViolation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.field.is_empty() {
			f.write_str(&self.message)
		} else {
			write!(f, "{}: {}", self.field, self.message)
		}
	}
}

/// Validation failure carrying per-field messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
	/// Individual failed checks; empty when only a generic message applies.
	pub violations: Vec<FieldViolation>,
}
impl ValidationError {
	/// Builds an error from a list of violations.
	pub fn new(violations: Vec<FieldViolation>) -> Self {
		Self { violations }
	}

	/// Builds an error holding a single violation.
	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self { violations: vec![FieldViolation::new(field, message)] }
	}

	/// Prefixes every violation with the section label.
	pub fn within(self, section: ConfigSection) -> Self {
		Self { violations: self.violations.into_iter().map(|v| v.within(section)).collect() }
	}

	/// Returns true when no field detail is attached.
	pub fn is_generic(&self) -> bool {
		self.violations.is_empty()
	}

	/// Returns the violations reported for one field path.
	pub fn field(&self, field: &str) -> impl Iterator<Item = &FieldViolation> {
		self.violations.iter().filter(move |v| v.field == field)
	}
}
impl Display for ValidationError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.violations.is_empty() {
			return f.write_str(GENERIC_MESSAGE);
		}

		f.write_str("Provider configuration is invalid: ")?;

		for (idx, violation) in self.violations.iter().enumerate() {
			if idx > 0 {
				f.write_str("; ")?;
			}

			write!(f, "{violation}")?;
		}

		f.write_str(".")
	}
}
impl StdError for ValidationError {}

/// Normalized map handed to a [`Validator`].
#[derive(Clone, Copy, Debug)]
pub struct ValidationTarget<'a> {
	/// Authority owning the map.
	pub authority: &'a AuthorityId,
	/// Section of the declaration being validated.
	pub section: ConfigSection,
	/// Normalized values.
	pub values: &'a ConfigValues,
	/// Schema published by the authority for this section.
	pub schema: &'a Value,
}

/// Pluggable field-level validator.
pub trait Validator
where
	Self: Send + Sync,
{
	/// Returns every failed check; an empty list means the map is valid.
	fn validate(&self, target: &ValidationTarget<'_>) -> Vec<FieldViolation>;
}

/// Validator that checks normalized maps against the authority's published JSON Schema.
#[derive(Debug, Default)]
pub struct SchemaValidator;
impl Display for SchemaValidator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("schema-validator")
	}
}
impl Validator for SchemaValidator {
	fn validate(&self, target: &ValidationTarget<'_>) -> Vec<FieldViolation> {
		let schema = match jsonschema::options().with_draft(Draft::Draft202012).build(target.schema)
		{
			Ok(schema) => schema,
			Err(e) => {
				return vec![FieldViolation::new("", format!("Schema cannot be compiled: {e}"))];
			},
		};
		let instance = Value::Object(target.values.clone());

		schema
			.iter_errors(&instance)
			.map(|e| FieldViolation::new(field_path(e.instance_path()), e.to_string()))
			.collect()
	}
}

/// Renders a JSON pointer (`/scopes/1`) as a dotted field path (`scopes[1]`).
fn field_path(location: &Location) -> String {
	let mut path = String::new();

	for segment in location {
		match segment {
			LocationSegment::Index(idx) => path.push_str(&format!("[{idx}]")),
			LocationSegment::Property(name) => {
				if !path.is_empty() {
					path.push('.');
				}

				path.push_str(&name);
			},
		}
	}

	path
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn authority() -> AuthorityId {
		AuthorityId::new("oidc").expect("Authority fixture should be valid.")
	}

	#[test]
	fn violations_are_prefixed_with_the_section() {
		let err = ValidationError::new(vec![
			FieldViolation::new("client_id", "Must not be empty."),
			FieldViolation::new("", "Unreadable."),
			FieldViolation::new("[0]", "Bad entry."),
		])
		.within(ConfigSection::Configuration);
		let fields: Vec<_> = err.violations.iter().map(|v| v.field.as_str()).collect();

		assert_eq!(fields, vec!["configuration.client_id", "configuration", "configuration[0]"]);
		assert_eq!(err.field("configuration.client_id").count(), 1);
	}

	#[test]
	fn display_lists_every_violation_or_falls_back() {
		let err = ValidationError::new(vec![
			FieldViolation::new("settings.name", "Too short"),
			FieldViolation::new("configuration.url", "Missing"),
		]);

		assert_eq!(
			err.to_string(),
			"Provider configuration is invalid: settings.name: Too short; configuration.url: Missing."
		);
		assert_eq!(ValidationError::default().to_string(), GENERIC_MESSAGE);
		assert!(ValidationError::default().is_generic());
	}

	#[test]
	fn schema_validator_reports_schema_mismatches() {
		let schema = json!({
			"$schema": crate::config::SCHEMA_DIALECT,
			"type": "object",
			"properties": { "client_id": { "type": "string", "minLength": 1 } },
			"required": ["client_id"],
		});
		let authority = authority();
		let valid = json!({ "client_id": "acme" });
		let invalid = json!({ "client_id": "" });
		let (Value::Object(valid), Value::Object(invalid)) = (valid, invalid) else {
			panic!("Fixtures must be JSON objects.");
		};
		let check = |values: &ConfigValues| {
			SchemaValidator.validate(&ValidationTarget {
				authority: &authority,
				section: ConfigSection::Configuration,
				values,
				schema: &schema,
			})
		};

		assert!(check(&valid).is_empty());

		let violations = check(&invalid);

		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].field, "client_id");
	}

	#[test]
	fn schema_violations_carry_the_instance_path() {
		let schema = json!({
			"$schema": crate::config::SCHEMA_DIALECT,
			"type": "object",
			"properties": {
				"scopes": { "type": "array", "items": { "type": "string" } },
				"claims": {
					"type": "object",
					"properties": { "email": { "type": "boolean" } },
				},
			},
		});
		let authority = authority();
		let Value::Object(values) = json!({ "scopes": ["openid", 7], "claims": { "email": "yes" } })
		else {
			panic!("Fixture must be a JSON object.");
		};
		let mut fields: Vec<_> = SchemaValidator
			.validate(&ValidationTarget {
				authority: &authority,
				section: ConfigSection::Configuration,
				values: &values,
				schema: &schema,
			})
			.into_iter()
			.map(|v| v.within(ConfigSection::Configuration).field)
			.collect();

		fields.sort();

		assert_eq!(fields, vec!["configuration.claims.email", "configuration.scopes[1]"]);
	}
}
