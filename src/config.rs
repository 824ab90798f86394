//! Typed, self-describing provider settings and configuration maps.
//!
//! A [`ConfigMap`] is the strongly typed view of one of the two generic maps a provider
//! declaration carries: the *settings* map (provider-agnostic behavior such as linking or
//! persistence flags) and the *configuration* map (protocol parameters and secrets). Each
//! authority pins one type per section, publishes its defaults, and exposes a JSON Schema
//! (draft 2020-12) through [`ConfigurableProperties`].
//!
//! Raw maps are normalized by overlaying them on the authority defaults and re-serializing
//! the typed value, so unknown keys are dropped and omitted keys take their default.
//! Normalization is idempotent.

pub mod provider;
pub mod runtime;
pub mod validator;

pub use provider::*;
pub use runtime::*;
pub use validator::*;

// crates.io
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
// self
use crate::{_prelude::*, model::AuthorityId};

/// Generic JSON object map persisted for the settings and configuration sections.
pub type ConfigValues = Map<String, Value>;

/// JSON Schema dialect advertised by every generated schema.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// The two ConfigMap sections a declaration carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSection {
	/// Provider-agnostic behavioral flags.
	Settings,
	/// Protocol-specific parameters and secrets.
	Configuration,
}
impl ConfigSection {
	/// Returns a stable label suitable for field paths and messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			ConfigSection::Settings => "settings",
			ConfigSection::Configuration => "configuration",
		}
	}
}
impl Display for ConfigSection {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Typed settings bag specific to one authority.
pub trait ConfigMap
where
	Self: 'static + Clone + Debug + Default + Send + Sync + Serialize + DeserializeOwned,
{
	/// Stable identifier of the map shape; used as the schema `$id` suffix.
	const RESOURCE_ID: &'static str;

	/// Returns the JSON Schema describing this map.
	fn schema() -> Value;

	/// Serializes the map into its generic object form.
	fn to_values(&self) -> Result<ConfigValues, ValidationError> {
		match serde_json::to_value(self) {
			Ok(Value::Object(values)) => Ok(values),
			Ok(_) => Err(ValidationError::single("", "Config map must serialize to a JSON object.")),
			Err(e) => Err(ValidationError::single("", e.to_string())),
		}
	}

	/// Parses a generic object form, reporting the failing field path.
	fn from_values(values: &ConfigValues) -> Result<Self, ValidationError> {
		serde_path_to_error::deserialize(Value::Object(values.clone())).map_err(|e| {
			let path = e.path().to_string();
			let field = if path == "." { String::new() } else { path };

			ValidationError::single(field, e.into_inner().to_string())
		})
	}

	/// Overlays raw values on `base` and parses the result; `null` keeps the base value.
	fn merge(base: &Self, raw: &ConfigValues) -> Result<Self, ValidationError> {
		let mut merged = base.to_values()?;

		for (key, value) in raw {
			if !value.is_null() {
				merged.insert(key.clone(), value.clone());
			}
		}

		Self::from_values(&merged)
	}
}

/// Schema endpoint payload describing one section of an authority's configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigurableProperties {
	/// Authority that owns the schema.
	pub authority: AuthorityId,
	/// Section the schema describes.
	pub section: ConfigSection,
	/// JSON Schema (draft 2020-12).
	pub schema: Value,
	/// Default values published by the authority.
	pub defaults: ConfigValues,
}

/// Builds an object schema for a ConfigMap.
pub fn schema_for_object(resource_id: &str, title: &str, properties: Value) -> Value {
	json!({
		"$schema": SCHEMA_DIALECT,
		"$id": format!("urn:provider-registry:config:{resource_id}"),
		"title": title,
		"type": "object",
		"properties": properties,
	})
}

/// Returns a JSON schema for strings.
pub fn schema_for_string(description: &str) -> Value {
	json!({ "type": "string", "description": description })
}

/// Returns a JSON schema for optional (nullable) strings.
pub fn schema_for_optional_string(description: &str) -> Value {
	json!({ "type": ["string", "null"], "description": description })
}

/// Returns a JSON schema for booleans.
pub fn schema_for_boolean(description: &str) -> Value {
	json!({ "type": "boolean", "description": description })
}

/// Returns a JSON schema for non-negative integers.
pub fn schema_for_integer(description: &str) -> Value {
	json!({ "type": "integer", "minimum": 0, "description": description })
}

/// Returns a JSON schema for string arrays.
pub fn schema_for_string_array(description: &str) -> Value {
	json!({ "type": "array", "items": { "type": "string" }, "description": description })
}
