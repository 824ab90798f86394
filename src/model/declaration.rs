//! Persisted provider declarations and the caller payload used to write them.

// self
use crate::{
	_prelude::*,
	config::ConfigValues,
	model::{AuthorityId, ProviderId, RealmId, ResourceType},
};

/// Persisted description of one configured provider instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderDeclaration {
	/// Resource kind; `(type, provider)` is unique across the store.
	#[serde(rename = "type")]
	pub resource_type: ResourceType,
	/// Authority implementing the provider; immutable after creation.
	pub authority: AuthorityId,
	/// Provider identifier.
	pub provider: ProviderId,
	/// Owning realm; immutable after creation.
	pub realm: RealmId,
	/// Display name, unique per realm (case-insensitive).
	pub name: String,
	/// Optional free-form description.
	#[serde(default)]
	pub description: Option<String>,
	/// Localized titles keyed by language tag.
	#[serde(default)]
	pub titles: BTreeMap<String, String>,
	/// Localized descriptions keyed by language tag.
	#[serde(default)]
	pub descriptions: BTreeMap<String, String>,
	/// Normalized settings map.
	#[serde(default)]
	pub settings: ConfigValues,
	/// Normalized configuration map.
	#[serde(default)]
	pub configuration: ConfigValues,
	/// Monotonic version; `None` for system providers.
	#[serde(default)]
	pub version: Option<u32>,
	/// Declaration-level switch read by registration checks.
	pub enabled: bool,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Last modification instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}
impl ProviderDeclaration {
	/// Returns true when the name matches case-insensitively.
	pub fn has_name(&self, name: &str) -> bool {
		self.name.to_lowercase() == name.to_lowercase()
	}

	/// Returns true when the query appears in the id, name, or description.
	pub fn matches(&self, query: &str) -> bool {
		let query = query.to_lowercase();

		self.provider.to_lowercase().contains(&query)
			|| self.name.to_lowercase().contains(&query)
			|| self.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&query))
	}
}

/// Caller-supplied payload for creating or updating a declaration.
///
/// Absent fields mean "unset" on add and "unchanged" on update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderDraft {
	/// Authority implementing the provider; required on add.
	pub authority: Option<AuthorityId>,
	/// Provider identifier; must match the target on update.
	pub provider: Option<ProviderId>,
	/// Realm; must match the target realm when present.
	pub realm: Option<RealmId>,
	/// Display name; defaults to the provider id on add.
	pub name: Option<String>,
	/// Optional free-form description.
	pub description: Option<String>,
	/// Localized titles keyed by language tag.
	pub titles: BTreeMap<String, String>,
	/// Localized descriptions keyed by language tag.
	pub descriptions: BTreeMap<String, String>,
	/// Raw settings map.
	pub settings: ConfigValues,
	/// Raw configuration map.
	pub configuration: ConfigValues,
	/// Caller's view of the current version.
	pub version: Option<u32>,
	/// Enabled flag; defaults to `true` on add.
	pub enabled: Option<bool>,
}
impl ProviderDraft {
	/// Creates a draft targeting the provided authority.
	pub fn new(authority: AuthorityId) -> Self {
		Self { authority: Some(authority), ..Default::default() }
	}

	/// Sets the provider identifier.
	pub fn with_provider(mut self, provider: ProviderId) -> Self {
		self.provider = Some(provider);

		self
	}

	/// Sets the realm.
	pub fn with_realm(mut self, realm: RealmId) -> Self {
		self.realm = Some(realm);

		self
	}

	/// Sets the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Sets the description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Adds a localized title.
	pub fn with_title(mut self, lang: impl Into<String>, title: impl Into<String>) -> Self {
		self.titles.insert(lang.into(), title.into());

		self
	}

	/// Replaces the raw settings map.
	pub fn with_settings(mut self, settings: ConfigValues) -> Self {
		self.settings = settings;

		self
	}

	/// Replaces the raw configuration map.
	pub fn with_configuration(mut self, configuration: ConfigValues) -> Self {
		self.configuration = configuration;

		self
	}

	/// Sets the caller's view of the version.
	pub fn with_version(mut self, version: u32) -> Self {
		self.version = Some(version);

		self
	}

	/// Sets the enabled flag.
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = Some(enabled);

		self
	}
}
impl From<&ProviderDeclaration> for ProviderDraft {
	fn from(declaration: &ProviderDeclaration) -> Self {
		Self {
			authority: Some(declaration.authority.clone()),
			provider: Some(declaration.provider.clone()),
			realm: Some(declaration.realm.clone()),
			name: Some(declaration.name.clone()),
			description: declaration.description.clone(),
			titles: declaration.titles.clone(),
			descriptions: declaration.descriptions.clone(),
			settings: declaration.settings.clone(),
			configuration: declaration.configuration.clone(),
			version: declaration.version,
			enabled: Some(declaration.enabled),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn declaration() -> ProviderDeclaration {
		ProviderDeclaration {
			resource_type: ResourceType::IdentityProvider,
			authority: AuthorityId::new("internal").expect("Authority fixture should be valid."),
			provider: ProviderId::new("acme-login").expect("Provider fixture should be valid."),
			realm: RealmId::new("acme").expect("Realm fixture should be valid."),
			name: "Acme Login".into(),
			description: Some("Employee sign-in".into()),
			titles: BTreeMap::new(),
			descriptions: BTreeMap::new(),
			settings: ConfigValues::new(),
			configuration: ConfigValues::new(),
			version: Some(1),
			enabled: true,
			created_at: None,
			updated_at: None,
		}
	}

	#[test]
	fn names_compare_case_insensitively() {
		let declaration = declaration();

		assert!(declaration.has_name("ACME login"));
		assert!(!declaration.has_name("Acme"));
	}

	#[test]
	fn search_matches_id_name_and_description() {
		let declaration = declaration();

		assert!(declaration.matches("ACME-LOG"));
		assert!(declaration.matches("login"));
		assert!(declaration.matches("employee"));
		assert!(!declaration.matches("saml"));
	}

	#[test]
	fn serialized_form_uses_type_and_rfc3339_timestamps() {
		let mut declaration = declaration();

		declaration.created_at = Some(time::macros::datetime!(2025-11-10 12:00 UTC));

		let payload =
			serde_json::to_value(&declaration).expect("Declaration should serialize to JSON.");

		assert_eq!(payload["type"], "identity_provider");
		assert_eq!(payload["created_at"], "2025-11-10T12:00:00Z");

		let round_trip: ProviderDeclaration =
			serde_json::from_value(payload).expect("Declaration should deserialize from JSON.");

		assert_eq!(round_trip, declaration);
	}

	#[test]
	fn drafts_mirror_stored_declarations() {
		let declaration = declaration();
		let draft = ProviderDraft::from(&declaration);

		assert_eq!(draft.provider.as_ref(), Some(&declaration.provider));
		assert_eq!(draft.version, Some(1));
		assert_eq!(draft.enabled, Some(true));
	}
}
