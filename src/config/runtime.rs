//! Runtime provider configuration derived from a declaration plus authority defaults.

// self
use crate::{
	_prelude::*,
	config::ConfigMap,
	model::{AuthorityId, ProviderDeclaration, ProviderId, RealmId, ResourceType},
	repository::ConfigIdentity,
};

/// Where a runtime configuration came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConfigOrigin {
	/// Built from a persisted declaration at the given version.
	Persisted {
		/// Declaration version the configuration was derived from.
		version: u32,
	},
	/// Built from an in-memory system provider.
	System,
}

/// Immutable runtime configuration handed to an authority's factory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig<S, C> {
	/// Resource kind of the provider.
	pub resource_type: ResourceType,
	/// Authority that builds the provider.
	pub authority: AuthorityId,
	/// Provider identifier.
	pub provider: ProviderId,
	/// Realm the provider serves.
	pub realm: RealmId,
	/// Display name.
	pub name: String,
	/// Optional free-form description.
	pub description: Option<String>,
	/// Localized titles keyed by language tag.
	pub titles: BTreeMap<String, String>,
	/// Localized descriptions keyed by language tag.
	pub descriptions: BTreeMap<String, String>,
	/// Typed settings map.
	pub settings: S,
	/// Typed configuration map.
	pub configuration: C,
	/// Origin of the configuration.
	pub origin: ConfigOrigin,
}
impl<S, C> ProviderConfig<S, C>
where
	S: ConfigMap,
	C: ConfigMap,
{
	/// Combines a declaration's identity with already-parsed maps.
	pub fn from_declaration(declaration: &ProviderDeclaration, settings: S, configuration: C) -> Self {
		let origin = match declaration.version {
			Some(version) if !declaration.realm.is_system() => ConfigOrigin::Persisted { version },
			_ => ConfigOrigin::System,
		};

		Self {
			resource_type: declaration.resource_type,
			authority: declaration.authority.clone(),
			provider: declaration.provider.clone(),
			realm: declaration.realm.clone(),
			name: declaration.name.clone(),
			description: declaration.description.clone(),
			titles: declaration.titles.clone(),
			descriptions: declaration.descriptions.clone(),
			settings,
			configuration,
			origin,
		}
	}

	/// Returns the declaration version this configuration reflects, if persisted.
	pub fn version(&self) -> Option<u32> {
		match self.origin {
			ConfigOrigin::Persisted { version } => Some(version),
			ConfigOrigin::System => None,
		}
	}

	/// Returns true for configurations built from system providers.
	pub fn is_system(&self) -> bool {
		matches!(self.origin, ConfigOrigin::System)
	}

	/// Returns the title for a language tag, falling back to the name.
	pub fn title(&self, lang: &str) -> &str {
		self.titles.get(lang).map(String::as_str).unwrap_or(&self.name)
	}
}
impl<S, C> ConfigIdentity for ProviderConfig<S, C>
where
	S: ConfigMap,
	C: ConfigMap,
{
	fn provider(&self) -> &ProviderId {
		&self.provider
	}

	fn realm(&self) -> &RealmId {
		&self.realm
	}
}
