//! Authority contracts: live provider lookup, configurable registration, and factories.
//!
//! An authority owns every live provider of one implementation (e.g. `oidc` identity
//! providers). Lookup goes through [`ProviderAuthority`]; authorities whose providers are
//! declared in the store additionally implement [`ConfigurableProviderAuthority`]. The
//! authority-specific part that turns a [`ProviderConfig`] into a live provider is a
//! [`ProviderFactory`], wrapped by [`ConfigurableAuthority`].

pub mod configurable;
pub mod fixed;

pub use configurable::*;
pub use fixed::*;

// self
use crate::{
	_prelude::*,
	config::{ConfigMap, ConfigurationProvider, ProviderConfig},
	error::NotFoundKind,
	model::{AuthorityId, ProviderDeclaration, ProviderId, RealmId, ResourceType},
};

/// Live provider instance handed out by authorities.
pub trait ResourceProvider
where
	Self: 'static + Send + Sync,
{
	/// Authority that built the provider.
	fn authority(&self) -> &AuthorityId;

	/// Provider identifier.
	fn provider(&self) -> &ProviderId;

	/// Realm the provider serves.
	fn realm(&self) -> &RealmId;

	/// Resource kind of the provider.
	fn resource_type(&self) -> ResourceType;
}
impl Debug for dyn ResourceProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResourceProvider")
			.field("authority", self.authority())
			.field("provider", self.provider())
			.field("realm", self.realm())
			.field("resource_type", &self.resource_type())
			.finish()
	}
}

/// Read-only view over the live providers of one authority.
pub trait ProviderAuthority
where
	Self: Send + Sync,
{
	/// Authority identifier.
	fn authority(&self) -> &AuthorityId;

	/// Resource kind served by the authority.
	fn resource_type(&self) -> ResourceType;

	/// Returns the live provider for an id, if active.
	fn find_provider(&self, provider: &ProviderId) -> Option<Arc<dyn ResourceProvider>>;

	/// Lists every live provider, ordered by provider id.
	fn list_providers(&self) -> Vec<Arc<dyn ResourceProvider>>;

	/// Returns true when a live provider exists for the id.
	fn has_provider(&self, provider: &ProviderId) -> bool {
		self.find_provider(provider).is_some()
	}

	/// Returns the live provider for an id or [`Error::NotFound`].
	fn get_provider(&self, provider: &ProviderId) -> Result<Arc<dyn ResourceProvider>> {
		self.find_provider(provider)
			.ok_or_else(|| Error::not_found(NotFoundKind::Provider, provider))
	}

	/// Lists the live providers of one realm, ordered by provider id.
	fn list_providers_by_realm(&self, realm: &RealmId) -> Vec<Arc<dyn ResourceProvider>> {
		self.list_providers().into_iter().filter(|p| p.realm() == realm).collect()
	}
}

/// Authority whose providers are built from persisted declarations.
pub trait ConfigurableProviderAuthority
where
	Self: ProviderAuthority,
{
	/// Parser and schema publisher for the authority's ConfigMaps, if it has one.
	fn configuration_provider(&self) -> Option<&dyn ConfigurationProvider>;

	/// Builds and activates a provider from a declaration, replacing any active instance.
	fn register_provider(
		&self,
		declaration: &ProviderDeclaration,
	) -> Result<Arc<dyn ResourceProvider>>;

	/// Releases and forgets an active provider; unknown ids are a no-op.
	fn unregister_provider(&self, provider: &ProviderId) -> Result<()>;
}

/// Authority-specific builder of live providers.
///
/// The associated map types pin what the authority's configuration provider parses, so a
/// factory only ever sees configurations of its own shape.
pub trait ProviderFactory
where
	Self: 'static + Send + Sync,
{
	/// Typed settings map.
	type Settings: ConfigMap;
	/// Typed configuration map.
	type Configuration: ConfigMap;
	/// Live provider produced by the factory.
	type Provider: ResourceProvider;
	/// Failure raised while building a provider.
	type Error: 'static + Send + Sync + StdError;

	/// Builds a live provider from a runtime configuration.
	fn build_provider(
		&self,
		config: Arc<ProviderConfig<Self::Settings, Self::Configuration>>,
	) -> Result<Self::Provider, Self::Error>;

	/// Releases protocol resources held by a provider that is being replaced or unregistered.
	fn release_provider(&self, _provider: &Self::Provider) {}
}
