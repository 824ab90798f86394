//! Read-only fan-out over every authority serving one resource type.

// self
use crate::{
	_prelude::*,
	authority::{ProviderAuthority, ResourceProvider},
	config::ValidationError,
	error::NotFoundKind,
	model::{AuthorityId, ProviderId, RealmId, ResourceType},
};

/// Merges the live providers of several authorities, ordered by authority id.
#[derive(Clone)]
pub struct ResourceProviderRegistry {
	resource_type: ResourceType,
	authorities: BTreeMap<AuthorityId, Arc<dyn ProviderAuthority>>,
}
impl ResourceProviderRegistry {
	/// Starts a builder for a registry of one resource type.
	pub fn builder(resource_type: ResourceType) -> ResourceProviderRegistryBuilder {
		ResourceProviderRegistryBuilder { resource_type, authorities: Vec::new() }
	}

	/// Resource kind served by the registry.
	pub fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	/// Returns a registered authority.
	pub fn authority(&self, authority: &AuthorityId) -> Option<&Arc<dyn ProviderAuthority>> {
		self.authorities.get(authority)
	}

	/// Identifiers of the registered authorities, in order.
	pub fn authority_ids(&self) -> impl Iterator<Item = &AuthorityId> {
		self.authorities.keys()
	}

	/// Returns true when any authority holds a live provider for the id.
	pub fn has_resource_provider(&self, provider: &ProviderId) -> bool {
		self.authorities.values().any(|a| a.has_provider(provider))
	}

	/// Returns the first live provider found for the id.
	pub fn find_resource_provider(&self, provider: &ProviderId) -> Option<Arc<dyn ResourceProvider>> {
		self.authorities.values().find_map(|a| a.find_provider(provider))
	}

	/// Returns the live provider for the id or [`Error::NotFound`].
	pub fn get_resource_provider(&self, provider: &ProviderId) -> Result<Arc<dyn ResourceProvider>> {
		self.find_resource_provider(provider)
			.ok_or_else(|| Error::not_found(NotFoundKind::Provider, provider))
	}

	/// Lists every live provider across authorities.
	pub fn list_resource_providers(&self) -> Vec<Arc<dyn ResourceProvider>> {
		self.authorities.values().flat_map(|a| a.list_providers()).collect()
	}

	/// Lists the live providers of one realm across authorities.
	pub fn list_resource_providers_by_realm(&self, realm: &RealmId) -> Vec<Arc<dyn ResourceProvider>> {
		self.authorities.values().flat_map(|a| a.list_providers_by_realm(realm)).collect()
	}
}
impl Debug for ResourceProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResourceProviderRegistry")
			.field("resource_type", &self.resource_type)
			.field("authorities", &self.authorities.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`ResourceProviderRegistry`] values.
pub struct ResourceProviderRegistryBuilder {
	resource_type: ResourceType,
	authorities: Vec<Arc<dyn ProviderAuthority>>,
}
impl ResourceProviderRegistryBuilder {
	/// Adds an authority.
	pub fn authority(mut self, authority: Arc<dyn ProviderAuthority>) -> Self {
		self.authorities.push(authority);

		self
	}

	/// Rejects authorities of another resource type or with a duplicate id.
	pub fn build(self) -> Result<ResourceProviderRegistry> {
		let mut authorities = BTreeMap::new();

		for authority in self.authorities {
			let id = authority.authority().clone();

			if authority.resource_type() != self.resource_type {
				return Err(ValidationError::single(
					"authority",
					format!(
						"Authority `{id}` serves {}, not {}.",
						authority.resource_type(),
						self.resource_type
					),
				)
				.into());
			}
			if authorities.insert(id.clone(), authority).is_some() {
				return Err(ValidationError::single(
					"authority",
					format!("Authority `{id}` is registered twice."),
				)
				.into());
			}
		}

		Ok(ResourceProviderRegistry { resource_type: self.resource_type, authorities })
	}
}
