//! Authority over providers declared in code rather than in the store.

// self
use crate::{
	_prelude::*,
	authority::{ProviderAuthority, ResourceProvider},
	error::DuplicateKind,
	model::{AuthorityId, ProviderId, RealmId, ResourceType},
};

/// Lookup-only authority over a fixed set of code-declared providers.
#[derive(Debug)]
pub struct FixedProviderAuthority {
	authority: AuthorityId,
	resource_type: ResourceType,
	providers: BTreeMap<ProviderId, Arc<dyn ResourceProvider>>,
}
impl FixedProviderAuthority {
	/// Starts a builder for an authority serving one resource type.
	pub fn builder(
		authority: AuthorityId,
		resource_type: ResourceType,
	) -> FixedProviderAuthorityBuilder {
		FixedProviderAuthorityBuilder { authority, resource_type, providers: Vec::new() }
	}
}
impl ProviderAuthority for FixedProviderAuthority {
	fn authority(&self) -> &AuthorityId {
		&self.authority
	}

	fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	fn find_provider(&self, provider: &ProviderId) -> Option<Arc<dyn ResourceProvider>> {
		self.providers.get(provider).cloned()
	}

	fn list_providers(&self) -> Vec<Arc<dyn ResourceProvider>> {
		self.providers.values().cloned().collect()
	}
}

/// Builder for [`FixedProviderAuthority`] values.
#[derive(Debug)]
pub struct FixedProviderAuthorityBuilder {
	authority: AuthorityId,
	resource_type: ResourceType,
	providers: Vec<Arc<dyn ResourceProvider>>,
}
impl FixedProviderAuthorityBuilder {
	/// Adds a provider instance.
	pub fn provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
		self.providers.push(provider);

		self
	}

	/// Adds a [`StaticResource`] built from plain identifiers.
	pub fn resource(self, provider: ProviderId, realm: RealmId) -> Self {
		let resource = StaticResource {
			authority: self.authority.clone(),
			provider,
			realm,
			resource_type: self.resource_type,
		};

		self.provider(Arc::new(resource))
	}

	/// Validates ownership and uniqueness, then builds the authority.
	pub fn build(self) -> Result<FixedProviderAuthority> {
		let mut providers = BTreeMap::new();

		for provider in self.providers {
			if provider.authority() != &self.authority
				|| provider.resource_type() != self.resource_type
			{
				return Err(Error::immutable(format!(
					"provider `{}` is not a {} of authority `{}`",
					provider.provider(),
					self.resource_type,
					self.authority
				)));
			}

			let id = provider.provider().clone();

			if providers.insert(id.clone(), provider).is_some() {
				return Err(Error::AlreadyRegistered {
					kind: DuplicateKind::ProviderId,
					value: id.to_string(),
				});
			}
		}

		Ok(FixedProviderAuthority {
			authority: self.authority,
			resource_type: self.resource_type,
			providers,
		})
	}
}

/// Plain code-declared provider carrying only its identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticResource {
	/// Owning authority.
	pub authority: AuthorityId,
	/// Provider identifier.
	pub provider: ProviderId,
	/// Realm the resource serves.
	pub realm: RealmId,
	/// Resource kind.
	pub resource_type: ResourceType,
}
impl ResourceProvider for StaticResource {
	fn authority(&self) -> &AuthorityId {
		&self.authority
	}

	fn provider(&self) -> &ProviderId {
		&self.provider
	}

	fn realm(&self) -> &RealmId {
		&self.realm
	}

	fn resource_type(&self) -> ResourceType {
		self.resource_type
	}
}
