//! Builder wiring authorities, the validator, and system providers into a service.

// self
use crate::{
	_prelude::*,
	authority::{ConfigurableProviderAuthority, ProviderAuthority},
	config::{ValidationError, Validator},
	error::DuplicateKind,
	model::{AuthorityId, ProviderDeclaration, ProviderDraft, ProviderId, RealmId, ResourceType},
	obs::{self, Operation},
	registry::ResourceProviderRegistry,
	service::{ConfigurableProviderService, prepare_maps},
	store::ProviderStore,
};

/// Builder for [`ConfigurableProviderService`] values.
///
/// The authority map is fixed once [`build`](Self::build) returns.
pub struct ConfigurableProviderServiceBuilder {
	resource_type: ResourceType,
	store: Arc<dyn ProviderStore>,
	authorities: Vec<(Arc<dyn ConfigurableProviderAuthority>, Arc<dyn ProviderAuthority>)>,
	lookups: Vec<Arc<dyn ProviderAuthority>>,
	validator: Option<Arc<dyn Validator>>,
	system_providers: Vec<(AuthorityId, ProviderId, ProviderDraft)>,
}
impl ConfigurableProviderServiceBuilder {
	pub(crate) fn new(resource_type: ResourceType, store: Arc<dyn ProviderStore>) -> Self {
		Self {
			resource_type,
			store,
			authorities: Vec::new(),
			lookups: Vec::new(),
			validator: None,
			system_providers: Vec::new(),
		}
	}

	/// Adds a configurable authority; it also becomes part of the service registry.
	pub fn authority<A>(mut self, authority: Arc<A>) -> Self
	where
		A: 'static + ConfigurableProviderAuthority,
	{
		let lookup: Arc<dyn ProviderAuthority> = authority.clone();
		let configurable: Arc<dyn ConfigurableProviderAuthority> = authority;

		self.authorities.push((configurable, lookup));

		self
	}

	/// Adds a lookup-only authority (such as code-declared resources) to the registry.
	pub fn lookup_authority(mut self, authority: Arc<dyn ProviderAuthority>) -> Self {
		self.lookups.push(authority);

		self
	}

	/// Installs the field-level validator run after parsing.
	pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
		self.validator = Some(validator);

		self
	}

	/// Declares an in-memory system provider served under the `system` realm.
	pub fn system_provider(
		mut self,
		authority: AuthorityId,
		provider: ProviderId,
		draft: ProviderDraft,
	) -> Self {
		self.system_providers.push((authority, provider, draft));

		self
	}

	/// Validates the wiring, then builds and registers every enabled system provider.
	pub fn build(self) -> Result<ConfigurableProviderService> {
		obs::observe(Operation::Build, self.resource_type, move || {
			let mut registry = ResourceProviderRegistry::builder(self.resource_type);
			let mut authorities = BTreeMap::new();

			for (configurable, lookup) in self.authorities {
				registry = registry.authority(lookup);
				authorities.insert(configurable.authority().clone(), configurable);
			}
			for lookup in self.lookups {
				registry = registry.authority(lookup);
			}

			let mut service = ConfigurableProviderService {
				resource_type: self.resource_type,
				store: self.store,
				authorities,
				registry: registry.build()?,
				validator: self.validator,
				system_providers: BTreeMap::new(),
				writes: Mutex::new(()),
			};

			for (authority, provider, draft) in self.system_providers {
				let declaration = system_declaration(&service, authority, provider, draft)?;

				if declaration.enabled {
					service.authority(&declaration.authority)?.register_provider(&declaration)?;
				}

				service.system_providers.insert(declaration.provider.clone(), declaration);
			}

			Ok(service)
		})
	}
}
impl Debug for ConfigurableProviderServiceBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigurableProviderServiceBuilder")
			.field("resource_type", &self.resource_type)
			.field("authorities", &self.authorities.len())
			.field("system_providers", &self.system_providers.len())
			.finish()
	}
}

fn system_declaration(
	service: &ConfigurableProviderService,
	authority: AuthorityId,
	provider: ProviderId,
	draft: ProviderDraft,
) -> Result<ProviderDeclaration> {
	if let Some(realm) = draft.realm.as_ref().filter(|r| !r.is_system()) {
		return Err(ValidationError::single(
			"realm",
			format!("System provider `{provider}` cannot be declared in realm `{realm}`."),
		)
		.into());
	}
	if service.system_providers.contains_key(&provider) {
		return Err(Error::AlreadyRegistered {
			kind: DuplicateKind::ProviderId,
			value: provider.to_string(),
		});
	}

	let (settings, configuration) = prepare_maps(
		service.authority(&authority)?.as_ref(),
		service.validator.as_deref(),
		&draft.settings,
		&draft.configuration,
	)?;

	Ok(ProviderDeclaration {
		resource_type: service.resource_type,
		authority,
		name: draft.name.unwrap_or_else(|| provider.to_string()),
		provider,
		realm: RealmId::system(),
		description: draft.description,
		titles: draft.titles,
		descriptions: draft.descriptions,
		settings,
		configuration,
		version: None,
		enabled: draft.enabled.unwrap_or(true),
		created_at: None,
		updated_at: None,
	})
}
