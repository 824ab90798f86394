//! Generic configurable authority that caches live providers built by a [`ProviderFactory`].
//!
//! Registration and teardown for the same provider id are serialized through a per-id guard
//! map whose entries are evicted once idle; unrelated ids proceed in parallel and lookups never
//! take a guard. A registration
//! builds the new instance before touching any state, so a failed build leaves the previous
//! instance (if any) active and the repository unchanged.
//!
//! ```text
//! INACTIVE --register ok--> ACTIVE --register ok--> ACTIVE (replaced)
//!    ^   \--register err--> INACTIVE     |
//!    |                                   |
//!    +-------------- unregister ---------+
//! ```

// self
use crate::{
	_prelude::*,
	authority::{
		ConfigurableProviderAuthority, ProviderAuthority, ProviderFactory, ResourceProvider,
	},
	config::{ConfigurationProvider, ProviderConfig, TypedConfigurationProvider},
	model::{AuthorityId, ProviderDeclaration, ProviderId, ResourceType},
	obs::{self, LifecycleEvent, Operation, RegistrationMetrics},
	repository::{InMemoryProviderConfigRepository, ProviderConfigRepository},
};

/// Runtime configuration type produced for a factory.
pub type FactoryConfig<F> =
	ProviderConfig<<F as ProviderFactory>::Settings, <F as ProviderFactory>::Configuration>;

/// Repository type holding a factory's runtime configurations.
pub type FactoryConfigRepository<F> = dyn ProviderConfigRepository<FactoryConfig<F>>;

/// Configurable authority backed by a [`ProviderFactory`].
pub struct ConfigurableAuthority<F>
where
	F: ProviderFactory,
{
	authority: AuthorityId,
	resource_type: ResourceType,
	factory: F,
	configuration: TypedConfigurationProvider<F::Settings, F::Configuration>,
	repository: Arc<FactoryConfigRepository<F>>,
	providers: RwLock<HashMap<ProviderId, Arc<F::Provider>>>,
	guards: Mutex<HashMap<ProviderId, Arc<Mutex<()>>>>,
	teardown: Mutex<()>,
	metrics: Arc<RegistrationMetrics>,
}
impl<F> ConfigurableAuthority<F>
where
	F: ProviderFactory,
{
	/// Starts a builder for an authority serving one resource type.
	pub fn builder(
		authority: AuthorityId,
		resource_type: ResourceType,
		factory: F,
	) -> ConfigurableAuthorityBuilder<F> {
		ConfigurableAuthorityBuilder::new(authority, resource_type, factory)
	}

	/// Returns the typed live provider for an id, if active.
	pub fn find(&self, provider: &ProviderId) -> Option<Arc<F::Provider>> {
		self.providers.read().get(provider).cloned()
	}

	/// Returns the runtime configuration the active provider was built from.
	pub fn find_config(&self, provider: &ProviderId) -> Result<Option<Arc<FactoryConfig<F>>>> {
		Ok(self.repository.find_by_provider_id(provider)?)
	}

	/// Factory used to build providers.
	pub fn factory(&self) -> &F {
		&self.factory
	}

	/// Typed configuration provider of the authority.
	pub fn configuration(&self) -> &TypedConfigurationProvider<F::Settings, F::Configuration> {
		&self.configuration
	}

	/// Repository holding the runtime configurations of active providers.
	pub fn repository(&self) -> &Arc<FactoryConfigRepository<F>> {
		&self.repository
	}

	/// Lifecycle counters of the authority.
	pub fn metrics(&self) -> &Arc<RegistrationMetrics> {
		&self.metrics
	}

	/// Builds and activates a provider, returning the typed instance.
	pub fn register(&self, declaration: &ProviderDeclaration) -> Result<Arc<F::Provider>> {
		obs::observe(Operation::Register, self.resource_type, || {
			self.ensure_owned(declaration)?;

			let guard = self.guard(&declaration.provider);
			let registered = {
				let _serialized = guard.lock();

				self.register_serialized(declaration)
			};

			self.release_guard(&declaration.provider, guard);

			registered
		})
	}

	fn register_serialized(&self, declaration: &ProviderDeclaration) -> Result<Arc<F::Provider>> {
		let config = Arc::new(self.configuration.build_config(declaration)?);
		let provider = match self.factory.build_provider(config.clone()) {
			Ok(provider) => Arc::new(provider),
			Err(e) => {
				self.metrics.record_build_failure();
				obs::record_lifecycle(
					LifecycleEvent::BuildFailed,
					&self.authority,
					&declaration.provider,
				);

				return Err(Error::system(
					self.authority.clone(),
					declaration.provider.clone(),
					e,
				));
			},
		};

		if let Err(e) = self.repository.add_registration(config) {
			self.factory.release_provider(&provider);

			return Err(e.into());
		}

		let previous = self.providers.write().insert(declaration.provider.clone(), provider.clone());

		match previous {
			Some(previous) => {
				self.factory.release_provider(&previous);
				self.metrics.record_replacement();
				obs::record_lifecycle(
					LifecycleEvent::Replaced,
					&self.authority,
					&declaration.provider,
				);
			},
			None => {
				self.metrics.record_registration();
				obs::record_lifecycle(
					LifecycleEvent::Registered,
					&self.authority,
					&declaration.provider,
				);
			},
		}

		Ok(provider)
	}

	/// Releases and forgets an active provider; unknown ids are a no-op.
	pub fn unregister(&self, provider: &ProviderId) -> Result<()> {
		obs::observe(Operation::Unregister, self.resource_type, || {
			let guard = self.guard(provider);
			let unregistered = {
				let _serialized = guard.lock();
				let _teardown = self.teardown.lock();

				self.unregister_serialized(provider)
			};

			self.release_guard(provider, guard);

			unregistered
		})
	}

	fn unregister_serialized(&self, provider: &ProviderId) -> Result<()> {
		let Some(active) = self.find(provider) else {
			return Ok(());
		};

		self.factory.release_provider(&active);
		self.providers.write().remove(provider);
		self.repository.remove_registration(provider)?;
		self.metrics.record_unregistration();
		obs::record_lifecycle(LifecycleEvent::Unregistered, &self.authority, provider);

		Ok(())
	}

	fn ensure_owned(&self, declaration: &ProviderDeclaration) -> Result<()> {
		if declaration.authority != self.authority {
			return Err(Error::immutable(format!(
				"provider `{}` belongs to authority `{}`, not `{}`",
				declaration.provider, declaration.authority, self.authority
			)));
		}
		if declaration.resource_type != self.resource_type {
			return Err(Error::immutable(format!(
				"provider `{}` is a {}, authority `{}` serves {}",
				declaration.provider,
				declaration.resource_type,
				self.authority,
				self.resource_type
			)));
		}

		Ok(())
	}

	/// Returns (and creates on demand) the registration guard for a provider id.
	fn guard(&self, provider: &ProviderId) -> Arc<Mutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(provider.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
	}

	/// Drops the caller's guard and evicts the map entry once no other caller holds it.
	fn release_guard(&self, provider: &ProviderId, guard: Arc<Mutex<()>>) {
		let mut guards = self.guards.lock();

		// The map and the caller own the only two references.
		if Arc::strong_count(&guard) == 2 {
			guards.remove(provider);
		}
	}
}
impl<F> Debug for ConfigurableAuthority<F>
where
	F: ProviderFactory,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigurableAuthority")
			.field("authority", &self.authority)
			.field("resource_type", &self.resource_type)
			.field("active", &self.providers.read().len())
			.finish()
	}
}
impl<F> ProviderAuthority for ConfigurableAuthority<F>
where
	F: ProviderFactory,
{
	fn authority(&self) -> &AuthorityId {
		&self.authority
	}

	fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	fn find_provider(&self, provider: &ProviderId) -> Option<Arc<dyn ResourceProvider>> {
		self.find(provider).map(|p| p as Arc<dyn ResourceProvider>)
	}

	fn list_providers(&self) -> Vec<Arc<dyn ResourceProvider>> {
		let guard = self.providers.read();
		let mut providers: Vec<_> = guard.values().cloned().collect();

		providers.sort_by(|a, b| a.provider().cmp(b.provider()));

		providers.into_iter().map(|p| p as Arc<dyn ResourceProvider>).collect()
	}
}
impl<F> ConfigurableProviderAuthority for ConfigurableAuthority<F>
where
	F: ProviderFactory,
{
	fn configuration_provider(&self) -> Option<&dyn ConfigurationProvider> {
		Some(&self.configuration)
	}

	fn register_provider(
		&self,
		declaration: &ProviderDeclaration,
	) -> Result<Arc<dyn ResourceProvider>> {
		self.register(declaration).map(|p| p as Arc<dyn ResourceProvider>)
	}

	fn unregister_provider(&self, provider: &ProviderId) -> Result<()> {
		self.unregister(provider)
	}
}

/// Builder for [`ConfigurableAuthority`] values.
pub struct ConfigurableAuthorityBuilder<F>
where
	F: ProviderFactory,
{
	authority: AuthorityId,
	resource_type: ResourceType,
	factory: F,
	default_settings: Option<F::Settings>,
	default_configuration: Option<F::Configuration>,
	repository: Option<Arc<FactoryConfigRepository<F>>>,
}
impl<F> ConfigurableAuthorityBuilder<F>
where
	F: ProviderFactory,
{
	fn new(authority: AuthorityId, resource_type: ResourceType, factory: F) -> Self {
		Self {
			authority,
			resource_type,
			factory,
			default_settings: None,
			default_configuration: None,
			repository: None,
		}
	}

	/// Overrides the default settings raw maps are merged over.
	pub fn default_settings(mut self, settings: F::Settings) -> Self {
		self.default_settings = Some(settings);

		self
	}

	/// Overrides the default configuration raw maps are merged over.
	pub fn default_configuration(mut self, configuration: F::Configuration) -> Self {
		self.default_configuration = Some(configuration);

		self
	}

	/// Replaces the in-memory configuration repository.
	pub fn repository(mut self, repository: Arc<FactoryConfigRepository<F>>) -> Self {
		self.repository = Some(repository);

		self
	}

	/// Consumes the builder.
	pub fn build(self) -> ConfigurableAuthority<F> {
		let mut configuration = TypedConfigurationProvider::new(self.authority.clone());

		if let Some(settings) = self.default_settings {
			configuration = configuration.with_default_settings(settings);
		}
		if let Some(defaults) = self.default_configuration {
			configuration = configuration.with_default_configuration(defaults);
		}

		let repository = self
			.repository
			.unwrap_or_else(|| Arc::new(InMemoryProviderConfigRepository::<FactoryConfig<F>>::new()));

		ConfigurableAuthority {
			authority: self.authority,
			resource_type: self.resource_type,
			factory: self.factory,
			configuration,
			repository,
			providers: RwLock::new(HashMap::new()),
			guards: Mutex::new(HashMap::new()),
			teardown: Mutex::new(()),
			metrics: Arc::new(RegistrationMetrics::default()),
		}
	}
}
