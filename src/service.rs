//! Configurable provider service: declaration CRUD, versioning, and lifecycle orchestration.
//!
//! One service handles one [`ResourceType`]. Persisted declarations live in the
//! [`ProviderStore`]; system providers are declared on the builder, live only in memory under
//! the `system` pseudo-realm, and are never written, updated, or deleted through the service.
//! Live instances are built and cached by authorities; the service only forwards stored
//! declarations to them.

pub mod builder;

pub use builder::ConfigurableProviderServiceBuilder;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	authority::{ConfigurableProviderAuthority, ResourceProvider},
	config::{
		ConfigSection, ConfigValues, ConfigurableProperties, ValidationError, ValidationTarget,
		Validator,
	},
	error::{DuplicateKind, NotFoundKind},
	model::{
		AuthorityId, Page, PageResult, ProviderDeclaration, ProviderDraft, ProviderId, RealmId,
		ResourceType,
	},
	obs::{self, Operation},
	registry::ResourceProviderRegistry,
	store::{ProviderStore, StoreError, WriteOutcome},
};

/// Entry point for managing the provider declarations of one resource type.
pub struct ConfigurableProviderService {
	resource_type: ResourceType,
	store: Arc<dyn ProviderStore>,
	authorities: BTreeMap<AuthorityId, Arc<dyn ConfigurableProviderAuthority>>,
	registry: ResourceProviderRegistry,
	validator: Option<Arc<dyn Validator>>,
	system_providers: BTreeMap<ProviderId, ProviderDeclaration>,
	// Serializes the uniqueness checks of add and update with their store write.
	writes: Mutex<()>,
}
impl ConfigurableProviderService {
	/// Starts a builder for a service over the provided store.
	pub fn builder(
		resource_type: ResourceType,
		store: Arc<dyn ProviderStore>,
	) -> ConfigurableProviderServiceBuilder {
		ConfigurableProviderServiceBuilder::new(resource_type, store)
	}

	/// Resource kind handled by the service.
	pub fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	/// Registry over every authority known to the service.
	pub fn registry(&self) -> &ResourceProviderRegistry {
		&self.registry
	}

	/// Identifiers of the configurable authorities, in order.
	pub fn authority_ids(&self) -> impl Iterator<Item = &AuthorityId> {
		self.authorities.keys()
	}

	/// Resolves a configurable authority or returns [`Error::NotFound`].
	pub fn authority(&self, authority: &AuthorityId) -> Result<&Arc<dyn ConfigurableProviderAuthority>> {
		self.authorities
			.get(authority)
			.ok_or_else(|| Error::not_found(NotFoundKind::Authority, authority))
	}

	/// Creates a declaration in a realm.
	///
	/// Concurrent adds and updates through one service are serialized, so the id and name
	/// checks hold at write time.
	///
	/// The provider id comes from `provider`, then from the draft; a UUID is generated when
	/// neither is set. The new declaration starts at version 1.
	pub fn add(
		&self,
		realm: &RealmId,
		provider: Option<ProviderId>,
		draft: ProviderDraft,
	) -> Result<ProviderDeclaration> {
		obs::observe(Operation::Add, self.resource_type, || {
			let _write = self.writes.lock();

			if realm.is_reserved() {
				return Err(Error::immutable(format!(
					"realm `{realm}` cannot hold persisted providers"
				)));
			}
			if let Some(other) = draft.realm.as_ref().filter(|r| *r != realm) {
				return Err(ValidationError::single(
					"realm",
					format!("Realm `{other}` does not match the target realm `{realm}`."),
				)
				.into());
			}

			let provider = match (provider, draft.provider) {
				(Some(a), Some(b)) if a != b =>
					return Err(ValidationError::single(
						"provider",
						format!("Provider `{b}` does not match the requested id `{a}`."),
					)
					.into()),
				(Some(id), _) | (None, Some(id)) => id,
				(None, None) => ProviderId::generate(),
			};

			self.ensure_unused(&provider)?;

			let name = draft.name.unwrap_or_else(|| provider.to_string());

			self.ensure_unique_name(realm, &name, None)?;

			let authority_id = draft
				.authority
				.ok_or_else(|| ValidationError::single("authority", "Authority is required."))?;
			let authority = self.authority(&authority_id)?;
			let (settings, configuration) = prepare_maps(
				authority.as_ref(),
				self.validator.as_deref(),
				&draft.settings,
				&draft.configuration,
			)?;
			let now = OffsetDateTime::now_utc();
			let declaration = ProviderDeclaration {
				resource_type: self.resource_type,
				authority: authority_id,
				provider,
				realm: realm.clone(),
				name,
				description: draft.description,
				titles: draft.titles,
				descriptions: draft.descriptions,
				settings,
				configuration,
				version: Some(1),
				enabled: draft.enabled.unwrap_or(true),
				created_at: Some(now),
				updated_at: Some(now),
			};

			match self.store.insert(declaration.clone())? {
				WriteOutcome::Written => Ok(declaration),
				WriteOutcome::Conflict => Err(Error::AlreadyRegistered {
					kind: DuplicateKind::ProviderId,
					value: declaration.provider.to_string(),
				}),
				WriteOutcome::Missing =>
					Err(StoreError::Backend { message: "Insert reported a missing row".into() }
						.into()),
			}
		})
	}

	/// Updates a persisted declaration; system providers are not visible here.
	///
	/// Version rule: absent keeps the stored version, older fails, equal increments, and newer
	/// is accepted as-is.
	pub fn update(&self, provider: &ProviderId, draft: ProviderDraft) -> Result<ProviderDeclaration> {
		obs::observe(Operation::Update, self.resource_type, || {
			let _write = self.writes.lock();
			let stored = self.find_persisted(provider)?;

			ensure_unchanged("provider", draft.provider.as_ref(), &stored.provider)?;
			ensure_unchanged("authority", draft.authority.as_ref(), &stored.authority)?;
			ensure_unchanged("realm", draft.realm.as_ref(), &stored.realm)?;

			let stored_version = stored.version.unwrap_or(1);
			let version = match draft.version {
				None => stored_version,
				Some(supplied) if supplied < stored_version =>
					return Err(Error::VersionConflict {
						provider: provider.clone(),
						stored: stored_version,
						supplied,
					}),
				Some(supplied) if supplied == stored_version => stored_version.saturating_add(1),
				Some(supplied) => supplied,
			};
			let name = draft.name.unwrap_or_else(|| stored.name.clone());

			self.ensure_unique_name(&stored.realm, &name, Some(provider))?;

			let authority = self.authority(&stored.authority)?;
			let (settings, configuration) = prepare_maps(
				authority.as_ref(),
				self.validator.as_deref(),
				&draft.settings,
				&draft.configuration,
			)?;
			let declaration = ProviderDeclaration {
				resource_type: self.resource_type,
				authority: stored.authority,
				provider: stored.provider,
				realm: stored.realm,
				name,
				description: draft.description.or(stored.description),
				titles: draft.titles,
				descriptions: draft.descriptions,
				settings,
				configuration,
				version: Some(version),
				enabled: draft.enabled.unwrap_or(stored.enabled),
				created_at: stored.created_at,
				updated_at: Some(OffsetDateTime::now_utc()),
			};

			match self.store.replace(declaration.clone())? {
				WriteOutcome::Written => Ok(declaration),
				WriteOutcome::Missing => Err(Error::not_found(NotFoundKind::Provider, provider)),
				WriteOutcome::Conflict =>
					Err(StoreError::Backend { message: "Replace reported a conflict".into() }
						.into()),
			}
		})
	}

	/// Removes a persisted declaration; active instances are left to their authority.
	pub fn delete(&self, provider: &ProviderId) -> Result<ProviderDeclaration> {
		obs::observe(Operation::Delete, self.resource_type, || {
			self.store
				.delete(self.resource_type, provider)?
				.ok_or_else(|| Error::not_found(NotFoundKind::Provider, provider))
		})
	}

	/// Looks up a declaration, consulting system providers first.
	pub fn find(&self, provider: &ProviderId) -> Result<Option<ProviderDeclaration>> {
		if let Some(system) = self.system_providers.get(provider) {
			return Ok(Some(system.clone()));
		}

		Ok(self.store.find(self.resource_type, provider)?)
	}

	/// Looks up a declaration or returns [`Error::NotFound`].
	pub fn get(&self, provider: &ProviderId) -> Result<ProviderDeclaration> {
		self.find(provider)?.ok_or_else(|| Error::not_found(NotFoundKind::Provider, provider))
	}

	/// Lists every persisted declaration; system providers are excluded.
	pub fn list(&self) -> Result<Vec<ProviderDeclaration>> {
		Ok(self.store.list(self.resource_type)?)
	}

	/// Lists the declarations of a realm.
	///
	/// `global` never holds providers and `system` resolves to the in-memory system providers.
	pub fn list_by_realm(&self, realm: &RealmId) -> Result<Vec<ProviderDeclaration>> {
		if realm.is_global() {
			return Ok(Vec::new());
		}
		if realm.is_system() {
			return Ok(self.system_providers.values().cloned().collect());
		}

		Ok(self.store.list_by_realm(self.resource_type, realm)?)
	}

	/// Searches a realm by provider id, name, or description, ordered by name.
	pub fn search(
		&self,
		realm: &RealmId,
		query: &str,
		page: Page,
	) -> Result<PageResult<ProviderDeclaration>> {
		let query = query.trim();
		let mut matches: Vec<_> =
			self.list_by_realm(realm)?.into_iter().filter(|d| d.matches(query)).collect();

		matches.sort_by(|a, b| {
			a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.provider.cmp(&b.provider))
		});

		Ok(page.apply(matches))
	}

	/// Returns the configuration schema and defaults published by an authority.
	pub fn get_configuration_schema(&self, authority: &AuthorityId) -> Result<ConfigurableProperties> {
		self.schema(authority, ConfigSection::Configuration)
	}

	/// Returns the settings schema and defaults published by an authority.
	pub fn get_settings_schema(&self, authority: &AuthorityId) -> Result<ConfigurableProperties> {
		self.schema(authority, ConfigSection::Settings)
	}

	/// Asks the owning authority to build and activate a persisted provider.
	///
	/// The stored declaration is forwarded, not the supplied one; the latter only has to agree
	/// on identity and authority.
	pub fn register_provider(
		&self,
		provider: &ProviderId,
		declaration: &ProviderDeclaration,
	) -> Result<Arc<dyn ResourceProvider>> {
		obs::observe(Operation::Register, self.resource_type, || {
			let stored = self.find_persisted(provider)?;

			ensure_unchanged("provider", Some(&declaration.provider), &stored.provider)?;
			ensure_unchanged("authority", Some(&declaration.authority), &stored.authority)?;

			self.authority(&stored.authority)?.register_provider(&stored)
		})
	}

	/// Asks the owning authority to release a persisted provider; inactive ones are a no-op.
	pub fn unregister_provider(&self, provider: &ProviderId) -> Result<()> {
		obs::observe(Operation::Unregister, self.resource_type, || {
			let stored = self.find_persisted(provider)?;

			self.authority(&stored.authority)?.unregister_provider(provider)
		})
	}

	/// Returns true when the provider is enabled and some authority holds a live instance.
	pub fn is_provider_registered(&self, provider: &ProviderId) -> Result<bool> {
		let Some(declaration) = self.find(provider)? else {
			return Ok(false);
		};

		if !declaration.enabled {
			return Ok(false);
		}

		Ok(self.authorities.values().any(|a| a.has_provider(provider)))
	}

	/// Registers every enabled persisted declaration, optionally limited to one realm.
	///
	/// Each declaration is attempted independently; the failures are returned.
	pub fn register_enabled(&self, realm: Option<&RealmId>) -> Result<Vec<(ProviderId, Error)>> {
		obs::observe(Operation::RegisterEnabled, self.resource_type, || {
			let declarations = match realm {
				Some(realm) if realm.is_reserved() => Vec::new(),
				Some(realm) => self.store.list_by_realm(self.resource_type, realm)?,
				None => self.store.list(self.resource_type)?,
			};
			let failures: Vec<_> = declarations
				.into_iter()
				.filter(|d| d.enabled)
				.filter_map(|d| {
					self.authority(&d.authority)
						.and_then(|authority| authority.register_provider(&d))
						.err()
						.map(|e| (d.provider, e))
				})
				.collect();

			Ok(failures)
		})
	}

	/// Returns the live provider for an id from any authority.
	pub fn find_resource_provider(&self, provider: &ProviderId) -> Option<Arc<dyn ResourceProvider>> {
		self.registry.find_resource_provider(provider)
	}

	/// Returns the live provider for an id or [`Error::NotFound`].
	pub fn get_resource_provider(&self, provider: &ProviderId) -> Result<Arc<dyn ResourceProvider>> {
		self.registry.get_resource_provider(provider)
	}

	/// Lists every live provider.
	pub fn list_resource_providers(&self) -> Vec<Arc<dyn ResourceProvider>> {
		self.registry.list_resource_providers()
	}

	/// Lists the live providers of a realm.
	pub fn list_resource_providers_by_realm(&self, realm: &RealmId) -> Vec<Arc<dyn ResourceProvider>> {
		self.registry.list_resource_providers_by_realm(realm)
	}

	fn find_persisted(&self, provider: &ProviderId) -> Result<ProviderDeclaration> {
		self.store
			.find(self.resource_type, provider)?
			.ok_or_else(|| Error::not_found(NotFoundKind::Provider, provider))
	}

	fn schema(&self, authority: &AuthorityId, section: ConfigSection) -> Result<ConfigurableProperties> {
		let configuration_provider = self
			.authority(authority)?
			.configuration_provider()
			.ok_or_else(|| Error::not_found(NotFoundKind::ConfigurationProvider, authority))?;

		Ok(configuration_provider.properties(section))
	}

	fn ensure_unused(&self, provider: &ProviderId) -> Result<()> {
		if self.system_providers.contains_key(provider)
			|| self.store.find(self.resource_type, provider)?.is_some()
		{
			return Err(Error::AlreadyRegistered {
				kind: DuplicateKind::ProviderId,
				value: provider.to_string(),
			});
		}

		Ok(())
	}

	fn ensure_unique_name(
		&self,
		realm: &RealmId,
		name: &str,
		exclude: Option<&ProviderId>,
	) -> Result<()> {
		let taken = self
			.store
			.list_by_realm(self.resource_type, realm)?
			.iter()
			.any(|d| Some(&d.provider) != exclude && d.has_name(name));

		if taken {
			return Err(Error::AlreadyRegistered { kind: DuplicateKind::Name, value: name.into() });
		}

		Ok(())
	}
}
impl Debug for ConfigurableProviderService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigurableProviderService")
			.field("resource_type", &self.resource_type)
			.field("authorities", &self.authorities.keys().collect::<Vec<_>>())
			.field("system_providers", &self.system_providers.keys().collect::<Vec<_>>())
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

/// Parses both raw maps through the authority's configuration provider, then runs the
/// validator over the normalized output.
///
/// Authorities without a configuration provider get their raw maps back unchanged.
fn prepare_maps(
	authority: &dyn ConfigurableProviderAuthority,
	validator: Option<&dyn Validator>,
	raw_settings: &ConfigValues,
	raw_configuration: &ConfigValues,
) -> Result<(ConfigValues, ConfigValues)> {
	let configuration_provider = authority.configuration_provider();
	let mut violations = Vec::new();
	let mut normalize = |section, raw: &ConfigValues| match configuration_provider {
		Some(parser) => parser.normalize(section, raw).unwrap_or_else(|e| {
			violations.extend(e.violations);

			ConfigValues::new()
		}),
		None => raw.clone(),
	};
	let settings = normalize(ConfigSection::Settings, raw_settings);
	let configuration = normalize(ConfigSection::Configuration, raw_configuration);

	if !violations.is_empty() {
		return Err(ValidationError::new(violations).into());
	}

	if let Some(validator) = validator {
		for (section, values) in
			[(ConfigSection::Settings, &settings), (ConfigSection::Configuration, &configuration)]
		{
			let schema = configuration_provider
				.map(|parser| parser.properties(section).schema)
				.unwrap_or(Value::Bool(true));
			let target =
				ValidationTarget { authority: authority.authority(), section, values, schema: &schema };

			violations.extend(validator.validate(&target).into_iter().map(|v| v.within(section)));
		}

		if !violations.is_empty() {
			return Err(ValidationError::new(violations).into());
		}
	}

	Ok((settings, configuration))
}

fn ensure_unchanged<T>(field: &str, supplied: Option<&T>, stored: &T) -> Result<()>
where
	T: PartialEq + Display,
{
	match supplied {
		Some(supplied) if supplied != stored =>
			Err(Error::immutable(format!("{field} cannot change from `{stored}` to `{supplied}`"))),
		_ => Ok(()),
	}
}
