//! Shared fixtures for integration tests: sample ConfigMaps, factories, and a wired service.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};
// crates.io
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
// self
use provider_registry::{
	authority::{ConfigurableAuthority, ProviderFactory, ResourceProvider},
	config::{
		ConfigMap, ConfigValues, ProviderConfig, SchemaValidator, schema_for_boolean,
		schema_for_object, schema_for_string, schema_for_string_array,
	},
	model::{AuthorityId, ProviderDraft, ProviderId, RealmId, ResourceType},
	service::ConfigurableProviderService,
	store::{MemoryProviderStore, ProviderStore},
};

pub const INTERNAL: &str = "internal";
pub const OIDC: &str = "oidc";
pub const SYSTEM_LOGIN: &str = "system-login";

/// Provider-agnostic login settings shared by every authority in the fixtures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
	pub linkable: bool,
	pub persistence: String,
}
impl Default for LoginSettings {
	fn default() -> Self {
		Self { linkable: true, persistence: "repository".into() }
	}
}
impl ConfigMap for LoginSettings {
	const RESOURCE_ID: &'static str = "fixtures.login-settings";

	fn schema() -> Value {
		schema_for_object(
			Self::RESOURCE_ID,
			"Login settings",
			json!({
				"linkable": schema_for_boolean("Whether accounts can be linked."),
				"persistence": {
					"type": "string",
					"enum": ["none", "session", "repository"],
					"description": "Where user data is persisted.",
				},
			}),
		)
	}
}

/// Configuration of the username/password authority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalConfiguration {
	pub confirm_email: bool,
	pub password_min_length: u32,
}
impl Default for InternalConfiguration {
	fn default() -> Self {
		Self { confirm_email: false, password_min_length: 8 }
	}
}
impl ConfigMap for InternalConfiguration {
	const RESOURCE_ID: &'static str = "fixtures.internal";

	fn schema() -> Value {
		schema_for_object(
			Self::RESOURCE_ID,
			"Internal login",
			json!({
				"confirm_email": schema_for_boolean("Require email confirmation."),
				"password_min_length": {
					"type": "integer",
					"minimum": 8,
					"description": "Minimum password length.",
				},
			}),
		)
	}
}

/// Configuration of the OpenID Connect authority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcConfiguration {
	pub issuer: String,
	pub client_id: String,
	pub scopes: Vec<String>,
}
impl Default for OidcConfiguration {
	fn default() -> Self {
		Self { issuer: String::new(), client_id: String::new(), scopes: vec!["openid".into()] }
	}
}
impl ConfigMap for OidcConfiguration {
	const RESOURCE_ID: &'static str = "fixtures.oidc";

	fn schema() -> Value {
		schema_for_object(
			Self::RESOURCE_ID,
			"OpenID Connect",
			json!({
				"issuer": { "type": "string", "description": "Issuer URL." },
				"client_id": schema_for_string("Client identifier."),
				"scopes": schema_for_string_array("Requested scopes."),
			}),
		)
	}
}

/// Live login provider built by the fixture factories.
#[derive(Debug)]
pub struct LoginProvider<C> {
	pub config: Arc<ProviderConfig<LoginSettings, C>>,
	pub released: AtomicBool,
}
impl<C> LoginProvider<C> {
	pub fn is_released(&self) -> bool {
		self.released.load(Ordering::SeqCst)
	}
}
impl<C> ResourceProvider for LoginProvider<C>
where
	C: ConfigMap,
{
	fn authority(&self) -> &AuthorityId {
		&self.config.authority
	}

	fn provider(&self) -> &ProviderId {
		&self.config.provider
	}

	fn realm(&self) -> &RealmId {
		&self.config.realm
	}

	fn resource_type(&self) -> ResourceType {
		self.config.resource_type
	}
}

/// Failure raised when an OIDC issuer cannot be reached.
#[derive(Debug, thiserror::Error)]
#[error("Issuer metadata is unreachable.")]
pub struct MetadataUnreachable;

/// Factory that always builds internal login providers.
#[derive(Debug, Default)]
pub struct InternalFactory {
	pub builds: AtomicUsize,
	pub releases: AtomicUsize,
}
impl ProviderFactory for InternalFactory {
	type Configuration = InternalConfiguration;
	type Error = MetadataUnreachable;
	type Provider = LoginProvider<InternalConfiguration>;
	type Settings = LoginSettings;

	fn build_provider(
		&self,
		config: Arc<ProviderConfig<LoginSettings, InternalConfiguration>>,
	) -> Result<Self::Provider, Self::Error> {
		self.builds.fetch_add(1, Ordering::SeqCst);

		Ok(LoginProvider { config, released: AtomicBool::new(false) })
	}

	fn release_provider(&self, provider: &Self::Provider) {
		self.releases.fetch_add(1, Ordering::SeqCst);
		provider.released.store(true, Ordering::SeqCst);
	}
}

/// Factory that fails unless the issuer uses HTTPS.
#[derive(Debug, Default)]
pub struct OidcFactory {
	pub builds: AtomicUsize,
}
impl ProviderFactory for OidcFactory {
	type Configuration = OidcConfiguration;
	type Error = MetadataUnreachable;
	type Provider = LoginProvider<OidcConfiguration>;
	type Settings = LoginSettings;

	fn build_provider(
		&self,
		config: Arc<ProviderConfig<LoginSettings, OidcConfiguration>>,
	) -> Result<Self::Provider, Self::Error> {
		self.builds.fetch_add(1, Ordering::SeqCst);

		if !config.configuration.issuer.starts_with("https://") {
			return Err(MetadataUnreachable);
		}

		Ok(LoginProvider { config, released: AtomicBool::new(false) })
	}

	fn release_provider(&self, provider: &Self::Provider) {
		provider.released.store(true, Ordering::SeqCst);
	}
}

/// Fully wired service plus handles on its collaborators.
pub struct Fixture {
	pub service: ConfigurableProviderService,
	pub store: Arc<MemoryProviderStore>,
	pub internal: Arc<ConfigurableAuthority<InternalFactory>>,
	pub oidc: Arc<ConfigurableAuthority<OidcFactory>>,
}

pub fn id(value: &str) -> ProviderId {
	ProviderId::new(value).expect("Provider fixture should be valid.")
}

pub fn realm(value: &str) -> RealmId {
	RealmId::new(value).expect("Realm fixture should be valid.")
}

pub fn authority(value: &str) -> AuthorityId {
	AuthorityId::new(value).expect("Authority fixture should be valid.")
}

pub fn values(value: Value) -> ConfigValues {
	match value {
		Value::Object(map) => map,
		_ => panic!("Fixture must be a JSON object."),
	}
}

pub fn internal_authority() -> Arc<ConfigurableAuthority<InternalFactory>> {
	Arc::new(
		ConfigurableAuthority::builder(
			authority(INTERNAL),
			ResourceType::IdentityProvider,
			InternalFactory::default(),
		)
		.build(),
	)
}

pub fn oidc_authority() -> Arc<ConfigurableAuthority<OidcFactory>> {
	Arc::new(
		ConfigurableAuthority::builder(
			authority(OIDC),
			ResourceType::IdentityProvider,
			OidcFactory::default(),
		)
		.build(),
	)
}

/// Draft targeting the internal authority with a display name.
pub fn internal_draft(name: &str) -> ProviderDraft {
	ProviderDraft::new(authority(INTERNAL)).with_name(name)
}

/// Draft targeting the OIDC authority with the provided issuer.
pub fn oidc_draft(name: &str, issuer: &str) -> ProviderDraft {
	ProviderDraft::new(authority(OIDC))
		.with_name(name)
		.with_configuration(values(json!({ "issuer": issuer, "client_id": "acme" })))
}

/// Builds a service over a fresh memory store with both authorities, the schema validator,
/// and one system provider.
pub fn fixture() -> Fixture {
	fixture_with_store(Arc::new(MemoryProviderStore::default()))
}

pub fn fixture_with_store(store: Arc<MemoryProviderStore>) -> Fixture {
	let internal = internal_authority();
	let oidc = oidc_authority();
	let backend: Arc<dyn ProviderStore> = store.clone();
	let service = ConfigurableProviderService::builder(ResourceType::IdentityProvider, backend)
		.authority(internal.clone())
		.authority(oidc.clone())
		.validator(Arc::new(SchemaValidator))
		.system_provider(authority(INTERNAL), id(SYSTEM_LOGIN), internal_draft("System Login"))
		.build()
		.expect("Fixture service should build.");

	Fixture { service, store, internal, oidc }
}
