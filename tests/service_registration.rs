mod common;

// std
use std::sync::{Arc, atomic::Ordering};
// self
use common::*;
use provider_registry::{
	authority::{FixedProviderAuthority, ProviderAuthority},
	config::ConfigOrigin,
	error::{Error, NotFoundKind},
	model::{ProviderDraft, RealmId, ResourceType},
	service::ConfigurableProviderService,
	store::{MemoryProviderStore, ProviderStore},
};

#[test]
fn register_activates_the_stored_declaration() {
	let fixture = fixture();
	let declaration = fixture
		.service
		.add(&realm("acme"), Some(id("acme-login")), internal_draft("Acme Login"))
		.expect("Add should succeed.");

	assert!(!fixture.service.is_provider_registered(&declaration.provider).expect("Read should succeed."));

	let mut supplied = declaration.clone();

	supplied.name = "Ignored Name".into();

	let live = fixture
		.service
		.register_provider(&declaration.provider, &supplied)
		.expect("Registration should succeed.");

	assert_eq!(live.provider(), &declaration.provider);
	assert!(fixture.service.is_provider_registered(&declaration.provider).expect("Read should succeed."));
	assert!(fixture.service.find_resource_provider(&declaration.provider).is_some());

	let config = fixture
		.internal
		.find_config(&declaration.provider)
		.expect("Repository read should succeed.")
		.expect("Active provider must have a runtime configuration.");

	assert_eq!(config.name, "Acme Login", "The stored declaration must be forwarded.");
	assert_eq!(config.origin, ConfigOrigin::Persisted { version: 1 });
	assert_eq!(config.configuration, InternalConfiguration::default());
}

#[test]
fn unregister_forgets_the_instance_and_repeats_as_a_no_op() {
	let fixture = fixture();
	let declaration = fixture
		.service
		.add(&realm("acme"), Some(id("acme-login")), internal_draft("Acme Login"))
		.expect("Add should succeed.");

	fixture
		.service
		.register_provider(&declaration.provider, &declaration)
		.expect("Registration should succeed.");

	let typed = fixture.internal.find(&declaration.provider).expect("Typed instance should be active.");

	fixture.service.unregister_provider(&declaration.provider).expect("Unregister should succeed.");

	assert!(typed.is_released());
	assert!(fixture.service.find_resource_provider(&declaration.provider).is_none());
	assert!(!fixture.service.is_provider_registered(&declaration.provider).expect("Read should succeed."));

	fixture
		.service
		.unregister_provider(&declaration.provider)
		.expect("Unregistering an inactive provider must be a no-op.");
}

#[test]
fn re_registration_replaces_the_cached_instance() {
	let fixture = fixture();
	let declaration = fixture
		.service
		.add(&realm("acme"), Some(id("acme-login")), internal_draft("Acme Login"))
		.expect("Add should succeed.");

	fixture.service.register_provider(&declaration.provider, &declaration).expect("Registration should succeed.");

	let first = fixture.internal.find(&declaration.provider).expect("First instance should be active.");
	let updated = fixture
		.service
		.update(&declaration.provider, ProviderDraft::default().with_version(1).with_name("Acme Staff"))
		.expect("Update should succeed.");

	fixture.service.register_provider(&updated.provider, &updated).expect("Re-registration should succeed.");

	let second = fixture.internal.find(&declaration.provider).expect("Second instance should be active.");

	assert!(first.is_released());
	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!(second.config.name, "Acme Staff");
	assert_eq!(fixture.service.list_resource_providers_by_realm(&realm("acme")).len(), 1);
	assert_eq!(fixture.internal.metrics().replacements(), 1);
}

#[test]
fn register_requires_a_persisted_row_with_the_same_authority() {
	let fixture = fixture();
	let declaration = fixture
		.service
		.add(&realm("acme"), Some(id("acme-login")), internal_draft("Acme Login"))
		.expect("Add should succeed.");
	let mut foreign = declaration.clone();

	foreign.authority = authority(OIDC);

	assert!(matches!(
		fixture.service.register_provider(&declaration.provider, &foreign),
		Err(Error::Immutable { .. })
	));

	let mut unknown = declaration.clone();

	unknown.provider = id("never-added");

	assert!(
		fixture
			.service
			.register_provider(&unknown.provider, &unknown)
			.expect_err("Unpersisted declarations must be rejected.")
			.is_not_found()
	);
	assert!(fixture.service.unregister_provider(&id("never-added")).is_err_and(|e| e.is_not_found()));
}

#[test]
fn missing_authority_leaves_the_row_persisted_and_inactive() {
	let store = Arc::new(MemoryProviderStore::default());
	let writer = fixture_with_store(store.clone());
	let declaration = writer
		.service
		.add(&realm("acme"), Some(id("acme-login")), internal_draft("Acme Login"))
		.expect("Add should succeed.");
	let backend: Arc<dyn ProviderStore> = store.clone();
	let reader = ConfigurableProviderService::builder(ResourceType::IdentityProvider, backend)
		.authority(oidc_authority())
		.build()
		.expect("Service without the internal authority should build.");
	let err = reader
		.register_provider(&declaration.provider, &declaration)
		.expect_err("Registering against a missing authority must fail.");

	assert!(matches!(err, Error::NotFound { kind: NotFoundKind::Authority, .. }));
	assert!(reader.find(&declaration.provider).expect("Find should succeed.").is_some());
	assert!(!reader.is_provider_registered(&declaration.provider).expect("Read should succeed."));
}

#[test]
fn build_failures_propagate_and_keep_the_declaration() {
	let fixture = fixture();
	let declaration = fixture
		.service
		.add(&realm("acme"), Some(id("acme-oidc")), oidc_draft("Acme SSO", "http://idp.example"))
		.expect("Add should succeed even when the issuer is unreachable.");
	let err = fixture
		.service
		.register_provider(&declaration.provider, &declaration)
		.expect_err("Unreachable issuers must fail to build.");

	assert!(matches!(err, Error::System { .. }));
	assert!(fixture.service.get(&declaration.provider).is_ok());
	assert!(!fixture.service.is_provider_registered(&declaration.provider).expect("Read should succeed."));
	assert_eq!(fixture.oidc.metrics().build_failures(), 1);
	assert!(
		fixture.oidc.find_config(&declaration.provider).expect("Repository read should succeed.").is_none()
	);
}

#[test]
fn disabled_declarations_are_not_reported_as_registered() {
	let fixture = fixture();
	let declaration = fixture
		.service
		.add(&realm("acme"), Some(id("acme-login")), internal_draft("Acme Login").with_enabled(false))
		.expect("Add should succeed.");

	fixture.service.register_provider(&declaration.provider, &declaration).expect("Registration should succeed.");

	assert!(fixture.internal.has_provider(&declaration.provider));
	assert!(!fixture.service.is_provider_registered(&declaration.provider).expect("Read should succeed."));
	assert!(!fixture.service.is_provider_registered(&id("unknown-id")).expect("Read should succeed."));
}

#[test]
fn register_enabled_is_best_effort() {
	let fixture = fixture();

	for (provider, draft) in [
		("acme-login", internal_draft("Acme Login")),
		("acme-oidc", oidc_draft("Acme SSO", "http://idp.example")),
		("acme-off", internal_draft("Acme Off").with_enabled(false)),
		("beta-login", internal_draft("Beta Login")),
	] {
		let target = if provider.starts_with("beta") { realm("beta") } else { realm("acme") };

		fixture.service.add(&target, Some(id(provider)), draft).expect("Add should succeed.");
	}

	let failures = fixture
		.service
		.register_enabled(Some(&realm("acme")))
		.expect("Bulk registration should run.");

	assert_eq!(failures.len(), 1);
	assert_eq!(failures[0].0, id("acme-oidc"));
	assert!(matches!(failures[0].1, Error::System { .. }));
	assert!(fixture.service.is_provider_registered(&id("acme-login")).expect("Read should succeed."));
	assert!(!fixture.internal.has_provider(&id("acme-off")));
	assert!(!fixture.internal.has_provider(&id("beta-login")));

	let everything = fixture.service.register_enabled(None).expect("Bulk registration should run.");

	assert_eq!(everything.len(), 1);
	assert!(fixture.internal.has_provider(&id("beta-login")));
}

#[test]
fn system_providers_are_isolated_from_the_store() {
	let fixture = fixture();
	let system = fixture.service.get(&id(SYSTEM_LOGIN)).expect("System provider should be readable.");

	assert!(system.realm.is_system());
	assert_eq!(system.version, None);
	assert!(fixture.store.is_empty());
	assert!(fixture.service.list_by_realm(&RealmId::global()).expect("Read should succeed.").is_empty());
	assert!(fixture.service.list().expect("List should succeed.").is_empty());
	assert!(fixture.service.delete(&system.provider).expect_err("Store has no such row.").is_not_found());
	assert!(
		fixture
			.service
			.update(&system.provider, ProviderDraft::default().with_name("Renamed"))
			.expect_err("Store has no such row.")
			.is_not_found()
	);

	let live = fixture.internal.find(&system.provider).expect("System provider should be active after build.");

	assert!(live.config.is_system());
	assert!(fixture.service.is_provider_registered(&system.provider).expect("Read should succeed."));
	assert_eq!(fixture.service.list_resource_providers_by_realm(&RealmId::system()).len(), 1);
}

#[test]
fn builder_rejects_unknown_system_authorities_and_mismatched_registries() {
	let backend: Arc<dyn ProviderStore> = Arc::new(MemoryProviderStore::default());
	let unknown = ConfigurableProviderService::builder(ResourceType::IdentityProvider, backend.clone())
		.authority(internal_authority())
		.system_provider(authority("saml"), id("system-saml"), ProviderDraft::default())
		.build()
		.expect_err("System providers need a known authority.");

	assert!(matches!(unknown, Error::NotFound { kind: NotFoundKind::Authority, .. }));

	let scopes = FixedProviderAuthority::builder(authority("scopes"), ResourceType::ScopeProvider)
		.build()
		.expect("Empty fixed authority should build.");
	let mismatched = ConfigurableProviderService::builder(ResourceType::IdentityProvider, backend)
		.lookup_authority(Arc::new(scopes))
		.build()
		.expect_err("Authorities of another resource type must be rejected.");

	assert!(matches!(mismatched, Error::Validation(_)));
}

#[test]
fn lookup_authorities_join_the_registry() {
	let backend: Arc<dyn ProviderStore> = Arc::new(MemoryProviderStore::default());
	let fixed = FixedProviderAuthority::builder(authority("core"), ResourceType::IdentityProvider)
		.resource(id("anonymous"), RealmId::global())
		.build()
		.expect("Fixed authority should build.");
	let internal = internal_authority();
	let service = ConfigurableProviderService::builder(ResourceType::IdentityProvider, backend)
		.authority(internal.clone())
		.lookup_authority(Arc::new(fixed))
		.build()
		.expect("Service should build.");

	assert!(service.get_resource_provider(&id("anonymous")).is_ok());
	assert_eq!(service.list_resource_providers().len(), 1);
	assert_eq!(service.registry().authority_ids().count(), 2);
	assert_eq!(service.authority_ids().count(), 1);
	assert_eq!(internal.factory().builds.load(Ordering::SeqCst), 0);
}
