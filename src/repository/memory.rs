//! In-process repository keyed by provider id with a realm index.

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	model::{ProviderId, RealmId},
	repository::{ConfigIdentity, ProviderConfigRepository, RepositoryError},
};

/// Thread-safe repository that keeps runtime configurations in memory.
///
/// The id map and the realm index live under one lock so readers never observe an entry in
/// one but not the other.
#[derive(Debug)]
pub struct InMemoryProviderConfigRepository<T> {
	inner: RwLock<Index<T>>,
}
impl<T> InMemoryProviderConfigRepository<T>
where
	T: ConfigIdentity,
{
	/// Creates an empty repository.
	pub fn new() -> Self {
		Self { inner: RwLock::new(Index { by_id: HashMap::new(), by_realm: HashMap::new() }) }
	}

	/// Number of registered configurations.
	pub fn len(&self) -> usize {
		self.inner.read().by_id.len()
	}

	/// Returns true when nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.inner.read().by_id.is_empty()
	}
}
impl<T> Default for InMemoryProviderConfigRepository<T>
where
	T: ConfigIdentity,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T> ProviderConfigRepository<T> for InMemoryProviderConfigRepository<T>
where
	T: ConfigIdentity,
{
	fn find_by_provider_id(&self, provider: &ProviderId) -> Result<Option<Arc<T>>, RepositoryError> {
		Ok(self.inner.read().by_id.get(provider).cloned())
	}

	fn find_all(&self) -> Result<Vec<Arc<T>>, RepositoryError> {
		let guard = self.inner.read();
		let mut configs: Vec<_> = guard.by_id.values().cloned().collect();

		configs.sort_by(|a, b| a.provider().cmp(b.provider()));

		Ok(configs)
	}

	fn find_by_realm(&self, realm: &RealmId) -> Result<Vec<Arc<T>>, RepositoryError> {
		let guard = self.inner.read();
		let Some(ids) = guard.by_realm.get(realm) else {
			return Ok(Vec::new());
		};

		Ok(ids.iter().filter_map(|id| guard.by_id.get(id).cloned()).collect())
	}

	fn add_registration(&self, config: Arc<T>) -> Result<(), RepositoryError> {
		let mut guard = self.inner.write();
		let provider = config.provider().clone();
		let realm = config.realm().clone();

		if let Some(previous) = guard.by_id.insert(provider.clone(), config) {
			guard.unindex(previous.realm(), &provider);
		}

		guard.by_realm.entry(realm).or_default().insert(provider);

		Ok(())
	}

	fn remove_registration(&self, provider: &ProviderId) -> Result<Option<Arc<T>>, RepositoryError> {
		let mut guard = self.inner.write();
		let removed = guard.by_id.remove(provider);

		if let Some(config) = &removed {
			guard.unindex(config.realm(), provider);
		}

		Ok(removed)
	}
}

#[derive(Debug)]
struct Index<T> {
	by_id: HashMap<ProviderId, Arc<T>>,
	by_realm: HashMap<RealmId, BTreeSet<ProviderId>>,
}
impl<T> Index<T> {
	fn unindex(&mut self, realm: &RealmId, provider: &ProviderId) {
		if let Some(ids) = self.by_realm.get_mut(realm) {
			ids.remove(provider);

			if ids.is_empty() {
				self.by_realm.remove(realm);
			}
		}
	}
}
