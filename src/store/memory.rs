//! Thread-safe in-memory [`ProviderStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	model::{ProviderDeclaration, ProviderId, RealmId, ResourceType},
	store::{ProviderStore, StoreError, StoreKey, WriteOutcome},
};

type StoreMap = Arc<RwLock<BTreeMap<StoreKey, ProviderDeclaration>>>;

/// Thread-safe storage backend that keeps declarations in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryProviderStore(StoreMap);
impl MemoryProviderStore {
	/// Number of stored declarations across all types.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl ProviderStore for MemoryProviderStore {
	fn find(
		&self,
		resource_type: ResourceType,
		provider: &ProviderId,
	) -> Result<Option<ProviderDeclaration>, StoreError> {
		Ok(self.0.read().get(&StoreKey::new(resource_type, provider)).cloned())
	}

	fn list(&self, resource_type: ResourceType) -> Result<Vec<ProviderDeclaration>, StoreError> {
		Ok(self.0.read().values().filter(|d| d.resource_type == resource_type).cloned().collect())
	}

	fn list_by_realm(
		&self,
		resource_type: ResourceType,
		realm: &RealmId,
	) -> Result<Vec<ProviderDeclaration>, StoreError> {
		Ok(self
			.0
			.read()
			.values()
			.filter(|d| d.resource_type == resource_type && &d.realm == realm)
			.cloned()
			.collect())
	}

	fn insert(&self, declaration: ProviderDeclaration) -> Result<WriteOutcome, StoreError> {
		let key = StoreKey::of(&declaration);
		let mut guard = self.0.write();

		if guard.contains_key(&key) {
			return Ok(WriteOutcome::Conflict);
		}

		guard.insert(key, declaration);

		Ok(WriteOutcome::Written)
	}

	fn replace(&self, declaration: ProviderDeclaration) -> Result<WriteOutcome, StoreError> {
		let key = StoreKey::of(&declaration);
		let mut guard = self.0.write();

		match guard.get_mut(&key) {
			Some(existing) => {
				*existing = declaration;

				Ok(WriteOutcome::Written)
			},
			None => Ok(WriteOutcome::Missing),
		}
	}

	fn delete(
		&self,
		resource_type: ResourceType,
		provider: &ProviderId,
	) -> Result<Option<ProviderDeclaration>, StoreError> {
		Ok(self.0.write().remove(&StoreKey::new(resource_type, provider)))
	}
}
