//! Storage contracts and built-in store implementations for provider declarations.

pub mod file;
pub mod memory;

pub use file::FileProviderStore;
pub use memory::MemoryProviderStore;

// self
use crate::{
	_prelude::*,
	model::{ProviderDeclaration, ProviderId, RealmId, ResourceType},
};

/// Storage backend contract implemented by provider declaration stores.
///
/// Stores are dumb persistence: realm rules, versioning, and validation belong to
/// the service layer. Every call is synchronous and completes within the caller.
pub trait ProviderStore
where
	Self: Send + Sync,
{
	/// Fetches the declaration for the type + provider id, if present.
	fn find(
		&self,
		resource_type: ResourceType,
		provider: &ProviderId,
	) -> Result<Option<ProviderDeclaration>, StoreError>;

	/// Lists every declaration of a type.
	fn list(&self, resource_type: ResourceType) -> Result<Vec<ProviderDeclaration>, StoreError>;

	/// Lists the declarations of a type within one realm.
	fn list_by_realm(
		&self,
		resource_type: ResourceType,
		realm: &RealmId,
	) -> Result<Vec<ProviderDeclaration>, StoreError> {
		Ok(self.list(resource_type)?.into_iter().filter(|d| &d.realm == realm).collect())
	}

	/// Inserts a new declaration unless the type + provider id already exists.
	fn insert(&self, declaration: ProviderDeclaration) -> Result<WriteOutcome, StoreError>;

	/// Replaces an existing declaration; reports [`WriteOutcome::Missing`] otherwise.
	fn replace(&self, declaration: ProviderDeclaration) -> Result<WriteOutcome, StoreError>;

	/// Removes a declaration, returning it when present.
	fn delete(
		&self,
		resource_type: ResourceType,
		provider: &ProviderId,
	) -> Result<Option<ProviderDeclaration>, StoreError>;
}

/// Result of a conditional store write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
	/// The declaration was written.
	Written,
	/// An insert hit an existing type + provider id.
	Conflict,
	/// A replace found no declaration to overwrite.
	Missing,
}

/// Error type produced by [`ProviderStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a stored declaration.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Resource type component.
	pub resource_type: ResourceType,
	/// Provider identifier component.
	pub provider: ProviderId,
}
impl StoreKey {
	/// Builds a key for the provided type + provider id.
	pub fn new(resource_type: ResourceType, provider: &ProviderId) -> Self {
		Self { resource_type, provider: provider.clone() }
	}

	/// Builds the key of an existing declaration.
	pub fn of(declaration: &ProviderDeclaration) -> Self {
		Self::new(declaration.resource_type, &declaration.provider)
	}
}
