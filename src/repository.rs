//! Runtime configuration repositories owned by authorities.
//!
//! A repository holds the [`ProviderConfig`](crate::config::ProviderConfig) values an authority
//! built for its live providers. It is never the source of truth for declarations; the
//! [`ProviderStore`](crate::store::ProviderStore) is.

pub mod memory;
pub mod translating;

pub use memory::InMemoryProviderConfigRepository;
pub use translating::{ConfigConverter, TranslatingProviderConfigRepository};

// self
use crate::{
	_prelude::*,
	model::{ProviderId, RealmId},
};

/// Identity of a runtime configuration held by a repository.
pub trait ConfigIdentity
where
	Self: 'static + Send + Sync,
{
	/// Provider identifier.
	fn provider(&self) -> &ProviderId;

	/// Realm the configuration serves.
	fn realm(&self) -> &RealmId;
}

/// Storage contract for runtime provider configurations.
pub trait ProviderConfigRepository<T>
where
	Self: Send + Sync,
	T: ConfigIdentity,
{
	/// Fetches the configuration registered for a provider id.
	fn find_by_provider_id(&self, provider: &ProviderId) -> Result<Option<Arc<T>>, RepositoryError>;

	/// Lists every registered configuration, ordered by provider id.
	fn find_all(&self) -> Result<Vec<Arc<T>>, RepositoryError>;

	/// Lists the configurations of one realm, ordered by provider id.
	fn find_by_realm(&self, realm: &RealmId) -> Result<Vec<Arc<T>>, RepositoryError>;

	/// Stores a configuration, replacing any previous one for the same provider id.
	fn add_registration(&self, config: Arc<T>) -> Result<(), RepositoryError>;

	/// Removes the configuration registered for a provider id.
	fn remove_registration(&self, provider: &ProviderId) -> Result<Option<Arc<T>>, RepositoryError>;

	/// Removes the entry matching a configuration's provider id.
	fn remove_config(&self, config: &T) -> Result<(), RepositoryError> {
		self.remove_registration(config.provider()).map(|_| ())
	}
}

/// Error type produced by [`ProviderConfigRepository`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RepositoryError {
	/// Write attempted against a read-only view.
	#[error("Repository `{repository}` is read-only.")]
	ReadOnly {
		/// Label of the repository that refused the write.
		repository: String,
	},
	/// Stored entry could not be converted into the requested shape.
	#[error("Configuration of provider `{provider}` cannot be converted: {message}.")]
	Conversion {
		/// Provider whose configuration failed conversion.
		provider: ProviderId,
		/// Human-readable error payload.
		message: String,
	},
}
