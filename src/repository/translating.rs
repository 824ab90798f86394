//! Read-only repository view that converts entries from a foreign configuration shape.

// self
use crate::{
	_prelude::*,
	model::{ProviderId, RealmId},
	repository::{ConfigIdentity, ProviderConfigRepository, RepositoryError},
};

/// Converts a foreign configuration into the shape a caller expects.
pub trait ConfigConverter<U, T>
where
	Self: Send + Sync,
{
	/// Converts one entry; the error message is surfaced through [`RepositoryError::Conversion`].
	fn convert(&self, source: &U) -> Result<T, String>;
}
impl<U, T, E, F> ConfigConverter<U, T> for F
where
	F: Send + Sync + Fn(&U) -> Result<T, E>,
	E: Display,
{
	fn convert(&self, source: &U) -> Result<T, String> {
		self(source).map_err(|e| e.to_string())
	}
}

/// Wraps a repository of `U` values and exposes them as `T` values.
///
/// Conversion happens on every read. Single lookups report conversion failures; list reads
/// skip entries that fail to convert. Writes are rejected.
pub struct TranslatingProviderConfigRepository<U, T> {
	source: Arc<dyn ProviderConfigRepository<U>>,
	converter: Arc<dyn ConfigConverter<U, T>>,
}
impl<U, T> TranslatingProviderConfigRepository<U, T>
where
	U: ConfigIdentity,
	T: ConfigIdentity,
{
	const LABEL: &'static str = "translating";

	/// Creates a view over the provided source repository.
	pub fn new(
		source: Arc<dyn ProviderConfigRepository<U>>,
		converter: impl 'static + ConfigConverter<U, T>,
	) -> Self {
		Self { source, converter: Arc::new(converter) }
	}

	fn translate(&self, entry: &U) -> Result<Arc<T>, RepositoryError> {
		self.converter.convert(entry).map(Arc::new).map_err(|message| {
			RepositoryError::Conversion { provider: entry.provider().clone(), message }
		})
	}

	fn translate_all(&self, entries: Vec<Arc<U>>) -> Vec<Arc<T>> {
		entries
			.iter()
			.filter_map(|entry| match self.translate(entry) {
				Ok(converted) => Some(converted),
				Err(_e) => {
					#[cfg(feature = "tracing")]
					tracing::warn!(provider = %entry.provider(), error = %_e, "Skipping unconvertible configuration.");

					None
				},
			})
			.collect()
	}

	fn read_only(&self) -> RepositoryError {
		RepositoryError::ReadOnly { repository: Self::LABEL.into() }
	}
}
impl<U, T> Debug for TranslatingProviderConfigRepository<U, T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TranslatingProviderConfigRepository(..)")
	}
}
impl<U, T> ProviderConfigRepository<T> for TranslatingProviderConfigRepository<U, T>
where
	U: ConfigIdentity,
	T: ConfigIdentity,
{
	fn find_by_provider_id(&self, provider: &ProviderId) -> Result<Option<Arc<T>>, RepositoryError> {
		self.source.find_by_provider_id(provider)?.map(|entry| self.translate(&entry)).transpose()
	}

	fn find_all(&self) -> Result<Vec<Arc<T>>, RepositoryError> {
		Ok(self.translate_all(self.source.find_all()?))
	}

	fn find_by_realm(&self, realm: &RealmId) -> Result<Vec<Arc<T>>, RepositoryError> {
		Ok(self.translate_all(self.source.find_by_realm(realm)?))
	}

	fn add_registration(&self, _config: Arc<T>) -> Result<(), RepositoryError> {
		Err(self.read_only())
	}

	fn remove_registration(&self, _provider: &ProviderId) -> Result<Option<Arc<T>>, RepositoryError> {
		Err(self.read_only())
	}

	fn remove_config(&self, _config: &T) -> Result<(), RepositoryError> {
		Err(self.read_only())
	}
}
