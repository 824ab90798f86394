//! Simple file-backed [`ProviderStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	model::{ProviderDeclaration, ProviderId, ResourceType},
	store::{ProviderStore, StoreError, StoreKey, WriteOutcome},
};

type Snapshot = BTreeMap<StoreKey, ProviderDeclaration>;

/// Persists provider declarations to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileProviderStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileProviderStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { Snapshot::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Snapshot::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let entries: Vec<ProviderDeclaration> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().map(|d| (StoreKey::of(&d), d)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.values().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl ProviderStore for FileProviderStore {
	fn find(
		&self,
		resource_type: ResourceType,
		provider: &ProviderId,
	) -> Result<Option<ProviderDeclaration>, StoreError> {
		Ok(self.inner.read().get(&StoreKey::new(resource_type, provider)).cloned())
	}

	fn list(&self, resource_type: ResourceType) -> Result<Vec<ProviderDeclaration>, StoreError> {
		Ok(self
			.inner
			.read()
			.values()
			.filter(|d| d.resource_type == resource_type)
			.cloned()
			.collect())
	}

	fn insert(&self, declaration: ProviderDeclaration) -> Result<WriteOutcome, StoreError> {
		let key = StoreKey::of(&declaration);
		let mut guard = self.inner.write();

		if guard.contains_key(&key) {
			return Ok(WriteOutcome::Conflict);
		}

		guard.insert(key.clone(), declaration);

		if let Err(e) = self.persist_locked(&guard) {
			guard.remove(&key);

			return Err(e);
		}

		Ok(WriteOutcome::Written)
	}

	fn replace(&self, declaration: ProviderDeclaration) -> Result<WriteOutcome, StoreError> {
		let key = StoreKey::of(&declaration);
		let mut guard = self.inner.write();
		let Some(previous) = guard.insert(key.clone(), declaration) else {
			guard.remove(&key);

			return Ok(WriteOutcome::Missing);
		};

		if let Err(e) = self.persist_locked(&guard) {
			guard.insert(key, previous);

			return Err(e);
		}

		Ok(WriteOutcome::Written)
	}

	fn delete(
		&self,
		resource_type: ResourceType,
		provider: &ProviderId,
	) -> Result<Option<ProviderDeclaration>, StoreError> {
		let key = StoreKey::new(resource_type, provider);
		let mut guard = self.inner.write();
		let Some(removed) = guard.remove(&key) else {
			return Ok(None);
		};

		if let Err(e) = self.persist_locked(&guard) {
			guard.insert(key, removed);

			return Err(e);
		}

		Ok(Some(removed))
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;
	use crate::{
		config::ConfigValues,
		model::{AuthorityId, RealmId},
	};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"provider_registry_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_declaration() -> ProviderDeclaration {
		ProviderDeclaration {
			resource_type: ResourceType::IdentityProvider,
			authority: AuthorityId::new("internal").expect("Failed to build authority fixture."),
			provider: ProviderId::new("acme-login").expect("Failed to build provider fixture."),
			realm: RealmId::new("acme").expect("Failed to build realm fixture."),
			name: "Acme Login".into(),
			description: None,
			titles: BTreeMap::new(),
			descriptions: BTreeMap::new(),
			settings: ConfigValues::new(),
			configuration: ConfigValues::new(),
			version: Some(1),
			enabled: true,
			created_at: Some(OffsetDateTime::UNIX_EPOCH),
			updated_at: Some(OffsetDateTime::UNIX_EPOCH),
		}
	}

	#[test]
	fn empty_file_opens_as_an_empty_store() {
		let path = temp_path();

		File::create(&path).expect("Failed to create empty snapshot file.");

		let store = FileProviderStore::open(&path).expect("Empty snapshot files should open.");

		assert!(
			store
				.list(ResourceType::IdentityProvider)
				.expect("Failed to list empty file store.")
				.is_empty()
		);
		assert_eq!(
			store.insert(build_declaration()).expect("Failed to insert into empty file store."),
			WriteOutcome::Written
		);

		let reopened = FileProviderStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert_eq!(
			reopened.list(ResourceType::IdentityProvider).expect("Failed to list reopened store.").len(),
			1
		);

		let _ = fs::remove_file(&path);
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileProviderStore::open(&path).expect("Failed to open file store snapshot.");
		let declaration = build_declaration();

		assert_eq!(
			store.insert(declaration.clone()).expect("Failed to insert fixture declaration."),
			WriteOutcome::Written
		);
		drop(store);

		let reopened =
			FileProviderStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = reopened
			.find(declaration.resource_type, &declaration.provider)
			.expect("Failed to fetch fixture declaration from file store.")
			.expect("File store lost declaration after reopen.");

		assert_eq!(fetched, declaration);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn conditional_writes_report_outcomes() {
		let path = temp_path();
		let store = FileProviderStore::open(&path).expect("Failed to open file store snapshot.");
		let mut declaration = build_declaration();

		assert_eq!(
			store.replace(declaration.clone()).expect("Replace should not fail."),
			WriteOutcome::Missing
		);
		assert!(
			store
				.find(declaration.resource_type, &declaration.provider)
				.expect("Find should not fail.")
				.is_none(),
			"A missing replace must not create the declaration."
		);
		store.insert(declaration.clone()).expect("Insert should not fail.");
		assert_eq!(
			store.insert(declaration.clone()).expect("Insert should not fail."),
			WriteOutcome::Conflict
		);

		declaration.version = Some(2);

		assert_eq!(
			store.replace(declaration.clone()).expect("Replace should not fail."),
			WriteOutcome::Written
		);
		assert_eq!(
			store
				.delete(declaration.resource_type, &declaration.provider)
				.expect("Delete should not fail.")
				.and_then(|d| d.version),
			Some(2)
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
