//! Registry-level error types shared across services, authorities, and stores.

// self
use crate::{
	_prelude::*,
	config::ValidationError,
	model::{AuthorityId, IdentifierError, ProviderId},
	repository::RepositoryError,
	store::StoreError,
};

/// Registry-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical registry error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		StoreError,
	),
	/// Runtime configuration repository failure.
	#[error(transparent)]
	Repository(#[from] RepositoryError),
	/// Raw configuration or settings failed parsing or field validation.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Malformed identifier supplied by the caller.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),

	/// Lookup miss; the caller may create the missing resource first.
	#[error("No such {kind}: {id}.")]
	NotFound {
		/// What was looked up.
		kind: NotFoundKind,
		/// Identifier that was not found.
		id: String,
	},
	/// Duplicate provider id or duplicate name within a realm.
	#[error("A provider with {kind} `{value}` is already registered.")]
	AlreadyRegistered {
		/// Which uniqueness rule was violated.
		kind: DuplicateKind,
		/// Conflicting value.
		value: String,
	},
	/// Attempt to mutate a provider or field that cannot change.
	#[error("Provider is immutable: {reason}.")]
	Immutable {
		/// Which rule was violated.
		reason: String,
	},
	/// Caller-supplied version is older than the stored one.
	#[error("Provider `{provider}` is at version {stored}; version {supplied} is outdated.")]
	VersionConflict {
		/// Provider identifier.
		provider: ProviderId,
		/// Version currently stored.
		stored: u32,
		/// Version supplied by the caller.
		supplied: u32,
	},
	/// Authority failed to build a live provider instance.
	#[error("Authority `{authority}` failed to build provider `{provider}`.")]
	System {
		/// Authority that attempted the build.
		authority: AuthorityId,
		/// Provider that could not be built.
		provider: ProviderId,
		/// Underlying authority failure.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Builds a [`Error::NotFound`] for the provided kind and identifier.
	pub fn not_found(kind: NotFoundKind, id: impl Display) -> Self {
		Self::NotFound { kind, id: id.to_string() }
	}

	/// Builds an [`Error::Immutable`] with the provided reason.
	pub fn immutable(reason: impl Into<String>) -> Self {
		Self::Immutable { reason: reason.into() }
	}

	/// Wraps an authority-side build failure.
	pub fn system(
		authority: AuthorityId,
		provider: ProviderId,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::System { authority, provider, source: Box::new(src) }
	}

	/// Returns true for lookup misses of any kind.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}

/// Lookup targets reported by [`Error::NotFound`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundKind {
	/// Provider declaration or live provider.
	Provider,
	/// Authority registered with a service or registry.
	Authority,
	/// Configuration provider of an authority.
	ConfigurationProvider,
}
impl NotFoundKind {
	/// Returns a human-readable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			NotFoundKind::Provider => "provider",
			NotFoundKind::Authority => "authority",
			NotFoundKind::ConfigurationProvider => "configuration provider",
		}
	}
}
impl Display for NotFoundKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Uniqueness rules reported by [`Error::AlreadyRegistered`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
	/// `(type, provider id)` already exists.
	ProviderId,
	/// Name already used in the realm.
	Name,
}
impl DuplicateKind {
	/// Returns a human-readable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			DuplicateKind::ProviderId => "id",
			DuplicateKind::Name => "name",
		}
	}
}
impl Display for DuplicateKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
