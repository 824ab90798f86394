//! Strongly typed identifiers for realms, providers, and authorities.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use uuid::Uuid;
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $min:expr, $allowed:expr) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view, $min, $allowed)?;

				Ok(Self(view.to_owned()))
			}

			/// Returns the identifier as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value, $min, $allowed)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;
const PROVIDER_ID_MIN_LEN: usize = 3;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (realm, provider, authority).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (realm, provider, authority).
		kind: &'static str,
	},
	/// The identifier is shorter than the kind allows.
	#[error("{kind} identifier must be at least {min} characters.")]
	TooShort {
		/// Kind of identifier (realm, provider, authority).
		kind: &'static str,
		/// Minimum permitted character count.
		min: usize,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (realm, provider, authority).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier contains a character outside the permitted set.
	#[error("{kind} identifier contains the invalid character {invalid:?}.")]
	InvalidCharacter {
		/// Kind of identifier (realm, provider, authority).
		kind: &'static str,
		/// First offending character.
		invalid: char,
	},
}

def_id! { RealmId, "Tenant boundary that scopes provider declarations.", "Realm", 1, is_realm_char }
def_id! {
	ProviderId,
	"Identifier of one configured provider; a slug (`[a-zA-Z0-9_-]{3,}`) or a generated UUID.",
	"Provider",
	PROVIDER_ID_MIN_LEN,
	is_slug_char
}
def_id! { AuthorityId, "Identifier of the authority implementing a provider kind.", "Authority", 1, is_realm_char }

impl RealmId {
	/// Pseudo-realm that never holds persisted providers.
	pub const GLOBAL: &'static str = "global";
	/// Pseudo-realm serving the in-memory system providers.
	pub const SYSTEM: &'static str = "system";

	/// Returns the `global` pseudo-realm.
	pub fn global() -> Self {
		Self(Self::GLOBAL.into())
	}

	/// Returns the `system` pseudo-realm.
	pub fn system() -> Self {
		Self(Self::SYSTEM.into())
	}

	/// Returns true for the `global` pseudo-realm.
	pub fn is_global(&self) -> bool {
		self.0 == Self::GLOBAL
	}

	/// Returns true for the `system` pseudo-realm.
	pub fn is_system(&self) -> bool {
		self.0 == Self::SYSTEM
	}

	/// Returns true when the realm can never hold persisted providers.
	pub fn is_reserved(&self) -> bool {
		self.is_global() || self.is_system()
	}
}

impl ProviderId {
	/// Generates a random UUID-based identifier.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}
}

fn is_slug_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_realm_char(c: char) -> bool {
	is_slug_char(c) || c == '.'
}

fn validate_view(
	kind: &'static str,
	view: &str,
	min: usize,
	allowed: fn(char) -> bool,
) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if let Some(invalid) = view.chars().find(|c| !allowed(*c)) {
		return Err(IdentifierError::InvalidCharacter { kind, invalid });
	}
	if view.len() < min {
		return Err(IdentifierError::TooShort { kind, min });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
