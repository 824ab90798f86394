//! Multi-tenant provider registry: declare, validate, version, and run per-realm identity,
//! credential, and resource providers behind pluggable authorities.
//!
//! Declarations are persisted through a [`store::ProviderStore`] and managed by a
//! [`service::ConfigurableProviderService`]. Authorities turn declarations into typed
//! [`config::ProviderConfig`] values and live [`authority::ResourceProvider`] instances;
//! downstream code looks those up through authorities or a [`registry::ResourceProviderRegistry`],
//! never through the store.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authority;
pub mod config;
pub mod error;
pub mod model;
pub mod obs;
pub mod registry;
pub mod repository;
pub mod service;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;

	pub use crate::error::{Error, Result};
}

pub use serde_json;
