//! Optional observability helpers for registry operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `provider_registry.op` with the `op` and
//!   `resource_type` fields, plus lifecycle events carrying `authority` and `provider`.
//! - Enable `metrics` to increment the `provider_registry_operation_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.
//!
//! [`RegistrationMetrics`] counters are always available.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Registry operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Declaration creation.
	Add,
	/// Declaration update.
	Update,
	/// Declaration removal.
	Delete,
	/// Live provider registration.
	Register,
	/// Live provider teardown.
	Unregister,
	/// Bulk registration of enabled declarations.
	RegisterEnabled,
	/// Service construction, including system providers.
	Build,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Add => "add",
			Operation::Update => "update",
			Operation::Delete => "delete",
			Operation::Register => "register",
			Operation::Unregister => "unregister",
			Operation::RegisterEnabled => "register_enabled",
			Operation::Build => "build",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a registry operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Lifecycle transitions of a live provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	/// A new provider instance became active.
	Registered,
	/// An active instance was swapped for a rebuilt one.
	Replaced,
	/// An active instance was released.
	Unregistered,
	/// The factory failed to build an instance.
	BuildFailed,
}
impl LifecycleEvent {
	/// Returns a stable label suitable for event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LifecycleEvent::Registered => "registered",
			LifecycleEvent::Replaced => "replaced",
			LifecycleEvent::Unregistered => "unregistered",
			LifecycleEvent::BuildFailed => "build_failed",
		}
	}
}
impl Display for LifecycleEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `f` inside an operation span, recording attempt and outcome.
pub(crate) fn observe<T>(
	op: Operation,
	resource_type: crate::model::ResourceType,
	f: impl FnOnce() -> Result<T>,
) -> Result<T> {
	let _span = OperationSpan::new(op, resource_type).entered();

	record_operation_outcome(op, OperationOutcome::Attempt);

	let result = f();

	match &result {
		Ok(_) => record_operation_outcome(op, OperationOutcome::Success),
		Err(_e) => {
			#[cfg(feature = "tracing")]
			::tracing::debug!(error = %_e, "Registry operation failed.");

			record_operation_outcome(op, OperationOutcome::Failure)
		},
	}

	result
}
