// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{Operation, OperationOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(op: Operation, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"provider_registry_operation_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

/// Thread-safe lifecycle counters kept by each configurable authority.
#[derive(Debug, Default)]
pub struct RegistrationMetrics {
	registrations: AtomicU64,
	replacements: AtomicU64,
	unregistrations: AtomicU64,
	build_failures: AtomicU64,
}
impl RegistrationMetrics {
	/// Returns the number of first-time registrations.
	pub fn registrations(&self) -> u64 {
		self.registrations.load(Ordering::Relaxed)
	}

	/// Returns the number of registrations that replaced an active instance.
	pub fn replacements(&self) -> u64 {
		self.replacements.load(Ordering::Relaxed)
	}

	/// Returns the number of released instances.
	pub fn unregistrations(&self) -> u64 {
		self.unregistrations.load(Ordering::Relaxed)
	}

	/// Returns the number of factory failures.
	pub fn build_failures(&self) -> u64 {
		self.build_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_registration(&self) {
		self.registrations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_replacement(&self) {
		self.replacements.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_unregistration(&self) {
		self.unregistrations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_build_failure(&self) {
		self.build_failures.fetch_add(1, Ordering::Relaxed);
	}
}
