// self
use crate::{
	_prelude::*,
	model::{AuthorityId, ProviderId, ResourceType},
	obs::{LifecycleEvent, Operation},
};

/// A span builder used by registry operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + resource type.
	pub fn new(op: Operation, resource_type: ResourceType) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"provider_registry.op",
				op = op.as_str(),
				resource_type = resource_type.as_str()
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, resource_type);

			Self {}
		}
	}

	/// Enters the span until the returned guard drops.
	pub fn entered(self) -> OperationSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OperationSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OperationSpanGuard {}
		}
	}
}

/// RAII guard returned by [`OperationSpan::entered`].
pub struct OperationSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OperationSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OperationSpanGuard(..)")
	}
}

/// Emits a structured lifecycle event for a live provider (when enabled).
pub fn record_lifecycle(event: LifecycleEvent, authority: &AuthorityId, provider: &ProviderId) {
	#[cfg(feature = "tracing")]
	{
		match event {
			LifecycleEvent::BuildFailed => tracing::warn!(
				event = event.as_str(),
				authority = authority.as_str(),
				provider = provider.as_str(),
				"Provider build failed."
			),
			_ => tracing::info!(
				event = event.as_str(),
				authority = authority.as_str(),
				provider = provider.as_str(),
				"Provider lifecycle changed."
			),
		}
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (event, authority, provider);
	}
}
