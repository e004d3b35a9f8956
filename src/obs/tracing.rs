// self
use crate::{_prelude::*, obs::FlowKind};

/// `delivery_gateway.flow` span wrapped around one gateway operation.
///
/// Without the `tracing` feature this is a zero-sized no-op.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("delivery_gateway.flow", flow = kind.as_str(), stage) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span.
	pub fn instrument<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a state transition at debug level.
pub fn debug_event(kind: FlowKind, stage: &'static str, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), stage, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage, message);
	}
}

/// Logs a recoverable failure at warn level.
pub fn warn_event(kind: FlowKind, stage: &'static str, message: &str, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(flow = kind.as_str(), stage, error = %error, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage, message, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrumented_future_keeps_its_output() {
		let span = FlowSpan::new(FlowKind::Refresh, "test");

		assert_eq!(span.instrument(async { "a2" }).await, "a2");
	}

	#[test]
	fn events_accept_store_errors() {
		let err = crate::store::StoreError::Backend { message: "keychain locked".into() };

		debug_event(FlowKind::Execute, "test", "Retrying with refreshed access token.");
		warn_event(FlowKind::Logout, "test", "Session key could not be removed.", &err);
	}
}
