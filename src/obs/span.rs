// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("pwrank_client.operation", operation = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning-level diagnostic for a recoverable anomaly.
pub fn warn_event(stage: &'static str, message: impl Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message.to_string());
	}
}

/// Emits a debug-level event describing normal control flow.
pub fn debug_event(stage: &'static str, message: impl Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message.to_string());
	}
}
