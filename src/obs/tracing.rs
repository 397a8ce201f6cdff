// self
use crate::{_prelude::*, auth::ClientKey, obs::EndpointKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedEndpoint<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedEndpoint<F> = F;

/// A span builder used by provider operations.
#[derive(Clone, Debug)]
pub struct EndpointSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl EndpointSpan {
	/// Creates a new span tagged with the provided endpoint + stage.
	pub fn new(kind: EndpointKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth1_provider.endpoint", endpoint = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedEndpoint<Fut>
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

/// Logs why a verification was rejected; the detail never reaches the response.
pub fn log_rejection(stage: &'static str, reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage, reason, "request rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, reason);
	}
}

/// Warns about a client that cannot sign with any method.
pub fn warn_missing_signing_material(client: &ClientKey) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(client = %client, "client has neither a shared secret nor a public key");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = client;
	}
}
