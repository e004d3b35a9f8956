//! Transport primitives for authenticated API calls.
//!
//! The module exposes [`HttpTransport`] alongside the owned [`ApiRequest`] and
//! [`ApiResponse`] types so downstream crates can plug in custom HTTP stacks. Requests own
//! their body, which lets the gateway resend them verbatim after a token refresh.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single request.
///
/// Implementations must not retry, follow authentication challenges, or otherwise alter the
/// request; the gateway owns that policy. Every received response, whatever its status, is
/// returned as `Ok`. Only failures to obtain a response map to [`TransportError`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` once and buffers the full response.
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds the wrapped client from a configured reqwest builder.
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, ConfigError> {
		builder.build().map(Self).map_err(ConfigError::http_client_build)
	}

	async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
		let url = &request.url;
		let mut builder = self.0.request(request.method.clone(), url.clone());

		builder = match &request.body {
			RequestBody::Empty => builder,
			RequestBody::Json(value) => builder.json(value),
			RequestBody::Multipart(form) =>
				builder.multipart(form.to_reqwest().map_err(|e| TransportError::build(url, e))?),
		};
		// Caller headers last so an explicit content type replaces the generated one.
		builder = builder.headers(request.headers.clone());

		let response = builder.send().await.map_err(|e| TransportError::network(url, e))?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(|e| TransportError::network(url, e))?;

		Ok(ApiResponse::new(status, headers, body.to_vec()))
	}
}
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestTransport(..)")
	}
}
impl HttpTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(self.dispatch(request))
	}
}
