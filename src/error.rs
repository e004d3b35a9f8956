//! Gateway-level error types shared across the session, transport, and API layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body did not match the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Server rejected a non-authentication request.
	#[error(transparent)]
	Rejected(#[from] RequestRejected),

	/// Server rejected the credentials and the session could not be recovered.
	#[error("Unauthorized.")]
	Unauthorized,
}
impl Error {
	/// Returns `true` for the [`Error::Unauthorized`] classification.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized)
	}

	/// Returns the HTTP status carried by a [`RequestRejected`] error.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected(rejected) => Some(rejected.status),
			Self::Unauthorized => Some(401),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http or https.
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Rejected scheme.
		scheme: String,
	},
	/// Base URL has no host component.
	#[error("Base URL must include a host.")]
	MissingHost,
	/// Endpoint path is not absolute.
	#[error("Endpoint `{endpoint}` must start with `/`, got `{path}`.")]
	InvalidEndpointPath {
		/// Endpoint label.
		endpoint: &'static str,
		/// Rejected path.
		path: String,
	},
	/// Endpoint URL could not be joined onto the base URL.
	#[error("Endpoint `{endpoint}` could not be resolved against the base URL.")]
	EndpointJoin {
		/// Endpoint label.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request payload could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
	/// Header name or value is not representable.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as supplied by the caller.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Failures to obtain a response from the server.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target of the failed call.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request could not be assembled by the transport.
	#[error("Request to {url} could not be built.")]
	Build {
		/// Target of the failed call.
		url: String,
		/// Transport-specific builder error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}

	/// Wraps a transport-specific request construction error.
	pub fn build(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Build { url: url.to_string(), source: Box::new(src) }
	}
}

/// Non-success response surfaced by the typed API layer.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Request was rejected with status {status}: {detail}.")]
pub struct RequestRejected {
	/// HTTP status code.
	pub status: u16,
	/// Server-supplied detail, or a fallback summary when none was parseable.
	pub detail: String,
}

/// Response body failed to decode into the expected type.
#[derive(Debug, ThisError)]
#[error("Response body from {context} did not match the expected shape at `{path}`.")]
pub struct DecodeError {
	/// Operation or endpoint label.
	pub context: String,
	/// JSON path where decoding failed.
	pub path: String,
	/// Structured parsing failure.
	#[source]
	pub source: serde_json::Error,
}
impl DecodeError {
	pub(crate) fn from_path_error(
		context: impl Into<String>,
		err: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		let path = err.path().to_string();

		Self { context: context.into(), path, source: err.into_inner() }
	}
}
