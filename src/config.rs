//! API location and endpoint layout consumed by the gateway and the typed API.
//!
//! Defaults mirror the production deployment; [`ApiConfig::from_env`] lets a build override
//! the base URL through `API_URL` without touching endpoint paths.

/// Builder API for assembling API configurations.
pub mod builder;

pub use builder::*;

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable consulted by [`ApiConfig::from_env`].
pub const API_URL_ENV: &str = "API_URL";
/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://reporttask.sytes.net";

/// Logical endpoints exposed by the delivery API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Token issuance.
	Login,
	/// Token refresh.
	Refresh,
	/// Delivery collection.
	Deliveries,
	/// Transport reference data.
	Transports,
	/// Service reference data.
	Services,
	/// Status reference data.
	Statuses,
	/// Packaging reference data.
	Packagings,
	/// Stored file collection.
	Files,
	/// Multipart file upload.
	Upload,
}
impl Endpoint {
	/// Returns a stable label suitable for errors and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Login => "login",
			Endpoint::Refresh => "refresh",
			Endpoint::Deliveries => "deliveries",
			Endpoint::Transports => "transports",
			Endpoint::Services => "services",
			Endpoint::Statuses => "statuses",
			Endpoint::Packagings => "packagings",
			Endpoint::Files => "files",
			Endpoint::Upload => "upload",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint paths appended to the base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEndpoints {
	/// Token issuance path.
	pub login: String,
	/// Token refresh path.
	pub refresh: String,
	/// Delivery collection path.
	pub deliveries: String,
	/// Transport collection path.
	pub transports: String,
	/// Service collection path.
	pub services: String,
	/// Status collection path.
	pub statuses: String,
	/// Packaging collection path.
	pub packagings: String,
	/// Stored file collection path.
	pub files: String,
	/// Multipart upload path.
	pub upload: String,
}
impl ApiEndpoints {
	/// Returns the configured path for `endpoint`.
	pub fn path(&self, endpoint: Endpoint) -> &str {
		match endpoint {
			Endpoint::Login => &self.login,
			Endpoint::Refresh => &self.refresh,
			Endpoint::Deliveries => &self.deliveries,
			Endpoint::Transports => &self.transports,
			Endpoint::Services => &self.services,
			Endpoint::Statuses => &self.statuses,
			Endpoint::Packagings => &self.packagings,
			Endpoint::Files => &self.files,
			Endpoint::Upload => &self.upload,
		}
	}

	fn path_mut(&mut self, endpoint: Endpoint) -> &mut String {
		match endpoint {
			Endpoint::Login => &mut self.login,
			Endpoint::Refresh => &mut self.refresh,
			Endpoint::Deliveries => &mut self.deliveries,
			Endpoint::Transports => &mut self.transports,
			Endpoint::Services => &mut self.services,
			Endpoint::Statuses => &mut self.statuses,
			Endpoint::Packagings => &mut self.packagings,
			Endpoint::Files => &mut self.files,
			Endpoint::Upload => &mut self.upload,
		}
	}
}
impl Default for ApiEndpoints {
	fn default() -> Self {
		Self {
			login: "/api/identity/auth/jwt/create/".into(),
			refresh: "/api/identity/auth/jwt/refresh/".into(),
			deliveries: "/api/v1/deliverys/".into(),
			transports: "/api/v1/transports/".into(),
			services: "/api/v1/services/".into(),
			statuses: "/api/v1/statuses/".into(),
			packagings: "/api/v1/packagings/".into(),
			files: "/api/v1/files/".into(),
			upload: "/api/upload-file/".into(),
		}
	}
}

/// Validated API location plus endpoint layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	/// Scheme + host (+ optional path prefix) every endpoint path is appended to.
	pub base_url: Url,
	/// Endpoint paths.
	pub endpoints: ApiEndpoints,
}
impl ApiConfig {
	/// Creates a new builder seeded with the production defaults.
	pub fn builder() -> ApiConfigBuilder {
		ApiConfigBuilder::default()
	}

	/// Builds a configuration from `API_URL`, falling back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		let raw = env::var(API_URL_ENV)
			.ok()
			.filter(|value| !value.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

		Self::builder().base_url_str(raw.trim())?.build()
	}

	/// Resolves the collection URL for `endpoint`.
	pub fn url(&self, endpoint: Endpoint) -> Result<Url, ConfigError> {
		self.join(endpoint, self.endpoints.path(endpoint))
	}

	/// Resolves the item URL (`<collection>/<id>/`) for `endpoint`.
	pub fn item_url(&self, endpoint: Endpoint, id: u64) -> Result<Url, ConfigError> {
		let collection = self.endpoints.path(endpoint).trim_end_matches('/');

		self.join(endpoint, &format!("{collection}/{id}/"))
	}

	fn join(&self, endpoint: Endpoint, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');

		Url::parse(&format!("{base}{path}"))
			.map_err(|source| ConfigError::EndpointJoin { endpoint: endpoint.as_str(), source })
	}
}
