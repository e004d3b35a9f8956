// self
use crate::{
	_prelude::*,
	config::{ApiConfig, ApiEndpoints, DEFAULT_BASE_URL, Endpoint},
	error::ConfigError,
};

/// Builder for [`ApiConfig`] values.
#[derive(Debug, Default)]
pub struct ApiConfigBuilder {
	/// Base URL; [`DEFAULT_BASE_URL`] when unset.
	pub base_url: Option<Url>,
	/// Endpoint paths.
	pub endpoints: ApiEndpoints,
}
impl ApiConfigBuilder {
	/// Sets the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Parses and sets the base URL.
	pub fn base_url_str(self, raw: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Ok(self.base_url(url))
	}

	/// Overrides the path of a single endpoint.
	pub fn endpoint(mut self, endpoint: Endpoint, path: impl Into<String>) -> Self {
		*self.endpoints.path_mut(endpoint) = path.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ApiConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(DEFAULT_BASE_URL)
				.map_err(|source| ConfigError::InvalidBaseUrl { source })?,
		};
		let config = ApiConfig { base_url, endpoints: self.endpoints };

		config.validate()?;

		Ok(config)
	}
}

impl ApiConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		match self.base_url.scheme() {
			"http" | "https" => {},
			scheme => return Err(ConfigError::UnsupportedScheme { scheme: scheme.to_owned() }),
		}

		if self.base_url.host_str().is_none_or(str::is_empty) {
			return Err(ConfigError::MissingHost);
		}

		for endpoint in [
			Endpoint::Login,
			Endpoint::Refresh,
			Endpoint::Deliveries,
			Endpoint::Transports,
			Endpoint::Services,
			Endpoint::Statuses,
			Endpoint::Packagings,
			Endpoint::Files,
			Endpoint::Upload,
		] {
			validate_path(endpoint, self.endpoints.path(endpoint))?;
		}

		Ok(())
	}
}

fn validate_path(endpoint: Endpoint, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidEndpointPath { endpoint: endpoint.as_str(), path: path.to_owned() })
	}
}
