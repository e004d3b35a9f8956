//! Token refresh exchange.
//!
//! The refresh endpoint takes `{"refresh": <token>}` and answers `{"access": <token>}`. Only
//! the access token is replaced in the store; the refresh token is never rotated here.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AccessGrant, RefreshRequest, TokenSecret},
	config::Endpoint,
	error::ConfigError,
	gateway::Gateway,
	http::{ApiRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::SessionKey,
};

/// How a refresh cycle obtained the token used for the retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// The refresh endpoint issued a new access token.
	Issued(TokenSecret),
	/// Another call already replaced the rejected token; the stored one is reused.
	Coalesced(TokenSecret),
}
impl RefreshOutcome {
	/// Consumes the outcome and returns the access token.
	pub fn into_token(self) -> TokenSecret {
		match self {
			Self::Issued(token) | Self::Coalesced(token) => token,
		}
	}
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Exchanges the stored refresh token for a new access token and persists it.
	///
	/// Fails with [`Error::Unauthorized`] when no refresh token is stored. Unlike
	/// [`Gateway::execute`], this never invokes a session terminator.
	pub async fn refresh_access_token(&self) -> Result<TokenSecret> {
		let refresh = self.store.get(SessionKey::RefreshToken).await?.ok_or(Error::Unauthorized)?;
		let access = self.exchange_refresh_token(&refresh).await?;

		self.store.set(SessionKey::AccessToken, access.clone()).await?;

		Ok(access)
	}

	/// Runs the refresh step of a rejected call.
	///
	/// `rejected` is the access token the server just refused. With coalescing enabled the
	/// exchange is skipped when the store already holds a different token.
	pub(crate) async fn refresh_for_retry(
		&self,
		refresh: &TokenSecret,
		rejected: Option<&TokenSecret>,
	) -> Result<RefreshOutcome> {
		let _serialized = match &self.refresh_guard {
			Some(guard) => Some(guard.lock().await),
			None => None,
		};

		if self.refresh_guard.is_some() {
			let current = self.store.get(SessionKey::AccessToken).await?;

			if let Some(current) = current.filter(|current| Some(current) != rejected) {
				self.refresh_metrics.record_attempt();
				self.refresh_metrics.record_coalesced();
				obs::debug_event(
					FlowKind::Refresh,
					"refresh_for_retry",
					"Access token already rotated by a concurrent call.",
				);

				return Ok(RefreshOutcome::Coalesced(current));
			}
		}

		let access = self.exchange_refresh_token(refresh).await?;

		self.store.set(SessionKey::AccessToken, access.clone()).await?;

		Ok(RefreshOutcome::Issued(access))
	}

	/// Posts `refresh` to the refresh endpoint and returns the issued access token.
	///
	/// The call bypasses the authenticated path: no bearer header, no retry.
	pub(crate) async fn exchange_refresh_token(
		&self,
		refresh: &TokenSecret,
	) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "exchange_refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let url = self.config.url(Endpoint::Refresh)?;
				let mut request = ApiRequest::post(url)
					.json(&RefreshRequest { refresh: refresh.expose() })
					.map_err(ConfigError::from)?;

				request.apply_content_type();

				let response = self.transport.send(&request).await?;

				if !response.is_success() {
					return Err(response.rejected("Token refresh failed").into());
				}

				let grant = response.json::<AccessGrant>("token refresh")?;

				Ok(grant.access)
			})
			.await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(err) => {
				self.refresh_metrics.record_failure();
				obs::warn_event(KIND, "exchange_refresh_token", "Token refresh failed.", err);
			},
		}

		obs::record_result(KIND, &result);

		result
	}
}
