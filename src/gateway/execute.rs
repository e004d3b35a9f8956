//! Authenticated execution with a single refresh-and-retry cycle.
//!
//! Every call walks [`AttemptState`] at most once from `Initial` to `Retried`:
//!
//! ```text
//! Initial --401 + refresh token--> Refreshing --new token--> Retried (terminal)
//!    |                                 |
//!    +--401, no refresh token--> Unauthorized
//!                                      +--refresh failed--> terminate + Unauthorized
//! ```
//!
//! Any non-401 response from `Initial`, and whatever `Retried` produces, is returned to the
//! caller unchanged.

// self
use crate::{
	_prelude::*,
	gateway::{Gateway, SessionTerminator},
	http::{ApiRequest, ApiResponse, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::SessionKey,
};

/// Position of a call within its bounded refresh-and-retry cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptState {
	/// First send with the stored access token.
	Initial,
	/// The first send was rejected; exchanging the refresh token.
	Refreshing,
	/// Resent once with the new token. Terminal.
	Retried,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Sends `request` with the stored bearer token, refreshing and retrying once on 401.
	///
	/// Non-401 responses (including 4xx/5xx) are returned as `Ok` for the caller to inspect.
	/// A 401 with no stored refresh token fails with [`Error::Unauthorized`] without touching
	/// `terminator`. A failed refresh invokes `terminator` once and then fails with
	/// [`Error::Unauthorized`]. Transport failures are returned as-is and never retried.
	pub async fn execute(
		&self,
		request: ApiRequest,
		terminator: Option<&dyn SessionTerminator>,
	) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Execute;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.run_attempts(request, terminator)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn run_attempts(
		&self,
		mut request: ApiRequest,
		terminator: Option<&dyn SessionTerminator>,
	) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Execute;

		let access = self.store.get(SessionKey::AccessToken).await?;
		let refresh = self.store.get(SessionKey::RefreshToken).await?;

		if let Some(access) = &access {
			request.authorize(access)?;
		}

		request.apply_content_type();

		let mut state = AttemptState::Initial;

		loop {
			state = match state {
				AttemptState::Initial => {
					let response = self.transport.send(&request).await?;

					if !response.is_unauthorized() {
						return Ok(response);
					}
					if refresh.is_none() {
						obs::debug_event(KIND, "execute", "Rejected without a refresh token.");

						return Err(Error::Unauthorized);
					}

					AttemptState::Refreshing
				},
				AttemptState::Refreshing => {
					let Some(refresh) = refresh.as_ref() else {
						return Err(Error::Unauthorized);
					};
					let token = match self.refresh_for_retry(refresh, access.as_ref()).await {
						Ok(outcome) => outcome.into_token(),
						Err(Error::Storage(err)) => return Err(Error::Storage(err)),
						Err(_) => {
							self.terminate(terminator).await;

							return Err(Error::Unauthorized);
						},
					};

					request.authorize(&token)?;
					obs::debug_event(KIND, "execute", "Retrying with refreshed access token.");

					AttemptState::Retried
				},
				AttemptState::Retried => return Ok(self.transport.send(&request).await?),
			};
		}
	}

	async fn terminate(&self, terminator: Option<&dyn SessionTerminator>) {
		let Some(terminator) = terminator else {
			return;
		};

		if let Err(err) = terminator.terminate().await {
			obs::warn_event(FlowKind::Logout, "terminate", "Session termination failed.", &err);
		}
	}
}
