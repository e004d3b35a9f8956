//! Session lifecycle: login, logout, status, and the store-backed session terminator.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Session, TokenPair},
	config::Endpoint,
	error::{ConfigError, RequestRejected},
	gateway::{Gateway, SessionTerminator, TerminateFuture},
	http::{ApiRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{SessionKey, SessionStore},
};

const LOGIN_FAILED: &str = "Login failed";

/// Terminator that clears every session key from a store.
#[derive(Clone)]
pub struct SessionReset {
	store: Arc<dyn SessionStore>,
}
impl SessionReset {
	/// Creates a terminator bound to `store`.
	pub fn new(store: Arc<dyn SessionStore>) -> Self {
		Self { store }
	}
}
impl SessionTerminator for SessionReset {
	fn terminate(&self) -> TerminateFuture<'_> {
		Box::pin(async move {
			obs::debug_event(FlowKind::Logout, "session_reset", "Clearing stored session.");

			Session::clear(self.store.as_ref()).await
		})
	}
}
impl Debug for SessionReset {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("SessionReset(..)")
	}
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Exchanges `credentials` for a token pair and persists it.
	///
	/// The issuance call is unauthenticated and never refreshed. A non-success status fails
	/// with [`Error::Rejected`] carrying the server's `detail` message, or `Login failed`
	/// when the body has none.
	pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.config.url(Endpoint::Login)?;
				let mut request =
					ApiRequest::post(url).json(credentials).map_err(ConfigError::from)?;

				request.apply_content_type();

				let response = self.transport.send(&request).await?;

				if !response.is_success() {
					let detail = response.detail().unwrap_or_else(|| LOGIN_FAILED.into());

					return Err(RequestRejected { status: response.status.as_u16(), detail }.into());
				}

				let session = Session::from(response.json::<TokenPair>("login")?);

				session.persist(self.store.as_ref()).await?;

				Ok(session)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Clears the stored session. The server is not contacted.
	pub async fn logout(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = Session::clear(self.store.as_ref()).await;

		obs::record_result(KIND, &result);

		result
	}

	/// Returns the stored session, if any.
	pub async fn session(&self) -> Result<Option<Session>> {
		Session::load(self.store.as_ref()).await
	}

	/// Reports whether an access token is stored.
	///
	/// A store that cannot be read is treated as signed out and cleared on a best-effort basis.
	pub async fn is_authenticated(&self) -> bool {
		match self.store.get(SessionKey::AccessToken).await {
			Ok(token) => token.is_some(),
			Err(err) => {
				obs::warn_event(
					FlowKind::Login,
					"is_authenticated",
					"Session store could not be read.",
					&err,
				);

				for key in SessionKey::ALL {
					if let Err(err) = self.store.remove(key).await {
						obs::warn_event(
							FlowKind::Logout,
							"is_authenticated",
							"Session key could not be removed.",
							&err,
						);
					}
				}

				false
			},
		}
	}

	/// Returns a terminator that clears this gateway's session store.
	pub fn session_reset(&self) -> SessionReset {
		SessionReset::new(self.store.clone())
	}
}
