//! Session model plus the request/response payloads of the token endpoints.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{SessionKey, SessionStore},
};

/// Credentials established by a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
	/// Bearer credential attached to every API call.
	pub access_token: TokenSecret,
	/// Credential exchanged for a new access token once the current one is rejected.
	pub refresh_token: Option<TokenSecret>,
}
impl Session {
	/// Creates a session from raw token strings.
	pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access),
			refresh_token: refresh.map(TokenSecret::new),
		}
	}

	/// Reads the session from `store`; `None` when no access token is stored.
	pub async fn load(store: &dyn SessionStore) -> Result<Option<Self>> {
		let Some(access_token) = store.get(SessionKey::AccessToken).await? else {
			return Ok(None);
		};
		let refresh_token = store.get(SessionKey::RefreshToken).await?;

		Ok(Some(Self { access_token, refresh_token }))
	}

	/// Writes both tokens to `store`; a missing refresh token removes the stored one.
	pub async fn persist(&self, store: &dyn SessionStore) -> Result<()> {
		store.set(SessionKey::AccessToken, self.access_token.clone()).await?;

		match &self.refresh_token {
			Some(refresh) => store.set(SessionKey::RefreshToken, refresh.clone()).await?,
			None => store.remove(SessionKey::RefreshToken).await?,
		}

		Ok(())
	}

	/// Removes every session key from `store`.
	pub async fn clear(store: &dyn SessionStore) -> Result<()> {
		for key in SessionKey::ALL {
			store.remove(key).await?;
		}

		Ok(())
	}
}
impl From<TokenPair> for Session {
	fn from(pair: TokenPair) -> Self {
		Self { access_token: pair.access, refresh_token: Some(pair.refresh) }
	}
}

/// Username/password pair posted to the token issuance endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
	/// Account name.
	pub username: String,
	/// Account password.
	pub password: String,
}
impl Credentials {
	/// Creates a credential pair.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: password.into() }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Token issuance response.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenPair {
	/// Newly issued access token.
	pub access: TokenSecret,
	/// Newly issued refresh token.
	pub refresh: TokenSecret,
}

/// Token refresh request body.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RefreshRequest<'a> {
	/// Refresh token being exchanged.
	pub refresh: &'a str,
}

/// Token refresh response.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessGrant {
	/// Replacement access token.
	pub access: TokenSecret,
}
