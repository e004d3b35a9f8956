//! Session store contracts and built-in store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable key-value persistence for session credentials.
///
/// The gateway only ever reads, replaces, or removes individual keys; implementations do not
/// need cross-key transactions.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if any.
	fn get(&self, key: SessionKey) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Stores or replaces the value under `key`.
	fn set(&self, key: SessionKey, value: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes the value under `key`; removing a missing key is not an error.
	fn remove(&self, key: SessionKey) -> StoreFuture<'_, ()>;
}

/// Keys persisted by the session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionKey {
	/// Short-lived bearer credential.
	#[serde(rename = "accessToken")]
	AccessToken,
	/// Long-lived credential exchanged for new access tokens.
	#[serde(rename = "refreshToken")]
	RefreshToken,
}
impl SessionKey {
	/// Every key managed by the session lifecycle.
	pub const ALL: [SessionKey; 2] = [SessionKey::AccessToken, SessionKey::RefreshToken];

	/// Returns the storage key name.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionKey::AccessToken => "accessToken",
			SessionKey::RefreshToken => "refreshToken",
		}
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;
	use std::error::Error as StdError;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "keychain locked".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("keychain locked"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn session_keys_use_wire_names() {
		let payload = serde_json::to_string(&SessionKey::AccessToken)
			.expect("SessionKey should serialize to JSON.");

		assert_eq!(payload, "\"accessToken\"");
		assert_eq!(SessionKey::RefreshToken.to_string(), "refreshToken");
	}
}
