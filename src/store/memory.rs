//! Thread-safe in-memory [`SessionStore`] implementation for tests and ephemeral sessions.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{SessionKey, SessionStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionKey, TokenSecret>>>;

/// Thread-safe storage backend that keeps credentials in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the number of stored keys.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no credentials are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: StoreMap, key: SessionKey) -> Option<TokenSecret> {
		map.read().get(&key).cloned()
	}

	fn set_now(map: StoreMap, key: SessionKey, value: TokenSecret) -> Result<(), StoreError> {
		map.write().insert(key, value);

		Ok(())
	}

	fn remove_now(map: StoreMap, key: SessionKey) -> Result<(), StoreError> {
		map.write().remove(&key);

		Ok(())
	}
}
impl SessionStore for MemoryStore {
	fn get(&self, key: SessionKey) -> StoreFuture<'_, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn set(&self, key: SessionKey, value: TokenSecret) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, key, value) })
	}

	fn remove(&self, key: SessionKey) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::remove_now(map, key) })
	}
}
