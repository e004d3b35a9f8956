// self
use delivery_gateway::{
	auth::{Session, TokenSecret},
	store::{MemoryStore, SessionKey, SessionStore},
};

#[tokio::test]
async fn set_get_remove_round_trip() {
	let store = MemoryStore::default();

	store
		.set(SessionKey::AccessToken, TokenSecret::new("a1"))
		.await
		.expect("Memory store write should succeed.");

	let stored = store
		.get(SessionKey::AccessToken)
		.await
		.expect("Memory store read should succeed.")
		.expect("Access token should be present after set.");

	assert_eq!(stored.expose(), "a1");
	assert_eq!(store.len(), 1);

	store.remove(SessionKey::AccessToken).await.expect("Memory store remove should succeed.");
	store.remove(SessionKey::AccessToken).await.expect("Removing a missing key is a no-op.");

	assert!(store.is_empty());
}

#[tokio::test]
async fn clones_share_state() {
	let store = MemoryStore::default();
	let clone = store.clone();

	Session::new("a1", Some("r1".into())).persist(&store).await.expect("Session should persist.");

	let session = Session::load(&clone)
		.await
		.expect("Session read should succeed.")
		.expect("Clone should see the persisted session.");

	assert_eq!(session.refresh_token.as_ref().map(TokenSecret::expose), Some("r1"));

	Session::clear(&clone).await.expect("Session clear should succeed.");

	assert!(store.is_empty());
}

#[tokio::test]
async fn replacing_access_keeps_refresh() {
	let store = MemoryStore::default();

	Session::new("a1", Some("r1".into())).persist(&store).await.expect("Session should persist.");
	store
		.set(SessionKey::AccessToken, TokenSecret::new("a2"))
		.await
		.expect("Memory store write should succeed.");

	let session = Session::load(&store)
		.await
		.expect("Session read should succeed.")
		.expect("Session should remain present.");

	assert_eq!(session.access_token.expose(), "a2");
	assert_eq!(session.refresh_token.map(|token| token.expose().to_owned()).as_deref(), Some("r1"));
}
