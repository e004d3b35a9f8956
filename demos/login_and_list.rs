//! Logs in against a mocked delivery backend, survives an access-token expiry through the
//! automatic refresh, and prints the quickest deliveries.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use delivery_gateway::{
	api::{DeliveryApi, DeliveryFilter, DeliveryQuery, DurationFilter},
	auth::Credentials,
	config::ApiConfig,
	gateway::Gateway,
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/identity/auth/jwt/create/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"expired-access\",\"refresh\":\"demo-refresh\"}");
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/deliverys/")
				.header("authorization", "Bearer expired-access");
			then.status(401).body("{\"detail\":\"Given token not valid for any token type\"}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/identity/auth/jwt/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"fresh-access\"}");
		})
		.await;
	let list_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/deliverys/")
				.header("authorization", "Bearer fresh-access");
			then.status(200).header("content-type", "application/json").body(
				"[{\"id\":41,\"departure_time\":\"2025-04-01T08:00:00Z\",\"delivery_time\":\"2025-04-01T09:45:00Z\",\"distance\":\"8.2\"},\
				 {\"id\":42,\"departure_time\":\"2025-04-01T08:00:00Z\",\"delivery_time\":\"2025-04-01T08:35:00Z\",\"distance\":\"3.0\"}]",
			);
		})
		.await;
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let config = ApiConfig::builder().base_url_str(&server.base_url())?.build()?;
	let gateway = Gateway::new(store, config);

	gateway.login(&Credentials::new("courier", "demo-password")).await?;

	let api = DeliveryApi::new(gateway).with_session_reset();
	let deliveries = api.list_deliveries(&DeliveryQuery::default()).await?;
	let filter = DeliveryFilter { duration: DurationFilter::UpToTwoHours, ..Default::default() };

	for delivery in filter.apply(&deliveries) {
		println!(
			"Delivery #{}: {} min, {} km.",
			delivery.id,
			delivery.duration_minutes().unwrap_or_default(),
			delivery.distance_km().unwrap_or_default(),
		);
	}

	login_mock.assert_async().await;
	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	list_mock.assert_async().await;

	Ok(())
}
