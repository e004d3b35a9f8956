//! Authenticated client for the delivery tracking API: bearer injection, one-shot token
//! refresh with a bounded retry, pluggable session stores, and typed delivery endpoints.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::DeliveryApi,
		auth::Session,
		config::ApiConfig,
		gateway::{Gateway, ReqwestGateway},
		http::ReqwestTransport,
		store::{MemoryStore, SessionStore},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let builder = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true);

		ReqwestTransport::from_builder(builder)
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Builds an [`ApiConfig`] pointing at the provided mock server base URL.
	pub fn test_config(base_url: &str) -> ApiConfig {
		ApiConfig::builder()
			.base_url(Url::parse(base_url).expect("Mock server base URL should parse."))
			.build()
			.expect("Test API configuration should build successfully.")
	}

	/// Constructs a [`Gateway`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_gateway(base_url: &str) -> (ReqwestGateway, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let gateway =
			Gateway::with_transport(store, test_config(base_url), test_reqwest_transport());

		(gateway, store_backend)
	}

	/// Constructs a [`DeliveryApi`] on top of [`build_reqwest_test_gateway`].
	pub fn build_reqwest_test_api(
		base_url: &str,
	) -> (DeliveryApi<ReqwestTransport>, Arc<MemoryStore>) {
		let (gateway, store) = build_reqwest_test_gateway(base_url);

		(DeliveryApi::new(gateway), store)
	}

	/// Seeds the store with an access/refresh token pair.
	pub async fn seed_session(store: &MemoryStore, access: &str, refresh: Option<&str>) {
		let session = Session::new(access, refresh.map(str::to_owned));

		session.persist(store).await.expect("Failed to seed session into the store.");
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
