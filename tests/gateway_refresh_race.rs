#![cfg(feature = "test")]

// std
use std::sync::{
	Mutex as StdMutex,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use tokio::sync::Barrier;
// self
use delivery_gateway::{
	_preludet::*,
	api::{DeliveryApi, FileUpload},
	config::Endpoint,
	error::TransportError,
	gateway::{Gateway, SessionTerminator},
	http::{ApiRequest, ApiResponse, HttpTransport, PartContent, RequestBody, TransportFuture},
	store::{MemoryStore, SessionKey, SessionStore},
};

const REFRESH: &str = "/api/identity/auth/jwt/refresh/";

/// How the scripted refresh endpoint answers.
#[derive(Clone, Copy)]
enum RefreshReply {
	/// `{"access": "a2-<n>"}`.
	Issue,
	/// Connection failure.
	Unreachable,
	/// 2xx without an `access` field.
	MissingAccess,
}

/// Answers 401 to `Bearer a1`, replies to refreshes per [`RefreshReply`], and 200 otherwise.
struct ScriptedTransport {
	rejection_barrier: Option<Barrier>,
	refresh_reply: RefreshReply,
	reject_every_token: bool,
	refreshes: AtomicUsize,
	seen: StdMutex<Vec<ApiRequest>>,
}
impl ScriptedTransport {
	fn new(concurrent_rejections: Option<usize>) -> Self {
		Self {
			rejection_barrier: concurrent_rejections.map(Barrier::new),
			refresh_reply: RefreshReply::Issue,
			reject_every_token: false,
			refreshes: AtomicUsize::new(0),
			seen: StdMutex::new(Vec::new()),
		}
	}

	fn with_refresh_reply(mut self, reply: RefreshReply) -> Self {
		self.refresh_reply = reply;

		self
	}

	fn rejecting_every_token(mut self) -> Self {
		self.reject_every_token = true;

		self
	}

	fn api_sends(&self) -> usize {
		self.seen().iter().filter(|request| request.url.path() != REFRESH).count()
	}

	fn refreshes(&self) -> usize {
		self.refreshes.load(Ordering::SeqCst)
	}

	fn seen(&self) -> Vec<ApiRequest> {
		self.seen.lock().expect("Request log lock should not be poisoned.").clone()
	}

	fn respond(status: u16, body: String) -> ApiResponse {
		ApiResponse::new(
			StatusCode::from_u16(status).expect("Scripted status should be valid."),
			HeaderMap::new(),
			body.into_bytes(),
		)
	}
}
impl HttpTransport for ScriptedTransport {
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			self.seen
				.lock()
				.expect("Request log lock should not be poisoned.")
				.push(request.clone());

			if request.url.path() == REFRESH {
				let issued = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;

				tokio::task::yield_now().await;

				return match self.refresh_reply {
					RefreshReply::Issue =>
						Ok(Self::respond(200, format!("{{\"access\":\"a2-{issued}\"}}"))),
					RefreshReply::Unreachable => Err(TransportError::network(
						&request.url,
						std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
					)),
					RefreshReply::MissingAccess => Ok(Self::respond(200, "{\"foo\":1}".into())),
				};
			}
			if self.reject_every_token || request.bearer() == Some("a1") {
				if let Some(barrier) = &self.rejection_barrier {
					barrier.wait().await;
				}

				return Ok(Self::respond(401, String::new()));
			}

			Ok(Self::respond(200, "[]".into()))
		})
	}
}

fn scripted_gateway(
	transport: Arc<ScriptedTransport>,
) -> (Gateway<ScriptedTransport>, Arc<MemoryStore>) {
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn SessionStore> = backend.clone();
	let gateway = Gateway::with_transport(store, test_config("http://gateway.test"), transport);

	(gateway, backend)
}

fn counting_terminator() -> (Arc<AtomicUsize>, impl SessionTerminator) {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let terminator = move || {
		counter.fetch_add(1, Ordering::SeqCst);

		async { Ok::<(), Error>(()) }
	};

	(calls, terminator)
}

fn list_request(gateway: &Gateway<ScriptedTransport>) -> ApiRequest {
	ApiRequest::get(
		gateway.config.url(Endpoint::Deliveries).expect("Deliveries URL should resolve."),
	)
}

#[tokio::test]
async fn concurrent_rejections_refresh_independently_by_default() {
	let transport = Arc::new(ScriptedTransport::new(Some(2)));
	let (gateway, store) = scripted_gateway(transport.clone());

	seed_session(&store, "a1", Some("r1")).await;

	let (first, second) = tokio::join!(
		gateway.execute(list_request(&gateway), None),
		gateway.execute(list_request(&gateway), None),
	);

	assert_eq!(first.expect("First call should recover.").status, StatusCode::OK);
	assert_eq!(second.expect("Second call should recover.").status, StatusCode::OK);
	assert_eq!(transport.refreshes(), 2);

	let stored = store
		.get(SessionKey::AccessToken)
		.await
		.expect("Memory store read should succeed.")
		.expect("An access token should be stored.");

	assert!(stored.expose().starts_with("a2-"));
}

#[tokio::test]
async fn coalescing_shares_one_refresh_between_concurrent_rejections() {
	let transport = Arc::new(ScriptedTransport::new(Some(2)));
	let (gateway, store) = scripted_gateway(transport.clone());
	let gateway = gateway.with_refresh_coalescing();

	seed_session(&store, "a1", Some("r1")).await;

	let (first, second) = tokio::join!(
		gateway.execute(list_request(&gateway), None),
		gateway.execute(list_request(&gateway), None),
	);

	assert_eq!(first.expect("First call should recover.").status, StatusCode::OK);
	assert_eq!(second.expect("Second call should recover.").status, StatusCode::OK);
	assert_eq!(transport.refreshes(), 1);
	assert_eq!(gateway.refresh_metrics.coalesced(), 1);

	let retried = transport
		.seen()
		.into_iter()
		.filter(|request| request.bearer() == Some("a2-1"))
		.count();

	assert_eq!(retried, 2);
}

#[tokio::test]
async fn multipart_upload_keeps_generated_content_type_across_retry() {
	let transport = Arc::new(ScriptedTransport::new(None));
	let (gateway, store) = scripted_gateway(transport.clone());
	let api = DeliveryApi::new(gateway);

	seed_session(&store, "a1", Some("r1")).await;

	let upload = FileUpload::new("manifest.pdf", b"%PDF".to_vec()).with_mime("application/pdf");
	let stored = api
		.upload_file(upload)
		.await
		.expect("Upload should succeed after refresh.");

	assert!(stored.is_empty());

	let sent = transport
		.seen()
		.into_iter()
		.filter(|request| request.url.path() == "/api/upload-file/")
		.collect::<Vec<_>>();

	assert_eq!(sent.len(), 2);
	assert_eq!(sent[0].bearer(), Some("a1"));
	assert_eq!(sent[1].bearer(), Some("a2-1"));

	for upload in &sent {
		assert!(upload.headers.get(CONTENT_TYPE).is_none());

		let RequestBody::Multipart(form) = &upload.body else {
			panic!("Upload body should stay multipart.");
		};

		assert_eq!(form.parts.len(), 1);
		assert_eq!(form.parts[0].name, "file");
		let PartContent::File { file_name, bytes, .. } = &form.parts[0].content else {
			panic!("Upload part should be a file.");
		};

		assert_eq!(file_name, "manifest.pdf");
		assert_eq!(bytes.as_slice(), b"%PDF");
	}
}

#[tokio::test]
async fn json_requests_carry_json_content_type() {
	let transport = Arc::new(ScriptedTransport::new(None));
	let (gateway, store) = scripted_gateway(transport.clone());

	seed_session(&store, "a9", Some("r1")).await;

	gateway.execute(list_request(&gateway), None).await.expect("Request should succeed.");

	let seen = transport.seen();

	assert_eq!(seen.len(), 1);
	assert_eq!(
		seen[0].headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
		Some("application/json"),
	);
	assert_eq!(seen[0].bearer(), Some("a9"));
}

#[tokio::test]
async fn rejected_retry_is_returned_without_another_refresh() {
	let transport = Arc::new(ScriptedTransport::new(None).rejecting_every_token());
	let (gateway, store) = scripted_gateway(transport.clone());
	let (terminations, terminator) = counting_terminator();

	seed_session(&store, "a1", Some("r1")).await;

	let response = gateway
		.execute(list_request(&gateway), Some(&terminator))
		.await
		.expect("A rejected retry is a normal outcome.");

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(transport.refreshes(), 1);
	assert_eq!(transport.api_sends(), 2);
	assert_eq!(terminations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_refresh_endpoint_terminates_session() {
	let transport =
		Arc::new(ScriptedTransport::new(None).with_refresh_reply(RefreshReply::Unreachable));
	let (gateway, store) = scripted_gateway(transport.clone());
	let (terminations, terminator) = counting_terminator();

	seed_session(&store, "a1", Some("r1")).await;

	let err = gateway
		.execute(list_request(&gateway), Some(&terminator))
		.await
		.expect_err("Refresh transport failure should fail the call.");

	assert!(err.is_unauthorized());
	assert_eq!(transport.refreshes(), 1);
	assert_eq!(transport.api_sends(), 1);
	assert_eq!(terminations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_without_access_field_terminates_session() {
	let transport =
		Arc::new(ScriptedTransport::new(None).with_refresh_reply(RefreshReply::MissingAccess));
	let (gateway, store) = scripted_gateway(transport.clone());
	let (terminations, terminator) = counting_terminator();

	seed_session(&store, "a1", Some("r1")).await;

	let err = gateway
		.execute(list_request(&gateway), Some(&terminator))
		.await
		.expect_err("Refresh reply without an access token should fail the call.");

	assert!(err.is_unauthorized());
	assert_eq!(transport.refreshes(), 1);
	assert_eq!(transport.api_sends(), 1);
	assert_eq!(terminations.load(Ordering::SeqCst), 1);
	assert_eq!(gateway.refresh_metrics.failures(), 1);
}
