//! Typed delivery endpoints layered on the authenticated [`Gateway`].
//!
//! Every call goes through [`Gateway::execute`], so bearer injection and the one-shot refresh
//! apply uniformly. Non-success statuses surface as [`Error::Rejected`] with the server's
//! `detail` message when one is present.

pub mod filter;
pub mod model;

pub use filter::*;
pub use model::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::Endpoint,
	error::ConfigError,
	gateway::{Gateway, SessionTerminator},
	http::{ApiRequest, ApiResponse, HttpTransport, MultipartForm, ReqwestTransport},
};

/// Multipart field name expected by the upload endpoint.
pub const UPLOAD_FIELD: &str = "file";

/// Delivery API client.
pub struct DeliveryApi<T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	gateway: Gateway<T>,
	terminator: Option<Arc<dyn SessionTerminator>>,
}
impl<T> DeliveryApi<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps `gateway` without a session terminator.
	pub fn new(gateway: Gateway<T>) -> Self {
		Self { gateway, terminator: None }
	}

	/// Forwards `terminator` to every call so a failed refresh can end the session.
	pub fn with_terminator(mut self, terminator: Arc<dyn SessionTerminator>) -> Self {
		self.terminator = Some(terminator);

		self
	}

	/// Uses the gateway's own store reset as the terminator.
	pub fn with_session_reset(self) -> Self {
		let reset = Arc::new(self.gateway.session_reset());

		self.with_terminator(reset)
	}

	/// Underlying gateway, for login, logout, and raw calls.
	pub fn gateway(&self) -> &Gateway<T> {
		&self.gateway
	}

	/// Lists deliveries, narrowed by the server-side filters in `query`.
	pub async fn list_deliveries(&self, query: &DeliveryQuery) -> Result<Vec<Delivery>> {
		let pairs = query.pairs();
		let request = ApiRequest::get(self.gateway.config.url(Endpoint::Deliveries)?)
			.query(pairs.iter().map(|(name, value)| (*name, value.as_str())));

		self.fetch_list(request, "delivery list", "Failed to load deliveries").await
	}

	/// Fetches one delivery.
	pub async fn delivery(&self, id: u64) -> Result<Delivery> {
		let request = ApiRequest::get(self.gateway.config.item_url(Endpoint::Deliveries, id)?);

		self.fetch(request, "delivery", "Failed to load delivery").await
	}

	/// Creates a delivery.
	pub async fn create_delivery(&self, draft: &DeliveryDraft) -> Result<Delivery> {
		let request = ApiRequest::post(self.gateway.config.url(Endpoint::Deliveries)?)
			.json(draft)
			.map_err(ConfigError::from)?;

		self.fetch(request, "created delivery", "Failed to create delivery").await
	}

	/// Partially updates a delivery; unset draft fields are left untouched.
	pub async fn update_delivery(&self, id: u64, draft: &DeliveryDraft) -> Result<Delivery> {
		let request = ApiRequest::patch(self.gateway.config.item_url(Endpoint::Deliveries, id)?)
			.json(draft)
			.map_err(ConfigError::from)?;

		self.fetch(request, "updated delivery", "Failed to update delivery").await
	}

	/// Deletes a delivery.
	pub async fn delete_delivery(&self, id: u64) -> Result<()> {
		let request = ApiRequest::delete(self.gateway.config.item_url(Endpoint::Deliveries, id)?);

		self.discard(request, "Failed to delete delivery").await
	}

	/// Lists transports.
	pub async fn transports(&self) -> Result<Vec<Transport>> {
		self.reference(Endpoint::Transports, "transport list", "Failed to load transports").await
	}

	/// Lists services.
	pub async fn services(&self) -> Result<Vec<Service>> {
		self.reference(Endpoint::Services, "service list", "Failed to load services").await
	}

	/// Lists statuses.
	pub async fn statuses(&self) -> Result<Vec<Status>> {
		self.reference(Endpoint::Statuses, "status list", "Failed to load statuses").await
	}

	/// Lists packaging kinds.
	pub async fn packagings(&self) -> Result<Vec<Packaging>> {
		self.reference(Endpoint::Packagings, "packaging list", "Failed to load packagings").await
	}

	/// Uploads a file as `multipart/form-data` and returns the stored records.
	///
	/// The content type (with its boundary) is generated by the transport, never forced to JSON.
	pub async fn upload_file(&self, upload: FileUpload) -> Result<Vec<StoredFile>> {
		let FileUpload { file_name, mime, bytes } = upload;
		let form = MultipartForm::new().file(UPLOAD_FIELD, file_name, mime, bytes);
		let request = ApiRequest::post(self.gateway.config.url(Endpoint::Upload)?).multipart(form);

		self.fetch_list(request, "file upload", "Failed to upload file").await
	}

	/// Fetches a stored file record.
	pub async fn file(&self, id: u64) -> Result<StoredFile> {
		let request = ApiRequest::get(self.gateway.config.item_url(Endpoint::Files, id)?);

		self.fetch(request, "file", "Failed to load file").await
	}

	/// Deletes a stored file.
	pub async fn delete_file(&self, id: u64) -> Result<()> {
		let request = ApiRequest::delete(self.gateway.config.item_url(Endpoint::Files, id)?);

		self.discard(request, "Failed to delete file").await
	}

	async fn send(&self, request: ApiRequest, fallback: &str) -> Result<ApiResponse> {
		let response = self.gateway.execute(request, self.terminator.as_deref()).await?;

		if !response.is_success() {
			return Err(response.rejected(fallback).into());
		}

		Ok(response)
	}

	async fn fetch<R>(&self, request: ApiRequest, context: &str, fallback: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		Ok(self.send(request, fallback).await?.json(context)?)
	}

	async fn fetch_list<R>(
		&self,
		request: ApiRequest,
		context: &str,
		fallback: &str,
	) -> Result<Vec<R>>
	where
		R: DeserializeOwned,
	{
		Ok(self.fetch::<ListPayload<R>>(request, context, fallback).await?.into_vec())
	}

	async fn reference<R>(
		&self,
		endpoint: Endpoint,
		context: &str,
		fallback: &str,
	) -> Result<Vec<R>>
	where
		R: DeserializeOwned,
	{
		let request = ApiRequest::get(self.gateway.config.url(endpoint)?);

		self.fetch_list(request, context, fallback).await
	}

	async fn discard(&self, request: ApiRequest, fallback: &str) -> Result<()> {
		self.send(request, fallback).await.map(|_| ())
	}
}
impl<T> Clone for DeliveryApi<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { gateway: self.gateway.clone(), terminator: self.terminator.clone() }
	}
}
impl<T> Debug for DeliveryApi<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DeliveryApi")
			.field("gateway", &self.gateway)
			.field("terminator", &self.terminator.is_some())
			.finish()
	}
}
