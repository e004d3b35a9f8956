//! Owned request description that can be sent more than once.

// crates.io
use reqwest::{
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
	multipart::{Form, Part},
};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// JSON media type attached to non-multipart requests.
pub const APPLICATION_JSON: &str = "application/json";

/// Request body kinds understood by the gateway.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// JSON document.
	Json(serde_json::Value),
	/// `multipart/form-data`; the transport generates the boundary.
	Multipart(MultipartForm),
}
impl RequestBody {
	/// Returns `true` for multipart bodies.
	pub fn is_multipart(&self) -> bool {
		matches!(self, Self::Multipart(_))
	}
}

/// Single outbound call: target, method, headers, body.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target, including any query string.
	pub url: Url,
	/// Caller-supplied headers; the gateway adds authorization and content type.
	pub headers: HeaderMap,
	/// Request payload.
	pub body: RequestBody,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: RequestBody::Empty }
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(url: Url) -> Self {
		Self::new(Method::PATCH, url)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(url: Url) -> Self {
		Self::new(Method::DELETE, url)
	}

	/// Serializes `payload` as the JSON body.
	pub fn json<T>(mut self, payload: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		self.body = RequestBody::Json(serde_json::to_value(payload)?);

		Ok(self)
	}

	/// Uses `form` as a multipart body.
	pub fn multipart(mut self, form: MultipartForm) -> Self {
		self.body = RequestBody::Multipart(form);

		self
	}

	/// Appends query parameters to the target.
	pub fn query<'a, I>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut pairs = pairs.into_iter().peekable();

		if pairs.peek().is_some() {
			self.url.query_pairs_mut().extend_pairs(pairs);
		}

		self
	}

	/// Sets a caller header, replacing any previous value.
	pub fn header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
		let invalid = || ConfigError::InvalidHeader { name: name.to_owned() };
		let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
		let value = HeaderValue::from_str(value).map_err(|_| invalid())?;

		self.headers.insert(name, value);

		Ok(self)
	}

	/// Returns the bearer token currently attached, if any.
	pub fn bearer(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
	}

	/// Attaches `token` as the bearer credential, replacing any previous one.
	pub(crate) fn authorize(&mut self, token: &TokenSecret) -> Result<(), ConfigError> {
		let mut value = HeaderValue::from_str(&token.bearer())
			.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

		value.set_sensitive(true);
		self.headers.insert(AUTHORIZATION, value);

		Ok(())
	}

	/// Sets the JSON content type unless the body is multipart.
	pub(crate) fn apply_content_type(&mut self) {
		if !self.body.is_multipart() {
			self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
		}
	}
}

/// Owned `multipart/form-data` payload.
///
/// Parts are kept as plain data so the form can be rebuilt for every send.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
	/// Ordered form parts.
	pub parts: Vec<MultipartPart>,
}
impl MultipartForm {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		file_name: impl Into<String>,
		mime: Option<String>,
		bytes: Vec<u8>,
	) -> Self {
		self.parts.push(MultipartPart {
			name: name.into(),
			content: PartContent::File { file_name: file_name.into(), mime, bytes },
		});

		self
	}

	pub(crate) fn to_reqwest(&self) -> Result<Form, ReqwestError> {
		let mut form = Form::new();

		for part in &self.parts {
			form = match &part.content {
				PartContent::Text(value) => form.text(part.name.clone(), value.clone()),
				PartContent::File { file_name, mime, bytes } => {
					let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());

					if let Some(mime) = mime {
						file = file.mime_str(mime)?;
					}

					form.part(part.name.clone(), file)
				},
			};
		}

		Ok(form)
	}
}

/// Named multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartPart {
	/// Field name.
	pub name: String,
	/// Field payload.
	pub content: PartContent,
}

/// Payload of a [`MultipartPart`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartContent {
	/// Plain text value.
	Text(String),
	/// File upload.
	File {
		/// File name reported to the server.
		file_name: String,
		/// Optional media type.
		mime: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}
