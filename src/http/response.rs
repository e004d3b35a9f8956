//! Buffered response returned by [`HttpTransport`](crate::http::HttpTransport) implementations.

// crates.io
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{DecodeError, RequestRejected},
};

/// Fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Assembles a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
		Self { status, headers, body }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns `true` when the server rejected the presented credentials.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Returns the body as lossy UTF-8 text.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self, context: &str) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|err| DecodeError::from_path_error(context, err))
	}

	/// Extracts the server-supplied `detail` message, if the body carries one.
	pub fn detail(&self) -> Option<String> {
		let value = serde_json::from_slice::<serde_json::Value>(&self.body).ok()?;

		match value.get("detail")? {
			serde_json::Value::String(detail) => Some(detail.clone()),
			serde_json::Value::Null => None,
			other => Some(other.to_string()),
		}
	}

	/// Converts a non-success response into a [`RequestRejected`] error.
	///
	/// The detail is the JSON `detail` field, else the JSON document itself, else the raw body
	/// text, else `fallback`.
	pub fn rejected(&self, fallback: &str) -> RequestRejected {
		let detail = self
			.detail()
			.or_else(|| {
				serde_json::from_slice::<serde_json::Value>(&self.body)
					.ok()
					.map(|value| value.to_string())
			})
			.or_else(|| {
				let text = self.text();
				let trimmed = text.trim();

				(!trimmed.is_empty()).then(|| trimmed.to_owned())
			})
			.unwrap_or_else(|| format!("{fallback} ({})", self.status.as_u16()));

		RequestRejected { status: self.status.as_u16(), detail }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ApiResponse {
		ApiResponse::new(
			StatusCode::from_u16(status).expect("Fixture status is valid."),
			HeaderMap::new(),
			body.as_bytes().to_vec(),
		)
	}

	#[test]
	fn rejected_prefers_detail_then_json_then_text() {
		let detail = response(400, "{\"detail\":\"Invalid number.\"}").rejected("fallback");
		let fields =
			response(400, "{\"number\":[\"This field is required.\"]}").rejected("fallback");
		let text = response(502, "Bad Gateway").rejected("fallback");
		let empty = response(500, "").rejected("Failed to load deliveries");

		assert_eq!(detail.detail, "Invalid number.");
		assert_eq!(fields.detail, "{\"number\":[\"This field is required.\"]}");
		assert_eq!(text.detail, "Bad Gateway");
		assert_eq!(empty.detail, "Failed to load deliveries (500)");
		assert_eq!(empty.status, 500);
	}

	#[test]
	fn json_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Grant {
			access: String,
		}

		let err = response(200, "{\"refresh\":\"r1\"}")
			.json::<Grant>("refresh")
			.expect_err("Missing access field should fail to decode.");

		assert_eq!(err.context, "refresh");
	}
}
