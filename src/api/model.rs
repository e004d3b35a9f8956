//! Wire models for delivery records and their reference data.

// crates.io
use time::{
	PrimitiveDateTime,
	format_description::well_known::{Iso8601, Rfc3339},
};
// self
use crate::_prelude::*;

/// Delivery record as returned by the delivery endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
	/// Server-assigned identifier.
	pub id: u64,
	/// Transport reference.
	#[serde(default)]
	pub transport: Option<u64>,
	/// Vehicle or consignment number.
	#[serde(default)]
	pub number: Option<String>,
	/// Departure instant as sent by the server.
	#[serde(default)]
	pub departure_time: Option<String>,
	/// Arrival instant as sent by the server.
	#[serde(default)]
	pub delivery_time: Option<String>,
	/// Distance in kilometres; the server sends either a string or a number.
	#[serde(default)]
	pub distance: Option<Distance>,
	/// Service references.
	#[serde(default)]
	pub services: Vec<u64>,
	/// Status reference.
	#[serde(default)]
	pub status: Option<u64>,
	/// Whether the vehicle passed its technical check.
	#[serde(default)]
	pub technical_state: bool,
	/// Name of the person who packed the shipment.
	#[serde(default)]
	pub fio: Option<String>,
	/// Free-form comment.
	#[serde(default)]
	pub comment: Option<String>,
	/// Packaging reference.
	#[serde(default)]
	pub packaging: Option<u64>,
	/// Attached file references.
	#[serde(default)]
	pub file: Vec<u64>,
}
impl Delivery {
	/// Parsed departure instant.
	pub fn departure(&self) -> Option<OffsetDateTime> {
		self.departure_time.as_deref().and_then(parse_instant)
	}

	/// Parsed arrival instant.
	pub fn arrival(&self) -> Option<OffsetDateTime> {
		self.delivery_time.as_deref().and_then(parse_instant)
	}

	/// Whole minutes between departure and arrival, rounded down.
	///
	/// `None` when either instant is missing or unparseable.
	pub fn duration_minutes(&self) -> Option<i64> {
		let elapsed = self.arrival()? - self.departure()?;

		i64::try_from(elapsed.whole_milliseconds().div_euclid(60_000)).ok()
	}

	/// Distance in kilometres, when it parses as a finite number.
	pub fn distance_km(&self) -> Option<f64> {
		self.distance.as_ref().and_then(Distance::kilometres)
	}
}

/// Distance as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Distance {
	/// Numeric value.
	Number(f64),
	/// Decimal string, e.g. `"12.50"`.
	Text(String),
}
impl Distance {
	/// Returns the value in kilometres, if finite.
	pub fn kilometres(&self) -> Option<f64> {
		let value = match self {
			Self::Number(value) => *value,
			Self::Text(text) => text.trim().parse().ok()?,
		};

		value.is_finite().then_some(value)
	}
}

/// Create or partial-update payload. Unset fields are omitted from the JSON body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDraft {
	/// Transport reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transport: Option<u64>,
	/// Vehicle or consignment number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub number: Option<String>,
	/// Departure instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub departure_time: Option<String>,
	/// Arrival instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_time: Option<String>,
	/// Distance in kilometres.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distance: Option<String>,
	/// Service references.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub services: Option<Vec<u64>>,
	/// Status reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<u64>,
	/// Technical check result.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub technical_state: Option<bool>,
	/// Name of the person who packed the shipment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fio: Option<String>,
	/// Free-form comment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Packaging reference.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub packaging: Option<u64>,
	/// Attached file references (see [`StoredFile`]).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file: Option<Vec<u64>>,
}

/// Server-side filters for the delivery list. Only set fields become query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryQuery {
	/// Service reference.
	pub service: Option<u64>,
	/// Transport reference.
	pub transport: Option<u64>,
	/// Lower date bound, passed through verbatim.
	pub date_from: Option<String>,
	/// Upper date bound, passed through verbatim.
	pub date_to: Option<String>,
}
impl DeliveryQuery {
	/// Returns the query parameters in a fixed order.
	pub fn pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		if let Some(service) = self.service {
			pairs.push(("service", service.to_string()));
		}
		if let Some(transport) = self.transport {
			pairs.push(("transport", transport.to_string()));
		}
		if let Some(date_from) = self.date_from.as_ref().filter(|value| !value.is_empty()) {
			pairs.push(("date_from", date_from.clone()));
		}
		if let Some(date_to) = self.date_to.as_ref().filter(|value| !value.is_empty()) {
			pairs.push(("date_to", date_to.clone()));
		}

		pairs
	}
}

/// Vehicle reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
	/// Identifier.
	pub id: u64,
	/// Vehicle brand.
	#[serde(default)]
	pub brand: String,
}

/// Service reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
	/// Identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
}

/// Status reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
	/// Identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Colour name or hex code chosen by the back office.
	#[serde(default)]
	pub color: Option<String>,
}

/// Packaging reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packaging {
	/// Identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
}

/// Uploaded file record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
	/// Identifier referenced from [`Delivery::file`].
	pub id: u64,
	/// Download URL.
	pub file: String,
}

/// File queued for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
	/// File name reported to the server.
	pub file_name: String,
	/// Optional media type.
	pub mime: Option<String>,
	/// File contents.
	pub bytes: Vec<u8>,
}
impl FileUpload {
	/// Creates an upload without an explicit media type.
	pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self { file_name: file_name.into(), mime: None, bytes }
	}

	/// Sets the media type.
	pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
		self.mime = Some(mime.into());

		self
	}
}

/// List endpoints answer either a bare array or a paginated envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload<T> {
	Page { results: Vec<T> },
	Items(Vec<T>),
}
impl<T> ListPayload<T> {
	pub(crate) fn into_vec(self) -> Vec<T> {
		match self {
			Self::Page { results } | Self::Items(results) => results,
		}
	}
}

fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	OffsetDateTime::parse(raw, &Rfc3339)
		.ok()
		.or_else(|| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).ok().map(|dt| dt.assume_utc()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn delivery(departure: Option<&str>, arrival: Option<&str>) -> Delivery {
		serde_json::from_value(serde_json::json!({
			"id": 1,
			"departure_time": departure,
			"delivery_time": arrival,
		}))
		.expect("Delivery fixture should decode.")
	}

	#[test]
	fn duration_rounds_down_to_whole_minutes() {
		let on_time = delivery(Some("2025-04-01T10:00:00Z"), Some("2025-04-01T11:30:59Z"));
		let offset = delivery(Some("2025-04-01T10:00:00+03:00"), Some("2025-04-01T07:45:00Z"));
		let backwards = delivery(Some("2025-04-01T10:00:30Z"), Some("2025-04-01T10:00:00Z"));

		assert_eq!(on_time.duration_minutes(), Some(90));
		assert_eq!(offset.duration_minutes(), Some(45));
		assert_eq!(backwards.duration_minutes(), Some(-1));
	}

	#[test]
	fn duration_is_unknown_without_both_instants() {
		assert_eq!(delivery(None, Some("2025-04-01T10:00:00Z")).duration_minutes(), None);
		let garbled = delivery(Some("yesterday"), Some("2025-04-01T10:00:00Z"));

		assert_eq!(garbled.duration_minutes(), None);
	}

	#[test]
	fn naive_timestamps_are_read_as_utc() {
		let naive = delivery(Some("2025-04-01T10:00:00"), Some("2025-04-01T10:20:00"));

		assert_eq!(naive.duration_minutes(), Some(20));
	}

	#[test]
	fn distance_accepts_strings_and_numbers() {
		assert_eq!(Distance::Text(" 12.50 ".into()).kilometres(), Some(12.5));
		assert_eq!(Distance::Number(4.0).kilometres(), Some(4.0));
		assert_eq!(Distance::Text("far".into()).kilometres(), None);

		let decoded: Delivery = serde_json::from_str("{\"id\":3,\"distance\":\"7\"}")
			.expect("String distance should decode.");

		assert_eq!(decoded.distance_km(), Some(7.0));
	}

	#[test]
	fn draft_omits_unset_fields() {
		let draft = DeliveryDraft { comment: Some("fragile".into()), ..Default::default() };
		let body = serde_json::to_string(&draft).expect("Draft should serialize.");

		assert_eq!(body, "{\"comment\":\"fragile\"}");
	}

	#[test]
	fn query_skips_unset_filters() {
		let query = DeliveryQuery {
			transport: Some(2),
			date_to: Some(String::new()),
			..Default::default()
		};

		assert_eq!(query.pairs(), vec![("transport", "2".to_owned())]);
	}

	#[test]
	fn list_payload_accepts_both_shapes() {
		let page: ListPayload<Service> = serde_json::from_value(serde_json::json!({
			"count": 1,
			"next": null,
			"previous": null,
			"results": [{ "id": 1, "name": "Loading" }],
		}))
		.expect("Paginated envelope should decode.");
		let bare: ListPayload<Service> = serde_json::from_str("[{\"id\":2,\"name\":\"Escort\"}]")
			.expect("Bare array should decode.");

		assert_eq!(page.into_vec()[0].name, "Loading");
		assert_eq!(bare.into_vec()[0].id, 2);
	}
}
