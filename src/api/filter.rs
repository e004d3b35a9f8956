//! Client-side narrowing and ordering of an already fetched delivery list.

// self
use crate::api::Delivery;

/// Upper bound on trip duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DurationFilter {
	/// No constraint.
	#[default]
	Any,
	/// At most 60 minutes.
	UpToOneHour,
	/// At most 120 minutes.
	UpToTwoHours,
}
impl DurationFilter {
	/// Inclusive limit in minutes, `None` for [`DurationFilter::Any`].
	pub const fn max_minutes(self) -> Option<i64> {
		match self {
			Self::Any => None,
			Self::UpToOneHour => Some(60),
			Self::UpToTwoHours => Some(120),
		}
	}
}

/// Upper bound on trip distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DistanceFilter {
	/// No constraint.
	#[default]
	Any,
	/// At most 5 km.
	UpToFiveKm,
	/// At most 10 km.
	UpToTenKm,
}
impl DistanceFilter {
	/// Inclusive limit in kilometres, `None` for [`DistanceFilter::Any`].
	pub const fn max_km(self) -> Option<f64> {
		match self {
			Self::Any => None,
			Self::UpToFiveKm => Some(5.),
			Self::UpToTenKm => Some(10.),
		}
	}
}

/// Combined duration, distance, and id-search filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryFilter {
	/// Duration bucket.
	pub duration: DurationFilter,
	/// Distance bucket.
	pub distance: DistanceFilter,
	/// Substring matched against the decimal id; blank disables the search.
	pub search: String,
}
impl DeliveryFilter {
	/// Returns `true` when `delivery` passes every active constraint.
	///
	/// Deliveries whose duration or distance is unknown fail the corresponding bucket
	/// unless it is `Any`.
	pub fn matches(&self, delivery: &Delivery) -> bool {
		let search = self.search.trim();

		if !search.is_empty() && !delivery.id.to_string().contains(search) {
			return false;
		}
		let duration_ok = self.duration.max_minutes().is_none_or(|max| {
			delivery.duration_minutes().is_some_and(|minutes| minutes <= max)
		});
		let distance_ok = self
			.distance
			.max_km()
			.is_none_or(|max| delivery.distance_km().is_some_and(|km| km <= max));

		duration_ok && distance_ok
	}

	/// Keeps the matching deliveries and orders them by [`sort_by_duration`].
	pub fn apply<'a>(&self, deliveries: &'a [Delivery]) -> Vec<&'a Delivery> {
		let mut kept =
			deliveries.iter().filter(|delivery| self.matches(delivery)).collect::<Vec<_>>();

		sort_by_duration(&mut kept);

		kept
	}
}

/// Sorts ascending by duration; unknown durations go last and ties keep their order.
pub fn sort_by_duration(deliveries: &mut [&Delivery]) {
	deliveries.sort_by_key(|delivery| {
		let minutes = delivery.duration_minutes();

		(minutes.is_none(), minutes)
	});
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn delivery(id: u64, minutes: Option<i64>, distance: Option<&str>) -> Delivery {
		let arrival = minutes
			.map(|minutes| format!("2025-04-01T{:02}:{:02}:00Z", 8 + minutes / 60, minutes % 60));

		serde_json::from_value(serde_json::json!({
			"id": id,
			"departure_time": "2025-04-01T08:00:00Z",
			"delivery_time": arrival,
			"distance": distance,
		}))
		.expect("Delivery fixture should decode.")
	}

	#[test]
	fn duration_bucket_is_inclusive_and_rejects_unknown() {
		let filter = DeliveryFilter { duration: DurationFilter::UpToOneHour, ..Default::default() };

		assert!(filter.matches(&delivery(1, Some(60), None)));
		assert!(!filter.matches(&delivery(2, Some(61), None)));
		assert!(!filter.matches(&delivery(3, None, None)));
		assert!(DeliveryFilter::default().matches(&delivery(3, None, None)));
	}

	#[test]
	fn distance_bucket_parses_wire_strings() {
		let filter = DeliveryFilter { distance: DistanceFilter::UpToTenKm, ..Default::default() };

		assert!(filter.matches(&delivery(1, None, Some("9.99"))));
		assert!(filter.matches(&delivery(2, None, Some("10"))));
		assert!(!filter.matches(&delivery(3, None, Some("10.01"))));
		assert!(!filter.matches(&delivery(4, None, None)));
	}

	#[test]
	fn search_matches_id_substring() {
		let filter = DeliveryFilter { search: " 23 ".into(), ..Default::default() };

		assert!(filter.matches(&delivery(1234, None, None)));
		assert!(!filter.matches(&delivery(2413, None, None)));
	}

	#[test]
	fn apply_sorts_by_duration_with_unknown_last() {
		let deliveries = [
			delivery(1, None, None),
			delivery(2, Some(90), None),
			delivery(3, Some(15), None),
			delivery(4, Some(90), None),
			delivery(5, None, None),
		];
		let ids = DeliveryFilter::default()
			.apply(&deliveries)
			.into_iter()
			.map(|delivery| delivery.id)
			.collect::<Vec<_>>();

		assert_eq!(ids, [3, 2, 4, 1, 5]);
	}
}
