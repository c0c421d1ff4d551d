use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use rove_config::Geofence;

use crate::{Category, Coordinate};

/// One search result. Ephemeral; its id identifies it only within the search
/// transaction that produced it. Saving mints a fresh id.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CandidateLocation {
	pub id: Uuid,
	pub name: String,
	pub coordinate: Coordinate,
	pub address: String,
	pub distance_m: f64,
	pub category: Category,
}

/// A user-saved location with its geofence radius and visit history.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SavedLocation {
	pub id: Uuid,
	pub name: String,
	pub category: Category,
	pub coordinate: Coordinate,
	pub address: String,
	pub geofence_radius_m: f64,
	#[serde(with = "crate::time_serde::vec")]
	pub visit_history: Vec<OffsetDateTime>,
}

impl SavedLocation {
	/// Builds a saved location from a search candidate. The requested radius
	/// is clamped into the configured bounds; the candidate's search id is
	/// not reused as persistence identity.
	pub fn from_candidate(candidate: &CandidateLocation, radius_m: f64, bounds: &Geofence) -> Self {
		Self {
			id: Uuid::new_v4(),
			name: candidate.name.clone(),
			category: candidate.category,
			coordinate: candidate.coordinate,
			address: candidate.address.clone(),
			geofence_radius_m: radius_m.clamp(bounds.min_radius_m, bounds.max_radius_m),
			visit_history: Vec::new(),
		}
	}

	pub fn visits_since(&self, cutoff: OffsetDateTime) -> usize {
		self.visit_history.iter().filter(|ts| **ts >= cutoff).count()
	}
}

/// Joins the present address components with single spaces, skipping absent
/// parts, in street-number/street/locality/region order.
pub fn format_address(components: &[Option<String>]) -> String {
	components
		.iter()
		.filter_map(|part| part.as_deref())
		.map(str::trim)
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}
