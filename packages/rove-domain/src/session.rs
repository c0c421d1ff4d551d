use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// The interval a user is judged present at a saved location, bounded by
/// region-entry and region-exit events.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VisitSession {
	pub id: Uuid,
	pub saved_location_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub start_time: OffsetDateTime,
	#[serde(default, with = "crate::time_serde::option")]
	pub end_time: Option<OffsetDateTime>,
}

impl VisitSession {
	pub fn open(saved_location_id: Uuid, start_time: OffsetDateTime) -> Self {
		Self { id: Uuid::new_v4(), saved_location_id, start_time, end_time: None }
	}

	pub fn close(&mut self, end_time: OffsetDateTime) {
		self.end_time = Some(end_time);
	}

	pub fn is_active(&self) -> bool {
		self.end_time.is_none()
	}

	pub fn duration(&self) -> Option<Duration> {
		self.end_time.map(|end| end - self.start_time)
	}
}
