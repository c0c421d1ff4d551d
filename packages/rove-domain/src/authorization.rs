use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Coordinate;

/// Position-provider authorization, mirrored locally. Transitions happen only
/// when the provider reports a change.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
	Undetermined,
	Granted,
	Denied,
	Restricted,
}

impl AuthorizationState {
	pub fn allows_acquisition(&self) -> bool {
		matches!(self, Self::Granted)
	}

	/// Denied and Restricted both halt acquisition and surface the same
	/// permission condition.
	pub fn is_blocked(&self) -> bool {
		matches!(self, Self::Denied | Self::Restricted)
	}
}

/// One raw fix from the position provider. Transient; consumed to update the
/// stabilized current location and never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
	pub coordinate: Coordinate,
	pub horizontal_accuracy_m: f64,
	pub timestamp: OffsetDateTime,
}

impl PositionSample {
	pub fn meets_accuracy(&self, threshold_m: f64) -> bool {
		self.horizontal_accuracy_m <= threshold_m
	}
}
