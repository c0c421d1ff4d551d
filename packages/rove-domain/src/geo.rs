use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Decimal places kept when snapping a coordinate to the dedup grid. Four
/// places is roughly an 11 m cell at the equator, tight enough to merge the
/// same venue returned by several query variants.
const GRID_DECIMALS: i32 = 4;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
	pub lat: f64,
	pub lon: f64,
}

/// A snapped grid cell. Two coordinates in the same cell are treated as the
/// same physical place during search dedup.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GridCell {
	lat: i64,
	lon: i64,
}

impl Coordinate {
	pub fn new(lat: f64, lon: f64) -> Self {
		Self { lat, lon }
	}

	/// Great-circle distance in meters (haversine).
	pub fn distance_m(&self, other: &Self) -> f64 {
		let lat_a = self.lat.to_radians();
		let lat_b = other.lat.to_radians();
		let d_lat = (other.lat - self.lat).to_radians();
		let d_lon = (other.lon - self.lon).to_radians();
		let h = (d_lat / 2.0).sin().powi(2)
			+ lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

		2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
	}

	pub fn grid_cell(&self) -> GridCell {
		let scale = 10_f64.powi(GRID_DECIMALS);

		GridCell {
			lat: (self.lat * scale).round() as i64,
			lon: (self.lon * scale).round() as i64,
		}
	}
}
