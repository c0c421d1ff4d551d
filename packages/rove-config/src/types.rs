use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub location: Location,
	pub search: Search,
	pub geofence: Geofence,
	pub saved: Saved,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Location {
	/// Raw position samples with a worse horizontal accuracy are discarded.
	#[serde(default = "default_accuracy_threshold_m")]
	pub accuracy_threshold_m: f64,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	#[serde(default = "default_distance_filter_m")]
	pub distance_filter_m: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_initial_radius_m")]
	pub initial_radius_m: f64,
	#[serde(default = "default_full_radius_m")]
	pub full_radius_m: f64,
	/// When the narrow pass yields fewer merged results than this, all query
	/// variants are rerun at `full_radius_m`.
	#[serde(default = "default_min_results")]
	pub min_results: usize,
	#[serde(default = "default_page_size")]
	pub page_size: usize,
	#[serde(default = "default_cache_ttl_secs")]
	pub cache_ttl_secs: u64,
	#[serde(default = "default_cache_max_entries")]
	pub cache_max_entries: usize,
	pub provider: PoiProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PoiProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Geofence {
	#[serde(default = "default_region_cap")]
	pub region_cap: usize,
	#[serde(default = "default_geofence_radius_m")]
	pub default_radius_m: f64,
	#[serde(default = "default_min_radius_m")]
	pub min_radius_m: f64,
	#[serde(default = "default_max_radius_m")]
	pub max_radius_m: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Saved {
	pub data_dir: String,
	#[serde(default = "default_duplicate_distance_m")]
	pub duplicate_distance_m: f64,
	#[serde(default = "default_locations_key")]
	pub locations_key: String,
	#[serde(default = "default_visits_key")]
	pub visits_key: String,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_accuracy_threshold_m() -> f64 {
	100.0
}

fn default_max_retries() -> u32 {
	3
}

fn default_distance_filter_m() -> f64 {
	10.0
}

fn default_initial_radius_m() -> f64 {
	2_000.0
}

fn default_full_radius_m() -> f64 {
	5_000.0
}

fn default_min_results() -> usize {
	5
}

fn default_page_size() -> usize {
	20
}

fn default_cache_ttl_secs() -> u64 {
	300
}

fn default_cache_max_entries() -> usize {
	64
}

fn default_region_cap() -> usize {
	20
}

fn default_geofence_radius_m() -> f64 {
	50.0
}

fn default_min_radius_m() -> f64 {
	25.0
}

fn default_max_radius_m() -> f64 {
	500.0
}

fn default_duplicate_distance_m() -> f64 {
	50.0
}

fn default_locations_key() -> String {
	"saved_locations".to_string()
}

fn default_visits_key() -> String {
	"visit_history".to_string()
}
