//! In-memory collaborators for engine tests: a scripted POI provider, a
//! command-recording position provider, and a blob store with injectable
//! failures. Nothing here touches the network or the filesystem.

use std::{
	collections::HashMap,
	sync::{
		Mutex,
		atomic::{AtomicBool, Ordering},
	},
};

use color_eyre::eyre::eyre;
use serde_json::Map;
use uuid::Uuid;

use rove_config::{Config, Geofence, Location, PoiProviderConfig, Saved, Search, Service};
use rove_domain::Coordinate;
use rove_providers::poi::PoiRecord;
use rove_service::{BoxFuture, PoiSearchProvider, PositionProvider, RegionSpec};
use rove_storage::BlobStore;

/// A baseline configuration with the stock thresholds. Tests mutate the
/// returned value when they need a tighter cap or a shorter TTL.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		location: Location {
			accuracy_threshold_m: 100.0,
			max_retries: 3,
			distance_filter_m: 10.0,
		},
		search: Search {
			initial_radius_m: 2_000.0,
			full_radius_m: 5_000.0,
			min_results: 5,
			page_size: 20,
			cache_ttl_secs: 300,
			cache_max_entries: 64,
			provider: PoiProviderConfig {
				provider_id: "scripted".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: String::new(),
				path: "/v1/search".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		geofence: Geofence {
			region_cap: 20,
			default_radius_m: 50.0,
			min_radius_m: 25.0,
			max_radius_m: 500.0,
		},
		saved: Saved {
			data_dir: "unused".to_string(),
			duplicate_distance_m: 50.0,
			locations_key: "saved_locations".to_string(),
			visits_key: "visit_history".to_string(),
		},
	}
}

pub fn poi_record(name: &str, lat: f64, lon: f64) -> PoiRecord {
	PoiRecord { name: name.to_string(), lat, lon, address_components: [None, None, None, None] }
}

#[derive(Clone, Debug)]
enum Scripted {
	Records(Vec<PoiRecord>),
	Failure(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoiCall {
	pub query: String,
	pub radius_m: f64,
}

/// [`PoiSearchProvider`] that replays scripted outcomes and records every
/// call. Lookup precedence: exact query, then radius, then the fallback
/// (empty results unless rescripted).
pub struct ScriptedPoiSearch {
	by_query: Mutex<HashMap<String, Scripted>>,
	by_radius: Mutex<HashMap<u64, Scripted>>,
	fallback: Mutex<Scripted>,
	calls: Mutex<Vec<PoiCall>>,
}

impl ScriptedPoiSearch {
	pub fn new() -> Self {
		Self {
			by_query: Mutex::new(HashMap::new()),
			by_radius: Mutex::new(HashMap::new()),
			fallback: Mutex::new(Scripted::Records(Vec::new())),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn respond(&self, query: &str, records: Vec<PoiRecord>) {
		lock(&self.by_query).insert(query.to_string(), Scripted::Records(records));
	}

	pub fn fail(&self, query: &str, reason: &str) {
		lock(&self.by_query).insert(query.to_string(), Scripted::Failure(reason.to_string()));
	}

	/// Scripts every query at one radius, keyed by the rounded meter value.
	pub fn respond_at_radius(&self, radius_m: f64, records: Vec<PoiRecord>) {
		lock(&self.by_radius).insert(radius_key(radius_m), Scripted::Records(records));
	}

	pub fn respond_all(&self, records: Vec<PoiRecord>) {
		*lock(&self.fallback) = Scripted::Records(records);
	}

	pub fn fail_all(&self, reason: &str) {
		*lock(&self.fallback) = Scripted::Failure(reason.to_string());
	}

	pub fn calls(&self) -> Vec<PoiCall> {
		lock(&self.calls).clone()
	}

	fn outcome(&self, query: &str, radius_m: f64) -> Scripted {
		if let Some(scripted) = lock(&self.by_query).get(query) {
			return scripted.clone();
		}
		if let Some(scripted) = lock(&self.by_radius).get(&radius_key(radius_m)) {
			return scripted.clone();
		}

		lock(&self.fallback).clone()
	}
}

impl Default for ScriptedPoiSearch {
	fn default() -> Self {
		Self::new()
	}
}

impl PoiSearchProvider for ScriptedPoiSearch {
	fn search<'a>(
		&'a self,
		_cfg: &'a PoiProviderConfig,
		query: &'a str,
		_center: Coordinate,
		radius_m: f64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<PoiRecord>>> {
		Box::pin(async move {
			lock(&self.calls).push(PoiCall { query: query.to_string(), radius_m });

			match self.outcome(query, radius_m) {
				Scripted::Records(records) => Ok(records),
				Scripted::Failure(reason) => Err(eyre!(reason)),
			}
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum PositionCommand {
	RequestAuthorization,
	StartUpdates,
	StopUpdates,
	Monitor(Uuid),
	StopMonitoring(Uuid),
}

/// [`PositionProvider`] that records every command it receives. Individual
/// command kinds can be made to fail.
#[derive(Default)]
pub struct RecordingPositionProvider {
	commands: Mutex<Vec<PositionCommand>>,
	fail_start_updates: AtomicBool,
	fail_monitor: AtomicBool,
}

impl RecordingPositionProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn commands(&self) -> Vec<PositionCommand> {
		lock(&self.commands).clone()
	}

	pub fn count_of(&self, command: &PositionCommand) -> usize {
		lock(&self.commands).iter().filter(|recorded| *recorded == command).count()
	}

	pub fn set_fail_start_updates(&self, fail: bool) {
		self.fail_start_updates.store(fail, Ordering::SeqCst);
	}

	pub fn set_fail_monitor(&self, fail: bool) {
		self.fail_monitor.store(fail, Ordering::SeqCst);
	}

	fn record(&self, command: PositionCommand) {
		lock(&self.commands).push(command);
	}
}

impl PositionProvider for RecordingPositionProvider {
	fn request_authorization<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.record(PositionCommand::RequestAuthorization);

			Ok(())
		})
	}

	fn start_updates<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.record(PositionCommand::StartUpdates);

			if self.fail_start_updates.load(Ordering::SeqCst) {
				return Err(eyre!("Scripted start_updates failure."));
			}

			Ok(())
		})
	}

	fn stop_updates<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.record(PositionCommand::StopUpdates);

			Ok(())
		})
	}

	fn monitor<'a>(&'a self, region: RegionSpec) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.record(PositionCommand::Monitor(region.id));

			if self.fail_monitor.load(Ordering::SeqCst) {
				return Err(eyre!("Scripted monitor failure."));
			}

			Ok(())
		})
	}

	fn stop_monitoring<'a>(&'a self, region_id: Uuid) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.record(PositionCommand::StopMonitoring(region_id));

			Ok(())
		})
	}
}

/// [`BlobStore`] over a hash map. Supports planting raw (including corrupt)
/// bytes and forcing reads or writes to fail.
#[derive(Default)]
pub struct MemoryBlobStore {
	blobs: Mutex<HashMap<String, Vec<u8>>>,
	fail_reads: AtomicBool,
	fail_writes: AtomicBool,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_raw(&self, key: &str, bytes: Vec<u8>) {
		lock(&self.blobs).insert(key.to_string(), bytes);
	}

	pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
		lock(&self.blobs).get(key).cloned()
	}

	pub fn set_fail_reads(&self, fail: bool) {
		self.fail_reads.store(fail, Ordering::SeqCst);
	}

	pub fn set_fail_writes(&self, fail: bool) {
		self.fail_writes.store(fail, Ordering::SeqCst);
	}
}

impl BlobStore for MemoryBlobStore {
	fn read_blob<'a>(
		&'a self,
		key: &'a str,
	) -> rove_storage::BoxFuture<'a, rove_storage::Result<Option<Vec<u8>>>> {
		Box::pin(async move {
			if self.fail_reads.load(Ordering::SeqCst) {
				return Err(rove_storage::Error::Io {
					key: key.to_string(),
					source: std::io::Error::other("Injected read failure."),
				});
			}

			Ok(lock(&self.blobs).get(key).cloned())
		})
	}

	fn write_blob<'a>(
		&'a self,
		key: &'a str,
		bytes: Vec<u8>,
	) -> rove_storage::BoxFuture<'a, rove_storage::Result<()>> {
		Box::pin(async move {
			if self.fail_writes.load(Ordering::SeqCst) {
				return Err(rove_storage::Error::Io {
					key: key.to_string(),
					source: std::io::Error::other("Injected write failure."),
				});
			}

			lock(&self.blobs).insert(key.to_string(), bytes);

			Ok(())
		})
	}
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn radius_key(radius_m: f64) -> u64 {
	radius_m.round() as u64
}
