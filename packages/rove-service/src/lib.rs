pub mod acquisition;
pub mod events;
pub mod saved;
pub mod search;
pub mod telemetry;
pub mod visits;

use std::{future::Future, pin::Pin, sync::Arc};

use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

pub use events::{EngineCondition, ErrorSink, EventNotifier, PositionEvent};
pub use saved::{SaveRequest, SaveResponse};
pub use search::{SearchRequest, SearchResponse};

use acquisition::AcquisitionState;
use rove_config::Config;
use rove_domain::Coordinate;
use rove_providers::poi::PoiRecord;
use rove_storage::BlobStore;
use search::cache::SearchCache;
use visits::TrackerState;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Depth of the provider event queue. Callbacks that outrun the event loop
/// block on enqueue instead of mutating engine state from their own thread.
const EVENT_QUEUE_DEPTH: usize = 64;

/// A circular area handed to the position provider for entry/exit
/// monitoring. The id is the saved location's id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionSpec {
	pub id: Uuid,
	pub center: Coordinate,
	pub radius_m: f64,
}

pub trait PoiSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a rove_config::PoiProviderConfig,
		query: &'a str,
		center: Coordinate,
		radius_m: f64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<PoiRecord>>>;
}

/// Command side of the position provider. All push-back communication
/// (fixes, authorization changes, region crossings) arrives as
/// [`PositionEvent`]s on the engine's event queue; implementations never
/// touch engine state directly.
pub trait PositionProvider
where
	Self: Send + Sync,
{
	fn request_authorization<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn start_updates<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn stop_updates<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn monitor<'a>(&'a self, region: RegionSpec) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn stop_monitoring<'a>(&'a self, region_id: Uuid) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Debug)]
pub enum ServiceError {
	/// No stabilized fix is available for the requested operation.
	LocationUnavailable,
	/// Every query variant of a search failed at the provider.
	SearchFailed { message: String },
	PermissionDenied,
	CapacityExceeded { cap: usize },
	DuplicateLocation { existing_id: Uuid },
	Persistence { message: String },
	Monitoring { message: String },
	InvalidRequest { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub poi: Arc<dyn PoiSearchProvider>,
	pub position: Arc<dyn PositionProvider>,
}

/// The location intelligence engine. One logical owner serializes all state
/// mutation: provider callbacks enqueue [`PositionEvent`]s, a single
/// consumer ([`RoveService::run_events`]) applies them, and caller-facing
/// operations share the same state lock.
pub struct RoveService {
	pub cfg: Config,
	store: Arc<dyn BlobStore>,
	providers: Providers,
	notifier: EventNotifier,
	sink: ErrorSink,
	state: Mutex<EngineState>,
	events_tx: mpsc::Sender<PositionEvent>,
	events_rx: Mutex<Option<mpsc::Receiver<PositionEvent>>>,
}

pub(crate) struct EngineState {
	pub(crate) acquisition: AcquisitionState,
	pub(crate) tracker: TrackerState,
	pub(crate) cache: SearchCache,
}

/// [`PoiSearchProvider`] backed by the HTTP client in `rove-providers`.
pub struct HttpPoiSearch;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::LocationUnavailable => {
				write!(f, "Location not available. Enable location services and retry.")
			},
			Self::SearchFailed { message } => write!(f, "Nearby search failed: {message}"),
			Self::PermissionDenied => {
				write!(f, "Location access is required. Enable location services in settings.")
			},
			Self::CapacityExceeded { cap } => {
				write!(f, "Cannot monitor more than {cap} regions.")
			},
			Self::DuplicateLocation { existing_id } => {
				write!(f, "A saved location already exists at this spot ({existing_id}).")
			},
			Self::Persistence { message } => write!(f, "Persistence error: {message}"),
			Self::Monitoring { message } => write!(f, "Monitoring error: {message}"),
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<rove_storage::Error> for ServiceError {
	fn from(err: rove_storage::Error) -> Self {
		Self::Persistence { message: err.to_string() }
	}
}

impl PoiSearchProvider for HttpPoiSearch {
	fn search<'a>(
		&'a self,
		cfg: &'a rove_config::PoiProviderConfig,
		query: &'a str,
		center: Coordinate,
		radius_m: f64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<PoiRecord>>> {
		Box::pin(rove_providers::poi::search(cfg, query, center.lat, center.lon, radius_m))
	}
}

impl Providers {
	pub fn new(poi: Arc<dyn PoiSearchProvider>, position: Arc<dyn PositionProvider>) -> Self {
		Self { poi, position }
	}
}

impl RoveService {
	pub fn new(
		cfg: Config,
		store: Arc<dyn BlobStore>,
		providers: Providers,
		sink: ErrorSink,
	) -> Self {
		let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
		let state = EngineState {
			acquisition: AcquisitionState::new(),
			tracker: TrackerState::new(),
			cache: SearchCache::new(cfg.search.cache_max_entries),
		};

		Self {
			cfg,
			store,
			providers,
			notifier: EventNotifier::new(),
			sink,
			state: Mutex::new(state),
			events_tx,
			events_rx: Mutex::new(Some(events_rx)),
		}
	}

	pub fn notifier(&self) -> &EventNotifier {
		&self.notifier
	}

	pub fn error_sink(&self) -> &ErrorSink {
		&self.sink
	}

	/// Handle for provider adapters to enqueue push callbacks.
	pub fn event_sender(&self) -> mpsc::Sender<PositionEvent> {
		self.events_tx.clone()
	}

	pub(crate) fn store(&self) -> &Arc<dyn BlobStore> {
		&self.store
	}

	pub(crate) fn providers(&self) -> &Providers {
		&self.providers
	}

	pub(crate) fn sink(&self) -> &ErrorSink {
		&self.sink
	}

	pub(crate) async fn lock_state(&self) -> tokio::sync::MutexGuard<'_, EngineState> {
		self.state.lock().await
	}

	/// Single-consumer event loop. Owns all engine state mutation for
	/// provider-pushed events; runs until every event sender is dropped.
	/// Calling it twice is an error.
	pub async fn run_events(&self) -> ServiceResult<()> {
		let mut rx = self.events_rx.lock().await.take().ok_or(ServiceError::InvalidRequest {
			message: "The event loop is already running.".to_string(),
		})?;

		while let Some(event) = rx.recv().await {
			self.apply_event(event, time::OffsetDateTime::now_utc()).await;
		}

		Ok(())
	}

	/// Applies one provider event. Exposed to the event loop and to tests
	/// that need a deterministic clock.
	pub async fn apply_event(&self, event: PositionEvent, now: time::OffsetDateTime) {
		match event {
			PositionEvent::AuthorizationChanged(state) => {
				self.handle_authorization_changed(state).await;
			},
			PositionEvent::PositionUpdated(sample) => {
				self.handle_position_updated(sample).await;
			},
			PositionEvent::UpdateFailed { reason } => {
				self.handle_update_failed(&reason).await;
			},
			PositionEvent::RegionEntered { region_id } => {
				self.handle_region_entered(region_id, now).await;
			},
			PositionEvent::RegionExited { region_id } => {
				self.handle_region_exited(region_id, now).await;
			},
			PositionEvent::MonitoringFailed { region_id, reason } => {
				self.handle_monitoring_failed(region_id, &reason).await;
			},
		}
	}
}
