use tokio::sync::broadcast;

use rove_domain::{AuthorizationState, Coordinate, PositionSample, VisitSession};
use uuid::Uuid;

const TOPIC_CAPACITY: usize = 32;

/// Push callback from the position provider, marshaled onto the engine's
/// event queue before any state is touched.
#[derive(Clone, Debug)]
pub enum PositionEvent {
	AuthorizationChanged(AuthorizationState),
	PositionUpdated(PositionSample),
	UpdateFailed { reason: String },
	RegionEntered { region_id: Uuid },
	RegionExited { region_id: Uuid },
	MonitoringFailed { region_id: Uuid, reason: String },
}

/// Ambient condition routed to the error sink instead of a caller. Nothing
/// here is fatal; the engine stays usable after every one of them.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCondition {
	LocationUnavailable { message: String },
	SearchFailed { message: String },
	PermissionDenied { message: String },
	CapacityExceeded { cap: usize },
	DuplicateLocation { existing_id: Uuid },
	PersistenceFailure { message: String },
	MonitoringFailure { region_id: Uuid, message: String },
}

/// Explicitly constructed error reporting collaborator. The composition
/// root owns one and hands clones to whoever produces ambient conditions;
/// consumers (a banner, an alert view) subscribe.
#[derive(Clone)]
pub struct ErrorSink {
	tx: broadcast::Sender<EngineCondition>,
}

/// Typed publish/subscribe topics decoupling the engine from its consumers.
/// Delivery is at-least-once to current subscribers; nothing is retained
/// for late subscribers.
pub struct EventNotifier {
	location: broadcast::Sender<Coordinate>,
	authorization: broadcast::Sender<AuthorizationState>,
	saved_locations: broadcast::Sender<()>,
	visit_started: broadcast::Sender<VisitSession>,
	visit_ended: broadcast::Sender<VisitSession>,
}

impl ErrorSink {
	pub fn new() -> Self {
		let (tx, _) = broadcast::channel(TOPIC_CAPACITY);

		Self { tx }
	}

	pub fn report(&self, condition: EngineCondition) {
		tracing::warn!(?condition, "Engine condition reported.");

		// Nobody listening is fine; conditions are advisory.
		let _ = self.tx.send(condition);
	}

	pub fn subscribe(&self) -> broadcast::Receiver<EngineCondition> {
		self.tx.subscribe()
	}
}

impl Default for ErrorSink {
	fn default() -> Self {
		Self::new()
	}
}

impl EventNotifier {
	pub(crate) fn new() -> Self {
		let (location, _) = broadcast::channel(TOPIC_CAPACITY);
		let (authorization, _) = broadcast::channel(TOPIC_CAPACITY);
		let (saved_locations, _) = broadcast::channel(TOPIC_CAPACITY);
		let (visit_started, _) = broadcast::channel(TOPIC_CAPACITY);
		let (visit_ended, _) = broadcast::channel(TOPIC_CAPACITY);

		Self { location, authorization, saved_locations, visit_started, visit_ended }
	}

	pub fn subscribe_location(&self) -> broadcast::Receiver<Coordinate> {
		self.location.subscribe()
	}

	pub fn subscribe_authorization(&self) -> broadcast::Receiver<AuthorizationState> {
		self.authorization.subscribe()
	}

	pub fn subscribe_saved_locations(&self) -> broadcast::Receiver<()> {
		self.saved_locations.subscribe()
	}

	pub fn subscribe_visit_started(&self) -> broadcast::Receiver<VisitSession> {
		self.visit_started.subscribe()
	}

	pub fn subscribe_visit_ended(&self) -> broadcast::Receiver<VisitSession> {
		self.visit_ended.subscribe()
	}

	pub(crate) fn publish_location(&self, coordinate: Coordinate) {
		let _ = self.location.send(coordinate);
	}

	pub(crate) fn publish_authorization(&self, state: AuthorizationState) {
		let _ = self.authorization.send(state);
	}

	pub(crate) fn publish_saved_locations_changed(&self) {
		let _ = self.saved_locations.send(());
	}

	pub(crate) fn publish_visit_started(&self, session: VisitSession) {
		let _ = self.visit_started.send(session);
	}

	pub(crate) fn publish_visit_ended(&self, session: VisitSession) {
		let _ = self.visit_ended.send(session);
	}
}
