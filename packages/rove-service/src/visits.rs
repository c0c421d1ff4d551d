//! Region-monitoring lifecycle and the visit-session state machine. The
//! tracked set is bounded by the provider's region ceiling; entry and exit
//! events drive a single open session at a time.

use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use rove_domain::{SavedLocation, VisitSession};

use crate::{EngineCondition, RegionSpec, RoveService, ServiceError, ServiceResult};

pub(crate) struct TrackerState {
	monitored: HashMap<Uuid, RegionSpec>,
	current_visit: Option<VisitSession>,
}

impl TrackerState {
	pub(crate) fn new() -> Self {
		Self { monitored: HashMap::new(), current_visit: None }
	}
}

impl RoveService {
	/// Registers a geofence for a saved location. A no-op when the location
	/// is already tracked; rejected without mutating anything once the
	/// region cap is reached.
	pub async fn start_monitoring(&self, location: &SavedLocation) -> ServiceResult<()> {
		let cap = self.cfg.geofence.region_cap;
		let region = RegionSpec {
			id: location.id,
			center: location.coordinate,
			radius_m: location.geofence_radius_m,
		};

		{
			let mut state = self.lock_state().await;

			if state.tracker.monitored.contains_key(&location.id) {
				return Ok(());
			}
			if state.tracker.monitored.len() >= cap {
				return Err(ServiceError::CapacityExceeded { cap });
			}

			state.tracker.monitored.insert(location.id, region);
		}

		// Setup failures keep the location tracked; a later restart may
		// succeed where this attempt did not.
		if let Err(err) = self.providers().position.monitor(region).await {
			self.sink().report(EngineCondition::MonitoringFailure {
				region_id: location.id,
				message: err.to_string(),
			});
		}

		Ok(())
	}

	pub async fn stop_monitoring(&self, location_id: Uuid) -> ServiceResult<()> {
		let removed = self.lock_state().await.tracker.monitored.remove(&location_id);

		if removed.is_none() {
			return Ok(());
		}
		if let Err(err) = self.providers().position.stop_monitoring(location_id).await {
			self.sink().report(EngineCondition::MonitoringFailure {
				region_id: location_id,
				message: err.to_string(),
			});
		}

		Ok(())
	}

	pub async fn stop_all_monitoring(&self) -> ServiceResult<()> {
		let ids: Vec<Uuid> = {
			let mut state = self.lock_state().await;

			state.tracker.monitored.drain().map(|(id, _)| id).collect()
		};

		for id in ids {
			if let Err(err) = self.providers().position.stop_monitoring(id).await {
				self.sink().report(EngineCondition::MonitoringFailure {
					region_id: id,
					message: err.to_string(),
				});
			}
		}

		Ok(())
	}

	pub async fn is_monitoring(&self, location_id: Uuid) -> bool {
		self.lock_state().await.tracker.monitored.contains_key(&location_id)
	}

	pub async fn monitored_count(&self) -> usize {
		self.lock_state().await.tracker.monitored.len()
	}

	/// Idempotent stop-and-start for every tracked location. Used after an
	/// app resume to resynchronize possibly-stale provider registrations;
	/// the tracked set itself never changes.
	pub async fn restart_monitoring(&self) -> ServiceResult<()> {
		let regions: Vec<RegionSpec> =
			{ self.lock_state().await.tracker.monitored.values().copied().collect() };

		for region in regions {
			if let Err(err) = self.providers().position.stop_monitoring(region.id).await {
				tracing::warn!(error = %err, region_id = %region.id, "Stale region stop failed.");
			}
			if let Err(err) = self.providers().position.monitor(region).await {
				self.sink().report(EngineCondition::MonitoringFailure {
					region_id: region.id,
					message: err.to_string(),
				});
			}
		}

		Ok(())
	}

	/// The open visit session, if the user is currently inside a geofence.
	pub async fn current_visit(&self) -> Option<VisitSession> {
		self.lock_state().await.tracker.current_visit.clone()
	}

	pub(crate) async fn handle_region_entered(&self, region_id: Uuid, now: OffsetDateTime) {
		let opened = {
			let mut state = self.lock_state().await;

			if !state.tracker.monitored.contains_key(&region_id) {
				tracing::debug!(region_id = %region_id, "Entry for an untracked region ignored.");

				return;
			}
			// A second entry with no intervening exit is a duplicate signal.
			if state.tracker.current_visit.is_some() {
				return;
			}

			let session = VisitSession::open(region_id, now);

			state.tracker.current_visit = Some(session.clone());

			session
		};

		tracing::info!(session_id = %opened.id, location_id = %region_id, "Visit started.");
		self.notifier().publish_visit_started(opened);
	}

	pub(crate) async fn handle_region_exited(&self, region_id: Uuid, now: OffsetDateTime) {
		let closed = {
			let mut state = self.lock_state().await;
			let matches = state
				.tracker
				.current_visit
				.as_ref()
				.map(|open| open.saved_location_id == region_id)
				.unwrap_or(false);

			if !matches {
				return;
			}

			let Some(mut session) = state.tracker.current_visit.take() else {
				return;
			};

			session.close(now);

			session
		};

		tracing::info!(session_id = %closed.id, location_id = %region_id, "Visit ended.");

		self.append_visit_record(&closed).await;
		self.notifier().publish_visit_ended(closed);
	}

	pub(crate) async fn handle_monitoring_failed(&self, region_id: Uuid, reason: &str) {
		self.sink().report(EngineCondition::MonitoringFailure {
			region_id,
			message: reason.to_string(),
		});
	}

	/// Persists a closed session to the visit-history collection and appends
	/// its timestamp to the owning saved location. Both writes are ambient;
	/// failures surface through the sink and never undo the session close.
	async fn append_visit_record(&self, session: &VisitSession) {
		if let Err(err) = self.persist_closed_session(session).await {
			self.sink()
				.report(EngineCondition::PersistenceFailure { message: err.to_string() });
		}

		let end_time = session.end_time.unwrap_or(session.start_time);

		if let Err(err) = self.record_visit(session.saved_location_id, end_time).await {
			self.sink()
				.report(EngineCondition::PersistenceFailure { message: err.to_string() });
		}
	}
}
