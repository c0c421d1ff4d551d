//! CRUD over user-saved locations plus the visit-history collection. Every
//! write is a read-modify-write of one blob, serialized behind the engine
//! state lock so concurrent callers cannot lose updates.

use time::OffsetDateTime;
use uuid::Uuid;

use rove_domain::{CandidateLocation, SavedLocation, VisitSession};
use rove_storage::records;

use crate::{EngineCondition, RoveService, ServiceError, ServiceResult};

#[derive(Clone, Debug)]
pub struct SaveRequest {
	pub candidate: CandidateLocation,
	/// Requested geofence radius; the configured default when absent. Either
	/// way the value is clamped into the configured bounds.
	pub geofence_radius_m: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct SaveResponse {
	pub saved: SavedLocation,
}

impl RoveService {
	/// Saves a search candidate as a tracked location. Rejected with
	/// `DuplicateLocation` when an existing entry lies within the configured
	/// duplicate distance; rejection mutates nothing.
	pub async fn save(&self, req: SaveRequest) -> ServiceResult<SaveResponse> {
		let radius = req.geofence_radius_m.unwrap_or(self.cfg.geofence.default_radius_m);
		let saved = {
			let _guard = self.lock_state().await;
			let mut locations = self.load_locations_strict().await?;

			if let Some(existing) = locations.iter().find(|existing| {
				existing.coordinate.distance_m(&req.candidate.coordinate)
					<= self.cfg.saved.duplicate_distance_m
			}) {
				return Err(ServiceError::DuplicateLocation { existing_id: existing.id });
			}

			let saved = SavedLocation::from_candidate(&req.candidate, radius, &self.cfg.geofence);

			locations.push(saved.clone());
			self.persist_locations(&locations).await?;

			saved
		};

		tracing::info!(location_id = %saved.id, name = %saved.name, "Saved location.");
		self.notifier().publish_saved_locations_changed();

		// Saving implies tracking intent. Hitting the region cap here is
		// ambient: the location is saved either way.
		match self.start_monitoring(&saved).await {
			Ok(()) => {},
			Err(ServiceError::CapacityExceeded { cap }) => {
				self.sink().report(EngineCondition::CapacityExceeded { cap });
			},
			Err(err) => return Err(err),
		}

		Ok(SaveResponse { saved })
	}

	/// Removes a saved location. A no-op (not an error) for an absent id.
	pub async fn delete(&self, location_id: Uuid) -> ServiceResult<()> {
		let removed = {
			let _guard = self.lock_state().await;
			let mut locations = self.load_locations_strict().await?;
			let before = locations.len();

			locations.retain(|location| location.id != location_id);

			if locations.len() == before {
				false
			} else {
				self.persist_locations(&locations).await?;

				true
			}
		};

		if !removed {
			return Ok(());
		}

		tracing::info!(location_id = %location_id, "Deleted location.");
		self.notifier().publish_saved_locations_changed();
		self.stop_monitoring(location_id).await?;

		Ok(())
	}

	/// All saved locations. A missing, unreadable, or corrupt blob degrades
	/// to an empty list; the failure is reported through the sink instead of
	/// being returned.
	pub async fn list_all(&self) -> Vec<SavedLocation> {
		let _guard = self.lock_state().await;

		self.load_locations_degraded().await
	}

	/// Appends a visit timestamp to a saved location's history. A no-op for
	/// an absent id.
	pub async fn record_visit(
		&self,
		location_id: Uuid,
		timestamp: OffsetDateTime,
	) -> ServiceResult<()> {
		let appended = {
			let _guard = self.lock_state().await;
			let mut locations = self.load_locations_strict().await?;
			let Some(location) =
				locations.iter_mut().find(|location| location.id == location_id)
			else {
				return Ok(());
			};

			location.visit_history.push(timestamp);
			self.persist_locations(&locations).await?;

			true
		};

		if appended {
			self.notifier().publish_saved_locations_changed();
		}

		Ok(())
	}

	/// Closed visit sessions, optionally filtered to one location. Degrades
	/// to empty on persistence failures, like [`list_all`](Self::list_all).
	pub async fn list_visits(&self, location_id: Option<Uuid>) -> Vec<VisitSession> {
		let sessions: Vec<VisitSession> = match self
			.load_collection_degraded(&self.cfg.saved.visits_key)
			.await
		{
			Some(sessions) => sessions,
			None => return Vec::new(),
		};

		match location_id {
			Some(id) => {
				sessions.into_iter().filter(|session| session.saved_location_id == id).collect()
			},
			None => sessions,
		}
	}

	pub(crate) async fn persist_closed_session(&self, session: &VisitSession) -> ServiceResult<()> {
		let mut sessions: Vec<VisitSession> = self
			.load_collection_degraded(&self.cfg.saved.visits_key)
			.await
			.unwrap_or_default();

		sessions.push(session.clone());

		let bytes = records::encode(&sessions)?;

		self.store().write_blob(&self.cfg.saved.visits_key, bytes).await?;

		Ok(())
	}

	/// Strict load for write paths: a corrupt blob is an error, not an empty
	/// list, so a failed decode can never silently clobber existing data.
	async fn load_locations_strict(&self) -> ServiceResult<Vec<SavedLocation>> {
		let Some(bytes) = self.store().read_blob(&self.cfg.saved.locations_key).await? else {
			return Ok(Vec::new());
		};

		Ok(records::decode(&bytes)?)
	}

	async fn load_locations_degraded(&self) -> Vec<SavedLocation> {
		self.load_collection_degraded(&self.cfg.saved.locations_key).await.unwrap_or_default()
	}

	async fn load_collection_degraded<T>(&self, key: &str) -> Option<Vec<T>>
	where
		T: serde::de::DeserializeOwned,
	{
		let bytes = match self.store().read_blob(key).await {
			Ok(Some(bytes)) => bytes,
			Ok(None) => return None,
			Err(err) => {
				self.sink()
					.report(EngineCondition::PersistenceFailure { message: err.to_string() });

				return None;
			},
		};

		match records::decode(&bytes) {
			Ok(records) => Some(records),
			Err(err) => {
				self.sink()
					.report(EngineCondition::PersistenceFailure { message: err.to_string() });

				None
			},
		}
	}

	async fn persist_locations(&self, locations: &[SavedLocation]) -> ServiceResult<()> {
		let bytes = records::encode(locations)?;

		self.store().write_blob(&self.cfg.saved.locations_key, bytes).await?;

		Ok(())
	}
}
