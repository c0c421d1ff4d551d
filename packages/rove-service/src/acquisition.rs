//! Authorization state machine and retry policy wrapping the position
//! provider. Raw fixes are gated on horizontal accuracy; provider failures
//! retry immediately up to a cap, then go quiet until a usable fix arrives.

use rove_domain::{AuthorizationState, Coordinate, PositionSample};

use crate::{EngineCondition, RoveService};

pub(crate) struct AcquisitionState {
	pub(crate) authorization: AuthorizationState,
	pub(crate) current_location: Option<Coordinate>,
	consecutive_failures: u32,
	rejected_samples: u64,
	denied_reported: bool,
	unavailable_reported: bool,
}

impl AcquisitionState {
	pub(crate) fn new() -> Self {
		Self {
			authorization: AuthorizationState::Undetermined,
			current_location: None,
			consecutive_failures: 0,
			rejected_samples: 0,
			denied_reported: false,
			unavailable_reported: false,
		}
	}
}

impl RoveService {
	/// Asks the provider for location authorization. The outcome arrives
	/// later as an `AuthorizationChanged` event.
	pub async fn request_permission(&self) -> crate::ServiceResult<()> {
		self.providers().position.request_authorization().await.map_err(|err| {
			tracing::warn!(error = %err, "request_authorization failed.");

			crate::ServiceError::LocationUnavailable
		})
	}

	/// Starts continuous acquisition when authorized; otherwise asks for
	/// authorization or surfaces the permission condition.
	pub async fn start_acquisition(&self) -> crate::ServiceResult<()> {
		let authorization = self.lock_state().await.acquisition.authorization;

		match authorization {
			AuthorizationState::Granted => {
				self.providers().position.start_updates().await.map_err(|err| {
					tracing::warn!(error = %err, "start_updates failed.");

					crate::ServiceError::LocationUnavailable
				})
			},
			AuthorizationState::Undetermined => self.request_permission().await,
			AuthorizationState::Denied | AuthorizationState::Restricted => {
				self.sink().report(EngineCondition::PermissionDenied {
					message: "Location access is required. Enable location services in settings."
						.to_string(),
				});

				Ok(())
			},
		}
	}

	/// The stabilized fix, if any sample has passed the accuracy gate.
	pub async fn current_location(&self) -> Option<Coordinate> {
		self.lock_state().await.acquisition.current_location
	}

	pub async fn authorization_state(&self) -> AuthorizationState {
		self.lock_state().await.acquisition.authorization
	}

	pub(crate) async fn handle_authorization_changed(&self, next: AuthorizationState) {
		{
			let mut state = self.lock_state().await;
			let acquisition = &mut state.acquisition;
			let was_blocked = acquisition.authorization.is_blocked();

			acquisition.authorization = next;

			if next.allows_acquisition() {
				acquisition.consecutive_failures = 0;
				acquisition.unavailable_reported = false;
			}
			if !next.is_blocked() {
				acquisition.denied_reported = false;
			}
			if next.is_blocked() && !was_blocked && !acquisition.denied_reported {
				acquisition.denied_reported = true;

				self.sink().report(EngineCondition::PermissionDenied {
					message: "Location access is required. Enable location services in settings."
						.to_string(),
				});
			}
		}

		self.notifier().publish_authorization(next);

		match next {
			AuthorizationState::Granted => {
				if let Err(err) = self.providers().position.start_updates().await {
					tracing::warn!(error = %err, "Failed to start updates after grant.");
				}
			},
			AuthorizationState::Denied | AuthorizationState::Restricted => {
				if let Err(err) = self.providers().position.stop_updates().await {
					tracing::warn!(error = %err, "Failed to stop updates after revocation.");
				}
			},
			AuthorizationState::Undetermined => {},
		}
	}

	pub(crate) async fn handle_position_updated(&self, sample: PositionSample) {
		let accepted = {
			let mut state = self.lock_state().await;
			let acquisition = &mut state.acquisition;

			if sample.meets_accuracy(self.cfg.location.accuracy_threshold_m) {
				acquisition.current_location = Some(sample.coordinate);
				acquisition.consecutive_failures = 0;
				acquisition.unavailable_reported = false;

				true
			} else {
				acquisition.rejected_samples += 1;

				tracing::debug!(
					accuracy_m = sample.horizontal_accuracy_m,
					rejected = acquisition.rejected_samples,
					"Rejected low-accuracy sample."
				);

				false
			}
		};

		if accepted {
			self.notifier().publish_location(sample.coordinate);
		}
	}

	pub(crate) async fn handle_update_failed(&self, reason: &str) {
		let retry = {
			let mut state = self.lock_state().await;
			let acquisition = &mut state.acquisition;

			acquisition.consecutive_failures += 1;

			if acquisition.consecutive_failures <= self.cfg.location.max_retries {
				true
			} else if !acquisition.unavailable_reported {
				acquisition.unavailable_reported = true;

				self.sink().report(EngineCondition::LocationUnavailable {
					message: format!(
						"Gave up after {} consecutive update failures: {reason}",
						acquisition.consecutive_failures - 1
					),
				});

				false
			} else {
				false
			}
		};

		if retry {
			tracing::info!(reason, "Retrying position updates after failure.");

			if let Err(err) = self.providers().position.start_updates().await {
				tracing::warn!(error = %err, "Retry start_updates failed.");
			}
		}
	}
}
