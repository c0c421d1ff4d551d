use rove_domain::{AuthorizationState, Coordinate};
use rove_service::{EngineCondition, PositionEvent};
use rove_testkit::PositionCommand;

use super::{Harness, T0, sample};

#[tokio::test]
async fn denial_is_reported_once_per_transition() {
	let mut harness = Harness::new();
	let denied = PositionEvent::AuthorizationChanged(AuthorizationState::Denied);

	harness.service.apply_event(denied.clone(), T0).await;
	harness.service.apply_event(denied.clone(), T0).await;

	let first = harness.drain_conditions();

	assert_eq!(
		first.iter().filter(|c| matches!(c, EngineCondition::PermissionDenied { .. })).count(),
		1
	);

	// A fresh grant re-arms the report for the next revocation.
	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Granted), T0)
		.await;
	harness.service.apply_event(denied, T0).await;

	let second = harness.drain_conditions();

	assert_eq!(
		second.iter().filter(|c| matches!(c, EngineCondition::PermissionDenied { .. })).count(),
		1
	);
}

#[tokio::test]
async fn start_acquisition_while_denied_reports_instead_of_failing() {
	let mut harness = Harness::new();

	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Denied), T0)
		.await;
	harness.drain_conditions();

	harness.service.start_acquisition().await.expect("start_acquisition failed.");

	let conditions = harness.drain_conditions();

	assert!(conditions.iter().any(|c| matches!(c, EngineCondition::PermissionDenied { .. })));
	assert_eq!(harness.position.count_of(&PositionCommand::StartUpdates), 0);
}

#[tokio::test]
async fn grant_starts_updates_and_revocation_stops_them() {
	let harness = Harness::new();

	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Granted), T0)
		.await;

	assert_eq!(harness.position.count_of(&PositionCommand::StartUpdates), 1);

	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Restricted), T0)
		.await;

	assert_eq!(harness.position.count_of(&PositionCommand::StopUpdates), 1);
}

#[tokio::test]
async fn low_accuracy_samples_never_become_the_current_location() {
	let harness = Harness::new();
	let coordinate = Coordinate::new(40.0, -73.0);

	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Granted), T0)
		.await;
	harness
		.service
		.apply_event(PositionEvent::PositionUpdated(sample(coordinate, 150.0)), T0)
		.await;

	assert_eq!(harness.service.current_location().await, None);

	// The gate is inclusive at the threshold.
	harness
		.service
		.apply_event(PositionEvent::PositionUpdated(sample(coordinate, 100.0)), T0)
		.await;

	assert_eq!(harness.service.current_location().await, Some(coordinate));
}

#[tokio::test]
async fn update_failures_retry_up_to_the_cap_then_report_once() {
	let mut harness = Harness::new();

	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Granted), T0)
		.await;

	let baseline = harness.position.count_of(&PositionCommand::StartUpdates);

	for _ in 0..3 {
		harness
			.service
			.apply_event(PositionEvent::UpdateFailed { reason: "No signal.".to_string() }, T0)
			.await;
	}

	// Three failures, three immediate retries, nothing reported yet.
	assert_eq!(harness.position.count_of(&PositionCommand::StartUpdates), baseline + 3);
	assert!(harness.drain_conditions().is_empty());

	harness
		.service
		.apply_event(PositionEvent::UpdateFailed { reason: "No signal.".to_string() }, T0)
		.await;
	harness
		.service
		.apply_event(PositionEvent::UpdateFailed { reason: "No signal.".to_string() }, T0)
		.await;

	let conditions = harness.drain_conditions();

	assert_eq!(
		conditions
			.iter()
			.filter(|c| matches!(c, EngineCondition::LocationUnavailable { .. }))
			.count(),
		1
	);
	assert_eq!(harness.position.count_of(&PositionCommand::StartUpdates), baseline + 3);
}

#[tokio::test]
async fn an_accurate_fix_rearms_the_retry_budget() {
	let mut harness = Harness::new();
	let coordinate = Coordinate::new(40.0, -73.0);

	harness
		.service
		.apply_event(PositionEvent::AuthorizationChanged(AuthorizationState::Granted), T0)
		.await;

	for _ in 0..4 {
		harness
			.service
			.apply_event(PositionEvent::UpdateFailed { reason: "No signal.".to_string() }, T0)
			.await;
	}

	harness.drain_conditions();
	harness
		.service
		.apply_event(PositionEvent::PositionUpdated(sample(coordinate, 10.0)), T0)
		.await;

	for _ in 0..4 {
		harness
			.service
			.apply_event(PositionEvent::UpdateFailed { reason: "No signal.".to_string() }, T0)
			.await;
	}

	let conditions = harness.drain_conditions();

	assert_eq!(
		conditions
			.iter()
			.filter(|c| matches!(c, EngineCondition::LocationUnavailable { .. }))
			.count(),
		1
	);
}
