use rove_service::{EngineCondition, ServiceError};
use rove_testkit::PositionCommand;

use super::Harness;

#[tokio::test]
async fn the_region_cap_rejects_the_twenty_first_registration() {
	let mut harness = Harness::new();

	// Spaced ~1.1 km apart so none trips the duplicate check.
	for i in 0..20 {
		harness.save_named(&format!("Gym {i}"), 40.0 + f64::from(i) * 0.01, -73.0).await;
	}

	assert_eq!(harness.service.monitored_count().await, 20);
	assert!(harness.drain_conditions().is_empty());

	// The save itself succeeds; only the geofence registration is refused.
	let overflow = harness.save_named("Gym 20", 40.0 + 20.0 * 0.01, -73.0).await;

	assert_eq!(harness.service.list_all().await.len(), 21);
	assert_eq!(harness.service.monitored_count().await, 20);
	assert!(!harness.service.is_monitoring(overflow.id).await);
	assert!(
		harness
			.drain_conditions()
			.iter()
			.any(|c| matches!(c, EngineCondition::CapacityExceeded { cap: 20 }))
	);
}

#[tokio::test]
async fn direct_registration_past_the_cap_is_an_error() {
	let mut cfg = rove_testkit::test_config();

	cfg.geofence.region_cap = 1;

	let harness = Harness::with_config(cfg);
	let first = harness.save_named("Gym 0", 40.0, -73.0).await;
	let second = harness.save_named("Gym 1", 40.1, -73.0).await;
	let result = harness.service.start_monitoring(&second).await;

	assert!(matches!(result, Err(ServiceError::CapacityExceeded { cap: 1 })));
	assert!(harness.service.is_monitoring(first.id).await);
	assert!(!harness.service.is_monitoring(second.id).await);
}

#[tokio::test]
async fn registering_a_tracked_location_again_is_a_no_op() {
	let harness = Harness::new();
	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;

	harness.service.start_monitoring(&saved).await.expect("Re-registration failed.");

	assert_eq!(harness.position.count_of(&PositionCommand::Monitor(saved.id)), 1);
	assert_eq!(harness.service.monitored_count().await, 1);
}

#[tokio::test]
async fn a_failed_provider_registration_keeps_the_location_tracked() {
	let mut harness = Harness::new();

	harness.position.set_fail_monitor(true);

	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;

	assert!(harness.service.is_monitoring(saved.id).await);
	assert!(
		harness
			.drain_conditions()
			.iter()
			.any(|c| matches!(c, EngineCondition::MonitoringFailure { .. }))
	);
}

#[tokio::test]
async fn restart_reissues_registrations_without_changing_the_set() {
	let harness = Harness::new();
	let first = harness.save_named("Gym A", 40.0, -73.0).await;
	let second = harness.save_named("Gym B", 40.1, -73.0).await;

	harness.service.restart_monitoring().await.expect("Restart failed.");

	assert_eq!(harness.service.monitored_count().await, 2);

	for id in [first.id, second.id] {
		assert_eq!(harness.position.count_of(&PositionCommand::StopMonitoring(id)), 1);
		assert_eq!(harness.position.count_of(&PositionCommand::Monitor(id)), 2);
	}
}

#[tokio::test]
async fn stop_all_clears_every_registration() {
	let harness = Harness::new();

	harness.save_named("Gym A", 40.0, -73.0).await;
	harness.save_named("Gym B", 40.1, -73.0).await;
	harness.service.stop_all_monitoring().await.expect("Stop failed.");

	assert_eq!(harness.service.monitored_count().await, 0);
	assert_eq!(
		harness
			.position
			.commands()
			.iter()
			.filter(|c| matches!(c, PositionCommand::StopMonitoring(_)))
			.count(),
		2
	);
}
