use rove_service::{EngineCondition, PositionEvent, SaveRequest, ServiceError};

use super::{Harness, T0, candidate};

#[tokio::test]
async fn a_corrupt_locations_blob_degrades_reads_to_empty() {
	let mut harness = Harness::new();

	harness.store.insert_raw("saved_locations", b"{ not json".to_vec());

	assert!(harness.service.list_all().await.is_empty());
	assert!(
		harness
			.drain_conditions()
			.iter()
			.any(|c| matches!(c, EngineCondition::PersistenceFailure { .. }))
	);
}

#[tokio::test]
async fn a_corrupt_locations_blob_blocks_writes_instead_of_clobbering() {
	let harness = Harness::new();
	let corrupt = b"{ not json".to_vec();

	harness.store.insert_raw("saved_locations", corrupt.clone());

	let result = harness
		.service
		.save(SaveRequest { candidate: candidate("Iron Temple", 40.0, -73.0), geofence_radius_m: None })
		.await;

	assert!(matches!(result, Err(ServiceError::Persistence { .. })));
	assert_eq!(harness.store.bytes("saved_locations"), Some(corrupt));
}

#[tokio::test]
async fn unreadable_storage_degrades_reads_and_reports() {
	let mut harness = Harness::new();

	harness.save_named("Iron Temple", 40.0, -73.0).await;
	harness.store.set_fail_reads(true);

	assert!(harness.service.list_all().await.is_empty());
	assert!(harness.service.list_visits(None).await.is_empty());
	assert!(
		harness
			.drain_conditions()
			.iter()
			.any(|c| matches!(c, EngineCondition::PersistenceFailure { .. }))
	);
}

#[tokio::test]
async fn a_corrupt_visit_blob_is_replaced_when_the_next_visit_closes() {
	let mut harness = Harness::new();
	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;

	harness.store.insert_raw("visit_history", b"garbage".to_vec());
	harness
		.service
		.apply_event(PositionEvent::RegionEntered { region_id: saved.id }, T0)
		.await;
	harness
		.service
		.apply_event(
			PositionEvent::RegionExited { region_id: saved.id },
			T0 + time::Duration::seconds(600),
		)
		.await;

	// The unreadable history is reported and restarted from this session.
	assert!(
		harness
			.drain_conditions()
			.iter()
			.any(|c| matches!(c, EngineCondition::PersistenceFailure { .. }))
	);
	assert_eq!(harness.service.list_visits(None).await.len(), 1);
}

#[tokio::test]
async fn a_failed_visit_write_never_undoes_the_session_close() {
	let mut harness = Harness::new();
	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;

	harness
		.service
		.apply_event(PositionEvent::RegionEntered { region_id: saved.id }, T0)
		.await;
	harness.store.set_fail_writes(true);
	harness
		.service
		.apply_event(
			PositionEvent::RegionExited { region_id: saved.id },
			T0 + time::Duration::seconds(600),
		)
		.await;

	assert_eq!(harness.service.current_visit().await, None);
	assert!(
		harness
			.drain_conditions()
			.iter()
			.any(|c| matches!(c, EngineCondition::PersistenceFailure { .. }))
	);
}

#[tokio::test]
async fn saved_locations_survive_a_service_restart() {
	let harness = Harness::new();
	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;

	// A second engine over the same store sees the same records.
	let providers = rove_service::Providers::new(harness.poi.clone(), harness.position.clone());
	let revived = rove_service::RoveService::new(
		rove_testkit::test_config(),
		harness.store.clone(),
		providers,
		rove_service::ErrorSink::new(),
	);
	let listed = revived.list_all().await;

	assert_eq!(listed, vec![saved]);
}
