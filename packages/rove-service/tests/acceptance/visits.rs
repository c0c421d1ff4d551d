use time::Duration;
use uuid::Uuid;

use rove_service::PositionEvent;

use super::{Harness, T0};

#[tokio::test]
async fn entry_and_exit_bound_one_recorded_visit() {
	let harness = Harness::new();
	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;
	let mut started = harness.service.notifier().subscribe_visit_started();
	let mut ended = harness.service.notifier().subscribe_visit_ended();

	harness
		.service
		.apply_event(PositionEvent::RegionEntered { region_id: saved.id }, T0)
		.await;

	let open = harness.service.current_visit().await.expect("No open visit.");

	assert!(open.is_active());
	assert_eq!(open.saved_location_id, saved.id);
	assert_eq!(started.try_recv().expect("No start notification.").id, open.id);

	let exit_at = T0 + Duration::seconds(1_800);

	harness
		.service
		.apply_event(PositionEvent::RegionExited { region_id: saved.id }, exit_at)
		.await;

	assert_eq!(harness.service.current_visit().await, None);

	let closed = ended.try_recv().expect("No end notification.");

	assert_eq!(closed.duration(), Some(Duration::seconds(1_800)));

	let history = harness.service.list_visits(Some(saved.id)).await;

	assert_eq!(history.len(), 1);
	assert_eq!(history[0].duration(), Some(Duration::seconds(1_800)));

	// The owning location's history gains the exit timestamp.
	let locations = harness.service.list_all().await;

	assert_eq!(locations[0].visit_history, vec![exit_at]);
}

#[tokio::test]
async fn a_repeated_entry_does_not_reopen_the_session() {
	let harness = Harness::new();
	let saved = harness.save_named("Iron Temple", 40.0, -73.0).await;
	let mut started = harness.service.notifier().subscribe_visit_started();

	harness
		.service
		.apply_event(PositionEvent::RegionEntered { region_id: saved.id }, T0)
		.await;
	harness
		.service
		.apply_event(
			PositionEvent::RegionEntered { region_id: saved.id },
			T0 + Duration::seconds(60),
		)
		.await;

	let open = harness.service.current_visit().await.expect("No open visit.");

	assert_eq!(open.start_time, T0);
	assert!(started.try_recv().is_ok());
	assert!(started.try_recv().is_err());
}

#[tokio::test]
async fn an_entry_for_an_untracked_region_is_ignored() {
	let harness = Harness::new();

	harness
		.service
		.apply_event(PositionEvent::RegionEntered { region_id: Uuid::new_v4() }, T0)
		.await;

	assert_eq!(harness.service.current_visit().await, None);
}

#[tokio::test]
async fn an_exit_for_a_different_region_leaves_the_session_open() {
	let harness = Harness::new();
	let visited = harness.save_named("Gym A", 40.0, -73.0).await;
	let other = harness.save_named("Gym B", 40.1, -73.0).await;

	harness
		.service
		.apply_event(PositionEvent::RegionEntered { region_id: visited.id }, T0)
		.await;
	harness
		.service
		.apply_event(
			PositionEvent::RegionExited { region_id: other.id },
			T0 + Duration::seconds(60),
		)
		.await;

	let open = harness.service.current_visit().await.expect("Session was closed.");

	assert_eq!(open.saved_location_id, visited.id);
	assert!(harness.service.list_visits(None).await.is_empty());
}

#[tokio::test]
async fn visit_histories_accumulate_per_location() {
	let harness = Harness::new();
	let first = harness.save_named("Gym A", 40.0, -73.0).await;
	let second = harness.save_named("Gym B", 40.1, -73.0).await;

	for (location, offset) in [(&first, 0), (&second, 3_600), (&first, 7_200)] {
		let entered = T0 + Duration::seconds(offset);

		harness
			.service
			.apply_event(PositionEvent::RegionEntered { region_id: location.id }, entered)
			.await;
		harness
			.service
			.apply_event(
				PositionEvent::RegionExited { region_id: location.id },
				entered + Duration::seconds(900),
			)
			.await;
	}

	assert_eq!(harness.service.list_visits(None).await.len(), 3);
	assert_eq!(harness.service.list_visits(Some(first.id)).await.len(), 2);
	assert_eq!(harness.service.list_visits(Some(second.id)).await.len(), 1);
}
