use pretty_assertions::assert_eq;
use rideout_db_storage::events::Event;
use rideout_db_storage::geo::EARTH_RADIUS_M;
use rideout_db_storage::rsvps::NewRsvp;
use serial_test::serial;

mod common;

/// Needs a PostgreSQL instance reachable via DATABASE_URL.
#[tokio::test]
#[serial]
#[ignore]
async fn radius_boundary_is_inclusive() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");

    let radius = 80_467.0; // 50 miles
    // one event exactly on the radius boundary, one a meter beyond
    let on_boundary_lng = (radius / EARTH_RADIUS_M).to_degrees();
    let beyond_lng = ((radius + 1.0) / EARTH_RADIUS_M).to_degrees();

    let on_boundary = common::make_event(&mut conn, &host, 0.0, on_boundary_lng, 12);
    let _beyond = common::make_event(&mut conn, &host, 0.0, beyond_lng, 13);

    let nearby = Event::get_nearby(&mut conn, 0.0, 0.0, radius).unwrap();

    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].event.id, on_boundary.id);
}

#[tokio::test]
#[serial]
#[ignore]
async fn results_are_ordered_by_start_time() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");

    // inserted out of order on purpose
    let event2 = common::make_event(&mut conn, &host, 40.0, -74.0, 14);
    let event1 = common::make_event(&mut conn, &host, 40.0, -74.0, 10);
    let event3 = common::make_event(&mut conn, &host, 40.0, -74.0, 18);

    // equal start times fall back to insertion order
    let event4 = common::make_event(&mut conn, &host, 40.0, -74.0, 18);

    let nearby = Event::get_nearby(&mut conn, 40.0, -74.0, 10_000.0).unwrap();

    let ids: Vec<_> = nearby.iter().map(|n| n.event.id).collect();
    assert_eq!(ids, vec![event1.id, event2.id, event3.id, event4.id]);
}

#[tokio::test]
#[serial]
#[ignore]
async fn events_without_rsvps_appear_with_count_zero() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");
    let guest = common::make_user(&mut conn, "Bob");

    let attended = common::make_event(&mut conn, &host, 40.0, -74.0, 10);
    let deserted = common::make_event(&mut conn, &host, 40.0, -74.0, 14);

    NewRsvp {
        user_email: guest.email.clone(),
        event_id: attended.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    let nearby = Event::get_nearby(&mut conn, 40.0, -74.0, 10_000.0).unwrap();

    assert_eq!(nearby.len(), 2);
    assert_eq!(nearby[0].event.id, attended.id);
    assert_eq!(nearby[0].rsvp_count, 1);
    assert_eq!(nearby[0].host.display_name, "Alice");
    assert_eq!(nearby[1].event.id, deserted.id);
    assert_eq!(nearby[1].rsvp_count, 0);
}

/// The two-user scenario: A hosts an event, B lives ten miles away with a
/// fifty mile search radius and sees it with the host auto-attendance
/// counted.
#[tokio::test]
#[serial]
#[ignore]
async fn feed_scenario_with_two_users() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");
    let guest = common::make_user(&mut conn, "Bob");

    let event = common::make_event(&mut conn, &host, 40.0, -74.0, 12);
    NewRsvp {
        user_email: host.email.clone(),
        event_id: event.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    // B is roughly ten miles north of A, radius 50 miles
    let guest_lat = 40.0 + (10.0 * 1609.0 / 111_320.0);
    let radius_m = 50.0 * 1609.0;

    let nearby = Event::get_nearby(&mut conn, guest_lat, -74.0, radius_m).unwrap();
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].rsvp_count, 1);

    // B attends, the count becomes 2
    NewRsvp {
        user_email: guest.email.clone(),
        event_id: event.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    let nearby = Event::get_nearby(&mut conn, guest_lat, -74.0, radius_m).unwrap();
    assert_eq!(nearby[0].rsvp_count, 2);
}
