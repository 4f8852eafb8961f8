use diesel::Connection;
use pretty_assertions::assert_eq;
use rideout_db_storage::rsvps::{NewRsvp, Rsvp};
use serial_test::serial;

mod common;

/// Attendance toggles are idempotent and the count read inside the same
/// transaction reflects the toggle that was just applied.
///
/// Needs a PostgreSQL instance reachable via DATABASE_URL.
#[tokio::test]
#[serial]
#[ignore]
async fn attend_is_idempotent() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");
    let attendee = common::make_user(&mut conn, "Bob");
    let event = common::make_event(&mut conn, &host, 40.0, -74.0, 12);

    // first attend inserts a row
    let inserted = NewRsvp {
        user_email: attendee.email.clone(),
        event_id: event.id,
    }
    .try_insert(&mut conn)
    .unwrap();
    assert!(inserted.is_some());
    assert_eq!(Rsvp::count_for_event(&mut conn, event.id).unwrap(), 1);

    // second attend of the same pair is a no-op, not an error
    let inserted = NewRsvp {
        user_email: attendee.email.clone(),
        event_id: event.id,
    }
    .try_insert(&mut conn)
    .unwrap();
    assert!(inserted.is_none());
    assert_eq!(Rsvp::count_for_event(&mut conn, event.id).unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore]
async fn unattend_of_non_member_is_a_noop() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");
    let outsider = common::make_user(&mut conn, "Mallory");
    let event = common::make_event(&mut conn, &host, 40.0, -74.0, 12);

    let existed = Rsvp::delete_by_id(&mut conn, &outsider.email, event.id).unwrap();

    assert!(!existed);
    assert_eq!(Rsvp::count_for_event(&mut conn, event.id).unwrap(), 0);
}

/// The toggle sequence of the host-and-guest scenario: the host attends
/// their own event, a guest toggles on and off again.
#[tokio::test]
#[serial]
#[ignore]
async fn toggle_sequence_keeps_count_consistent() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");
    let guest = common::make_user(&mut conn, "Bob");
    let event = common::make_event(&mut conn, &host, 40.0, -74.0, 12);

    // host auto-attends on creation
    NewRsvp {
        user_email: host.email.clone(),
        event_id: event.id,
    }
    .try_insert(&mut conn)
    .unwrap();

    // guest attends, count observed within the mutating transaction
    let count = conn
        .transaction(|conn| {
            NewRsvp {
                user_email: guest.email.clone(),
                event_id: event.id,
            }
            .try_insert(conn)?;

            Rsvp::count_for_event(conn, event.id)
        })
        .unwrap();
    assert_eq!(count, 2);

    // guest un-attends, count drops back
    let count = conn
        .transaction(|conn| {
            Rsvp::delete_by_id(conn, &guest.email, event.id)?;

            Rsvp::count_for_event(conn, event.id)
        })
        .unwrap();
    assert_eq!(count, 1);

    let going = Rsvp::get_event_ids_for_user(&mut conn, &host.email).unwrap();
    assert_eq!(going, vec![event.id]);
}
