use database::DatabaseError;
use diesel::Connection;
use pretty_assertions::assert_eq;
use rideout_db_storage::events::{AuthoredEvent, Event, NewAuthoredEvent};
use rideout_db_storage::rsvps::{NewRsvp, Rsvp};
use serial_test::serial;

mod common;

/// Cancelling an event removes its RSVPs and authorship records together
/// with the event row, in one transaction.
///
/// Needs a PostgreSQL instance reachable via DATABASE_URL.
#[tokio::test]
#[serial]
#[ignore]
async fn cancellation_leaves_no_dangling_references() {
    let db = common::setup_db().await;
    let mut conn = db.get_conn().unwrap();
    common::clear_tables(&mut conn);

    let host = common::make_user(&mut conn, "Alice");
    let guest = common::make_user(&mut conn, "Bob");

    let cancelled = common::make_event(&mut conn, &host, 40.0, -74.0, 12);
    let kept = common::make_event(&mut conn, &host, 40.0, -74.0, 14);

    for event in [&cancelled, &kept] {
        NewAuthoredEvent {
            user_email: host.email.clone(),
            event_id: event.id,
        }
        .insert(&mut conn)
        .unwrap();

        for user in [&host, &guest] {
            NewRsvp {
                user_email: user.email.clone(),
                event_id: event.id,
            }
            .try_insert(&mut conn)
            .unwrap();
        }
    }

    // the cancellation cascade as the delete endpoint runs it
    conn.transaction::<_, DatabaseError, _>(|conn| {
        Rsvp::delete_all_for_event(conn, cancelled.id)?;
        AuthoredEvent::delete_all_for_event(conn, cancelled.id)?;
        Event::delete_by_id(conn, cancelled.id)?;

        Ok(())
    })
    .unwrap();

    // no RSVP row references the cancelled event
    assert_eq!(Rsvp::count_for_event(&mut conn, cancelled.id).unwrap(), 0);
    assert_eq!(
        Rsvp::get_event_ids_for_user(&mut conn, &guest.email).unwrap(),
        vec![kept.id]
    );

    // no authored-event list references it either
    assert_eq!(
        AuthoredEvent::get_event_ids_for_user(&mut conn, &host.email).unwrap(),
        vec![kept.id]
    );

    // the untouched event survived
    assert!(Event::get(&mut conn, kept.id).is_ok());
    assert!(matches!(
        Event::get(&mut conn, cancelled.id),
        Err(DatabaseError::NotFound)
    ));
}
