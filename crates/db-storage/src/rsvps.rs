//! The RSVP ledger: membership facts between users and events
//!
//! A row's existence is the whole fact. Adds and removes are idempotent,
//! the attendance count is read inside the caller's transaction so it is
//! always consistent with the mutation the caller just performed.
use crate::ids::EventId;
use crate::schema::rsvps;
use database::{DbConnection, Result};
use diesel::prelude::*;

/// Diesel RSVP struct
#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = rsvps, primary_key(user_email, event_id))]
pub struct Rsvp {
    pub user_email: String,
    pub event_id: EventId,
}

impl Rsvp {
    /// Deletes an RSVP entry by user email and event id
    ///
    /// Returns true if something was deleted. Removing a non-member is a
    /// no-op, not an error.
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(
        conn: &mut DbConnection,
        user_email: &str,
        event_id: EventId,
    ) -> Result<bool> {
        let lines_changed = diesel::delete(rsvps::table)
            .filter(
                rsvps::user_email
                    .eq(user_email)
                    .and(rsvps::event_id.eq(event_id)),
            )
            .execute(conn)?;

        Ok(lines_changed > 0)
    }

    /// Deletes all RSVPs of an event, part of the cancellation cascade
    #[tracing::instrument(err, skip_all)]
    pub fn delete_all_for_event(conn: &mut DbConnection, event_id: EventId) -> Result<()> {
        diesel::delete(rsvps::table)
            .filter(rsvps::event_id.eq(event_id))
            .execute(conn)?;

        Ok(())
    }

    /// Current attendance count of an event
    #[tracing::instrument(err, skip_all)]
    pub fn count_for_event(conn: &mut DbConnection, event_id: EventId) -> Result<i64> {
        let count = rsvps::table
            .filter(rsvps::event_id.eq(event_id))
            .count()
            .get_result(conn)?;

        Ok(count)
    }

    /// Ids of all events the given user is attending
    #[tracing::instrument(err, skip_all)]
    pub fn get_event_ids_for_user(
        conn: &mut DbConnection,
        user_email: &str,
    ) -> Result<Vec<EventId>> {
        let event_ids = rsvps::table
            .filter(rsvps::user_email.eq(user_email))
            .select(rsvps::event_id)
            .load(conn)?;

        Ok(event_ids)
    }
}

/// Diesel insertable RSVP struct
#[derive(Debug, Insertable)]
#[diesel(table_name = rsvps)]
pub struct NewRsvp {
    pub user_email: String,
    pub event_id: EventId,
}

impl NewRsvp {
    /// Tries to insert the RSVP into the database
    ///
    /// When yielding a unique key violation, None is returned. Two
    /// concurrent inserts of the same pair converge to exactly one row,
    /// neither caller sees an error.
    #[tracing::instrument(err, skip_all)]
    pub fn try_insert(self, conn: &mut DbConnection) -> Result<Option<Rsvp>> {
        let query = self.insert_into(rsvps::table);

        let result = query.get_result(conn);

        match result {
            Ok(rsvp) => Ok(Some(rsvp)),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                ..,
            )) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
