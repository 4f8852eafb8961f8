//! Contains the event specific database structs and queries
//!
//! Also home to the authored-event records (one row per event a user has
//! created, shaped like the RSVP table) and the radius-bounded nearby-event
//! query used by the home feed.
use crate::geo;
use crate::ids::EventId;
use crate::rsvps::Rsvp;
use crate::schema::{authored_events, events, rsvps, users};
use crate::users::User;
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::collections::HashMap;

/// Diesel event struct
///
/// Is used as a result in various queries. Represents an event row
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: EventId,
    pub id_serial: i64,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub host_email: String,
}

impl Event {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let event = events::table.filter(events::id.eq(event_id)).first(conn)?;

        Ok(event)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(conn: &mut DbConnection, event_id: EventId) -> Result<()> {
        diesel::delete(events::table)
            .filter(events::id.eq(event_id))
            .execute(conn)?;

        Ok(())
    }

    /// Returns all events the given user has authored, soonest first,
    /// together with the host row (the user itself, kept for a uniform
    /// listing shape).
    #[tracing::instrument(err, skip_all)]
    pub fn get_authored_with_host(
        conn: &mut DbConnection,
        user_email: &str,
    ) -> Result<Vec<(Event, User)>> {
        let event_ids = AuthoredEvent::get_event_ids_for_user(conn, user_email)?;

        Self::get_by_ids_with_host(conn, event_ids)
    }

    /// Returns all events the given user is attending, soonest first,
    /// together with the host row.
    #[tracing::instrument(err, skip_all)]
    pub fn get_attended_with_host(
        conn: &mut DbConnection,
        user_email: &str,
    ) -> Result<Vec<(Event, User)>> {
        let event_ids: Vec<EventId> = Rsvp::get_event_ids_for_user(conn, user_email)?;

        Self::get_by_ids_with_host(conn, event_ids)
    }

    fn get_by_ids_with_host(
        conn: &mut DbConnection,
        event_ids: Vec<EventId>,
    ) -> Result<Vec<(Event, User)>> {
        let query = events::table
            .inner_join(users::table)
            .filter(events::id.eq_any(event_ids))
            .order_by(events::starts_at.asc())
            .then_order_by(events::id_serial.asc());

        let events_with_host = query.load(conn)?;

        Ok(events_with_host)
    }

    /// Returns every event within `radius_m` meters of the origin point,
    /// soonest first (insertion order on equal times), annotated with the
    /// host row, the live RSVP count and the computed distance.
    ///
    /// The radius bound is inclusive. Events without any RSVP are part of
    /// the result with a count of 0.
    #[tracing::instrument(err, skip_all)]
    pub fn get_nearby(
        conn: &mut DbConnection,
        origin_lat: f64,
        origin_lng: f64,
        radius_m: f64,
    ) -> Result<Vec<NearbyEvent>> {
        // Coarse latitude band in SQL, exact great-circle check below.
        let (lat_min, lat_max) = geo::latitude_band(origin_lat, radius_m);

        let candidates: Vec<(Event, User)> = events::table
            .inner_join(users::table)
            .filter(events::latitude.between(lat_min, lat_max))
            .order_by(events::starts_at.asc())
            .then_order_by(events::id_serial.asc())
            .load(conn)?;

        let within_radius: Vec<(Event, User, f64)> = candidates
            .into_iter()
            .filter_map(|(event, host)| {
                let distance_m = geo::haversine_distance_m(
                    (origin_lat, origin_lng),
                    (event.latitude, event.longitude),
                );

                (distance_m <= radius_m).then_some((event, host, distance_m))
            })
            .collect();

        let event_ids: Vec<EventId> = within_radius.iter().map(|(event, ..)| event.id).collect();

        let rsvp_counts: HashMap<EventId, i64> = rsvps::table
            .filter(rsvps::event_id.eq_any(event_ids))
            .group_by(rsvps::event_id)
            .select((rsvps::event_id, count_star()))
            .load::<(EventId, i64)>(conn)?
            .into_iter()
            .collect();

        let nearby = within_radius
            .into_iter()
            .map(|(event, host, distance_m)| NearbyEvent {
                rsvp_count: rsvp_counts.get(&event.id).copied().unwrap_or(0),
                event,
                host,
                distance_m,
            })
            .collect();

        Ok(nearby)
    }
}

/// A single entry of the nearby-event listing
#[derive(Debug)]
pub struct NearbyEvent {
    pub event: Event,
    pub host: User,
    pub rsvp_count: i64,
    pub distance_m: f64,
}

/// Diesel insertable event struct
///
/// Represents fields that have to be provided on event insertion.
#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub id: EventId,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub host_email: String,
}

impl NewEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<Event> {
        let query = self.insert_into(events::table);

        let event = query.get_result(conn)?;

        Ok(event)
    }
}

/// Diesel event struct for updates
///
/// Every field is overwritten, an update is a full-record replace.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = events)]
pub struct UpdateEvent {
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
}

impl UpdateEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let query = diesel::update(events::table)
            .filter(events::id.eq(event_id))
            .set(self)
            .returning(events::all_columns);

        let event = query.get_result(conn)?;

        Ok(event)
    }
}

/// Authorship record, one row per event a user has created
///
/// Mirrors the shape of the RSVP table so event cancellation is a scoped
/// delete keyed by the event id.
#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = authored_events, primary_key(user_email, event_id))]
pub struct AuthoredEvent {
    pub user_email: String,
    pub event_id: EventId,
}

impl AuthoredEvent {
    /// Deletes the authorship records of an event, part of the
    /// cancellation cascade
    #[tracing::instrument(err, skip_all)]
    pub fn delete_all_for_event(conn: &mut DbConnection, event_id: EventId) -> Result<()> {
        diesel::delete(authored_events::table)
            .filter(authored_events::event_id.eq(event_id))
            .execute(conn)?;

        Ok(())
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get_event_ids_for_user(
        conn: &mut DbConnection,
        user_email: &str,
    ) -> Result<Vec<EventId>> {
        let event_ids = authored_events::table
            .filter(authored_events::user_email.eq(user_email))
            .select(authored_events::event_id)
            .load(conn)?;

        Ok(event_ids)
    }
}

/// Diesel insertable authorship record
#[derive(Debug, Insertable)]
#[diesel(table_name = authored_events)]
pub struct NewAuthoredEvent {
    pub user_email: String,
    pub event_id: EventId,
}

impl NewAuthoredEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<AuthoredEvent> {
        let query = self.insert_into(authored_events::table);

        let authored_event = query.get_result(conn)?;

        Ok(authored_event)
    }
}
