//! Event related API structs and Endpoints
//!
//! The defined structs are exposed to the REST API and will be
//! serialized/deserialized. Similar structs are defined in the storage
//! crate for database operations.
use crate::api::v1::response::{ApiError, DefaultApiResult, NoContent};
use actix_web::web::{Data, Json, Path, ReqData};
use actix_web::{delete, get, patch, post};
use chrono::{DateTime, Utc};
use database::{DatabaseError, Db};
use db_storage::events::{
    AuthoredEvent, Event, NearbyEvent, NewAuthoredEvent, NewEvent, UpdateEvent,
};
use db_storage::geo::METERS_PER_MILE;
use db_storage::ids::EventId;
use db_storage::rsvps::{NewRsvp, Rsvp};
use db_storage::users::User;
use diesel::Connection;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub mod rsvps;

/// Event representation returned by listings
#[derive(Debug, Serialize)]
pub struct EventEntry {
    pub id: EventId,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub host_email: String,
    /// Display name of the hosting user
    pub host_name: String,
}

impl EventEntry {
    pub fn from_db(event: Event, host: &User) -> Self {
        Self {
            id: event.id,
            name: event.name,
            starts_at: event.starts_at,
            location: event.location,
            latitude: event.latitude,
            longitude: event.longitude,
            description: event.description,
            host_email: event.host_email,
            host_name: host.display_name.clone(),
        }
    }
}

/// Entry of the nearby-event listing, an [`EventEntry`] annotated with the
/// live attendance count and the distance from the requesting user
#[derive(Debug, Serialize)]
pub struct NearbyEventEntry {
    #[serde(flatten)]
    pub event: EventEntry,
    pub rsvp_count: i64,
    pub distance_m: f64,
}

impl NearbyEventEntry {
    fn from_db(nearby: NearbyEvent) -> Self {
        let NearbyEvent {
            event,
            host,
            rsvp_count,
            distance_m,
        } = nearby;

        Self {
            event: EventEntry::from_db(event, &host),
            rsvp_count,
            distance_m,
        }
    }
}

/// The home feed: the requesting user's saved location plus every event in
/// its search radius
#[derive(Debug, Serialize)]
pub struct HomeFeed {
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    /// Search radius in miles, as entered by the user
    pub radius: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub events: Vec<NearbyEventEntry>,
    /// Ids of the events the requesting user is attending
    pub events_going: Vec<EventId>,
}

/// API Endpoint *GET /events*
///
/// Returns the [`HomeFeed`] for the requesting user: all events within the
/// user's search radius around their saved location, soonest first, each
/// annotated with host name and live RSVP count. Events nobody attends are
/// included with a count of 0.
///
/// Fails with `no_location` if the user has not saved a location yet.
#[get("/events")]
pub async fn get_events(db: Data<Db>, current_user: ReqData<User>) -> DefaultApiResult<HomeFeed> {
    let current_user = current_user.into_inner();

    let feed = crate::block(move || -> Result<HomeFeed, ApiError> {
        let mut conn = db.get_conn()?;

        let location = current_user.saved_location().ok_or_else(|| {
            ApiError::not_found()
                .with_code("no_location")
                .with_message("No saved location, set a location first")
        })?;

        let nearby = Event::get_nearby(
            &mut conn,
            location.latitude,
            location.longitude,
            location.radius_m,
        )?;

        let events_going = Rsvp::get_event_ids_for_user(&mut conn, &current_user.email)?;

        Ok(HomeFeed {
            name: current_user.display_name,
            email: current_user.email,
            city: current_user.city,
            radius: (location.radius_m / METERS_PER_MILE) as i64,
            latitude: location.latitude,
            longitude: location.longitude,
            events: nearby.into_iter().map(NearbyEventEntry::from_db).collect(),
            events_going,
        })
    })
    .await??;

    Ok(Json(feed))
}

/// API request parameters to create or overwrite an event
#[derive(Debug, Deserialize, Validate)]
pub struct EventBody {
    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub name: String,
    pub starts_at: DateTime<Utc>,
    #[validate(length(max = 255))]
    pub location: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
}

fn validate_not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank_name"));
    }

    Ok(())
}

/// JSON body of the response coming from the *POST* request on `/events`
#[derive(Debug, Serialize)]
pub struct EventCreated {
    pub event_id: EventId,
}

/// API Endpoint *POST /events*
///
/// Creates a new event hosted by the requesting user. The event row, the
/// authorship record and the host's own RSVP are inserted in one
/// transaction; the host always attends their own event.
#[post("/events")]
pub async fn new_event(
    db: Data<Db>,
    current_user: ReqData<User>,
    body: Json<EventBody>,
) -> DefaultApiResult<EventCreated> {
    let body = body.into_inner();

    body.validate()?;

    let current_user = current_user.into_inner();

    let event = crate::block(move || -> Result<Event, ApiError> {
        let mut conn = db.get_conn()?;

        let event = conn.transaction(|conn| -> Result<Event, DatabaseError> {
            let event = NewEvent {
                id: EventId::generate(),
                name: body.name,
                starts_at: body.starts_at,
                location: body.location,
                latitude: body.latitude,
                longitude: body.longitude,
                description: body.description,
                host_email: current_user.email.clone(),
            }
            .insert(conn)?;

            NewAuthoredEvent {
                user_email: current_user.email.clone(),
                event_id: event.id,
            }
            .insert(conn)?;

            NewRsvp {
                user_email: current_user.email.clone(),
                event_id: event.id,
            }
            .try_insert(conn)?;

            Ok(event)
        })?;

        Ok(event)
    })
    .await??;

    log::debug!("Created event {}", event.id);

    Ok(Json(EventCreated { event_id: event.id }))
}

/// JSON body confirming a mutation
#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub message: &'static str,
}

/// API Endpoint *PATCH /events/{event_id}*
///
/// Overwrites the full field set of an event.
#[patch("/events/{event_id}")]
pub async fn patch_event(
    db: Data<Db>,
    id: Path<EventId>,
    _current_user: ReqData<User>,
    body: Json<EventBody>,
) -> DefaultApiResult<Confirmation> {
    let event_id = id.into_inner();
    let body = body.into_inner();

    body.validate()?;

    crate::block(move || -> Result<Event, ApiError> {
        let mut conn = db.get_conn()?;

        let event = UpdateEvent {
            name: body.name,
            starts_at: body.starts_at,
            location: body.location,
            latitude: body.latitude,
            longitude: body.longitude,
            description: body.description,
        }
        .apply(&mut conn, event_id)?;

        Ok(event)
    })
    .await??;

    Ok(Json(Confirmation {
        message: "Event updated",
    }))
}

/// API Endpoint *DELETE /events/{event_id}*
///
/// Cancels an event. RSVPs, authorship records and the event row are
/// removed in one transaction, a failure in any step rolls back the whole
/// cancellation.
#[delete("/events/{event_id}")]
pub async fn delete_event(
    db: Data<Db>,
    id: Path<EventId>,
    _current_user: ReqData<User>,
) -> Result<NoContent, ApiError> {
    let event_id = id.into_inner();

    crate::block(move || -> Result<(), ApiError> {
        let mut conn = db.get_conn()?;

        conn.transaction(|conn| -> Result<(), DatabaseError> {
            let event = Event::get(conn, event_id)?;

            Rsvp::delete_all_for_event(conn, event.id)?;
            AuthoredEvent::delete_all_for_event(conn, event.id)?;
            Event::delete_by_id(conn, event.id)?;

            Ok(())
        })?;

        Ok(())
    })
    .await??;

    Ok(NoContent)
}
