//! RSVP toggle endpoint
use crate::api::v1::response::{ApiError, DefaultApiResult};
use actix_web::put;
use actix_web::web::{Data, Json, Path, ReqData};
use database::{DatabaseError, Db};
use db_storage::events::Event;
use db_storage::ids::EventId;
use db_storage::rsvps::{NewRsvp, Rsvp};
use db_storage::users::User;
use diesel::Connection;
use serde::{Deserialize, Serialize};

/// The JSON body expected when making a *PUT* request on
/// `/events/{event_id}/rsvp`
#[derive(Debug, Deserialize)]
pub struct PutRsvpBody {
    /// Desired attendance state
    pub attending: bool,
}

/// JSON body of the response: the attendance count after the toggle
#[derive(Debug, Serialize)]
pub struct RsvpCount {
    pub rsvp_count: i64,
}

/// API Endpoint *PUT /events/{event_id}/rsvp*
///
/// Sets the requesting user's attendance for an event to the desired
/// state. Both directions are idempotent: attending an event twice or
/// leaving one never joined is a no-op. Returns the attendance count read
/// within the same transaction as the toggle, so the count is always
/// consistent with the mutation just performed, also under concurrent
/// toggles from other sessions.
#[put("/events/{event_id}/rsvp")]
pub async fn set_rsvp(
    db: Data<Db>,
    id: Path<EventId>,
    current_user: ReqData<User>,
    body: Json<PutRsvpBody>,
) -> DefaultApiResult<RsvpCount> {
    let event_id = id.into_inner();
    let attending = body.into_inner().attending;
    let current_user = current_user.into_inner();

    let rsvp_count = crate::block(move || -> Result<i64, ApiError> {
        let mut conn = db.get_conn()?;

        let count = conn.transaction(|conn| -> Result<i64, DatabaseError> {
            let event = Event::get(conn, event_id)?;

            if attending {
                NewRsvp {
                    user_email: current_user.email.clone(),
                    event_id: event.id,
                }
                .try_insert(conn)?;
            } else {
                Rsvp::delete_by_id(conn, &current_user.email, event.id)?;
            }

            Rsvp::count_for_event(conn, event.id)
        })?;

        Ok(count)
    })
    .await??;

    Ok(Json(RsvpCount { rsvp_count }))
}
