//! User related API structs and Endpoints
//!
//! The defined structs are exposed to the REST API and will be
//! serialized/deserialized. Similar structs are defined in the storage
//! crate for database operations.
use crate::api::v1::events::EventEntry;
use crate::api::v1::response::{ApiError, DefaultApiResult};
use crate::geocode::GeocodeClient;
use actix_web::web::{Data, Json, ReqData};
use actix_web::{get, patch};
use database::Db;
use db_storage::events::Event;
use db_storage::geo::METERS_PER_MILE;
use db_storage::users::{UpdateUserLocation, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Private user profile
///
/// Is only accessible to the user themself, used on */users/me* endpoints.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub make: String,
    pub model: String,
    pub city: Option<String>,
    /// Search radius in miles, absent until a location was saved
    pub radius: Option<i64>,
    /// Events the user is attending, soonest first
    pub events_attending: Vec<EventEntry>,
    /// Events the user has created, soonest first
    pub events_authored: Vec<EventEntry>,
}

/// API Endpoint *GET /users/me*
///
/// Returns the [`UserProfile`] of the requesting user together with the
/// events they attend and the events they host.
#[get("/users/me")]
pub async fn get_me(db: Data<Db>, current_user: ReqData<User>) -> DefaultApiResult<UserProfile> {
    let current_user = current_user.into_inner();

    let profile = crate::block(move || -> Result<UserProfile, ApiError> {
        let mut conn = db.get_conn()?;

        let attending = Event::get_attended_with_host(&mut conn, &current_user.email)?;
        let authored = Event::get_authored_with_host(&mut conn, &current_user.email)?;

        Ok(UserProfile {
            name: current_user.display_name,
            email: current_user.email,
            make: current_user.make,
            model: current_user.model,
            city: current_user.city,
            radius: current_user
                .radius_m
                .map(|radius_m| (radius_m / METERS_PER_MILE) as i64),
            events_attending: attending
                .into_iter()
                .map(|(event, host)| EventEntry::from_db(event, &host))
                .collect(),
            events_authored: authored
                .into_iter()
                .map(|(event, host)| EventEntry::from_db(event, &host))
                .collect(),
        })
    })
    .await??;

    Ok(Json(profile))
}

/// API request parameters to update the saved location
#[derive(Debug, Deserialize, Validate)]
pub struct PatchLocationBody {
    #[validate(length(min = 1, max = 255))]
    pub city: String,
    /// Search radius in miles
    #[validate(range(min = 1, max = 500))]
    pub radius: u32,
}

/// JSON body of the response coming from *PATCH /users/me/location*
#[derive(Debug, Serialize)]
pub struct LocationUpdated {
    pub message: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// API Endpoint *PATCH /users/me/location*
///
/// Resolves the given city through the geocoding collaborator and stores
/// the coordinates together with the search radius (converted to meters)
/// on the requesting user. A city the collaborator cannot resolve is a
/// `address_not_found` failure, a collaborator outage surfaces as 502.
#[patch("/users/me/location")]
pub async fn patch_location(
    db: Data<Db>,
    geocode: Data<GeocodeClient>,
    current_user: ReqData<User>,
    body: Json<PatchLocationBody>,
) -> DefaultApiResult<LocationUpdated> {
    let body = body.into_inner();

    body.validate()?;

    let (latitude, longitude) = geocode.resolve(&body.city).await?;

    let current_user = current_user.into_inner();

    let user = crate::block(move || -> Result<User, ApiError> {
        let mut conn = db.get_conn()?;

        let user = UpdateUserLocation {
            latitude,
            longitude,
            radius_m: body.radius as f64 * METERS_PER_MILE,
            city: body.city,
        }
        .apply(&mut conn, &current_user.email)?;

        Ok(user)
    })
    .await??;

    Ok(Json(LocationUpdated {
        message: "Location updated",
        latitude: user.latitude.unwrap_or(latitude),
        longitude: user.longitude.unwrap_or(longitude),
    }))
}
