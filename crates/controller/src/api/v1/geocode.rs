//! Geocoding proxy endpoints
//!
//! Thin passthroughs to the address geocoding and autocomplete
//! collaborators so the frontend never holds the upstream API key.
use crate::api::v1::response::DefaultApiResult;
use crate::geocode::GeocodeClient;
use actix_web::post;
use actix_web::web::{Data, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The JSON body expected when making a *POST* request on `/geocode`
#[derive(Debug, Deserialize, Validate)]
pub struct PostGeocodeBody {
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

/// Coordinates of a resolved address
#[derive(Debug, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// API Endpoint *POST /geocode*
///
/// Resolves a free-text address to coordinates.
#[post("/geocode")]
pub async fn geocode(
    client: Data<GeocodeClient>,
    body: Json<PostGeocodeBody>,
) -> DefaultApiResult<Coordinates> {
    body.validate()?;

    let (lat, lng) = client.resolve(&body.address).await?;

    Ok(Json(Coordinates { lat, lng }))
}

/// API Endpoint *POST /geocode/autocomplete*
///
/// Forwards the request body to the autocomplete collaborator and returns
/// its suggestions verbatim.
#[post("/geocode/autocomplete")]
pub async fn autocomplete(
    client: Data<GeocodeClient>,
    body: Json<serde_json::Value>,
) -> DefaultApiResult<serde_json::Value> {
    let suggestions = client.autocomplete(body.into_inner()).await?;

    Ok(Json(suggestions))
}
