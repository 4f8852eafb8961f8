//! Release news endpoint
use actix_web::get;
use actix_web::web::Json;
use serde::Serialize;

/// A single news entry shown on the landing page
#[derive(Debug, Clone, Serialize)]
pub struct NewsEntry {
    pub title: &'static str,
    pub date: &'static str,
    pub content: &'static str,
}

/// API Endpoint *GET /news*
///
/// Returns the static list of product updates. Public, no session needed.
#[get("/news")]
pub async fn news() -> Json<Vec<NewsEntry>> {
    Json(vec![NewsEntry {
        title: "Rideout V1.0 Launch",
        date: "2026-05-01",
        content: "Welcome to the first release of Rideout, a platform for riders \
                  to schedule and find group meets and rides nearby. Create an \
                  event, RSVP to one, and see who else is going. More features \
                  are on the way, stay tuned!",
    }])
}
