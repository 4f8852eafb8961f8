//! HTTP client for the address geocoding and autocomplete collaborators
//!
//! Both are treated as opaque upstream services: failures surface as a
//! generic upstream error and are never retried here.
use crate::settings;
use reqwest::Client;
use serde::Deserialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("the address could not be resolved")]
    NoMatch,
    #[error("geocoding service returned status {0}")]
    UpstreamStatus(reqwest::StatusCode),
}

/// Client for a Google-geocode-shaped address resolution API
pub struct GeocodeClient {
    client: Client,
    api_key: String,
    geocode_url: String,
    autocomplete_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GeocodeClient {
    pub fn new(settings: settings::Geocoding) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key,
            geocode_url: settings.geocode_url,
            autocomplete_url: settings.autocomplete_url,
        }
    }

    /// Resolves a free-text address to `(latitude, longitude)`.
    ///
    /// An address the upstream knows no coordinates for yields
    /// [`Error::NoMatch`].
    pub async fn resolve(&self, address: &str) -> Result<(f64, f64)> {
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus(response.status()));
        }

        let body: GeocodeResponse = response.json().await?;

        let first = body.results.into_iter().next().ok_or(Error::NoMatch)?;

        Ok((first.geometry.location.lat, first.geometry.location.lng))
    }

    /// Proxies an autocomplete request body to the places API and returns
    /// the upstream JSON verbatim.
    pub async fn autocomplete(&self, body: serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(&self.autocomplete_url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", "suggestions.placePrediction.text")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_geocode_response() {
        let json = r#"{
            "results": [
                { "geometry": { "location": { "lat": 40.7128, "lng": -74.006 } } },
                { "geometry": { "location": { "lat": 0.0, "lng": 0.0 } } }
            ],
            "status": "OK"
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        let first = response.results.into_iter().next().unwrap();

        assert_eq!(first.geometry.location.lat, 40.7128);
        assert_eq!(first.geometry.location.lng, -74.006);
    }

    #[test]
    fn empty_results_mean_no_match() {
        let json = r#"{ "results": [], "status": "ZERO_RESULTS" }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();

        assert!(response.results.is_empty());
    }
}
