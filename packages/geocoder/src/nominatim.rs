//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance. This client does no pacing of its own; wrap it in
//! a [`ThrottledResolver`](crate::throttle::ThrottledResolver).
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use async_trait::async_trait;
use pothole_admin_pothole_models::Coordinates;

use crate::{GeocodeError, RoadResolver};

/// Address keys checked for a road name, most specific first.
const ROAD_KEYS: &[&str] = &[
    "road",
    "pedestrian",
    "footway",
    "highway",
    "street",
    "path",
    "cycleway",
];

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
pub struct NominatimReverse {
    client: reqwest::Client,
    base_url: String,
    zoom: u8,
}

impl NominatimReverse {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String, zoom: u8) -> Self {
        Self {
            client,
            base_url,
            zoom,
        }
    }
}

#[async_trait]
impl RoadResolver for NominatimReverse {
    fn id(&self) -> &str {
        "nominatim"
    }

    async fn road_name(&self, coords: Coordinates) -> Result<Option<String>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("zoom", self.zoom.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim `jsonv2` reverse response.
fn parse_response(body: &serde_json::Value) -> Result<Option<String>, GeocodeError> {
    if !body.is_object() {
        return Err(GeocodeError::Parse {
            message: "Nominatim response is not an object".to_string(),
        });
    }

    // Nominatim reports "Unable to geocode" as a 200 with an error field.
    if let Some(error) = body.get("error").and_then(serde_json::Value::as_str) {
        log::debug!("Nominatim: {error}");
        return Ok(None);
    }

    let address = body.get("address");
    let road = ROAD_KEYS
        .iter()
        .find_map(|key| {
            address
                .and_then(|a| a.get(*key))
                .and_then(serde_json::Value::as_str)
        })
        .or_else(|| body.get("name").and_then(serde_json::Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(road)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_road_from_address() {
        let body = serde_json::json!({
            "display_name": "Anna Salai, Teynampet, Chennai",
            "name": "Some Building",
            "address": {
                "road": "Anna Salai",
                "suburb": "Teynampet",
                "city": "Chennai"
            }
        });
        assert_eq!(parse_response(&body).unwrap().as_deref(), Some("Anna Salai"));
    }

    #[test]
    fn falls_back_through_road_keys_then_name() {
        let body = serde_json::json!({
            "address": { "pedestrian": "Marina Promenade" }
        });
        assert_eq!(
            parse_response(&body).unwrap().as_deref(),
            Some("Marina Promenade")
        );

        let body = serde_json::json!({ "name": "Kamarajar Salai", "address": {} });
        assert_eq!(
            parse_response(&body).unwrap().as_deref(),
            Some("Kamarajar Salai")
        );
    }

    #[test]
    fn unable_to_geocode_is_no_match() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn blank_names_are_no_match() {
        let body = serde_json::json!({ "name": "  ", "address": {} });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn non_object_is_parse_error() {
        let body = serde_json::json!([]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
