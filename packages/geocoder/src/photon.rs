//! Photon reverse geocoder client.
//!
//! Photon exposes a `/reverse` endpoint returning a `GeoJSON`
//! `FeatureCollection`. The road lives in `properties.street` for address
//! hits and in `properties.name` when the nearest feature is the street
//! itself.
//!
//! See <https://github.com/komoot/photon#reverse-geocode-a-coordinate>

use async_trait::async_trait;
use pothole_admin_pothole_models::Coordinates;

use crate::{GeocodeError, RoadResolver};

/// Reverse geocoder backed by a Photon instance.
pub struct PhotonReverse {
    client: reqwest::Client,
    base_url: String,
}

impl PhotonReverse {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl RoadResolver for PhotonReverse {
    fn id(&self) -> &str {
        "photon"
    }

    async fn road_name(&self, coords: Coordinates) -> Result<Option<String>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("limit", "1".to_string()),
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

fn parse_response(body: &serde_json::Value) -> Result<Option<String>, GeocodeError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Photon response missing 'features' array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    let properties = first.get("properties");
    let is_street = properties
        .and_then(|p| p.get("osm_key"))
        .and_then(serde_json::Value::as_str)
        == Some("highway");

    let street = properties
        .and_then(|p| p.get("street"))
        .and_then(serde_json::Value::as_str);
    let name = properties
        .and_then(|p| p.get("name"))
        .and_then(serde_json::Value::as_str);

    let road = if is_street { name.or(street) } else { street };

    Ok(road
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from))
}
