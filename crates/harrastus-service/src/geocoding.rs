//! Address to coordinate lookup.

use std::time::Duration;

use harrastus_core::error::{HarrastusError, HarrastusResult};
use harrastus_core::models::coordinate::Coordinate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::GeocodeError;

/// Resolves a free-form address to a coordinate.
pub trait Geocoder: Send + Sync {
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinate, GeocodeError>> + Send;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Extract the first result's location from a Geocoding API body.
pub fn parse_geocode_response(address: &str, body: &str) -> Result<Coordinate, GeocodeError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed {
            address: address.to_owned(),
            reason: e.to_string(),
        })?;
    if response.status != "OK" {
        return Err(GeocodeError::Status {
            address: address.to_owned(),
            status: response.status,
        });
    }
    let first = response
        .results
        .first()
        .ok_or_else(|| GeocodeError::Malformed {
            address: address.to_owned(),
            reason: "no results".into(),
        })?;
    let location = &first.geometry.location;
    Coordinate::checked(location.lat, location.lng).map_err(|e| GeocodeError::Malformed {
        address: address.to_owned(),
        reason: e.to_string(),
    })
}

/// Google Geocoding API client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> HarrastusResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarrastusError::Internal(format!("geocoding client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    /// A client for the configured endpoint, or `None` when no API key
    /// is set.
    pub fn from_config(config: &ServiceConfig) -> HarrastusResult<Option<Self>> {
        config
            .geocoding_api_key
            .as_ref()
            .map(|key| {
                Self::new(
                    config.geocoding_url.clone(),
                    key.clone(),
                    Duration::from_secs(config.geocoding_timeout_secs),
                )
            })
            .transpose()
    }
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let request_failed = |reason: String| GeocodeError::Request {
            address: address.to_owned(),
            reason,
        };
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", self.api_key.as_str()), ("address", address)])
            .send()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| request_failed(e.to_string()))?;
        if !status.is_success() {
            warn!(%status, address, "Geocoding API returned an error status");
            return Err(request_failed(format!("HTTP {status}")));
        }

        let coordinate = parse_geocode_response(address, &body)?;
        debug!(
            address,
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "Geocoded address"
        );
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "Hämeenkatu 1,+33100+Tampere";

    #[test]
    fn parses_first_result() {
        let body = r#"{
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 61.4981, "lng": 23.7608}}},
                {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
            ]
        }"#;
        let c = parse_geocode_response(ADDRESS, body).unwrap();
        assert_eq!(c, Coordinate::new(61.4981, 23.7608));
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let body = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        let err = parse_geocode_response(ADDRESS, body).unwrap_err();
        assert!(matches!(err, GeocodeError::Status { ref status, .. } if status == "ZERO_RESULTS"));

        let converted: HarrastusError = err.into();
        assert!(converted.to_string().contains("could not be geocoded"));
        assert!(matches!(converted, HarrastusError::Geocoding { address } if address == ADDRESS));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_geocode_response(ADDRESS, "<html>"),
            Err(GeocodeError::Malformed { .. })
        ));
        assert!(matches!(
            parse_geocode_response(ADDRESS, r#"{"status": "OK", "results": []}"#),
            Err(GeocodeError::Malformed { .. })
        ));
    }

    #[test]
    fn disabled_without_api_key() {
        let config = ServiceConfig::default();
        assert!(GoogleGeocoder::from_config(&config).unwrap().is_none());

        let config = ServiceConfig {
            geocoding_api_key: Some("key".into()),
            ..ServiceConfig::default()
        };
        assert!(GoogleGeocoder::from_config(&config).unwrap().is_some());
    }
}
