//! 地名 → 座標の解決（Open-Meteo Geocoding API）
//!
//! `GET {url}?name=<place>&count=1&language=en&format=json` を1回だけ発行し、
//! `results[0]` の緯度経度を採用する。`results` が無い/空なら `NotFound`。

use super::types::{Coordinate, GeocodeError};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

/// 地名を座標に解決する
pub trait Geocoder: Send + Sync {
    fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeHit>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    latitude: f64,
    longitude: f64,
}

/// レスポンス本文から先頭候補の座標を取り出す
pub fn parse_geocode_response(place_name: &str, body: &str) -> Result<Coordinate, GeocodeError> {
    let parsed: GeocodeResponse = serde_json::from_str(body)
        .map_err(|e| GeocodeError::Failure(format!("invalid geocoding response: {e}")))?;
    let first = parsed
        .results
        .first()
        .ok_or_else(|| GeocodeError::NotFound(place_name.to_string()))?;
    Coordinate::new(first.latitude, first.longitude).ok_or_else(|| {
        GeocodeError::Failure(format!(
            "geocoder returned invalid coordinate ({}, {})",
            first.latitude, first.longitude
        ))
    })
}

/// Open-Meteo 実装
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

impl Geocoder for OpenMeteoGeocoder {
    #[instrument(name = "geocode", skip(self))]
    fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError> {
        let name = place_name.trim();
        if name.is_empty() {
            return Err(GeocodeError::NotFound(String::new()));
        }

        let resp = self
            .client
            .get(&self.url)
            .query(&[("name", name), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .map_err(|e| GeocodeError::Failure(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| GeocodeError::Failure(e.to_string()))?;
        debug!(target: "places", status = %status, len = text.len(), "geocode_response_raw");

        if !status.is_success() {
            return Err(GeocodeError::Failure(format!("status {}: {}", status.as_u16(), text)));
        }
        parse_geocode_response(name, &text)
    }
}
