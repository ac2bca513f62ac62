//! Google Places `searchText` 連携
//!
//! ロケーションは `locationBias`（ソフトな優先）で渡すため、半径外の結果も
//! 関連度次第で返ってくる。フィールドマスクで表示名と住所だけを要求する。

use super::types::{Coordinate, Place, PlacesResult, SearchError};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

pub const FIELD_MASK: &str = "places.displayName,places.formattedAddress";

/// 座標付近をテキスト検索する
pub trait PlacesSearch: Send + Sync {
    fn search(&self, query: &str, center: Coordinate, radius_m: u32) -> Result<PlacesResult, SearchError>;
}

/// リクエスト本文を組み立てる
pub fn build_search_body(query: &str, center: Coordinate, radius_m: u32, max_results: u32) -> Value {
    json!({
        "textQuery": query,
        "maxResultCount": max_results,
        "locationBias": {
            "circle": {
                "center": { "latitude": center.latitude, "longitude": center.longitude },
                "radius": f64::from(radius_m)
            }
        }
    })
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    places: Vec<WirePlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlace {
    #[serde(default)]
    display_name: Option<LocalizedText>,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    #[serde(default)]
    text: String,
}

/// レスポンス本文を `PlacesResult` に変換する。`{}`（0件）は空の結果。
pub fn parse_search_response(body: &str, max_results: usize) -> Result<PlacesResult, SearchError> {
    let wire: WireResponse = if body.trim().is_empty() {
        WireResponse::default()
    } else {
        serde_json::from_str(body).map_err(|e| SearchError::Failure(format!("invalid places response: {e}")))?
    };
    let places = wire
        .places
        .into_iter()
        .take(max_results)
        .map(|p| Place {
            display_name: p.display_name.map(|d| d.text).unwrap_or_default(),
            formatted_address: p.formatted_address.unwrap_or_default(),
        })
        .collect();
    Ok(PlacesResult { places })
}

/// Google Places (New) 実装
#[derive(Debug, Clone)]
pub struct GooglePlacesSearch {
    client: Client,
    url: String,
    api_key: Option<String>,
    max_results: u32,
}

impl GooglePlacesSearch {
    pub fn new(client: Client, url: impl Into<String>, api_key: Option<String>, max_results: u32) -> Self {
        Self { client, url: url.into(), api_key, max_results }
    }
}

impl PlacesSearch for GooglePlacesSearch {
    #[instrument(name = "places_search", skip(self), fields(center = %center))]
    fn search(&self, query: &str, center: Coordinate, radius_m: u32) -> Result<PlacesResult, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let body = build_search_body(query, center, radius_m, self.max_results);

        let resp = self
            .client
            .post(&self.url)
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .map_err(|e| SearchError::Failure(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| SearchError::Failure(e.to_string()))?;
        debug!(target: "places", status = %status, len = text.len(), "places_response_raw");

        if !status.is_success() {
            return Err(SearchError::Status { status: status.as_u16(), body: text });
        }
        parse_search_response(&text, self.max_results as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_bias_not_restriction() {
        let c = Coordinate::new(28.6, 77.2).unwrap();
        let v = build_search_body("restaurants near me", c, 5000, 5);
        assert_eq!(v["textQuery"], "restaurants near me");
        assert_eq!(v["maxResultCount"], 5);
        assert_eq!(v["locationBias"]["circle"]["radius"], 5000.0);
        assert_eq!(v["locationBias"]["circle"]["center"]["latitude"], 28.6);
        assert!(v.get("locationRestriction").is_none());
    }

    #[test]
    fn parses_display_name_text_and_caps() {
        let body = r#"{"places":[
            {"displayName":{"text":"A","languageCode":"en"},"formattedAddress":"addr A"},
            {"displayName":{"text":"B"},"formattedAddress":"addr B"},
            {"displayName":{"text":"C"}}
        ]}"#;
        let r = parse_search_response(body, 2).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.places[0].display_name, "A");
        assert_eq!(r.places[1].formatted_address, "addr B");
    }

    #[test]
    fn empty_object_is_empty_result() {
        assert!(parse_search_response("{}", 5).unwrap().is_empty());
        assert!(parse_search_response("", 5).unwrap().is_empty());
    }

    #[test]
    fn missing_key_errors_before_network() {
        let s = GooglePlacesSearch::new(Client::new(), "http://127.0.0.1:9", None, 5);
        let err = s.search("cafes", Coordinate::new(0.0, 0.0).unwrap(), 5000).unwrap_err();
        assert!(matches!(err, SearchError::MissingApiKey));
    }
}
