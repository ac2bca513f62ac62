use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// 緯度経度。生成後は不変。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// 範囲外・非有限値は `None`
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// 検索結果の1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub display_name: String,
    pub formatted_address: String,
}

/// Places API の結果（上流の順序を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacesResult {
    pub places: Vec<Place>,
}

impl PlacesResult {
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }
}

/// ジオコーディングの失敗。NotFound と通信失敗は区別する。
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no geocoding results for '{0}'")]
    NotFound(String),
    #[error("geocoding failed: {0}")]
    Failure(String),
}

/// Places 検索の失敗
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("GOOGLE_API_KEY not set")]
    MissingApiKey,
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Failure(String),
}

/// 検索地点を決められなかった理由。Display がそのままユーザー向けの文になる。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("Sorry, I couldn't find the coordinates for {phrase}.")]
    UnknownPlace { phrase: String },
    #[error("I don't have your location yet. Please grant location access or specify a city in your query.")]
    NoLocation,
    #[error("Sorry, I couldn't work out which location you meant. Please try again or name a city.")]
    ExtractionFailed,
}
