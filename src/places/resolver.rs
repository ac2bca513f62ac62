//! 検索の中心座標を決める。
//!
//! 1. LLM に発話から都市/地名を抜き出させる（無ければ `None` と答えさせる）
//! 2. 地名があればジオコーディング。失敗したら現在地には戻らず終了。
//! 3. 地名が無ければセッションの現在地、それも無ければ案内メッセージ。
//!
//! 発話中の地名は常に現在地より優先する。

use super::geocoder::Geocoder;
use super::types::{Coordinate, GeocodeError, ResolutionError};
use crate::llm::Completion;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 抽出結果がこの語なら「地名なし」
pub const NO_LOCATION_TOKEN: &str = "None";

/// 抽出プロンプト
pub fn extraction_prompt(utterance: &str) -> String {
    format!(
        "From the user query '{utterance}', extract the city or location name. \
If no location is mentioned, respond with only the word '{NO_LOCATION_TOKEN}'."
    )
}

/// モデル出力を地名に正規化する。`None` や空なら `None`。
///
/// 前後の空白・引用符・末尾のピリオドは落とし、`None` は大文字小文字を区別しない。
pub fn normalize_extraction(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim_end_matches('.')
        .trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_LOCATION_TOKEN) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 解決の途中経過。UI の進捗表示に使う。
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveStep {
    Geocoding(String),
    /// 通信・応答の失敗（NotFound ではない）。中身は失敗の詳細。
    GeocodeFailed(String),
    UsingSessionLocation(Coordinate),
}

pub struct LocationResolver {
    llm: Arc<dyn Completion>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(llm: Arc<dyn Completion>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { llm, geocoder }
    }

    pub fn resolve(&self, utterance: &str, session_location: Option<Coordinate>) -> Result<Coordinate, ResolutionError> {
        self.resolve_with(utterance, session_location, |_| {})
    }

    /// `on_step` で途中経過を受け取る版
    #[instrument(name = "resolve_location", skip(self, on_step), fields(has_session = session_location.is_some()))]
    pub fn resolve_with(
        &self,
        utterance: &str,
        session_location: Option<Coordinate>,
        mut on_step: impl FnMut(&ResolveStep),
    ) -> Result<Coordinate, ResolutionError> {
        let extracted = match self.llm.complete(&extraction_prompt(utterance)) {
            Ok(raw) => normalize_extraction(&raw),
            Err(e) => {
                warn!(target: "places", error = %e, "location extraction failed");
                return Err(ResolutionError::ExtractionFailed);
            }
        };

        match extracted {
            Some(phrase) => {
                info!(target: "places", phrase = %phrase, "named location extracted");
                on_step(&ResolveStep::Geocoding(phrase.clone()));
                match self.geocoder.geocode(&phrase) {
                    Ok(coord) => Ok(coord),
                    Err(GeocodeError::NotFound(_)) => Err(ResolutionError::UnknownPlace { phrase }),
                    Err(GeocodeError::Failure(detail)) => {
                        warn!(target: "places", error = %detail, phrase = %phrase, "geocoding failed");
                        on_step(&ResolveStep::GeocodeFailed(detail));
                        Err(ResolutionError::UnknownPlace { phrase })
                    }
                }
            }
            None => match session_location {
                Some(coord) => {
                    on_step(&ResolveStep::UsingSessionLocation(coord));
                    Ok(coord)
                }
                None => Err(ResolutionError::NoLocation),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;
    use std::sync::Mutex;

    struct FixedLlm(Result<String, String>);
    impl Completion for FixedLlm {
        fn complete(&self, _prompt: &str) -> Result<String> {
            self.0.clone().map_err(|e| color_eyre::eyre::eyre!(e))
        }
    }

    #[derive(Default)]
    struct StubGeocoder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }
    impl Geocoder for StubGeocoder {
        fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError> {
            self.calls.lock().unwrap().push(place_name.to_string());
            match (self.fail, place_name) {
                (true, _) => Err(GeocodeError::Failure("connection refused".into())),
                (false, "Jalandhar") => Ok(Coordinate::new(31.32, 75.58).unwrap()),
                (false, other) => Err(GeocodeError::NotFound(other.to_string())),
            }
        }
    }

    fn resolver(reply: &str, geo: Arc<StubGeocoder>) -> LocationResolver {
        LocationResolver::new(Arc::new(FixedLlm(Ok(reply.to_string()))), geo)
    }

    #[test]
    fn normalize_handles_quotes_and_case() {
        assert_eq!(normalize_extraction(" None\n"), None);
        assert_eq!(normalize_extraction("none."), None);
        assert_eq!(normalize_extraction("\"Delhi\""), Some("Delhi".into()));
        assert_eq!(normalize_extraction(""), None);
    }

    #[test]
    fn named_place_beats_session_location() {
        let geo = Arc::new(StubGeocoder::default());
        let r = resolver("Jalandhar", geo.clone());
        let session = Coordinate::new(28.6, 77.2);
        let got = r.resolve("cafes in Jalandhar", session).unwrap();
        assert_eq!(got, Coordinate::new(31.32, 75.58).unwrap());
        assert_eq!(*geo.calls.lock().unwrap(), vec!["Jalandhar".to_string()]);
    }

    #[test]
    fn geocode_failure_does_not_fall_back() {
        let geo = Arc::new(StubGeocoder { fail: true, ..Default::default() });
        let r = resolver("Jalandhar", geo);
        let mut steps = Vec::new();
        let err = r
            .resolve_with("cafes in Jalandhar", Coordinate::new(28.6, 77.2), |s| steps.push(s.clone()))
            .unwrap_err();
        assert_eq!(err, ResolutionError::UnknownPlace { phrase: "Jalandhar".into() });
        assert_eq!(
            steps,
            vec![
                ResolveStep::Geocoding("Jalandhar".into()),
                ResolveStep::GeocodeFailed("connection refused".into()),
            ]
        );
    }

    #[test]
    fn no_phrase_uses_session_location_unchanged() {
        let geo = Arc::new(StubGeocoder::default());
        let r = resolver("None", geo.clone());
        let session = Coordinate::new(28.6, 77.2).unwrap();
        let mut steps = Vec::new();
        let got = r.resolve_with("restaurants near me", Some(session), |s| steps.push(s.clone())).unwrap();
        assert_eq!(got, session);
        assert_eq!(steps, vec![ResolveStep::UsingSessionLocation(session)]);
        assert!(geo.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn no_phrase_no_session_is_no_location() {
        let geo = Arc::new(StubGeocoder::default());
        let r = resolver("None", geo.clone());
        assert_eq!(r.resolve("restaurants near me", None).unwrap_err(), ResolutionError::NoLocation);
        assert!(geo.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn extraction_error_is_reported() {
        let geo = Arc::new(StubGeocoder::default());
        let r = LocationResolver::new(Arc::new(FixedLlm(Err("503".into()))), geo.clone());
        assert_eq!(r.resolve("cafes", Coordinate::new(1.0, 1.0)).unwrap_err(), ResolutionError::ExtractionFailed);
        assert!(geo.calls.lock().unwrap().is_empty());
    }
}
