#![allow(dead_code)]

use color_eyre::Result;
use places_finder::llm::Completion;
use places_finder::places::{Coordinate, GeocodeError, Geocoder, PlacesResult, PlacesSearch, SearchError};
use std::collections::HashMap;
use std::sync::Mutex;
use once_cell::sync::Lazy;
use std::sync::Once;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static START: Once = Once::new();
static _GUARD: Lazy<std::sync::Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| std::sync::Mutex::new(None));

/// Initialize test environment: dotenv and tracing (stderr + file).
/// Idempotent: safe to call multiple times.
pub fn init() {
    START.call_once(|| {
        let _ = dotenvy::dotenv();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("env filter");

        // Daily rotating log file separate from app runtime logs
        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard); // retain guard for lifetime

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(file_nb);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();

        tracing::info!(target: "test_init", "Test tracing initialized (stderr + rotating file)");
    });
}


/// Completion fake: answers the extraction prompt from a table and records every prompt.
pub struct FakeLlm {
    pub extraction: String,
    pub summary: String,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn new(extraction: &str, summary: &str) -> Self {
        Self { extraction: extraction.into(), summary: summary.into(), prompts: Mutex::new(vec![]) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Completion for FakeLlm {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.starts_with("From the user query") {
            Ok(self.extraction.clone())
        } else {
            Ok(self.summary.clone())
        }
    }
}

/// Geocoder fake backed by a fixed gazetteer.
#[derive(Default)]
pub struct FakeGeocoder {
    pub known: HashMap<String, Coordinate>,
    pub failure: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with(place: &str, lat: f64, lon: f64) -> Self {
        let mut known = HashMap::new();
        known.insert(place.to_string(), Coordinate::new(lat, lon).unwrap());
        Self { known, ..Default::default() }
    }

    /// 通信失敗を返し続けるジオコーダ
    pub fn failing(detail: &str) -> Self {
        Self { failure: Some(detail.to_string()), ..Default::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, place_name: &str) -> Result<Coordinate, GeocodeError> {
        self.calls.lock().unwrap().push(place_name.to_string());
        if let Some(detail) = &self.failure {
            return Err(GeocodeError::Failure(detail.clone()));
        }
        self.known
            .get(place_name)
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(place_name.to_string()))
    }
}

/// Search fake returning a canned result (or a status error) and recording (query, center).
pub struct FakeSearch {
    pub result: PlacesResult,
    pub failure: Option<(u16, String)>,
    pub calls: Mutex<Vec<(String, Coordinate, u32)>>,
}

impl FakeSearch {
    pub fn returning(result: PlacesResult) -> Self {
        Self { result, failure: None, calls: Mutex::new(vec![]) }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self { result: PlacesResult::default(), failure: Some((status, body.to_string())), calls: Mutex::new(vec![]) }
    }

    pub fn calls(&self) -> Vec<(String, Coordinate, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlacesSearch for FakeSearch {
    fn search(&self, query: &str, center: Coordinate, radius_m: u32) -> Result<PlacesResult, SearchError> {
        self.calls.lock().unwrap().push((query.to_string(), center, radius_m));
        match &self.failure {
            Some((status, body)) => Err(SearchError::Status { status: *status, body: body.clone() }),
            None => Ok(self.result.clone()),
        }
    }
}
