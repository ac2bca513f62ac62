//! 周辺スポット検索: ジオコーディング、Places 検索、要約、位置解決、ツール

pub mod geocoder;
pub mod resolver;
pub mod search;
pub mod summarizer;
pub mod tool;
pub mod types;

pub use geocoder::{Geocoder, OpenMeteoGeocoder};
pub use resolver::{LocationResolver, ResolveStep};
pub use search::{GooglePlacesSearch, PlacesSearch};
pub use summarizer::Summarizer;
pub use tool::{build_places_search_tool, PlacesTool, PLACES_TOOL_DESCRIPTION, PLACES_TOOL_NAME};
pub use types::{Coordinate, GeocodeError, Place, PlacesResult, ResolutionError, SearchError};

use crate::config::Config;
use color_eyre::{eyre::WrapErr, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// 外部APIで共有するブロッキングHTTPクライアント
pub fn build_http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("places_finder/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .wrap_err("building reqwest client")
}
