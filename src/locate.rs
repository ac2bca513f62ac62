//! 起動時に一度だけ行う現在地の取得
//!
//! 端末には GPS が無いので、`PLACES_LAT`/`PLACES_LON` があればそれを使い、
//! 無ければ IP ベースの位置情報 API（ip-api.com 互換の `{status, lat, lon}`）に問い合わせる。

use crate::config::Config;
use crate::places::Coordinate;
use color_eyre::{eyre::eyre, eyre::WrapErr, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct IpLocation {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// レスポンス本文から座標を取り出す
pub fn parse_ip_location(body: &str) -> Result<Coordinate> {
    let loc: IpLocation = serde_json::from_str(body).wrap_err("invalid location response")?;
    if loc.status != "success" {
        return Err(eyre!(
            "location lookup failed: {}",
            loc.message.unwrap_or_else(|| format!("status '{}'", loc.status))
        ));
    }
    match (loc.lat, loc.lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon).ok_or_else(|| eyre!("invalid coordinate ({lat}, {lon})")),
        _ => Err(eyre!("location response missing lat/lon")),
    }
}

/// 現在地を1回取得する
#[instrument(name = "locate_once", skip_all)]
pub fn locate_once(client: &Client, config: &Config) -> Result<Coordinate> {
    if let Some(fixed) = config.fixed_location {
        info!(target: "app", location = %fixed, "using configured location");
        return Ok(fixed);
    }

    let resp = client
        .get(&config.locate_url)
        .send()
        .wrap_err("sending location lookup request")?;
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    debug!(target: "app", status = %status, len = text.len(), "locate_response_raw");
    if !status.is_success() {
        return Err(eyre!("status {}: {}", status.as_u16(), text));
    }
    let coord = parse_ip_location(&text)?;
    info!(target: "app", location = %coord, "location acquired");
    Ok(coord)
}
