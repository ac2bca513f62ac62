//! アプリケーション設定と定数

use crate::places::Coordinate;
use std::str::FromStr;
use tracing::warn;

/// 検索時の既定バイアス半径（メートル）
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 5000;

/// Places API に要求する最大件数の既定値
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM モデル名
    pub model: String,
    /// OpenAI 互換エンドポイントのベースURL
    pub llm_api_base: String,
    /// Google API キー（Places と LLM の両方に使える）
    pub api_key: Option<String>,
    /// LLM 専用キー（未指定なら `api_key` を使う）
    pub llm_api_key: Option<String>,
    /// 生成温度
    pub temperature: f32,
    /// 最大トークン数
    pub max_tokens: u32,
    /// エージェントのツール呼び出しループ上限
    pub max_agent_loops: usize,
    /// 検索バイアス半径（メートル）
    pub search_radius_m: u32,
    /// 検索結果の最大件数
    pub max_results: u32,
    /// ジオコーディングAPI
    pub geocoding_url: String,
    /// Places テキスト検索API
    pub places_url: String,
    /// IPベースの現在地取得API
    pub locate_url: String,
    /// 固定の現在地（PLACES_LAT / PLACES_LON）
    pub fixed_location: Option<Coordinate>,
    /// HTTPタイムアウト（秒）
    pub http_timeout_secs: u64,
    /// イベントポーリング間隔（ミリ秒）
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            llm_api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: None,
            llm_api_key: None,
            temperature: 0.0,
            // NOTE: Keep in sync with tests (tests/config_tests.rs).
            max_tokens: 2000,
            max_agent_loops: 5,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            max_results: DEFAULT_MAX_RESULTS,
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            places_url: "https://places.googleapis.com/v1/places:searchText".to_string(),
            locate_url: "http://ip-api.com/json".to_string(),
            fixed_location: None,
            http_timeout_secs: 15,
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    /// 新しい設定インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数から設定を読み込む（`.env` は呼び出し側で読み込み済みの想定）
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を組み立てる。テストで環境変数を汚さないために分離。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = non_empty("GOOGLE_API_KEY");
        let llm_api_key = non_empty("PLACES_LLM_API_KEY");

        let fixed_location = match (non_empty("PLACES_LAT"), non_empty("PLACES_LON")) {
            (Some(lat), Some(lon)) => match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Coordinate::new(lat, lon),
                _ => {
                    warn!(target: "app", lat = %lat, lon = %lon, "ignoring unparseable PLACES_LAT/PLACES_LON");
                    None
                }
            },
            _ => None,
        };

        Self {
            model: non_empty("PLACES_LLM_MODEL").unwrap_or(d.model),
            llm_api_base: non_empty("PLACES_LLM_API_BASE").unwrap_or(d.llm_api_base),
            api_key,
            llm_api_key,
            temperature: parse_or(&lookup, "PLACES_LLM_TEMPERATURE", d.temperature),
            max_tokens: parse_or(&lookup, "PLACES_LLM_MAX_TOKENS", d.max_tokens),
            max_agent_loops: parse_or(&lookup, "PLACES_AGENT_MAX_LOOPS", d.max_agent_loops).max(1),
            search_radius_m: parse_or(&lookup, "PLACES_SEARCH_RADIUS_M", d.search_radius_m),
            max_results: parse_or(&lookup, "PLACES_MAX_RESULTS", d.max_results).clamp(1, 20),
            geocoding_url: non_empty("PLACES_GEOCODING_URL").unwrap_or(d.geocoding_url),
            places_url: non_empty("PLACES_SEARCH_URL").unwrap_or(d.places_url),
            locate_url: non_empty("PLACES_LOCATE_URL").unwrap_or(d.locate_url),
            fixed_location,
            http_timeout_secs: parse_or(&lookup, "PLACES_HTTP_TIMEOUT_SECS", d.http_timeout_secs),
            poll_interval_ms: d.poll_interval_ms,
        }
    }

    /// LLM 呼び出しに使うキー
    pub fn effective_llm_key(&self) -> Option<&str> {
        self.llm_api_key.as_deref().or(self.api_key.as_deref())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            warn!(target: "app", key, value = %raw, "unparseable config value; using default");
            default
        }),
        _ => default,
    }
}
