//! 実APIを叩く確認用テスト。`cargo test -- --ignored` で明示的に実行する。

use places_finder::config::Config;
use places_finder::llm::ToolContext;
use places_finder::places::build_http_client;
use places_finder::worker::build_agent;
mod common;

#[ctor::ctor]
fn _init() {
    common::init();
}

#[test]
#[ignore]
fn live_city_query_returns_text() {
    let config = Config::from_env();
    if config.api_key.is_none() {
        eprintln!("GOOGLE_API_KEY not set; skipping");
        return;
    }
    let http = build_http_client(&config).unwrap();
    let mut agent = build_agent(&config, &http).unwrap();
    let answer = agent.invoke("cafes in Jalandhar", &ToolContext::new(None));
    tracing::info!(target: "test", answer = %answer.final_answer, "live answer");
    assert!(!answer.final_answer.trim().is_empty());
}
