//! アシスタントワーカー（TUIとは別スレッドで動く）
//!
//! エージェントと外部クライアントはこのスレッドで一度だけ組み立て、プロセス終了まで
//! 使い回す。リクエストは1件ずつ順に処理するので、1ターンが終わるまで次は始まらない。

use crate::config::Config;
use crate::llm::{AgentExecutor, LlmClient, ToolContext};
use crate::locate::locate_once;
use crate::places::{
    build_http_client, build_places_search_tool, Coordinate, GooglePlacesSearch, OpenMeteoGeocoder, PlacesTool,
};
use color_eyre::Result;
use reqwest::blocking::Client;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, instrument, warn};

/// UI → ワーカー
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRequest {
    /// 1ターン分の質問。現在地はその時点のスナップショット。
    Prompt { text: String, location: Option<Coordinate> },
    /// 現在地の取得を依頼
    Locate,
}

/// ワーカー → UI
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Progress(String),
    Answer(String),
    Located(Result<Coordinate, String>),
}

/// 本番用の部品でエージェントを組み立てる
pub fn build_agent(config: &Config, http: &Client) -> Result<AgentExecutor> {
    let llm = Arc::new(LlmClient::new(config)?);
    let geocoder = Arc::new(OpenMeteoGeocoder::new(http.clone(), config.geocoding_url.clone()));
    let search = Arc::new(GooglePlacesSearch::new(
        http.clone(),
        config.places_url.clone(),
        config.api_key.clone(),
        config.max_results,
    ));
    let places = Arc::new(PlacesTool::new(llm.clone(), geocoder, search, config.search_radius_m));
    Ok(AgentExecutor::new(llm, vec![build_places_search_tool(places)], config.max_agent_loops))
}

/// ワーカーを開始
pub fn start_worker(rx: Receiver<WorkerRequest>, tx: Sender<WorkerEvent>, config: Config) -> JoinHandle<()> {
    std::thread::spawn(move || run_worker(rx, tx, config))
}

fn run_worker(rx: Receiver<WorkerRequest>, tx: Sender<WorkerEvent>, config: Config) {
    let http = build_http_client(&config).map_err(|e| format!("{e:#}"));
    let mut agent = match &http {
        Ok(client) => build_agent(&config, client).map_err(|e| format!("{e:#}")),
        Err(e) => Err(e.clone()),
    };
    if let Err(e) = &agent {
        error!(target: "app", "assistant unavailable: {e}");
    }

    while let Ok(request) = rx.recv() {
        let event = match request {
            WorkerRequest::Prompt { text, location } => {
                WorkerEvent::Answer(answer_prompt(agent.as_mut(), &text, location, &tx))
            }
            WorkerRequest::Locate => {
                let located = match &http {
                    Ok(client) => locate_once(client, &config).map_err(|e| format!("{e:#}")),
                    Err(e) => Err(e.clone()),
                };
                if let Err(e) = &located {
                    warn!(target: "app", "location unavailable: {e}");
                }
                WorkerEvent::Located(located)
            }
        };
        if tx.send(event).is_err() {
            // UI 側が終了済み
            break;
        }
    }
    info!(target: "app", "worker stopped");
}

#[instrument(name = "answer_prompt", skip(agent, tx), fields(prompt_len = text.len()))]
fn answer_prompt(
    agent: Result<&mut AgentExecutor, &mut String>,
    text: &str,
    location: Option<Coordinate>,
    tx: &Sender<WorkerEvent>,
) -> String {
    let agent = match agent {
        Ok(a) => a,
        Err(e) => return format!("The assistant is not configured: {e}"),
    };
    info!(target: "app", "prompt_received: {}", text);
    let progress_tx = tx.clone();
    let ctx = ToolContext::new(location).with_progress(Arc::new(move |m: &str| {
        let _ = progress_tx.send(WorkerEvent::Progress(m.to_string()));
    }));
    let answer = agent.invoke(text, &ctx).final_answer;
    info!(target: "app", "answer_ready: {}", answer);
    answer
}
