//! アプリケーション状態管理モジュール

use crate::config::Config;
use crate::places::Coordinate;
use crate::session::Session;
use crate::worker::{self, WorkerEvent, WorkerRequest};
use color_eyre::{eyre::eyre, Result};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;
use tracing::{info, warn};

/// 入力欄のスラッシュコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `/loc <lat>,<lon>`
    SetLocation(Coordinate),
    /// `/locate`
    Locate,
    /// `/clear`
    Clear,
}

impl Command {
    /// `/` で始まらなければ `Ok(None)`（通常の質問）
    pub fn parse(input: &str) -> Result<Option<Command>> {
        let input = input.trim();
        let Some(rest) = input.strip_prefix('/') else {
            return Ok(None);
        };
        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        match name {
            "loc" => {
                let parts: Vec<&str> = args
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .collect();
                let [lat, lon] = parts.as_slice() else {
                    return Err(eyre!("usage: /loc <lat>,<lon>"));
                };
                let (lat, lon) = (lat.parse::<f64>()?, lon.parse::<f64>()?);
                Coordinate::new(lat, lon)
                    .map(|c| Some(Command::SetLocation(c)))
                    .ok_or_else(|| eyre!("coordinate out of range: {lat}, {lon}"))
            }
            "locate" => Ok(Some(Command::Locate)),
            "clear" => Ok(Some(Command::Clear)),
            other => Err(eyre!("unknown command: /{other}")),
        }
    }
}

/// アプリケーションの状態を管理する構造体
pub struct App {
    /// 現在の入力テキスト
    pub input: String,
    /// 表示履歴と現在地
    pub session: Session,
    /// 回答待ちフラグ
    pub pending: bool,
    /// 位置情報の取得待ちフラグ
    pub locating: bool,
    /// 直近の進捗・お知らせ
    pub status: Option<String>,
    /// アプリケーション開始時刻
    pub started: Instant,
    tx: Sender<WorkerRequest>,
    rx: Receiver<WorkerEvent>,
}

impl App {
    /// 設定を指定してアプリケーションインスタンスを作成し、ワーカーを起動する
    pub fn with_config(config: Config) -> Self {
        let (tx_request, rx_request) = mpsc::channel::<WorkerRequest>();
        let (tx_event, rx_event) = mpsc::channel::<WorkerEvent>();
        worker::start_worker(rx_request, tx_event, config);

        let mut app = Self::with_channels(tx_request, rx_event);
        app.request_location();
        app
    }

    /// 既存のチャンネルで作成（ワーカーは起動しない）
    pub fn with_channels(tx: Sender<WorkerRequest>, rx: Receiver<WorkerEvent>) -> Self {
        Self {
            input: String::new(),
            session: Session::new(),
            pending: false,
            locating: false,
            status: None,
            started: Instant::now(),
            tx,
            rx,
        }
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// 現在地の取得を依頼（一度に1件だけ）
    pub fn request_location(&mut self) {
        if self.locating {
            return;
        }
        if self.tx.send(WorkerRequest::Locate).is_ok() {
            self.locating = true;
        } else {
            warn!(target: "app", "worker is gone; cannot request location");
        }
    }

    /// 入力を送信。コマンドならその場で処理し、質問ならワーカーへ送る。
    pub fn submit_prompt(&mut self) -> Result<()> {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.pending {
            return Ok(());
        }
        self.input.clear();

        match Command::parse(&text) {
            Ok(Some(cmd)) => {
                self.apply_command(cmd);
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => {
                self.status = Some(format!("{e}"));
                return Ok(());
            }
        }

        info!(target: "app", "submit_prompt: {}", text);
        self.session.push_user(text.clone());
        self.pending = true;
        self.status = Some("Thinking...".to_string());
        self.tx.send(WorkerRequest::Prompt { text, location: self.session.location() })?;
        Ok(())
    }

    fn apply_command(&mut self, cmd: Command) {
        match cmd {
            Command::SetLocation(c) => {
                self.session.set_location(c);
                self.status = Some(format!("Location set to {c}."));
            }
            Command::Locate => {
                self.request_location();
                self.status = Some("Requesting your location...".to_string());
            }
            Command::Clear => {
                self.session.clear_turns();
                self.status = None;
            }
        }
    }

    /// ワーカーからのイベントを取り込む（非ブロッキング）
    pub fn check_worker_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                WorkerEvent::Progress(msg) => self.status = Some(msg),
                WorkerEvent::Answer(answer) => {
                    info!(target: "app", "answer_received: {}", answer);
                    self.session.push_assistant(answer);
                    self.pending = false;
                    self.status = None;
                }
                WorkerEvent::Located(Ok(coord)) => {
                    self.locating = false;
                    self.session.set_location(coord);
                    if !self.pending {
                        self.status = Some(format!("Location set to {coord}."));
                    }
                }
                WorkerEvent::Located(Err(e)) => {
                    self.locating = false;
                    warn!(target: "app", "location request failed: {e}");
                    if !self.pending {
                        self.status = Some(format!("Location unavailable: {e}"));
                    }
                }
            }
        }
    }

    /// ヘッダーに出す現在地の案内
    pub fn location_notice(&self) -> String {
        match self.session.location() {
            Some(c) => format!(
                "📍 Your location {c} acquired. You can now ask about places 'near me' or in a specific city."
            ),
            None => "Waiting for location access... You can still ask about places in a specific city \
(e.g., 'cafes in Jalandhar'), or set one with /loc <lat>,<lon>."
                .to_string(),
        }
    }

    pub fn elapsed_time(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}
