
// 同階層のファイルをモジュールとしてインポート
pub mod app;
pub mod config;
pub mod event;
pub mod llm;
pub mod locate;
pub mod places;
pub mod session;
pub mod ui;
pub mod worker;

pub use config::Config;

use color_eyre::Result;
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}

/// アプリケーションのメインループを実行
pub fn run(mut terminal: DefaultTerminal, config: Config) -> Result<()> {
    let poll = Duration::from_millis(config.poll_interval_ms);
    let mut app = app::App::with_config(config);

    loop {
        // ワーカーからの回答・進捗を取り込む
        app.check_worker_events();

        terminal.draw(|f| ui::render(f, &app))?;

        if crossterm_event::poll(poll)? {
            match crossterm_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match event::handle_key(&mut app, key) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => {
                        // 1ターンの失敗でアプリは止めない
                        tracing::error!("Error handling key: {:?}", e);
                        app.status = Some(format!("Error: {e}"));
                    }
                },
                Event::Resize(_, _) => {
                    // 次ループで再描画されるので特別な処理なし
                }
                _ => {}
            }
        }
    }
    Ok(())
}
