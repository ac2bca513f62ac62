//! イベント処理モジュール

use crate::app::App;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// キーイベントを処理
///
/// # Returns
/// - `Ok(true)` - アプリケーションを終了
/// - `Ok(false)` - 処理を継続
/// - `Err(_)` - エラーが発生
pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
        KeyCode::Enter => app.submit_prompt()?,
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(ch) => app.push_char(ch),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerRequest;
    use std::sync::mpsc::channel;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_enter_sends_prompt() -> Result<()> {
        let (tx, rx) = channel();
        let (_tx_ev, rx_ev) = channel();
        let mut app = App::with_channels(tx, rx_ev);
        for ch in "hi!".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)))?;
        }
        handle_key(&mut app, key(KeyCode::Backspace))?;
        assert!(!handle_key(&mut app, key(KeyCode::Enter))?);
        assert_eq!(rx.try_recv()?, WorkerRequest::Prompt { text: "hi".into(), location: None });
        assert!(app.pending);
        Ok(())
    }

    #[test]
    fn esc_and_ctrl_c_exit() -> Result<()> {
        let (tx, _rx) = channel();
        let (_tx_ev, rx_ev) = channel();
        let mut app = App::with_channels(tx, rx_ev);
        assert!(handle_key(&mut app, key(KeyCode::Esc))?);
        assert!(handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))?);
        Ok(())
    }
}
