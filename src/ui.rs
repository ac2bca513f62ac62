//! UI描画モジュール

use crate::app::App;
use crate::session::Role;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const INPUT_PLACEHOLDER: &str = "Ask about places near you or in a city...";

/// メインUI描画関数
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // ヘッダ
            Constraint::Min(5),    // 会話履歴
            Constraint::Length(1), // 進捗
            Constraint::Length(3), // 入力欄
            Constraint::Length(1), // フッター
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_history(f, app, chunks[1]);
    render_status(f, app, chunks[2]);
    render_input(f, app, chunks[3]);
    render_footer(f, app, chunks[4]);
}

/// タイトルと現在地の案内
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let notice = if app.session.location().is_some() {
        Line::from(app.location_notice().fg(Color::Green))
    } else {
        Line::from(app.location_notice().fg(Color::Yellow))
    };
    let header = Paragraph::new(vec![Line::from("Smart Places Finder 🌍".bold().fg(Color::Cyan)), notice])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Guide"));
    f.render_widget(header, area);
}

/// 役割付きの会話履歴。末尾が見えるようにスクロールする。
fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for turn in app.session.turns() {
        let label = match turn.role {
            Role::User => Span::raw("you").bold().fg(Color::Cyan),
            Role::Assistant => Span::raw("assistant").bold().fg(Color::Magenta),
        };
        lines.push(Line::from(label));
        lines.extend(turn.content.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;
    let history = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Chat"));
    f.render_widget(history, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let text = match (&app.status, app.pending) {
        (Some(s), _) => s.clone(),
        (None, true) => "Thinking...".to_string(),
        (None, false) => String::new(),
    };
    f.render_widget(Paragraph::new(text.italic()), area);
}

/// 入力欄を描画
fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let line = if app.input.is_empty() {
        Line::from(INPUT_PLACEHOLDER.dark_gray())
    } else {
        let mut current = app.input.clone();
        current.push('_'); // 簡易カーソル表示
        Line::from(current)
    };
    let input_widget = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("Input"));
    f.render_widget(input_widget, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let elapsed = app.elapsed_time().as_secs_f32();
    let footer = Paragraph::new(Line::from(vec![Span::raw(format!(
        "Enter: send | /loc <lat>,<lon> | /locate | /clear | Esc: quit | {elapsed:.1}s"
    ))]))
    .alignment(Alignment::Right);
    f.render_widget(footer, area);
}
