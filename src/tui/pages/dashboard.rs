//! Dashboard: resource counts and key hints.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .margin(1)
        .split(area);

    let counts = vec![
        Line::from(vec![
            Span::styled("提供商  ", app.theme.text_dim()),
            Span::styled(app.providers.providers.len().to_string(), app.theme.text_accent()),
        ]),
        Line::from(vec![
            Span::styled("模型    ", app.theme.text_dim()),
            Span::styled(app.models.models.len().to_string(), app.theme.text_accent()),
        ]),
        Line::from(vec![
            Span::styled("会话    ", app.theme.text_dim()),
            Span::styled(app.chat.conversations.len().to_string(), app.theme.text_accent()),
        ]),
        Line::from(vec![
            Span::styled("参数预设", app.theme.text_dim()),
            Span::styled(format!(" {}", app.presets.presets.len()), app.theme.text_accent()),
        ]),
    ];
    let overview = Paragraph::new(counts).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border(false))
            .title(" 概览 "),
    );
    frame.render_widget(overview, chunks[0]);

    let help = Paragraph::new(vec![
        Line::from(Span::styled("2: 提供商管理", app.theme.text())),
        Line::from(Span::styled("3: 模型管理", app.theme.text())),
        Line::from(Span::styled("4: 多模型对话", app.theme.text())),
        Line::from(""),
        Line::from(Span::styled("?: 查看全部快捷键", app.theme.text_dim())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border(false))
            .title(" 快速开始 "),
    );
    frame.render_widget(help, chunks[1]);
}
