//! Multi-model chat: conversation list, turn history, fan-out bar, editor.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::store::TurnState;
use crate::tui::app::App;
use crate::tui::components::InputBox;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(area);

    render_conversations(frame, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    render_history(frame, app, right[0]);
    render_fanout_bar(frame, app, right[1]);
    frame.render_widget(
        InputBox {
            content: &app.chat_input,
            placeholder: "输入消息, Enter 发送, Ctrl+O 选择模型",
            focused: true,
            theme: &app.theme,
        },
        right[2],
    );
}

fn render_conversations(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .chat
        .conversations
        .iter()
        .map(|conversation| {
            let style = if app.chat.selected == Some(conversation.id) {
                app.theme.selected()
            } else {
                app.theme.text()
            };
            ListItem::new(conversation.title.clone()).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border(false))
            .title(" 会话  Ctrl+N:新建 Ctrl+L:切换 "),
    );
    frame.render_widget(list, area);
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(false))
        .title(match app.chat.selected_conversation() {
            Some(conversation) => format!(" {} ", conversation.title),
            None => " 对话 ".to_string(),
        });

    let mut lines: Vec<Line> = Vec::new();
    for (i, turn) in app.chat.turns.iter().enumerate() {
        let turn_selected = i == app.turn_index;
        match turn {
            TurnState::Pending { content, .. } => {
                lines.push(Line::from(vec![
                    Span::styled("you ", app.theme.text_accent()),
                    Span::styled(content.clone(), app.theme.text()),
                    Span::styled("  (发送中...)", app.theme.text_dim()),
                ]));
            }
            TurnState::Confirmed(turn) => {
                if turn.is_deleted {
                    lines.push(Line::from(Span::styled("(已删除)", app.theme.text_dim())));
                    continue;
                }
                let marker = if turn_selected { "> " } else { "  " };
                lines.push(Line::from(vec![
                    Span::styled(marker, app.theme.text_accent()),
                    Span::styled("you ", app.theme.text_accent()),
                    Span::styled(turn.user_input.clone(), app.theme.text()),
                ]));
                for (j, response) in turn.visible_responses().enumerate() {
                    let label = app
                        .impl_labels
                        .get(&response.model_implementation_id)
                        .cloned()
                        .unwrap_or_else(|| response.model_implementation_id.to_string());
                    let mut tag = label;
                    if response.is_selected {
                        tag.push_str(" [已选]");
                    }
                    if let Some(metadata) = &response.metadata {
                        if let Some(seconds) = metadata.response_time {
                            tag.push_str(&format!(" {:.1}s", seconds));
                        }
                    }
                    let highlighted = turn_selected && j == app.response_index;
                    let tag_style = if highlighted {
                        app.theme.selected()
                    } else {
                        app.theme.text_dim()
                    };
                    lines.push(Line::from(Span::styled(format!("    {}", tag), tag_style)));
                    let body = match &response.error {
                        Some(error) => Span::styled(
                            format!("    ! {}", error),
                            ratatui::style::Style::default().fg(app.theme.error),
                        ),
                        None => Span::styled(format!("    {}", response.content), app.theme.text()),
                    };
                    lines.push(Line::from(body));
                }
            }
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "暂无对话内容, 输入消息开始",
            app.theme.text_dim(),
        )));
    }

    // Keep the tail of long histories in view.
    let height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(height) as u16;
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_fanout_bar(frame: &mut Frame, app: &App, area: Rect) {
    let selection = if app.selected_impls.is_empty() {
        "未选择模型 (Ctrl+O)".to_string()
    } else {
        app.selected_impls
            .iter()
            .filter_map(|id| app.impl_labels.get(id))
            .cloned()
            .collect::<Vec<_>>()
            .join(" | ")
    };
    let mut spans = vec![
        Span::styled("发送到: ", app.theme.text_dim()),
        Span::styled(selection, app.theme.text_accent()),
    ];
    if let Some(temperature) = app.parameters.temperature {
        spans.push(Span::styled(
            format!("  temp={}", temperature),
            app.theme.text_dim(),
        ));
    }
    if let Some(max_tokens) = app.parameters.max_tokens {
        spans.push(Span::styled(
            format!("  max={}", max_tokens),
            app.theme.text_dim(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
