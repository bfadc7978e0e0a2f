//! Model management: logical models plus their provider implementations.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use crate::api::types::ModelImplementation;
use crate::tui::app::{App, Pane};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_models(frame, app, chunks[0]);
    render_implementations(frame, app, chunks[1]);
}

fn render_models(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.model_pane == Pane::List;
    let rows: Vec<Row> = app
        .models
        .models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let style = if i == app.model_index {
                app.theme.selected()
            } else {
                app.theme.text()
            };
            let capabilities = model
                .capabilities
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(",");
            Row::new(vec![model.name.clone(), model.family.clone(), capabilities]).style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Min(16),
        ],
    )
    .header(Row::new(vec!["名称", "系列", "能力"]).style(app.theme.text_dim()))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border(focused))
            .title(" 模型  a:添加 e:编辑 d:删除 "),
    );
    frame.render_widget(table, area);
}

fn price_summary(implementation: &ModelImplementation) -> String {
    match &implementation.pricing_info {
        Some(pricing) => {
            let input = pricing.input_price.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            let output = pricing.output_price.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            format!("{} {}/{}", pricing.currency, input, output)
        }
        None => "-".to_string(),
    }
}

fn render_implementations(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.model_pane == Pane::Detail;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(focused))
        .title(" 模型实现  a:添加 Ctrl+↑/↓:排序 ");

    if app.selected_model().is_none() {
        let empty = Paragraph::new("选择一个模型查看实现").style(app.theme.text_dim()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .implementations
        .implementations
        .iter()
        .enumerate()
        .map(|(i, implementation)| {
            let style = if focused && i == app.impl_index {
                app.theme.selected()
            } else if !implementation.is_available {
                app.theme.text_dim()
            } else {
                app.theme.text()
            };
            let provider = app
                .providers
                .find(implementation.provider_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "?".to_string());
            let window = implementation
                .context_window
                .map(|w| format!("{}k", w / 1000))
                .unwrap_or_else(|| "-".to_string());
            let state = if implementation.is_available { "可用" } else { "停用" };
            Row::new(vec![
                provider,
                implementation.provider_model_id.clone(),
                implementation.version.clone(),
                window,
                price_summary(implementation),
                state.to_string(),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(4),
        ],
    )
    .header(
        Row::new(vec!["提供商", "模型ID", "版本", "上下文", "价格(入/出)", "状态"])
            .style(app.theme.text_dim()),
    )
    .block(block);
    frame.render_widget(table, area);
}
