//! Provider management: master list plus key/quota detail.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::api::types::FreeQuotaType;
use crate::tui::app::{App, Pane};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn quota_summary(provider: &crate::api::types::Provider) -> String {
    let Some(quota) = &provider.free_quota else {
        return "-".to_string();
    };
    let kind = match provider.free_quota_type {
        Some(FreeQuotaType::Credit) => "额度",
        Some(FreeQuotaType::SharedTokens) => "共享token",
        Some(FreeQuotaType::PerModelTokens) => "按模型token",
        None => "?",
    };
    format!("{} {} ({})", kind, quota.amount, quota.reset_period.label())
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.provider_pane == Pane::List;
    let rows: Vec<Row> = app
        .providers
        .providers
        .iter()
        .enumerate()
        .map(|(i, provider)| {
            let style = if i == app.provider_index {
                app.theme.selected()
            } else {
                app.theme.text()
            };
            Row::new(vec![
                provider.name.clone(),
                provider.base_url.clone(),
                provider.api_keys_count.to_string(),
                quota_summary(provider),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(6),
            Constraint::Length(24),
        ],
    )
    .header(Row::new(vec!["名称", "接口地址", "密钥", "免费额度"]).style(app.theme.text_dim()))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border(focused))
            .title(" 提供商  a:添加 e:编辑 d:删除 q:额度 x:删额度 "),
    );
    frame.render_widget(table, area);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.provider_pane == Pane::Detail;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(focused))
        .title(" API密钥  Ctrl+↑/↓:排序 ");

    let Some(provider) = app.selected_provider() else {
        let empty = Paragraph::new("选择一个提供商查看密钥").style(app.theme.text_dim()).block(block);
        frame.render_widget(empty, area);
        return;
    };

    let mut items: Vec<ListItem> = vec![ListItem::new(Line::from(vec![
        Span::styled(provider.name.clone(), app.theme.text_accent()),
        Span::styled(
            format!("  {}", provider.description.as_deref().unwrap_or("")),
            app.theme.text_dim(),
        ),
    ]))];
    items.push(ListItem::new(""));

    if app.keys.keys.is_empty() {
        items.push(ListItem::new(
            Line::from(Span::styled("暂无密钥 (a 添加)", app.theme.text_dim())),
        ));
    }
    for (i, key) in app.keys.keys.iter().enumerate() {
        let style = if focused && i == app.key_index {
            app.theme.selected()
        } else {
            app.theme.text()
        };
        let preview = key.key_preview.as_deref().unwrap_or("***");
        items.push(
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}. {}", key.sort_order + 1, key.alias)),
                Span::styled(format!("  {}", preview), app.theme.text_dim()),
            ]))
            .style(style),
        );
    }

    frame.render_widget(List::new(items).block(block), area);
}
