//! Top-level layout: header, sider navigation, page content, status bar,
//! and the dialog overlays.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, DialogKind, DialogState};
use super::components::{centered_rect, Header, Spinner, StatusBar};
use super::forms::FormState;
use super::pages;
use super::route::Route;
use crate::bus::NoticeLevel;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if let Some(form) = &app.form {
        render_form(frame, app, form);
    }
    if let Some(dialog) = &app.dialog {
        render_dialog(frame, app, dialog);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let username = app.config.get_username();
    frame.render_widget(
        Header {
            title: app.route.title(),
            path: app.route.path(),
            api_url: app.config.api_url(),
            username: &username,
            theme: &app.theme,
        },
        area,
    );
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(0)])
        .split(area);

    render_nav(frame, app, chunks[0]);

    // List-load failures render an inline banner above the page; 'r'
    // retries the fetch.
    let mut content = chunks[1];
    let banner = match app.route {
        Route::Providers => app.providers.error.as_deref().or(app.keys.error.as_deref()),
        Route::Models => app
            .models
            .error
            .as_deref()
            .or(app.implementations.error.as_deref()),
        Route::Chat => app.chat.error.as_deref(),
        _ => None,
    };
    if let Some(error) = banner {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(content);
        let hint = if matches!(app.route, Route::Providers | Route::Models) {
            "  (r 重试)"
        } else {
            ""
        };
        let line = Paragraph::new(format!("! {}{}", error, hint))
            .style(ratatui::style::Style::default().fg(app.theme.error));
        frame.render_widget(line, rows[0]);
        content = rows[1];
    }

    match app.route {
        Route::Dashboard => pages::dashboard::render(frame, app, content),
        Route::Providers => pages::providers::render(frame, app, content),
        Route::Models => pages::models::render(frame, app, content),
        Route::Chat => pages::chat::render(frame, app, content),
        Route::Users => pages::users::render(frame, app, content),
        Route::Settings => pages::settings::render(frame, app, content),
    }
}

fn render_nav(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let label = format!(" {} {}", i + 1, route.title());
            let style = if *route == app.route {
                app.theme.selected()
            } else {
                app.theme.text()
            };
            ListItem::new(label).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::RIGHT)
            .border_style(app.theme.border(false)),
    );
    frame.render_widget(list, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if app.busy() {
        frame.render_widget(
            Spinner {
                message: "working...",
                frame: app.spinner_frame,
                theme: &app.theme,
            },
            area,
        );
        return;
    }

    let (center, error) = match &app.notice {
        Some((level, message)) => (message.as_str(), *level == NoticeLevel::Error),
        None => ("", false),
    };
    frame.render_widget(
        StatusBar {
            left: "?: help  Tab: page  Ctrl+C: quit",
            center,
            right: app.config.api_url(),
            error,
            theme: &app.theme,
        },
        area,
    );
}

fn render_dialog(frame: &mut Frame, app: &App, dialog: &DialogState) {
    let area = centered_rect(frame.area(), 64, 20);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(true))
        .title(format!(" {} ", dialog.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Confirm and help dialogs carry only a message.
    if dialog.items.is_empty() {
        let mut text = dialog.message.clone().unwrap_or_default();
        if matches!(dialog.kind, DialogKind::Confirm(_)) {
            text.push_str("\n\nEnter: confirm  Esc: cancel");
        }
        let paragraph = Paragraph::new(text)
            .style(app.theme.text())
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let search = Paragraph::new(format!("/ {}", dialog.search_query)).style(app.theme.text_dim());
    frame.render_widget(search, chunks[0]);

    let multi = dialog.kind == DialogKind::ImplementationPicker;
    let items: Vec<ListItem> = dialog
        .filtered_indices
        .iter()
        .enumerate()
        .map(|(row, &index)| {
            let item = &dialog.items[index];
            let mut spans = Vec::new();
            if multi {
                let mark = if item.checked { "[x] " } else { "[ ] " };
                spans.push(Span::styled(mark, app.theme.text_accent()));
            } else if item.checked {
                spans.push(Span::styled("* ", app.theme.text_accent()));
            }
            spans.push(Span::styled(item.label.clone(), app.theme.text()));
            if let Some(description) = &item.description {
                spans.push(Span::styled(format!("  {}", description), app.theme.text_dim()));
            }
            let style = if row == dialog.selected_index {
                app.theme.selected()
            } else {
                app.theme.text()
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();
    frame.render_widget(List::new(items), chunks[1]);

    if let Some(message) = &dialog.message {
        frame.render_widget(Paragraph::new(message.as_str()).style(app.theme.text_dim()), chunks[2]);
    }
}

fn render_form(frame: &mut Frame, app: &App, form: &FormState) {
    let height = (form.fields.len() as u16 + 5).min(24);
    let area = centered_rect(frame.area(), 64, height);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(true))
        .title(format!(" {} ", form.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let value = if field.secret && !field.value.is_empty() {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let style = if i == form.focus {
            app.theme.text_accent()
        } else {
            app.theme.text()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", field.label), app.theme.text_dim()),
            Span::styled(value, style),
        ]));
    }
    lines.push(Line::from(""));
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.clone(),
            ratatui::style::Style::default().fg(app.theme.error),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Enter: submit  Tab: next field  Esc: cancel",
            app.theme.text_dim(),
        ))),
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
