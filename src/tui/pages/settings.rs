//! Settings: effective configuration, read-only.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::config::Config;
use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let config_path = Config::global_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    let entry = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", label), app.theme.text_dim()),
            Span::styled(value, app.theme.text()),
        ])
    };

    let lines = vec![
        entry("api_url", app.config.api_url().to_string()),
        entry("theme", app.theme.name.clone()),
        entry("username", app.config.get_username()),
        entry(
            "log_level",
            app.config.log_level.clone().unwrap_or_else(|| "info".to_string()),
        ),
        entry("config", config_path),
        Line::from(""),
        Line::from(Span::styled(
            "编辑配置文件后重启生效 (modelhub config path)",
            app.theme.text_dim(),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border(false))
            .title(" 设置 "),
    );
    frame.render_widget(paragraph, area);
}
