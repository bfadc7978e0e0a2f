//! User management placeholder; the gateway has no user endpoints yet.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new("用户管理尚未开放")
        .style(app.theme.text_dim())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border(false))
                .title(" 用户管理 "),
        );
    frame.render_widget(paragraph, area);
}
