//! Reusable TUI components.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::theme::Theme;

/// Header component showing the active page and gateway address
pub struct Header<'a> {
    pub title: &'a str,
    pub path: &'a str,
    pub api_url: &'a str,
    pub username: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(30),
                Constraint::Min(20),
                Constraint::Length(24),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(self.title, self.theme.text_accent()),
            Span::styled(format!("  {}", self.path), self.theme.text_dim()),
        ]))
        .alignment(Alignment::Left);
        title.render(chunks[0], buf);

        let gateway = Paragraph::new(self.api_url)
            .style(self.theme.text_dim())
            .alignment(Alignment::Center);
        gateway.render(chunks[1], buf);

        let user = Paragraph::new(self.username)
            .style(self.theme.text_dim())
            .alignment(Alignment::Right);
        user.render(chunks[2], buf);
    }
}

/// Status bar component
pub struct StatusBar<'a> {
    pub left: &'a str,
    pub center: &'a str,
    pub right: &'a str,
    pub error: bool,
    pub theme: &'a Theme,
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(area);

        let left = Paragraph::new(self.left)
            .style(self.theme.text_dim())
            .alignment(Alignment::Left);
        left.render(chunks[0], buf);

        let center_style = if self.error {
            Style::default().fg(self.theme.error)
        } else {
            self.theme.text_dim()
        };
        let center = Paragraph::new(self.center)
            .style(center_style)
            .alignment(Alignment::Center);
        center.render(chunks[1], buf);

        let right = Paragraph::new(self.right)
            .style(self.theme.text_dim())
            .alignment(Alignment::Right);
        right.render(chunks[2], buf);
    }
}

/// Loading spinner component
pub struct Spinner<'a> {
    pub message: &'a str,
    pub frame: usize,
    pub theme: &'a Theme,
}

impl<'a> Widget for Spinner<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        let frame = frames[self.frame % frames.len()];

        let text = format!("{} {}", frame, self.message);
        let paragraph = Paragraph::new(text)
            .style(self.theme.text_accent())
            .alignment(Alignment::Left);
        paragraph.render(area, buf);
    }
}

/// Input box component for the chat message editor
pub struct InputBox<'a> {
    pub content: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<'a> Widget for InputBox<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .title(" Message ");
        let inner = block.inner(area);
        block.render(area, buf);

        let display_text = if self.content.is_empty() {
            Span::styled(self.placeholder, self.theme.text_dim())
        } else {
            Span::styled(self.content, self.theme.text())
        };

        let paragraph = Paragraph::new(display_text)
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(self.theme.input_bg));
        paragraph.render(inner, buf);
    }
}

/// Centered rectangle used by dialog overlays.
pub fn centered_rect(area: Rect, max_width: u16, max_height: u16) -> Rect {
    let width = area.width.min(max_width).max(40.min(area.width));
    let height = area.height.min(max_height).max(10.min(area.height));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}
