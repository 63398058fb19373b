//! Config page: the last configuration loaded from the backend.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::console::{Document, NodeKey};
use crate::models::ConfigDocument;

use super::control_hint;

#[derive(Debug, Default)]
pub struct ConfigView {
    scroll: u16,
}

impl ConfigView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        document: &Document,
        config: Option<&ConfigDocument>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let text = match config.map(ConfigDocument::to_pretty_json) {
            Some(Ok(json)) => Text::from(json),
            Some(Err(e)) => Text::styled(e.to_string(), Style::default().fg(Color::Red)),
            None => Text::styled(
                "Chưa tải cấu hình.",
                Style::default().fg(Color::DarkGray),
            ),
        };
        let body = Paragraph::new(text).scroll((self.scroll, 0)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Cấu hình "),
        );
        frame.render_widget(body, chunks[0]);

        let line = Line::from(vec![
            Span::raw(" "),
            control_hint(document, NodeKey::ReloadConfigButton, "R"),
            Span::raw("  "),
            control_hint(document, NodeKey::SaveConfigButton, "e"),
            Span::styled("  j/k: cuộn", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }
}
