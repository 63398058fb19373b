//! Log Panel View - Always visible activity log
//!
//! Shows the console's log lines, newest first, at the bottom of the screen.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::console::{LogLine, LogPanel};

use super::super::theme::tone_color;

/// State for the Log Panel view
#[derive(Debug, Default)]
pub struct LogPanelView {
    /// Whether the panel is collapsed to a single line
    pub collapsed: bool,
}

impl LogPanelView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Height this panel wants (for layout)
    pub fn preferred_height(&self) -> u16 {
        if self.collapsed { 1 } else { 8 }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, log: &LogPanel) {
        if self.collapsed {
            self.render_collapsed(frame, area, log);
        } else {
            self.render_expanded(frame, area, log);
        }
    }

    fn line(entry: &LogLine) -> Line<'static> {
        let color = tone_color(entry.tone());
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", entry.time),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                entry.prefix(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(entry.message.clone(), Style::default().fg(color)),
        ])
    }

    fn render_collapsed(&self, frame: &mut Frame, area: Rect, log: &LogPanel) {
        let line = match log.latest() {
            Some(entry) => Self::line(entry),
            None => Line::styled(" Log: (trống) [L để mở rộng]", Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_expanded(&self, frame: &mut Frame, area: Rect, log: &LogPanel) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Nhật ký ({}) [L] ", log.len()));

        if log.is_empty() {
            let empty = Paragraph::new(" Chưa có hoạt động")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = log
            .entries()
            .take(area.height.saturating_sub(1) as usize)
            .map(|entry| ListItem::new(Self::line(entry)))
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}
