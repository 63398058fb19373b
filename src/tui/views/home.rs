//! Home page: status badges, maintenance banner, entry gantry, lane cards and
//! the queue strip.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::console::document::ContainerKind;
use crate::console::{Document, NodeKey};

use super::{control_hint, grid, indicator_span, node_span};

/// Lane cards per row.
const CARD_COLUMNS: usize = 4;
const CARD_HEIGHT: u16 = 6;

#[derive(Debug, Default)]
pub struct HomeView;

impl HomeView {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, document: &Document, selected: usize) {
        let banner_height = if document.is_hidden(NodeKey::MaintenanceBanner) {
            0
        } else {
            4
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_height),
                Constraint::Min(CARD_HEIGHT),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0], document);
        if banner_height > 0 {
            self.render_banner(frame, chunks[1], document);
        }
        self.render_cards(frame, chunks[2], document, selected);
        self.render_queue(frame, chunks[3], document);
        self.render_controls(frame, chunks[4], document);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, document: &Document) {
        let mut spans = vec![Span::raw(" ")];
        for key in [NodeKey::MockBadge, NodeKey::MaintenanceBadge] {
            if let Some(span) = node_span(document, key) {
                spans.push(Span::styled(
                    format!("[{}]", span.content),
                    span.style,
                ));
                spans.push(Span::raw(" "));
            }
        }
        if !document.is_hidden(NodeKey::GantryHome) {
            let title = document.text(NodeKey::GantryHome).unwrap_or_default();
            let state = document.text(NodeKey::GantryText).unwrap_or_default();
            spans.push(Span::raw(format!("  {}: ", title)));
            spans.push(indicator_span(document, NodeKey::GantryLightHome, state));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect, document: &Document) {
        let title = node_span(document, NodeKey::MaintenanceBanner)
            .unwrap_or_else(|| Span::raw(""));
        let error = document.text(NodeKey::MaintenanceError).unwrap_or_default();
        let banner = Paragraph::new(vec![
            Line::from(title),
            Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::LightRed),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(banner, area);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, document: &Document, selected: usize) {
        let cards: Vec<_> = document.children(ContainerKind::LaneStatus).collect();
        if cards.is_empty() {
            let empty = Paragraph::new(" Đang chờ dữ liệu từ server...")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, area);
            return;
        }

        let cells = grid(area, cards.len(), CARD_COLUMNS, CARD_HEIGHT);
        for (card, cell) in cards.iter().zip(cells) {
            let Some(i) = card.key.lane_index() else {
                continue;
            };
            let name = document.text(NodeKey::LaneName(i)).unwrap_or_default();
            let count = document.text(NodeKey::LaneCount(i)).unwrap_or_default();
            let status = node_span(document, NodeKey::LaneStatus(i)).unwrap_or_else(|| Span::raw(""));

            let border = if i == selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let body = Paragraph::new(vec![
                Line::from(vec![Span::raw(" "), status]),
                Line::from(format!(" Đếm: {}", count)),
                Line::from(vec![
                    Span::raw(" "),
                    indicator_span(document, NodeKey::LaneSensor(i), "Sensor"),
                    Span::raw("  "),
                    indicator_span(document, NodeKey::LaneGrab(i), "Thu"),
                    Span::raw("  "),
                    indicator_span(document, NodeKey::LanePush(i), "Đẩy"),
                ]),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!(" {}. {} ", i + 1, name)),
            );
            frame.render_widget(body, cell);
        }
    }

    fn render_queue(&self, frame: &mut Frame, area: Rect, document: &Document) {
        let mut spans = vec![Span::raw(" ")];
        for chip in document.children(ContainerKind::Queue) {
            if let Some(span) = node_span(document, chip.key) {
                spans.push(span);
                spans.push(Span::raw("  "));
            }
        }
        let strip = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Hàng chờ "),
        );
        frame.render_widget(strip, area);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect, document: &Document) {
        let line = Line::from(vec![
            Span::raw(" "),
            control_hint(document, NodeKey::ResetCountButton, "c"),
            Span::raw("  "),
            control_hint(document, NodeKey::ResetMaintenanceButton, "m"),
            Span::raw("  "),
            control_hint(document, NodeKey::ResetQueueButton, "x"),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}
