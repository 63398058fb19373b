//! Test page: live sensor grid, relay test buttons, auto test and, in mock
//! mode, sensor simulation.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::console::document::ContainerKind;
use crate::console::{Document, NodeKey};

use super::{control_hint, grid, indicator_span, node_span};

const CELL_HEIGHT: u16 = 4;

#[derive(Debug, Default)]
pub struct TestBenchView;

impl TestBenchView {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, document: &Document, selected: usize) {
        let mock_visible = !document.is_hidden(NodeKey::MockControls);
        let sections = |kind| {
            let container = document.container(kind);
            let rows = container
                .children
                .len()
                .div_ceil(container.columns.max(1))
                .max(1) as u16;
            rows * CELL_HEIGHT + 2
        };

        let mut constraints = vec![
            Constraint::Length(sections(ContainerKind::SensorTest)),
            Constraint::Length(sections(ContainerKind::RelayTest)),
            Constraint::Length(1),
        ];
        if mock_visible {
            constraints.push(Constraint::Min(CELL_HEIGHT + 2));
        } else {
            constraints.push(Constraint::Min(0));
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_sensors(frame, chunks[0], document, selected);
        self.render_relays(frame, chunks[1], document, selected);
        self.render_controls(frame, chunks[2], document);
        if mock_visible {
            self.render_mock(frame, chunks[3], document, selected);
        }
    }

    fn section(title: &str) -> Block<'static> {
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", title))
    }

    fn cell_block(name: &str, i: usize, selected: usize) -> Block<'static> {
        let style = if i == selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(format!(" {}. {} ", i + 1, name))
    }

    fn render_sensors(&self, frame: &mut Frame, area: Rect, document: &Document, selected: usize) {
        let mut title = "Kiểm tra Sensor".to_string();
        if !document.is_hidden(NodeKey::GantryTest) {
            title.push_str(" | ");
            title.push_str(document.text(NodeKey::GantryTest).unwrap_or_default());
        }
        let block = Self::section(&title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !document.is_hidden(NodeKey::GantryTest) {
            let light = indicator_span(document, NodeKey::GantryLightTest, "Gác cổng");
            let header = Rect { height: 1, ..inner };
            frame.render_widget(Paragraph::new(Line::from(light)).alignment(Alignment::Right), header);
        }

        let container = document.container(ContainerKind::SensorTest);
        let cells = grid(inner, container.children.len(), container.columns, CELL_HEIGHT);
        for (node, cell) in document.children(ContainerKind::SensorTest).zip(cells) {
            let Some(i) = node.key.lane_index() else {
                continue;
            };
            let name = document.text(NodeKey::SensorCellLabel(i)).unwrap_or_default();
            let body = Paragraph::new(Line::from(vec![
                Span::raw(" "),
                indicator_span(document, NodeKey::TestSensor(i), "Sensor"),
            ]))
            .block(Self::cell_block(name, i, selected));
            frame.render_widget(body, cell);
        }
    }

    fn render_relays(&self, frame: &mut Frame, area: Rect, document: &Document, selected: usize) {
        let block = Self::section("Kiểm tra Relay");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let container = document.container(ContainerKind::RelayTest);
        let cells = grid(inner, container.children.len(), container.columns, CELL_HEIGHT);
        for (node, cell) in document.children(ContainerKind::RelayTest).zip(cells) {
            let Some(i) = node.key.lane_index() else {
                continue;
            };
            let name = document.text(NodeKey::RelayCellLabel(i)).unwrap_or_default();
            let line = match node_span(document, NodeKey::RelayPlaceholder(i)) {
                Some(placeholder) => Line::from(vec![Span::raw(" "), placeholder]),
                None => Line::from(vec![
                    Span::raw(" "),
                    control_hint(document, NodeKey::RelayGrabButton(i), "g"),
                    Span::raw("  "),
                    control_hint(document, NodeKey::RelayPushButton(i), "p"),
                ]),
            };
            let body = Paragraph::new(line).block(Self::cell_block(name, i, selected));
            frame.render_widget(body, cell);
        }
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect, document: &Document) {
        let line = Line::from(vec![
            Span::raw(" "),
            control_hint(document, NodeKey::TestAllRelaysButton, "a"),
            Span::raw("  "),
            control_hint(document, NodeKey::ToggleAutoTestButton, "t"),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_mock(&self, frame: &mut Frame, area: Rect, document: &Document, selected: usize) {
        let block = Self::section("Giả lập Sensor (Mock)");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let container = document.container(ContainerKind::MockLanes);
        let cells = grid(inner, container.children.len(), container.columns, CELL_HEIGHT + 1);
        for (node, cell) in document.children(ContainerKind::MockLanes).zip(cells) {
            let Some(i) = node.key.lane_index() else {
                continue;
            };
            let name = document.text(NodeKey::MockCellLabel(i)).unwrap_or_default();
            let lines = match node_span(document, NodeKey::MockPlaceholder(i)) {
                Some(placeholder) => vec![Line::from(vec![Span::raw(" "), placeholder])],
                None => vec![
                    Line::from(vec![
                        Span::raw(" "),
                        node_span(document, NodeKey::MockPin(i)).unwrap_or_else(|| Span::raw("")),
                        Span::raw("  "),
                        node_span(document, NodeKey::MockStatus(i)).unwrap_or_else(|| Span::raw("")),
                    ]),
                    Line::from(vec![
                        Span::raw(" "),
                        control_hint(document, NodeKey::MockActiveButton(i), "d"),
                        Span::raw("  "),
                        control_hint(document, NodeKey::MockIdleButton(i), "i"),
                    ]),
                ],
            };
            let body = Paragraph::new(lines).block(Self::cell_block(name, i, selected));
            frame.render_widget(body, cell);
        }
    }
}
