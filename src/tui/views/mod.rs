//! TUI Views module
//!
//! Each page draws straight from the console's view document; views hold no
//! state of their own beyond selection and scroll.

mod config;
mod home;
mod log_panel;
mod test_bench;

pub use config::ConfigView;
pub use home::HomeView;
pub use log_panel::LogPanelView;
pub use test_bench::TestBenchView;

use ratatui::prelude::*;

use crate::console::{Document, NodeKey};

use super::theme::{indicator_symbol, node_style};

/// Span for a node's text, or nothing if it is absent or hidden.
pub(crate) fn node_span(document: &Document, key: NodeKey) -> Option<Span<'static>> {
    let node = document.node(key)?;
    if node.is_hidden() {
        return None;
    }
    Some(Span::styled(node.text.clone(), node_style(node)))
}

/// `● label` for an indicator light.
pub(crate) fn indicator_span(document: &Document, key: NodeKey, label: &str) -> Span<'static> {
    match document.node(key) {
        Some(node) => Span::styled(
            format!("{} {}", indicator_symbol(node), label),
            node_style(node),
        ),
        None => Span::styled(format!("· {}", label), Style::default().fg(Color::DarkGray)),
    }
}

/// `[k] Label` hint for a control, greyed out when it would not act.
pub(crate) fn control_hint(document: &Document, key: NodeKey, shortcut: &str) -> Span<'static> {
    let label = document.text(key).unwrap_or_default();
    let style = match document.node(key) {
        Some(node) if document.is_enabled(key) => node_style(node),
        _ => Style::default().fg(Color::DarkGray),
    };
    Span::styled(format!("[{}] {}", shortcut, label), style)
}

/// Split `area` into a row-major grid of `count` cells.
pub(crate) fn grid(area: Rect, count: usize, columns: usize, row_height: u16) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let columns = columns.clamp(1, count);
    let rows = count.div_ceil(columns);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            (0..rows)
                .map(|_| Constraint::Length(row_height))
                .collect::<Vec<_>>(),
        )
        .split(area);

    let mut cells = Vec::with_capacity(count);
    for row in row_areas.iter() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                (0..columns)
                    .map(|_| Constraint::Ratio(1, columns as u32))
                    .collect::<Vec<_>>(),
            )
            .split(*row);
        cells.extend(cols.iter().copied());
    }
    cells.truncate(count);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_row_major() {
        let cells = grid(Rect::new(0, 0, 90, 20), 4, 3, 5);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].y, cells[2].y);
        assert!(cells[3].y > cells[0].y);
        assert_eq!(cells[3].x, cells[0].x);
    }

    #[test]
    fn test_grid_empty() {
        assert!(grid(Rect::new(0, 0, 10, 10), 0, 3, 5).is_empty());
    }

    #[test]
    fn test_hidden_node_has_no_span() {
        let doc = Document::new();
        assert!(node_span(&doc, NodeKey::MockBadge).is_none());
        assert!(node_span(&doc, NodeKey::ResetQueueButton).is_some());
    }
}
