//! Sorting queue strip.

use crate::models::LaneIndex;

use super::document::{ContainerKind, Document, Fragment, Mark, NodeKey, NodeKind, Tone};

/// Chip colours, indexed by `lane_index % 5`.
pub const QUEUE_PALETTE: [Tone; 5] = [Tone::Blue, Tone::Green, Tone::Yellow, Tone::Purple, Tone::Pink];

pub fn chip_tone(lane_index: usize) -> Tone {
    QUEUE_PALETTE[lane_index % QUEUE_PALETTE.len()]
}

pub fn lane_label(lanes: &LaneIndex, lane_index: usize) -> String {
    lanes
        .name(lane_index)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Lane {}", lane_index + 1))
}

pub fn chip(lanes: &LaneIndex, position: usize, lane_index: usize) -> Fragment {
    let name = lane_label(lanes, lane_index);
    let fragment = Fragment::new(NodeKey::QueueChip(position), NodeKind::Chip)
        .tone(chip_tone(lane_index))
        .mark(Mark::QueueItem);
    if position == 0 {
        fragment.text(format!("→ {} (Next)", name)).mark(Mark::Next)
    } else {
        fragment.text(name)
    }
}

/// Rebuild the queue strip. Only chips are regenerated; the empty placeholder
/// node is kept and toggled.
pub fn render_queue(document: &mut Document, lanes: &LaneIndex, queue: &[usize]) {
    document.remove_children_where(ContainerKind::Queue, |node| node.has(Mark::QueueItem));

    document.set_hidden(NodeKey::QueueEmpty, !queue.is_empty());
    let chips = queue
        .iter()
        .enumerate()
        .map(|(position, &lane_index)| chip(lanes, position, lane_index))
        .collect();
    document.mount(ContainerKind::Queue, chips);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LaneConfig;

    fn index() -> LaneIndex {
        let lanes: Vec<_> = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                LaneConfig {
                    id: None,
                    name: Some(name.to_string()),
                    sensor_pin: None,
                    push_pin: None,
                    pull_pin: None,
                }
                .to_lane(i)
            })
            .collect();
        LaneIndex::from_lanes(&lanes)
    }

    fn chip_texts(doc: &Document) -> Vec<String> {
        doc.children(ContainerKind::Queue)
            .filter(|n| n.has(Mark::QueueItem))
            .map(|n| n.text.clone())
            .collect()
    }

    #[test]
    fn test_queue_head_marked_next() {
        let mut doc = Document::new();
        render_queue(&mut doc, &index(), &[2, 0, 1]);

        assert_eq!(chip_texts(&doc), vec!["→ C (Next)", "A", "B"]);
        let heads: Vec<_> = doc
            .children(ContainerKind::Queue)
            .filter(|n| n.has(Mark::Next))
            .collect();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].tone, Some(Tone::Yellow));
        assert!(doc.is_hidden(NodeKey::QueueEmpty));
    }

    #[test]
    fn test_empty_queue_shows_placeholder_only() {
        let mut doc = Document::new();
        render_queue(&mut doc, &index(), &[0, 1]);
        render_queue(&mut doc, &index(), &[]);

        assert!(chip_texts(&doc).is_empty());
        assert!(!doc.is_hidden(NodeKey::QueueEmpty));
        assert!(doc.contains(NodeKey::QueueEmpty));
    }

    #[test]
    fn test_unknown_lane_falls_back_to_number() {
        let mut doc = Document::new();
        render_queue(&mut doc, &index(), &[1, 7]);
        assert_eq!(chip_texts(&doc), vec!["→ B (Next)", "Lane 8"]);
        assert_eq!(chip_tone(7), Tone::Yellow);
        assert_eq!(chip_tone(5), Tone::Blue);
    }
}
