//! Mapping from view-document tones and marks to terminal styles.

use ratatui::style::{Color, Modifier, Style};

use crate::console::{Mark, Node, NodeKind, Tone};

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Gray => Color::Gray,
        Tone::Green => Color::Green,
        Tone::Red => Color::Red,
        Tone::Yellow => Color::Yellow,
        Tone::Cyan => Color::Cyan,
        Tone::Indigo => Color::LightBlue,
        Tone::Blue => Color::Blue,
        Tone::Purple => Color::Magenta,
        Tone::Pink => Color::LightMagenta,
        Tone::StrongRed => Color::LightRed,
        Tone::StrongYellow => Color::LightYellow,
    }
}

/// Style for a node, from its marks first and its tone second.
pub fn node_style(node: &Node) -> Style {
    let base = Style::default();
    if node.disabled || node.has(Mark::Locked) {
        return base.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
    }
    if node.has(Mark::Dimmed) || node.has(Mark::RelayDisabled) {
        return base.fg(Color::DarkGray);
    }
    if node.has(Mark::SensorActive) {
        return base.fg(Color::LightRed).add_modifier(Modifier::BOLD);
    }
    if node.has(Mark::RelayActive) {
        return base.fg(Color::LightGreen).add_modifier(Modifier::BOLD);
    }
    if node.has(Mark::StatusSorting) {
        return base.fg(Color::Black).bg(Color::Green);
    }
    if node.has(Mark::StatusPassThrough) {
        return base.fg(Color::Black).bg(Color::LightBlue);
    }
    if node.has(Mark::StatusPulse) {
        return base.fg(Color::Black).bg(Color::Yellow);
    }

    let styled = match node.tone {
        Some(tone) => base.fg(tone_color(tone)),
        None => base,
    };
    match node.kind {
        NodeKind::Badge | NodeKind::Banner => styled.add_modifier(Modifier::BOLD),
        NodeKind::Placeholder => styled.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        NodeKind::Chip if node.has(Mark::Next) => styled.add_modifier(Modifier::BOLD),
        _ => styled,
    }
}

/// Glyph for an indicator light.
pub fn indicator_symbol(node: &Node) -> &'static str {
    if node.has(Mark::Dimmed) || node.has(Mark::RelayDisabled) {
        "·"
    } else if node.has(Mark::SensorActive) || node.has(Mark::RelayActive) {
        "●"
    } else {
        "○"
    }
}
